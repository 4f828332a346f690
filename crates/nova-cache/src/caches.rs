//! The four derived cache layers: shallow decls, folded decls,
//! linearizations, and TASTs.
//!
//! Each is a thin memoizing map. The *policy* of when to invalidate them
//! belongs to [`crate::InvalidationEngine`]; these types only know how to
//! store, fetch, and forget.

use std::collections::HashMap;
use std::sync::Arc;

use nova_core::SymbolName;
use nova_ids::EntryId;

/// Per-symbol shallow declaration cache.
///
/// Depends on whether the defining file has an entry and, if so, that
/// entry's contents; otherwise on the file's disk contents. Invalidated
/// per-symbol by both triggers.
#[derive(Debug)]
pub struct ShallowDeclCache<D> {
    entries: HashMap<SymbolName, Arc<D>>,
}

impl<D> Default for ShallowDeclCache<D> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<D> ShallowDeclCache<D> {
    pub fn get(&self, symbol: &SymbolName) -> Option<Arc<D>> {
        self.entries.get(symbol).cloned()
    }

    pub fn get_or_compute(&mut self, symbol: &SymbolName, compute: impl FnOnce() -> Option<D>) -> Option<Arc<D>> {
        if let Some(existing) = self.entries.get(symbol) {
            return Some(existing.clone());
        }
        let computed = compute()?;
        let arc = Arc::new(computed);
        self.entries.insert(symbol.clone(), arc.clone());
        Some(arc)
    }

    pub fn invalidate(&mut self, symbol: &SymbolName) {
        self.entries.remove(symbol);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-symbol folded declaration cache.
///
/// Depends on the set of entries, all their contents, and all disk contents
/// — so both triggers clear it wholesale rather than invalidating
/// individual symbols.
#[derive(Debug)]
pub struct FoldedDeclCache<D> {
    entries: HashMap<SymbolName, Arc<D>>,
}

impl<D> Default for FoldedDeclCache<D> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<D> FoldedDeclCache<D> {
    pub fn get(&self, symbol: &SymbolName) -> Option<Arc<D>> {
        self.entries.get(symbol).cloned()
    }

    pub fn get_or_compute(&mut self, symbol: &SymbolName, compute: impl FnOnce() -> D) -> Arc<D> {
        if let Some(existing) = self.entries.get(symbol) {
            return existing.clone();
        }
        let arc = Arc::new(compute());
        self.entries.insert(symbol.clone(), arc.clone());
        arc
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Per-class linearization (method-resolution order) cache. Same dependency
/// shape as [`FoldedDeclCache`].
#[derive(Debug)]
pub struct LinearizationCache<L> {
    entries: HashMap<SymbolName, Arc<L>>,
}

impl<L> Default for LinearizationCache<L> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<L> LinearizationCache<L> {
    pub fn get(&self, class: &SymbolName) -> Option<Arc<L>> {
        self.entries.get(class).cloned()
    }

    pub fn get_or_compute(&mut self, class: &SymbolName, compute: impl FnOnce() -> L) -> Arc<L> {
        if let Some(existing) = self.entries.get(class) {
            return existing.clone();
        }
        let arc = Arc::new(compute());
        self.entries.insert(class.clone(), arc.clone());
        arc
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Per-open-buffer typed AST cache, keyed by [`EntryId`]. Same dependency
/// shape as [`FoldedDeclCache`] (it additionally depends on the entry set).
#[derive(Debug)]
pub struct TastCache<T> {
    entries: HashMap<EntryId, Arc<T>>,
}

impl<T> Default for TastCache<T> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<T> TastCache<T> {
    pub fn get(&self, entry: EntryId) -> Option<Arc<T>> {
        self.entries.get(&entry).cloned()
    }

    pub fn get_or_compute(&mut self, entry: EntryId, compute: impl FnOnce() -> T) -> Arc<T> {
        if let Some(existing) = self.entries.get(&entry) {
            return existing.clone();
        }
        let arc = Arc::new(compute());
        self.entries.insert(entry, arc.clone());
        arc
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
