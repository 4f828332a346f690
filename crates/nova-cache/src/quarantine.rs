//! The Quarantine/Snapshot protocol: a scoped read-view over the
//! shared caches that routes every write to a discarded side area, so that
//! speculative work against an unsaved buffer can never pollute the caches
//! other requests see.

use std::collections::HashMap;
use std::sync::Arc;

use nova_core::{Backend, SymbolName};
use nova_ids::EntryId;

use crate::InvalidationEngine;

/// A quarantined view over a shared [`InvalidationEngine`].
///
/// Reads fall through to the shared engine when the side area has no entry
/// of its own; writes only ever land in the side area. Dropping a
/// `Quarantine` discards every side write it accumulated.
pub struct Quarantine<'a, B: Backend> {
    shared: &'a InvalidationEngine<B>,
    shallow_side: HashMap<SymbolName, Option<Arc<B::ShallowDecl>>>,
    folded_side: HashMap<SymbolName, Arc<B::FoldedDecl>>,
    linearization_side: HashMap<SymbolName, Arc<B::Linearization>>,
    tast_side: HashMap<EntryId, Arc<B::Tast>>,
}

impl<'a, B: Backend> Quarantine<'a, B> {
    pub fn new(shared: &'a InvalidationEngine<B>) -> Self {
        Self {
            shared,
            shallow_side: HashMap::new(),
            folded_side: HashMap::new(),
            linearization_side: HashMap::new(),
            tast_side: HashMap::new(),
        }
    }

    /// Shallow decl lookup: side area shadows the shared cache. A `None`
    /// entry in the side area means "looked up under quarantine and found
    /// absent", which also shadows a shared hit (the unsaved buffer may have
    /// deleted the declaration).
    pub fn shallow_decl(
        &mut self,
        symbol: &SymbolName,
        compute: impl FnOnce() -> Option<B::ShallowDecl>,
    ) -> Option<Arc<B::ShallowDecl>> {
        if let Some(side) = self.shallow_side.get(symbol) {
            return side.clone();
        }
        if let Some(shared) = self.shared.shallow().get(symbol) {
            return Some(shared);
        }
        let computed = compute().map(Arc::new);
        self.shallow_side.insert(symbol.clone(), computed.clone());
        computed
    }

    pub fn folded_decl(&mut self, symbol: &SymbolName, compute: impl FnOnce() -> B::FoldedDecl) -> Arc<B::FoldedDecl> {
        if let Some(side) = self.folded_side.get(symbol) {
            return side.clone();
        }
        if let Some(shared) = self.shared.folded().get(symbol) {
            return shared;
        }
        let arc = Arc::new(compute());
        self.folded_side.insert(symbol.clone(), arc.clone());
        arc
    }

    pub fn linearization(&mut self, class: &SymbolName, compute: impl FnOnce() -> B::Linearization) -> Arc<B::Linearization> {
        if let Some(side) = self.linearization_side.get(class) {
            return side.clone();
        }
        if let Some(shared) = self.shared.linearization().get(class) {
            return shared;
        }
        let arc = Arc::new(compute());
        self.linearization_side.insert(class.clone(), arc.clone());
        arc
    }

    pub fn tast(&mut self, entry: EntryId, compute: impl FnOnce() -> B::Tast) -> Arc<B::Tast> {
        if let Some(side) = self.tast_side.get(&entry) {
            return side.clone();
        }
        if let Some(shared) = self.shared.tast().get(entry) {
            return shared;
        }
        let arc = Arc::new(compute());
        self.tast_side.insert(entry, arc.clone());
        arc
    }

    /// Explicitly mark a symbol as having no shallow decl under this
    /// quarantine, shadowing whatever the shared cache holds. Used when the
    /// quarantined entry's unsaved contents removed a declaration outright.
    pub fn shadow_shallow_absent(&mut self, symbol: SymbolName) {
        self.shallow_side.insert(symbol, None);
    }

    pub fn side_shallow_len(&self) -> usize {
        self.shallow_side.len()
    }

    pub fn side_folded_len(&self) -> usize {
        self.folded_side.len()
    }
}
