//! Forward Naming Table (FNT) and Reverse Naming Table (RNT).
//!
//! Both tables reflect disk only: they are created from saved state at
//! initialize time and mutated only by the Change-Backlog Processor
//! (Trigger B). Nothing in this crate ever
//! looks at an open buffer's contents — callers that need entry-aware lookups
//! skip the RNT for paths that have an entry and consult that entry's AST
//! instead (the `InvalidationEngine` in `nova-cache` enforces this).

use std::collections::HashMap;
use std::sync::Arc;

use nova_core::{FileInfo, RepoPath, SymbolName};

/// path → the set of symbols defined in that file.
#[derive(Debug, Default)]
pub struct ForwardNamingTable {
    files: HashMap<RepoPath, FileInfo>,
}

impl ForwardNamingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table from a saved-state snapshot.
    pub fn from_saved_state(files: HashMap<RepoPath, FileInfo>) -> Self {
        Self { files }
    }

    pub fn get(&self, path: &RepoPath) -> Option<&FileInfo> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Replace the `FileInfo` for `path`, returning the previous one (or
    /// `FileInfo::empty()` if the file was not previously known). This is the
    /// only mutation Trigger B performs on the FNT.
    pub fn set(&mut self, path: RepoPath, info: FileInfo) -> FileInfo {
        if info.symbols.is_empty() {
            self.files.remove(&path).unwrap_or_default()
        } else {
            self.files.insert(path, info).unwrap_or_default()
        }
    }
}

/// A name delta produced by applying Trigger B to one path: which symbols
/// stopped being defined there, and which symbols now are. The symbol-index
/// env (an external collaborator) is updated with exactly this delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDelta {
    pub removed: Vec<SymbolName>,
    pub added: Vec<SymbolName>,
}

impl NameDelta {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// symbol name → defining file.
///
/// Backed by an immutable `persistent` index loaded once from saved state,
/// plus a mutable `delta` layered on top. A `delta` entry of `None` means the
/// symbol was removed relative to the persistent base; `Some(path)` means it
/// now resolves to `path` (possibly overriding the persistent base).
#[derive(Debug)]
pub struct ReverseNamingTable {
    persistent: Arc<HashMap<SymbolName, RepoPath>>,
    delta: HashMap<SymbolName, Option<RepoPath>>,
}

impl ReverseNamingTable {
    pub fn from_saved_state(persistent: Arc<HashMap<SymbolName, RepoPath>>) -> Self {
        Self {
            persistent,
            delta: HashMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::from_saved_state(Arc::new(HashMap::new()))
    }

    /// Resolve a symbol to its defining file, if any.
    ///
    /// Callers must skip this for a symbol defined in a file that currently
    /// has an open entry; that check is the caller's responsibility since
    /// the RNT has no notion of entries at all.
    pub fn lookup(&self, name: &SymbolName) -> Option<&RepoPath> {
        match self.delta.get(name) {
            Some(Some(path)) => Some(path),
            Some(None) => None,
            None => self.persistent.get(name),
        }
    }

    /// Apply the result of re-deriving one file's `FileInfo` (Trigger B).
    ///
    /// Symbols in `old.symbols` but not `new.symbols` are removed; symbols in
    /// `new.symbols` are (re-)pointed at `path`. A symbol redefined in a
    /// different file is last-writer-wins — this method does not check
    /// whether another file currently claims the symbol.
    pub fn apply(&mut self, path: &RepoPath, old: &FileInfo, new: &FileInfo) -> NameDelta {
        let mut delta = NameDelta::default();

        for symbol in &old.symbols {
            if !new.symbols.contains(symbol) {
                self.delta.insert(symbol.clone(), None);
                delta.removed.push(symbol.clone());
            }
        }

        for symbol in &new.symbols {
            self.delta.insert(symbol.clone(), Some(path.clone()));
            delta.added.push(symbol.clone());
        }

        delta
    }

    pub fn len(&self) -> usize {
        let mut names: std::collections::HashSet<&SymbolName> = self.persistent.keys().collect();
        for (name, value) in &self.delta {
            if value.is_some() {
                names.insert(name);
            } else {
                names.remove(name);
            }
        }
        names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
