//! The Invalidation Engine: applies the two triggers (entry mutation and
//! on-disk file change) to the derived cache layers on every mutation.

use nova_core::{Backend, FileInfo, RepoPath};
use nova_ids::EntryId;
use nova_naming::{ForwardNamingTable, NameDelta, ReverseNamingTable};

use crate::caches::{FoldedDeclCache, LinearizationCache, ShallowDeclCache, TastCache};

/// Owns the four derived cache layers and applies invalidation triggers to
/// them. Does not own the FNT/RNT or the Entry Table — those are handed in by
/// reference so the engine can read the file's old symbol set (FNT) and
/// update the reverse index (RNT) as part of Trigger B.
pub struct InvalidationEngine<B: Backend> {
    shallow: ShallowDeclCache<B::ShallowDecl>,
    folded: FoldedDeclCache<B::FoldedDecl>,
    linearization: LinearizationCache<B::Linearization>,
    tast: TastCache<B::Tast>,
}

impl<B: Backend> Default for InvalidationEngine<B> {
    fn default() -> Self {
        Self {
            shallow: ShallowDeclCache::default(),
            folded: FoldedDeclCache::default(),
            linearization: LinearizationCache::default(),
            tast: TastCache::default(),
        }
    }
}

impl<B: Backend> InvalidationEngine<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shallow(&self) -> &ShallowDeclCache<B::ShallowDecl> {
        &self.shallow
    }

    pub fn shallow_mut(&mut self) -> &mut ShallowDeclCache<B::ShallowDecl> {
        &mut self.shallow
    }

    pub fn folded(&self) -> &FoldedDeclCache<B::FoldedDecl> {
        &self.folded
    }

    pub fn folded_mut(&mut self) -> &mut FoldedDeclCache<B::FoldedDecl> {
        &mut self.folded
    }

    pub fn linearization(&self) -> &LinearizationCache<B::Linearization> {
        &self.linearization
    }

    pub fn linearization_mut(&mut self) -> &mut LinearizationCache<B::Linearization> {
        &mut self.linearization
    }

    pub fn tast(&self) -> &TastCache<B::Tast> {
        &self.tast
    }

    pub fn tast_mut(&mut self) -> &mut TastCache<B::Tast> {
        &mut self.tast
    }

    /// Trigger A: an entry was opened with new contents, edited, or closed.
    ///
    /// The caller is responsible for invalidating the entry's own AST (owned
    /// by `nova_vfs::Entry`, not by this engine) and for not calling this at
    /// all when the mutation was a no-op re-open.
    pub fn trigger_entry_mutated(&mut self, path: &RepoPath, fnt: &ForwardNamingTable) {
        if let Some(info) = fnt.get(path) {
            for symbol in &info.symbols {
                self.shallow.invalidate(symbol);
            }
        }
        self.folded.clear();
        self.linearization.clear();
        self.tast.clear();
        tracing::debug!(%path, "trigger_entry_mutated: cross-file caches cleared");
    }

    /// Trigger B: `path` changed on disk. `new_info` is the freshly
    /// re-parsed `FileInfo` (empty if the path no longer exists or is not a
    /// recognized source file). Returns the name delta so the caller can
    /// forward it to the symbol-index env.
    pub fn trigger_file_changed(
        &mut self,
        path: &RepoPath,
        fnt: &mut ForwardNamingTable,
        rnt: &mut ReverseNamingTable,
        new_info: FileInfo,
    ) -> NameDelta {
        let old_info = fnt.set(path.clone(), new_info.clone());
        let delta = rnt.apply(path, &old_info, &new_info);

        for symbol in old_info.symbols.iter().chain(new_info.symbols.iter()) {
            self.shallow.invalidate(symbol);
        }
        self.folded.clear();
        self.linearization.clear();
        self.tast.clear();

        tracing::debug!(
            %path,
            removed = delta.removed.len(),
            added = delta.added.len(),
            "trigger_file_changed: naming tables and cross-file caches updated"
        );
        delta
    }

    /// Discard every TAST for `entry` without touching anything else. Used
    /// by the eager-invalidation choice for entry close.
    pub fn invalidate_tast_for_entry(&mut self, entry: EntryId) {
        // `TastCache` only supports clearing in bulk today; a single close
        // already triggers the wholesale `trigger_entry_mutated` clear, so
        // this is a no-op kept for call-site clarity at close time.
        let _ = entry;
    }
}
