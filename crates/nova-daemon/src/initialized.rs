//! The daemon's steady-state record.

use std::collections::HashSet;
use std::path::PathBuf;

use nova_cache::InvalidationEngine;
use nova_core::{Backend, PathResolver, RepoPath};
use nova_naming::{ForwardNamingTable, ReverseNamingTable};

use crate::collaborators::{StdlibMaterializer, SymbolIndexEnv};
use crate::context::Context;

/// The daemon's steady-state record. Holds everything that survives across
/// requests once initialization succeeds.
///
/// Beyond `standard_library_root`, `forward_naming_table`, `symbol_index_env`,
/// `context`, `changed_files_to_process`, and `changed_files_denominator`,
/// this also holds the `ReverseNamingTable` and the cross-file
/// `InvalidationEngine` — both are core-owned state (the RNT backs
/// `Definition`/`TypeDefinition` lookups
/// directly; the symbol-index env is purely an external ranking collaborator
/// updated from the same `NameDelta`).
pub struct InitializedState<B: Backend> {
    pub standard_library_root: PathBuf,
    pub path_resolver: PathResolver,
    pub stdlib: Box<dyn StdlibMaterializer>,
    pub forward_naming_table: ForwardNamingTable,
    pub reverse_naming_table: ReverseNamingTable,
    pub invalidation: InvalidationEngine<B>,
    pub symbol_index_env: Box<dyn SymbolIndexEnv>,
    pub context: Context<B>,
    pub changed_files_to_process: HashSet<RepoPath>,
    pub changed_files_denominator: usize,
}

impl<B: Backend> InitializedState<B> {
    /// `processed = denominator - |remaining|`.
    pub fn processed_count(&self) -> usize {
        self.changed_files_denominator - self.changed_files_to_process.len()
    }

    /// Queue a disk-change notification for `path`, growing the denominator
    /// if this path was not already pending.
    pub fn enqueue_changed_file(&mut self, path: RepoPath) {
        if self.changed_files_to_process.insert(path) {
            self.changed_files_denominator += 1;
        }
    }

    /// If the stdlib stub directory has disappeared since it was last
    /// checked, re-materialize it to a fresh directory and re-point the path
    /// resolver. Observable only through the resolver; no cache is touched.
    pub fn ensure_stdlib_root(&mut self) {
        if self.standard_library_root.exists() {
            return;
        }
        match self.stdlib.materialize() {
            Ok(new_root) => {
                tracing::warn!(
                    old = %self.standard_library_root.display(),
                    new = %new_root.display(),
                    "stdlib stub directory vanished, re-materialized"
                );
                self.path_resolver.set_stdlib_root(new_root.clone());
                self.standard_library_root = new_root;
            }
            Err(err) => {
                tracing::error!(%err, "failed to re-materialize stdlib stub directory");
            }
        }
    }
}
