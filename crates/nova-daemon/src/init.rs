//! Initialization: turns an `Initialize` request into either an
//! `InitializedState` or a structured failure detail.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use nova_core::{Backend, PathResolver};
use nova_naming::{ForwardNamingTable, ReverseNamingTable};

use crate::collaborators::{SavedStateLoader, StdlibMaterializer, SymbolIndexEnv};
use crate::context::{Context, ProgramOptions};
use crate::initialized::InitializedState;

pub struct InitRequest<'a> {
    pub root: &'a Path,
    pub saved_state_path: Option<&'a Path>,
    pub use_ranked_autocomplete: bool,
}

/// Run initialization in order, using caller-supplied collaborators.
/// A failure at any step is returned as `Err` for the caller to wrap into
/// `FailedToInitialize` (the daemon loop does this; this function is pure
/// fallible setup with no notion of the state machine).
pub fn initialize<B: Backend>(
    request: InitRequest<'_>,
    backend: B,
    loader: &mut dyn SavedStateLoader,
    mut stdlib: Box<dyn StdlibMaterializer>,
    symbol_index_env: Box<dyn SymbolIndexEnv>,
) -> anyhow::Result<InitializedState<B>> {
    // Step 1: materialize stdlib stubs.
    let stdlib_root = stdlib.materialize()?;
    let path_resolver = PathResolver::new(request.root, stdlib_root.clone(), std::env::temp_dir());

    // Step 2: empty backend + default context, shallow-class-decl mode is
    // implicit in this crate's invalidation rules (see context.rs).
    let options = ProgramOptions { use_ranked_autocomplete: request.use_ranked_autocomplete };
    let context = Context::new(backend, options);

    // Step 3 already done by the caller constructing `symbol_index_env`.

    // Step 4: load saved state.
    let saved_state = loader
        .load(request.saved_state_path)
        .map_err(|source| anyhow::anyhow!("saved state load failed: {source}"))?;

    // Step 5: build FNT and RNT from the same saved file map, seed backlog.
    let mut symbol_owners = HashMap::with_capacity(saved_state.files.len());
    for (path, info) in &saved_state.files {
        for symbol in &info.symbols {
            symbol_owners.insert(symbol.clone(), path.clone());
        }
    }
    let forward_naming_table = ForwardNamingTable::from_saved_state(saved_state.files);
    let reverse_naming_table = ReverseNamingTable::from_saved_state(Arc::new(symbol_owners));
    let changed_files_denominator = saved_state.changed_files.len();
    let changed_files_to_process = saved_state.changed_files.into_iter().collect();

    Ok(InitializedState {
        standard_library_root: stdlib_root,
        path_resolver,
        stdlib,
        forward_naming_table,
        reverse_naming_table,
        invalidation: nova_cache::InvalidationEngine::new(),
        symbol_index_env,
        context,
        changed_files_to_process,
        changed_files_denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{EmptyDirMaterializer, InMemorySavedStateLoader, NoopSymbolIndexEnv};
    use nova_core::{FileInfo, FoldedLookup, ShallowLookup, SymbolName};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone)]
    struct NoopBackend;

    impl Backend for NoopBackend {
        type Ast = String;
        type Tast = String;
        type ShallowDecl = String;
        type FoldedDecl = String;
        type Linearization = String;
        fn parse(&self, contents: &str) -> Self::Ast {
            contents.to_string()
        }
        fn file_info(&self, _ast: &Self::Ast) -> FileInfo {
            FileInfo::empty()
        }
        fn shallow_decl(&self, _ast: &Self::Ast, _symbol: &SymbolName) -> Option<Self::ShallowDecl> {
            None
        }
        fn fold_decl(&self, _s: &SymbolName, shallow: &Self::ShallowDecl, _l: &mut ShallowLookup<'_, Self::ShallowDecl>) -> Self::FoldedDecl {
            shallow.clone()
        }
        fn linearize(&self, class: &SymbolName, _l: &mut FoldedLookup<'_, Self::FoldedDecl>) -> Self::Linearization {
            class.as_str().to_string()
        }
        fn typecheck(&self, ast: &Self::Ast, _l: &mut FoldedLookup<'_, Self::FoldedDecl>) -> Self::Tast {
            ast.clone()
        }
    }

    #[test]
    fn initialize_seeds_backlog_from_loader_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = InMemorySavedStateLoader {
            files: Arc::new(HashMap::new()),
            changed_files: vec![nova_core::RepoPath::repo("A.src"), nova_core::RepoPath::repo("B.src")],
        };
        let stdlib = EmptyDirMaterializer::new(dir.path());

        let state = initialize(
            InitRequest { root: dir.path(), saved_state_path: None, use_ranked_autocomplete: false },
            NoopBackend,
            &mut loader,
            Box::new(stdlib),
            Box::new(NoopSymbolIndexEnv),
        )
        .unwrap();

        assert_eq!(state.changed_files_denominator, 2);
        assert_eq!(state.changed_files_to_process.len(), 2);
    }

    #[test]
    fn initialize_with_explicit_saved_state_path_has_no_backlog() {
        let dir = tempfile::tempdir().unwrap();
        let saved_state_file = dir.path().join("state.bin");
        std::fs::write(&saved_state_file, b"").unwrap();
        let mut loader = InMemorySavedStateLoader {
            files: Arc::new(HashMap::new()),
            changed_files: vec![nova_core::RepoPath::repo("Should.src")],
        };
        let stdlib = EmptyDirMaterializer::new(dir.path());

        let state = initialize(
            InitRequest { root: dir.path(), saved_state_path: Some(&saved_state_file), use_ranked_autocomplete: false },
            NoopBackend,
            &mut loader,
            Box::new(stdlib),
            Box::new(NoopSymbolIndexEnv),
        )
        .unwrap();

        assert_eq!(state.changed_files_denominator, 0);
    }

    #[test]
    fn initialize_builds_reverse_naming_table_from_saved_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = nova_core::RepoPath::repo("A.src");
        let mut files = HashMap::new();
        files.insert(path.clone(), nova_core::FileInfo::new(vec![SymbolName::new("A"), SymbolName::new("A.Inner")]));
        let mut loader = InMemorySavedStateLoader { files: Arc::new(files), changed_files: Vec::new() };
        let stdlib = EmptyDirMaterializer::new(dir.path());

        let state = initialize(
            InitRequest { root: dir.path(), saved_state_path: None, use_ranked_autocomplete: false },
            NoopBackend,
            &mut loader,
            Box::new(stdlib),
            Box::new(NoopSymbolIndexEnv),
        )
        .unwrap();

        assert_eq!(state.reverse_naming_table.lookup(&SymbolName::new("A")), Some(&path));
        assert_eq!(state.reverse_naming_table.lookup(&SymbolName::new("A.Inner")), Some(&path));
        assert_eq!(state.reverse_naming_table.lookup(&SymbolName::new("Nonexistent")), None);
    }
}
