//! The Change-Backlog Processor.

use nova_core::{Backend, FileInfo, RepoPath};

use crate::initialized::InitializedState;
use crate::protocol::Notification;

/// Dequeue and process exactly one path, in whatever order the backing
/// `HashSet` happens to yield it.
///
/// Returns `None` if the backlog was already empty (the caller should not
/// have called this — the daemon loop only calls it when non-empty — but
/// this stays a harmless no-op rather than panicking).
pub fn process_one_turn<B: Backend>(state: &mut InitializedState<B>) -> Option<Notification> {
    let path = state.changed_files_to_process.iter().next().cloned()?;
    state.changed_files_to_process.remove(&path);

    if let Err(err) = process_path(state, &path) {
        tracing::warn!(%path, %err, "backlog entry failed, dropping path and continuing");
    }

    if state.changed_files_to_process.is_empty() {
        state.changed_files_denominator = 0;
        Some(Notification::Done)
    } else {
        Some(Notification::Processing {
            processed: state.processed_count(),
            total: state.changed_files_denominator,
        })
    }
}

fn process_path<B: Backend>(state: &mut InitializedState<B>, path: &RepoPath) -> anyhow::Result<()> {
    if !path.is_source_file() {
        return Ok(());
    }

    let absolute = state.path_resolver.resolve(path);
    let new_info = match std::fs::read_to_string(&absolute) {
        Ok(contents) => {
            let ast = state.context.backend.parse(&contents);
            state.context.backend.file_info(&ast)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileInfo::empty(),
        Err(e) => return Err(e.into()),
    };

    let delta = state.invalidation.trigger_file_changed(
        path,
        &mut state.forward_naming_table,
        &mut state.reverse_naming_table,
        new_info,
    );
    state.symbol_index_env.apply_delta(path, &delta);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{EmptyDirMaterializer, NoopSymbolIndexEnv};
    use crate::context::{Context, ProgramOptions};
    use nova_core::{FileInfo, RootKind, ShallowLookup, FoldedLookup, SymbolName};
    use nova_naming::{ForwardNamingTable, ReverseNamingTable};

    #[derive(Clone)]
    struct LineCountBackend;

    impl Backend for LineCountBackend {
        type Ast = String;
        type Tast = String;
        type ShallowDecl = String;
        type FoldedDecl = String;
        type Linearization = String;

        fn parse(&self, contents: &str) -> Self::Ast {
            contents.to_string()
        }

        fn file_info(&self, ast: &Self::Ast) -> FileInfo {
            let symbols = ast
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(SymbolName::new)
                .collect();
            FileInfo::new(symbols)
        }

        fn shallow_decl(&self, _ast: &Self::Ast, _symbol: &SymbolName) -> Option<Self::ShallowDecl> {
            None
        }
        fn fold_decl(
            &self,
            _symbol: &SymbolName,
            shallow: &Self::ShallowDecl,
            _lookup_shallow: &mut ShallowLookup<'_, Self::ShallowDecl>,
        ) -> Self::FoldedDecl {
            shallow.clone()
        }
        fn linearize(&self, class: &SymbolName, _lookup_folded: &mut FoldedLookup<'_, Self::FoldedDecl>) -> Self::Linearization {
            class.as_str().to_string()
        }
        fn typecheck(&self, ast: &Self::Ast, _lookup_folded: &mut FoldedLookup<'_, Self::FoldedDecl>) -> Self::Tast {
            ast.clone()
        }
    }

    fn make_state(dir: &std::path::Path) -> InitializedState<LineCountBackend> {
        InitializedState {
            standard_library_root: dir.join("stdlib"),
            path_resolver: nova_core::PathResolver::new(dir, dir.join("stdlib"), dir.join("scratch")),
            stdlib: Box::new(EmptyDirMaterializer::new(dir)),
            forward_naming_table: ForwardNamingTable::new(),
            reverse_naming_table: ReverseNamingTable::empty(),
            invalidation: nova_cache::InvalidationEngine::new(),
            symbol_index_env: Box::new(NoopSymbolIndexEnv),
            context: Context::new(LineCountBackend, ProgramOptions { use_ranked_autocomplete: false }),
            changed_files_to_process: Default::default(),
            changed_files_denominator: 0,
        }
    }

    #[test]
    fn processing_a_path_updates_fnt_rnt_and_emits_progress() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.src"), "A\nA.Inner\n").unwrap();
        let mut state = make_state(dir.path());

        let p = RepoPath::new(RootKind::Repo, "A.src");
        state.enqueue_changed_file(p.clone());
        state.enqueue_changed_file(RepoPath::new(RootKind::Repo, "B.src"));

        let note = process_one_turn(&mut state).unwrap();
        match note {
            Notification::Processing { processed, total } => {
                assert_eq!(processed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("expected Processing, got {other:?}"),
        }

        assert_eq!(state.reverse_naming_table.lookup(&SymbolName::new("A")), Some(&p));
    }

    #[test]
    fn draining_the_last_path_emits_done_and_resets_denominator() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(dir.path());
        state.enqueue_changed_file(RepoPath::new(RootKind::Repo, "Missing.src"));

        let note = process_one_turn(&mut state).unwrap();
        assert!(matches!(note, Notification::Done));
        assert_eq!(state.changed_files_denominator, 0);
    }

    #[test]
    fn non_source_path_is_dropped_without_touching_naming_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(dir.path());
        state.enqueue_changed_file(RepoPath::new(RootKind::Repo, "README.md"));

        process_one_turn(&mut state).unwrap();
        assert!(state.forward_naming_table.is_empty());
    }

    #[test]
    fn non_source_path_does_not_clear_cross_file_caches() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(dir.path());
        state
            .invalidation
            .folded_mut()
            .get_or_compute(&SymbolName::new("Untouched"), || "folded".to_string());
        state
            .invalidation
            .linearization_mut()
            .get_or_compute(&SymbolName::new("Untouched"), || "lin".to_string());

        state.enqueue_changed_file(RepoPath::new(RootKind::Repo, "README.md"));
        process_one_turn(&mut state).unwrap();

        assert_eq!(state.invalidation.folded().len(), 1);
        assert_eq!(state.invalidation.linearization().len(), 1);
    }
}
