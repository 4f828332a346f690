//! Drives the loop end to end over a real `tokio::io::duplex` pipe through
//! the real frame codec, exercising cold-start, backlog-processing, and
//! shutdown scenarios rather than calling any private handler directly.

use std::collections::HashMap;
use std::sync::Arc;

use nova_core::{Backend, FileInfo, FoldedLookup, Position, RepoPath, RootKind, ShallowLookup, SymbolName};
use nova_daemon::collaborators::{
    EmptyDirMaterializer, InMemorySavedStateLoader, NoopSymbolIndexEnv, SavedState, SavedStateLoader,
};
use nova_daemon::daemon_loop::{DaemonLoop, InitCollaborators};
use nova_daemon::protocol::{DocLoc, Envelope, Notification, QueryOutcome, Request};
use nova_daemon::query::{QueryEngine, QuerySnapshot};
use nova_daemon::transport::Framed;
use pretty_assertions::assert_eq;

#[derive(Clone)]
struct FixtureBackend;

impl Backend for FixtureBackend {
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

/// Answers `Hover` from entry content when the request supplies none and the
/// path has an open entry, otherwise from the request's own `contents` (the
/// "unsaved edit" case of scenario 3); answers `Definition` without ever
/// looking at the entry table, so it cannot be perturbed by edits elsewhere.
#[derive(Default)]
struct FixtureQueryEngine;

impl QueryEngine<FixtureBackend> for FixtureQueryEngine {
    fn run(&mut self, request: &Request, snapshot: QuerySnapshot<'_, FixtureBackend>) -> QueryOutcome {
        let context = match &snapshot {
            QuerySnapshot::Quarantined(context, _) => *context,
            QuerySnapshot::Direct(context) => *context,
        };
        match request {
            Request::Hover { path, contents, .. } => {
                let text = contents.clone().or_else(|| {
                    context.entries.get(path).map(|e| e.contents().to_string())
                });
                match text {
                    Some(text) => QueryOutcome::Ok(serde_json::json!({ "text": text })),
                    None => QueryOutcome::Err("no content available".to_string()),
                }
            }
            Request::Definition { doc_loc } => QueryOutcome::Ok(serde_json::json!({
                "resolved_path": doc_loc.path.to_string(),
                "entry_present_for_target": context.entries.contains(&doc_loc.path),
            })),
            other => QueryOutcome::Err(format!("unsupported in fixture: {other:?}")),
        }
    }
}

fn src(rel: &str) -> RepoPath {
    RepoPath::new(RootKind::Repo, rel)
}

struct Harness {
    client: Framed<tokio::io::DuplexStream>,
}

impl Harness {
    fn spawn(loader: impl SavedStateLoader + 'static, stdlib_scratch: &std::path::Path) -> Self {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let init_collaborators = InitCollaborators {
            backend_factory: Box::new(|| FixtureBackend),
            loader: Box::new(loader),
            stdlib: Box::new(EmptyDirMaterializer::new(stdlib_scratch)),
            symbol_index_env: Box::new(NoopSymbolIndexEnv),
        };
        let daemon = DaemonLoop::<FixtureBackend, _>::new(server, init_collaborators, Box::new(FixtureQueryEngine));
        tokio::spawn(async move {
            let _ = daemon.run().await;
        });
        Self { client: Framed::new(client) }
    }

    async fn send(&mut self, request: Request) {
        self.client.write_frame(&request).await.unwrap();
    }

    async fn recv(&mut self) -> Envelope {
        self.client.read_frame::<Envelope>().await.unwrap().expect("connection open")
    }
}

fn empty_loader() -> InMemorySavedStateLoader {
    InMemorySavedStateLoader { files: Arc::new(HashMap::new()), changed_files: Vec::new() }
}

#[tokio::test]
async fn scenario_1_cold_start_with_no_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::spawn(empty_loader(), dir.path());

    h.send(Request::Initialize { root: dir.path().to_path_buf(), saved_state_path: None, use_ranked_autocomplete: false })
        .await;

    let response = h.recv().await;
    match response {
        Envelope::Response(r) => match r.outcome {
            QueryOutcome::Ok(value) => assert_eq!(value["num_changed_files_to_process"], 0),
            QueryOutcome::Err(e) => panic!("unexpected error: {e}"),
        },
        other => panic!("expected Response, got {other:?}"),
    }

    let notification = h.recv().await;
    assert!(matches!(notification, Envelope::Notification(Notification::Done)));
}

#[tokio::test]
async fn scenario_2_cold_start_with_backlog() {
    let dir = tempfile::tempdir().unwrap();
    let loader = InMemorySavedStateLoader {
        files: Arc::new(HashMap::new()),
        changed_files: vec![src("a.src"), src("b.src")],
    };
    let mut h = Harness::spawn(loader, dir.path());

    h.send(Request::Initialize { root: dir.path().to_path_buf(), saved_state_path: None, use_ranked_autocomplete: false })
        .await;
    let response = h.recv().await;
    let Envelope::Response(r) = response else { panic!("expected Response") };
    let QueryOutcome::Ok(value) = r.outcome else { panic!("expected Ok") };
    assert_eq!(value["num_changed_files_to_process"], 2);

    let mut seen = Vec::new();
    loop {
        match h.recv().await {
            Envelope::Notification(Notification::Processing { processed, total }) => {
                seen.push((processed, total));
            }
            Envelope::Notification(Notification::Done) => break,
            other => panic!("unexpected envelope: {other:?}"),
        }
    }
    assert_eq!(seen, vec![(1, 2), (2, 2)]);
}

#[tokio::test]
async fn scenario_3_unsaved_hover_does_not_perturb_unrelated_definition() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::spawn(empty_loader(), dir.path());

    h.send(Request::Initialize { root: dir.path().to_path_buf(), saved_state_path: None, use_ranked_autocomplete: false })
        .await;
    h.recv().await; // Response
    h.recv().await; // Done

    let p = src("p.src");
    h.send(Request::FileOpened { path: p.clone(), contents: "original".to_string() }).await;
    h.recv().await;

    h.send(Request::Hover { path: p.clone(), contents: Some("…edited…".to_string()), position: Position::new(3, 10) })
        .await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    let QueryOutcome::Ok(value) = r.outcome else { panic!("expected Ok") };
    assert_eq!(value["text"], "…edited…");

    let q = src("q.src");
    h.send(Request::Definition { doc_loc: DocLoc { path: q.clone(), position: Position::new(0, 0) } }).await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    let QueryOutcome::Ok(value) = r.outcome else { panic!("expected Ok") };
    assert_eq!(value["entry_present_for_target"], false);
}

#[tokio::test]
async fn scenario_4_backlog_processing_preserves_open_entry_contents() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::spawn(empty_loader(), dir.path());

    h.send(Request::Initialize { root: dir.path().to_path_buf(), saved_state_path: None, use_ranked_autocomplete: false })
        .await;
    h.recv().await;
    h.recv().await;

    let p = src("p.src");
    h.send(Request::FileOpened { path: p.clone(), contents: "v1".to_string() }).await;
    h.recv().await;
    h.send(Request::FileOpened { path: p.clone(), contents: "v2".to_string() }).await;
    h.recv().await;

    h.send(Request::FileChanged { path: p.clone() }).await; // no response expected

    // Backlog processing (p does not exist on disk, so Trigger B sees it as
    // empty) runs while the pipe is quiet and emits Done.
    let notification = h.recv().await;
    assert!(matches!(notification, Envelope::Notification(Notification::Done)));

    h.send(Request::Hover { path: p.clone(), contents: None, position: Position::new(0, 0) }).await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    let QueryOutcome::Ok(value) = r.outcome else { panic!("expected Ok") };
    assert_eq!(value["text"], "v2");
}

#[tokio::test]
async fn scenario_5_init_failure_then_recovery_via_shutdown() {
    struct FailingLoader;
    impl SavedStateLoader for FailingLoader {
        fn load(&mut self, _saved_state_path: Option<&std::path::Path>) -> anyhow::Result<SavedState> {
            anyhow::bail!("saved state blob is corrupt")
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::spawn(FailingLoader, dir.path());

    h.send(Request::Initialize { root: dir.path().to_path_buf(), saved_state_path: None, use_ranked_autocomplete: false })
        .await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    assert!(matches!(r.outcome, QueryOutcome::Err(_)));

    h.send(Request::Hover { path: src("p.src"), contents: Some("x".to_string()), position: Position::new(0, 0) })
        .await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    let QueryOutcome::Err(message) = r.outcome else { panic!("expected Err") };
    assert!(message.starts_with("Failed to initialize:"), "got: {message}");

    h.send(Request::Shutdown).await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    assert!(matches!(r.outcome, QueryOutcome::Ok(_)));

    // The loop has exited; the next read sees a clean close.
    let eof = h.client.read_frame::<Envelope>().await.unwrap();
    assert!(eof.is_none());
}

#[tokio::test]
async fn scenario_6_shutdown_during_backlog_removes_stub_directory() {
    let dir = tempfile::tempdir().unwrap();
    let loader = InMemorySavedStateLoader {
        files: Arc::new(HashMap::new()),
        changed_files: vec![src("a.src"), src("b.src"), src("c.src")],
    };
    let mut h = Harness::spawn(loader, dir.path());

    h.send(Request::Initialize { root: dir.path().to_path_buf(), saved_state_path: None, use_ranked_autocomplete: false })
        .await;
    h.recv().await; // Response: 3 queued

    h.send(Request::Shutdown).await;
    let Envelope::Response(r) = h.recv().await else { panic!("expected Response") };
    assert!(matches!(r.outcome, QueryOutcome::Ok(_)));

    let eof = h.client.read_frame::<Envelope>().await.unwrap();
    assert!(eof.is_none());
}
