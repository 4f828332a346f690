//! `novad`: the daemon binary. Speaks the framed protocol over stdio,
//! running the single-threaded cooperative loop until it sees
//! `Shutdown` or the transport closes.
//!
//! Transport setup (how a client actually spawns/connects to this process)
//! is an external-collaborator concern; this binary only wires up the loop
//! over its own stdin/stdout, which is sufficient for a directly-spawned
//! child process.

use std::path::PathBuf;

use clap::Parser;

use nova_core::{FileInfo, FoldedLookup, ShallowLookup, SymbolName};
use nova_daemon::collaborators::{EmptyDirMaterializer, NoopSymbolIndexEnv, SavedState, SavedStateLoader};
use nova_daemon::config::DaemonConfig;
use nova_daemon::daemon_loop::{DaemonLoop, InitCollaborators};
use nova_daemon::logging;
use nova_daemon::query::UnimplementedQueryEngine;

#[derive(Debug, Parser)]
#[command(name = "novad", version, about = "Long-lived incremental-analysis daemon")]
struct Cli {
    /// Repository root to analyze.
    #[arg(long)]
    root: PathBuf,
    /// Path to a saved-state blob to seed the forward/reverse naming tables
    /// from. Omit to always run the external loader's discovery path.
    #[arg(long)]
    saved_state: Option<PathBuf>,
    /// Directory to write the log file (and its rotated predecessor) to.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Path to a `nova-daemon.toml` config file. Missing file falls back to
    /// defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Raise the tracing verbosity to `debug` regardless of `RUST_LOG`.
    #[arg(long)]
    verbose: bool,
}

/// Placeholder [`nova_core::Backend`] until a concrete language backend is
/// wired in; it parses nothing and reports empty `FileInfo`, which is enough
/// to exercise initialization, the backlog processor, and the transport.
#[derive(Debug, Clone, Default)]
struct PlaceholderBackend;

impl nova_core::Backend for PlaceholderBackend {
    type Ast = ();
    type Tast = ();
    type ShallowDecl = ();
    type FoldedDecl = ();
    type Linearization = ();

    fn parse(&self, _contents: &str) -> Self::Ast {}

    fn file_info(&self, _ast: &Self::Ast) -> FileInfo {
        FileInfo::empty()
    }

    fn shallow_decl(&self, _ast: &Self::Ast, _symbol: &SymbolName) -> Option<Self::ShallowDecl> {
        None
    }

    fn fold_decl(
        &self,
        _symbol: &SymbolName,
        _shallow: &Self::ShallowDecl,
        _lookup_shallow: &mut ShallowLookup<'_, Self::ShallowDecl>,
    ) -> Self::FoldedDecl {
    }

    fn linearize(&self, _class: &SymbolName, _lookup_folded: &mut FoldedLookup<'_, Self::FoldedDecl>) -> Self::Linearization {
    }

    fn typecheck(&self, _ast: &Self::Ast, _lookup_folded: &mut FoldedLookup<'_, Self::FoldedDecl>) -> Self::Tast {
    }
}

/// A [`SavedStateLoader`] that never has anything to offer: every
/// initialization starts from an empty forward table with nothing queued on
/// the backlog. A real deployment replaces this with one that reads a saved
/// state blob from disk.
struct NoSavedState;

impl SavedStateLoader for NoSavedState {
    fn load(&mut self, _saved_state_path: Option<&std::path::Path>) -> anyhow::Result<SavedState> {
        Ok(SavedState { files: Default::default(), changed_files: Vec::new() })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = DaemonConfig::load_from(cli.config.as_deref())?;
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = log_dir;
    }
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    let _logging_guard = logging::init(&config)?;
    tracing::info!(log_dir = %config.log_dir.display(), "novad starting");

    let init_collaborators = InitCollaborators {
        backend_factory: Box::new(PlaceholderBackend::default),
        loader: Box::new(NoSavedState),
        stdlib: Box::new(EmptyDirMaterializer::new(config.stdlib_stub_dir.clone())),
        symbol_index_env: Box::new(NoopSymbolIndexEnv),
    };

    let stdio = tokio::io::join(tokio::io::stdin(), tokio::io::stdout());
    let mut loop_ = DaemonLoop::<PlaceholderBackend, _>::new(
        stdio,
        init_collaborators,
        Box::new(UnimplementedQueryEngine) as Box<_>,
    );

    loop_.initialize_from_args(cli.root, cli.saved_state, false).await;
    loop_.run().await?;
    tracing::info!("novad shutting down");
    Ok(())
}
