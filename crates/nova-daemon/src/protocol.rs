//! The wire-level request/response/notification tags, carried as a
//! `bincode`-encoded payload inside each [`crate::transport::Framed`] frame.
//!
//! The concrete query algorithms (hover, completion, ...) are external
//! collaborators; this module only carries their inputs and outputs
//! across the wire. `DocLoc` and the per-query payload types are therefore
//! opaque blobs from the core's point of view — it round-trips them without
//! interpreting their contents beyond the `path` needed to resolve a
//! snapshot.

use serde::{Deserialize, Serialize};

use nova_core::{Position, RepoPath};

/// A document location: a path plus a position within it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocLoc {
    pub path: RepoPath,
    pub position: Position,
}

/// What kind of thing a completion candidate names. Carried alongside a
/// symbol's name so a resolve request can disambiguate between an overloaded
/// function and a constant (or any other pair) that happen to share a name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Enum,
    EnumMember,
    Constant,
    Variable,
    Field,
    Module,
    TypeAlias,
}

/// Requests the editor can send, inbound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    Initialize {
        root: std::path::PathBuf,
        saved_state_path: Option<std::path::PathBuf>,
        use_ranked_autocomplete: bool,
    },
    Shutdown,
    Verbose(bool),
    FileOpened { path: RepoPath, contents: String },
    FileClosed { path: RepoPath },
    FileChanged { path: RepoPath },
    Hover { path: RepoPath, contents: Option<String>, position: Position },
    Completion { doc_loc: DocLoc, is_manually_invoked: bool },
    CompletionResolve { symbol: String, kind: SymbolKind },
    CompletionResolveLocation { doc_loc: DocLoc, kind: SymbolKind },
    DocumentHighlight { doc_loc: DocLoc },
    SignatureHelp { doc_loc: DocLoc },
    Definition { doc_loc: DocLoc },
    TypeDefinition { doc_loc: DocLoc },
    DocumentSymbol { doc_loc: DocLoc },
    TypeCoverage { path: RepoPath, contents: String },
}

impl Request {
    /// Whether this request tag expects a `Response` at all, or is a
    /// fire-and-forget notification-style message.
    pub fn expects_response(&self) -> bool {
        !matches!(self, Request::Verbose(_) | Request::FileChanged { .. })
    }
}

/// A successful or failed outcome for a query, opaque beyond success/failure
/// since the concrete query result payloads are external-collaborator
/// concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueryOutcome {
    Ok(serde_json::Value),
    Err(String),
}

/// A response to exactly one request that expected one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub outcome: QueryOutcome,
    /// Wall-clock timestamp, milliseconds since the Unix epoch, at which the
    /// daemon unblocked to process the request.
    pub unblocked_time_millis: u64,
}

/// Unsolicited messages the daemon may emit at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Notification {
    Processing { processed: usize, total: usize },
    Done,
}

/// Every outbound frame is one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Envelope {
    Response(Response),
    Notification(Notification),
}
