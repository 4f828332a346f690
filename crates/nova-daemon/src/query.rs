//! The seam between the core and the external query algorithms (hover,
//! completion, ...). These are out of scope for this crate; its only
//! obligation is to hand each one the right kind of snapshot.

use nova_cache::Quarantine;
use nova_core::Backend;

use crate::context::Context;
use crate::protocol::{QueryOutcome, Request};

/// The view a query receives. Every query reads through the `Context`
///; quarantined queries are
/// additionally handed a `Quarantine` so any shallow/folded/linearization/TAST
/// work they trigger against unsaved entry content lands in a side area
/// instead of the shared caches.
pub enum QuerySnapshot<'a, B: Backend> {
    Quarantined(&'a Context<B>, Quarantine<'a, B>),
    Direct(&'a Context<B>),
}

/// Whether `request` is served under quarantine or directly.
pub fn needs_quarantine(request: &Request) -> bool {
    matches!(
        request,
        Request::Hover { .. }
            | Request::Completion { .. }
            | Request::SignatureHelp { .. }
            | Request::Definition { .. }
            | Request::TypeDefinition { .. }
            | Request::DocumentHighlight { .. }
            | Request::CompletionResolveLocation { .. }
            | Request::TypeCoverage { .. }
    )
}

/// Implemented by the external collaborator that actually answers queries.
/// The core dispatches to this once it has built the right `QuerySnapshot`.
pub trait QueryEngine<B: Backend>: Send {
    fn run(&mut self, request: &Request, snapshot: QuerySnapshot<'_, B>) -> QueryOutcome;
}

/// A `QueryEngine` that reports every query as unimplemented. Useful as a
/// default for hosts that only care about the init/shutdown/backlog
/// machinery (e.g. this crate's own integration tests that never send a
/// query request).
#[derive(Debug, Default)]
pub struct UnimplementedQueryEngine;

impl<B: Backend> QueryEngine<B> for UnimplementedQueryEngine {
    fn run(&mut self, request: &Request, _snapshot: QuerySnapshot<'_, B>) -> QueryOutcome {
        QueryOutcome::Err(format!("query not implemented: {request:?}"))
    }
}
