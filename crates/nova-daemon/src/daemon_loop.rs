//! The Daemon Loop: state machine, fairness policy, and the
//! top-level `run` entrypoint.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncRead, AsyncWrite};

use nova_core::{describe_panic, Backend};

use crate::backlog;
use crate::collaborators::{SavedStateLoader, StdlibMaterializer, SymbolIndexEnv};
use crate::error::{DaemonError, DaemonResult};
use crate::init::{self, InitRequest};
use crate::initialized::InitializedState;
use crate::protocol::{Envelope, QueryOutcome, Request, Response};
use crate::query::{needs_quarantine, QueryEngine, QuerySnapshot};
use crate::state::{InitFailureDetail, StateTag};
use crate::transport::Framed;

/// Everything the loop needs to build an `InitializedState` the first time
/// it sees an `Initialize` request. Consumed (via `Option::take`) at that
/// point, since the loop never re-initializes once started.
pub struct InitCollaborators<B: Backend> {
    pub backend_factory: Box<dyn FnOnce() -> B + Send>,
    pub loader: Box<dyn SavedStateLoader>,
    pub stdlib: Box<dyn StdlibMaterializer>,
    pub symbol_index_env: Box<dyn SymbolIndexEnv>,
}

/// Drives one connection end to end: reads requests, dispatches them per the
/// state machine, and writes responses/notifications, alternating with
/// backlog work per the fairness policy.
pub struct DaemonLoop<B: Backend, S> {
    framed: Framed<S>,
    state_tag: StateTag,
    initialized: Option<InitializedState<B>>,
    failure: Option<InitFailureDetail>,
    init_collaborators: Option<InitCollaborators<B>>,
    query_engine: Box<dyn QueryEngine<B>>,
    next_request_id: u64,
}

impl<B, S> DaemonLoop<B, S>
where
    B: Backend,
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, init_collaborators: InitCollaborators<B>, query_engine: Box<dyn QueryEngine<B>>) -> Self {
        Self {
            framed: Framed::new(stream),
            state_tag: StateTag::Initializing,
            initialized: None,
            failure: None,
            init_collaborators: Some(init_collaborators),
            query_engine,
            next_request_id: 0,
        }
    }

    pub fn state_tag(&self) -> StateTag {
        self.state_tag
    }

    /// Drive initialization directly from caller-supplied arguments rather
    /// than waiting for an `Initialize` request to arrive over the wire.
    /// Used by binaries that take `--root`/`--saved-state` on argv; callers
    /// that expect the peer to send `Initialize` itself never call this.
    ///
    /// Failure is not returned: it is recorded the same way a failed
    /// wire-delivered `Initialize` is, via `FailedToInitialize`, so the loop
    /// still starts and reports the failure to every subsequent request
    /// instead of the process exiting.
    pub async fn initialize_from_args(&mut self, root: std::path::PathBuf, saved_state_path: Option<std::path::PathBuf>, use_ranked_autocomplete: bool) {
        let request = Request::Initialize { root, saved_state_path, use_ranked_autocomplete };
        if let DispatchOutcome::Outcome(QueryOutcome::Err(message)) = self.dispatch(request).await {
            tracing::error!(%message, "startup initialization did not succeed");
        }
    }

    /// Run until the peer sends `Shutdown` (returning `Ok`) or the
    /// transport fails (returning `Err` as a `TransportFailure`: the queue
    /// is closed and the loop terminates).
    pub async fn run(mut self) -> DaemonResult<()> {
        loop {
            if self.should_process_backlog() {
                // Fairness: only take a backlog turn when no message is
                // immediately available. A zero-duration read attempt stands
                // in for "the input pipe is not readable".
                match tokio::time::timeout(Duration::ZERO, self.framed.read_frame::<Request>()).await {
                    Err(_elapsed) => {
                        self.run_one_backlog_turn().await?;
                        continue;
                    }
                    Ok(read_result) => {
                        if !self.handle_read_result(read_result).await? {
                            return Ok(());
                        }
                        continue;
                    }
                }
            }

            let read_result = self.framed.read_frame::<Request>().await;
            if !self.handle_read_result(read_result).await? {
                return Ok(());
            }
        }
    }

    fn should_process_backlog(&self) -> bool {
        self.initialized
            .as_ref()
            .is_some_and(|s| !s.changed_files_to_process.is_empty())
    }

    async fn run_one_backlog_turn(&mut self) -> DaemonResult<()> {
        let Some(state) = self.initialized.as_mut() else { return Ok(()) };
        if let Some(notification) = backlog::process_one_turn(state) {
            self.framed
                .write_frame(&Envelope::Notification(notification))
                .await
                .map_err(DaemonError::TransportFailure)?;
        }
        Ok(())
    }

    /// Returns `Ok(true)` to keep looping, `Ok(false)` to exit cleanly.
    async fn handle_read_result(&mut self, result: Result<Option<Request>, crate::error::TransportError>) -> DaemonResult<bool> {
        let request = match result {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(false), // peer closed the pipe cleanly
            Err(e) => return Err(DaemonError::TransportFailure(e)),
        };

        let expects_response = request.expects_response();
        let unblocked_time_millis = now_millis();

        let outcome = self.dispatch(request).await;

        if expects_response {
            let keep_going = !matches!(outcome, DispatchOutcome::Shutdown);
            let response = Response {
                outcome: outcome.into_query_outcome(),
                unblocked_time_millis,
            };
            self.framed
                .write_frame(&Envelope::Response(response))
                .await
                .map_err(DaemonError::TransportFailure)?;
            Ok(keep_going)
        } else {
            Ok(true)
        }
    }

    async fn dispatch(&mut self, request: Request) -> DispatchOutcome {
        // On Shutdown in the Initialized state, clean up the stubs directory
        // and exit the loop; in any other state, exit directly. This is an
        // exception to the per-state table below, which otherwise governs
        // every other request tag.
        if matches!(request, Request::Shutdown) {
            return self.handle_shutdown().await;
        }

        match (&self.state_tag, &request) {
            (StateTag::Initializing, Request::Initialize { .. }) => self.handle_initialize(request).await,
            (StateTag::Initializing, _) => {
                DispatchOutcome::Outcome(QueryOutcome::Err(DaemonError::WrongState { state: StateTag::Initializing.as_str() }.to_string()))
            }
            (StateTag::FailedToInitialize, _) => {
                let detail = self.failure.as_ref().expect("FailedToInitialize always carries a detail");
                DispatchOutcome::Outcome(QueryOutcome::Err(detail.short_message.clone()))
            }
            (StateTag::Initialized, Request::Initialize { .. }) => {
                DispatchOutcome::Outcome(QueryOutcome::Err(DaemonError::WrongState { state: StateTag::Initialized.as_str() }.to_string()))
            }
            (StateTag::Initialized, _) => self.handle_initialized_request(request).await,
        }
    }

    async fn handle_initialize(&mut self, request: Request) -> DispatchOutcome {
        let Request::Initialize { root, saved_state_path, use_ranked_autocomplete } = request else {
            unreachable!("guarded by caller match arm");
        };
        let Some(mut collaborators) = self.init_collaborators.take() else {
            return DispatchOutcome::Outcome(QueryOutcome::Err(
                DaemonError::WrongState { state: "initialization collaborators already consumed" }.to_string(),
            ));
        };

        let backend = (collaborators.backend_factory)();
        let init_request = InitRequest {
            root: &root,
            saved_state_path: saved_state_path.as_deref(),
            use_ranked_autocomplete,
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            init::initialize(
                init_request,
                backend,
                collaborators.loader.as_mut(),
                collaborators.stdlib,
                collaborators.symbol_index_env,
            )
        }));

        match result {
            Ok(Ok(state)) => {
                let num_changed = state.changed_files_denominator;
                self.initialized = Some(state);
                self.state_tag = StateTag::Initialized;
                DispatchOutcome::Outcome(QueryOutcome::Ok(
                    serde_json::json!({ "num_changed_files_to_process": num_changed }),
                ))
            }
            Ok(Err(source)) => {
                let err = DaemonError::InitLoadFailure { path: root, source };
                let detail = InitFailureDetail::from_error(&err);
                tracing::error!(%err, "initialization failed");
                let message = detail.short_message.clone();
                self.failure = Some(detail);
                self.state_tag = StateTag::FailedToInitialize;
                DispatchOutcome::Outcome(QueryOutcome::Err(message))
            }
            Err(payload) => {
                let panic_detail = describe_panic(payload.as_ref());
                let err = DaemonError::InitUncaught { detail: panic_detail.message };
                let detail = InitFailureDetail::from_error(&err);
                tracing::error!(%err, "initialization panicked");
                let message = detail.short_message.clone();
                self.failure = Some(detail);
                self.state_tag = StateTag::FailedToInitialize;
                DispatchOutcome::Outcome(QueryOutcome::Err(message))
            }
        }
    }

    async fn handle_shutdown(&mut self) -> DispatchOutcome {
        if let Some(state) = self.initialized.as_mut() {
            // Best-effort stub cleanup; a failure here must not block
            // shutdown from completing.
            let _ = state.stdlib.cleanup(&state.standard_library_root);
        }
        DispatchOutcome::Shutdown
    }

    async fn handle_initialized_request(&mut self, request: Request) -> DispatchOutcome {
        let state = self.initialized.as_mut().expect("Initialized state_tag implies Some");

        match request {
            Request::Verbose(enabled) => {
                tracing::info!(verbose = enabled, "verbosity toggled");
                DispatchOutcome::NoResponse
            }
            Request::FileChanged { path } => {
                state.enqueue_changed_file(path);
                DispatchOutcome::NoResponse
            }
            Request::FileOpened { path, contents } => {
                state.ensure_stdlib_root();
                let outcome = state.context.entries.open(path.clone(), contents);
                if outcome.changed() {
                    state.invalidation.trigger_entry_mutated(&path, &state.forward_naming_table);
                }
                DispatchOutcome::Outcome(QueryOutcome::Ok(serde_json::json!({ "entry_id": outcome.entry_id().to_raw() })))
            }
            Request::FileClosed { path } => {
                if let Some(entry) = state.context.entries.close(&path) {
                    state.invalidation.trigger_entry_mutated(&path, &state.forward_naming_table);
                    let _ = entry.id();
                }
                DispatchOutcome::Outcome(QueryOutcome::Ok(serde_json::Value::Null))
            }
            other => self.dispatch_query(other),
        }
    }

    fn dispatch_query(&mut self, request: Request) -> DispatchOutcome {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let state = self.initialized.as_mut().expect("Initialized state_tag implies Some");
        let query_engine = &mut self.query_engine;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            if needs_quarantine(&request) {
                let quarantine = nova_cache::Quarantine::new(&state.invalidation);
                query_engine.run(&request, QuerySnapshot::Quarantined(&state.context, quarantine))
            } else {
                query_engine.run(&request, QuerySnapshot::Direct(&state.context))
            }
        }));

        match result {
            Ok(outcome) => DispatchOutcome::Outcome(outcome),
            Err(payload) => {
                let panic_detail = describe_panic(payload.as_ref());
                let err = DaemonError::HandlerUncaught { request_id, detail: panic_detail.message };
                tracing::error!(%err, "request handler panicked");
                DispatchOutcome::Outcome(QueryOutcome::Err(err.to_string()))
            }
        }
    }
}

enum DispatchOutcome {
    Outcome(QueryOutcome),
    NoResponse,
    Shutdown,
}

impl DispatchOutcome {
    fn into_query_outcome(self) -> QueryOutcome {
        match self {
            DispatchOutcome::Outcome(outcome) => outcome,
            DispatchOutcome::NoResponse => QueryOutcome::Ok(serde_json::Value::Null),
            DispatchOutcome::Shutdown => QueryOutcome::Ok(serde_json::Value::Null),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
