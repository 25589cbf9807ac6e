//! Concurrent fan-out of one user message to every selected provider.
//!
//! Each selected provider runs in its own tokio task behind the timeout guard.
//! Batch mode joins the tasks in selection order. The two streaming modes hand
//! back a [`RunEvents`] stream fed by a single unbounded channel: a supervisor
//! task forwards each provider's completion as soon as its task settles and
//! sends [`RunEvent::Done`] once all of them have.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::conversation::build_messages;
use crate::provider::ProviderAdapter;
use crate::timeout::with_timeout;
use crate::{BatchResult, Error, Message, ProviderError, ProviderId, ProviderOutcome, RunEvent, RunRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Batch,
    OnCompletion,
    Realtime,
}

impl Mode {
    fn as_str(&self) -> &'static str {
        match self {
            Mode::Batch => "batch",
            Mode::OnCompletion => "on_completion",
            Mode::Realtime => "realtime",
        }
    }
}

/// Resolved, validated form of a [`RunRequest`].
struct RunPlan {
    run_id: Uuid,
    user_message: String,
    messages: Arc<[Message]>,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    timeout: Duration,
}

/// Fans a user message out to registered provider adapters.
///
/// Holds no per-run state; one orchestrator serves any number of concurrent runs.
#[derive(Clone)]
pub struct Orchestrator {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    default_timeout: Duration,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<_> = self.adapters.keys().map(|id| id.as_str()).collect();
        providers.sort_unstable();
        f.debug_struct("Orchestrator")
            .field("providers", &providers)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator with no adapters registered.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            adapters: HashMap::new(),
            default_timeout,
        }
    }

    /// Register an adapter, replacing any previous one with the same id.
    pub fn register<A: ProviderAdapter>(&mut self, adapter: A) -> &mut Self {
        self.register_arc(Arc::new(adapter))
    }

    pub fn register_arc(&mut self, adapter: Arc<dyn ProviderAdapter>) -> &mut Self {
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_adapter<A: ProviderAdapter>(mut self, adapter: A) -> Self {
        self.register(adapter);
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn is_registered(&self, provider: ProviderId) -> bool {
        self.adapters.contains_key(&provider)
    }

    fn plan(&self, request: RunRequest) -> Result<RunPlan, Error> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        if timeout.is_zero() {
            return Err(Error::config("provider timeout must be positive"));
        }

        let adapters: Vec<_> = request
            .providers
            .ids()
            .iter()
            .filter_map(|id| self.adapters.get(id).cloned())
            .collect();
        if adapters.is_empty() {
            return Err(Error::NoProviders);
        }

        let messages = build_messages(&request.history, &request.user_message);
        Ok(RunPlan {
            run_id: Uuid::new_v4(),
            user_message: request.user_message,
            messages: messages.into(),
            adapters,
            timeout,
        })
    }

    /// Ask every selected provider for a complete answer and wait for all of them.
    ///
    /// Outcomes are in selection order. Provider failures never fail the call.
    pub async fn run_batch(&self, request: RunRequest) -> Result<BatchResult, Error> {
        let plan = self.plan(request)?;
        let span = run_span(&plan, Mode::Batch);

        async move {
            let handles = spawn_all(&plan, None);
            let outcomes = join_all(handles).await;
            tracing::info!(
                succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
                failed = outcomes.iter().filter(|o| !o.is_success()).count(),
                "run finished"
            );
            Ok(BatchResult {
                user_message: plan.user_message,
                outcomes,
            })
        }
        .instrument(span)
        .await
    }

    /// Deliver each provider's complete answer the moment it settles.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, since the provider tasks are spawned
    /// before this returns.
    pub fn run_on_completion(&self, request: RunRequest) -> Result<RunEvents, Error> {
        self.run_streaming(request, Mode::OnCompletion)
    }

    /// Relay every provider's answer fragment by fragment as it is produced.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn run_realtime(&self, request: RunRequest) -> Result<RunEvents, Error> {
        self.run_streaming(request, Mode::Realtime)
    }

    fn run_streaming(&self, request: RunRequest, mode: Mode) -> Result<RunEvents, Error> {
        let plan = self.plan(request)?;
        let span = run_span(&plan, mode);
        let (sender, receiver) = mpsc::unbounded_channel();
        let run_id = plan.run_id;

        let _ = sender.send(RunEvent::UserEcho {
            content: plan.user_message.clone(),
        });

        let fragments = (mode == Mode::Realtime).then(|| sender.clone());
        let handles = {
            let _entered = span.enter();
            spawn_all(&plan, fragments)
        };

        tokio::spawn(
            async move {
                let mut pending: FuturesUnordered<_> = handles.into_iter().collect();
                let mut failed = 0usize;
                while let Some(outcome) = pending.next().await {
                    if !outcome.is_success() {
                        failed += 1;
                    }
                    if sender.send(RunEvent::Completion(outcome)).is_err() {
                        tracing::debug!("event receiver dropped");
                    }
                }
                tracing::info!(failed, "run finished");
                let _ = sender.send(RunEvent::Done);
            }
            .instrument(span),
        );

        Ok(RunEvents { run_id, receiver })
    }
}

fn run_span(plan: &RunPlan, mode: Mode) -> tracing::Span {
    tracing::info_span!(
        "run",
        run_id = %plan.run_id,
        mode = mode.as_str(),
        providers = plan.adapters.len(),
        timeout_ms = plan.timeout.as_millis() as u64,
    )
}

/// Spawn one task per adapter. Each returned future always yields an outcome,
/// including when the task itself panicked.
fn spawn_all(
    plan: &RunPlan,
    fragments: Option<UnboundedSender<RunEvent>>,
) -> Vec<impl std::future::Future<Output = ProviderOutcome>> {
    plan.adapters
        .iter()
        .map(|adapter| {
            let id = adapter.id();
            let span = tracing::info_span!("provider", provider = %id);
            let handle: JoinHandle<ProviderOutcome> = tokio::spawn(
                invoke(
                    adapter.clone(),
                    plan.messages.clone(),
                    plan.timeout,
                    fragments.clone(),
                )
                .instrument(span),
            );
            handle.map(move |joined| {
                joined.unwrap_or_else(|e| {
                    tracing::error!(provider = %id, error = %e, "provider task failed");
                    ProviderOutcome::new(id, Err(ProviderError::upstream(id, format!("task failed: {e}"))))
                })
            })
        })
        .collect()
}

/// One timeout-guarded adapter call. With a fragment sender the streaming
/// operation is used and every fragment is forwarded before this returns.
async fn invoke(
    adapter: Arc<dyn ProviderAdapter>,
    messages: Arc<[Message]>,
    timeout: Duration,
    fragments: Option<UnboundedSender<RunEvent>>,
) -> ProviderOutcome {
    let id = adapter.id();

    if !adapter.is_configured() {
        let error = ProviderError::not_configured(id);
        tracing::warn!(kind = error.kind(), error = %error, "provider skipped");
        return ProviderOutcome::new(id, Err(error));
    }

    tracing::debug!(messages = messages.len(), "provider call started");
    let started = Instant::now();

    let result = match fragments {
        None => with_timeout(adapter.respond(&messages), timeout, id.label()).await,
        Some(sender) => {
            let mut on_fragment = move |text: &str| {
                let _ = sender.send(RunEvent::Fragment {
                    provider: id,
                    text: text.to_string(),
                });
            };
            with_timeout(
                adapter.respond_streaming(&messages, &mut on_fragment),
                timeout,
                id.label(),
            )
            .await
        }
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(content) => {
            tracing::info!(content_len = content.len(), elapsed_ms, "provider answered")
        }
        Err(error) => {
            tracing::warn!(kind = error.kind(), error = %error, elapsed_ms, "provider failed")
        }
    }

    ProviderOutcome::new(id, result)
}

/// Event stream of one streaming run.
///
/// Starts with [`RunEvent::UserEcho`], ends with [`RunEvent::Done`], after which
/// the stream terminates.
#[derive(Debug)]
pub struct RunEvents {
    run_id: Uuid,
    receiver: UnboundedReceiver<RunEvent>,
}

impl RunEvents {
    /// Identifier of the run, as recorded in its tracing span.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Next event, or `None` once the run is over.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.receiver.recv().await
    }

    /// Drain the whole run.
    pub async fn collect_all(mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }
}

impl Stream for RunEvents {
    type Item = RunEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
