use std::future::Future;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::Instrument as _;

use crate::foundation::config::PipelineConfig;
use crate::foundation::core::{Credential, FrameSize, RequestId};
use crate::foundation::error::{SketchError, SketchResult};
use crate::inference::client::InferenceClient;
use crate::inference::failure::StageFailure;
use crate::inference::transport::{HttpTransport, ReqwestTransport};
use crate::pipeline::events::{Phase, Rejection, RunOutcome, StatusEvent};
use crate::render::raster::{CaptureResult, Rasterizer};
use crate::render::view::ViewTransform;
use crate::strokes::store::StrokeStore;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Result of the synchronous part of a run.
enum Started<'a> {
    /// Capture succeeded; the slot is held until inference finishes.
    Captured {
        flight: FlightGuard<'a>,
        credential: &'a Credential,
        request: RequestId,
        capture: CaptureResult,
    },
    /// The run already reached a terminal outcome.
    Finished(RunOutcome),
}

/// Holds the single-flight slot for the duration of one run.
///
/// Dropping the guard (normal completion, or the run future being dropped at shutdown) returns
/// the pipeline to `Idle`.
struct FlightGuard<'a> {
    phase: &'a AtomicU8,
}

impl<'a> FlightGuard<'a> {
    fn acquire(phase: &'a AtomicU8) -> Option<Self> {
        phase
            .compare_exchange(
                Phase::Idle as u8,
                Phase::Capturing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| Self { phase })
    }

    fn set(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.phase.store(Phase::Idle as u8, Ordering::Release);
    }
}

/// Sequences capture, describe, and summarize, one run at a time.
///
/// Observers subscribe to [`StatusEvent`]s; they are pushed one event per phase transition.
pub struct PipelineOrchestrator<T> {
    rasterizer: Rasterizer,
    client: InferenceClient<T>,
    credential: Option<Credential>,
    capture_size: FrameSize,
    phase: AtomicU8,
    next_id: AtomicU64,
    events: broadcast::Sender<StatusEvent>,
    last_outcome: Mutex<Option<RunOutcome>>,
}

impl PipelineOrchestrator<ReqwestTransport> {
    /// Orchestrator talking to the configured endpoints over `reqwest`.
    pub fn with_reqwest(config: &PipelineConfig, token: &str) -> SketchResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.inference.timeout())?;
        Ok(Self::from_config(config, transport, token))
    }
}

impl<T: HttpTransport> PipelineOrchestrator<T> {
    /// Assemble an orchestrator.
    ///
    /// An empty `token` is accepted here and reported by every [`run`](Self::run) as
    /// [`SketchError::CredentialMissing`].
    pub fn new(
        rasterizer: Rasterizer,
        client: InferenceClient<T>,
        token: &str,
        capture_size: FrameSize,
    ) -> Self {
        let credential = Credential::new(token).ok();
        if credential.is_none() {
            tracing::warn!("no inference credential configured; runs will be rejected");
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            rasterizer,
            client,
            credential,
            capture_size,
            phase: AtomicU8::new(Phase::Idle as u8),
            next_id: AtomicU64::new(0),
            events,
            last_outcome: Mutex::new(None),
        }
    }

    /// Assemble an orchestrator from configuration and a transport.
    pub fn from_config(config: &PipelineConfig, transport: T, token: &str) -> Self {
        Self::new(
            Rasterizer::new(&config.capture),
            InferenceClient::new(transport, config.inference.clone()),
            token,
            config.capture.size,
        )
    }

    /// Subscribe to status events. Events sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    /// Current phase of the in-flight run, or `Idle`.
    ///
    /// The slot is released before the terminal event is sent, so `Done` and `Failed` are only
    /// observed through [`StatusEvent`]s and [`last_outcome`](Self::last_outcome).
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Return `true` while a run is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase() != Phase::Idle
    }

    /// Outcome of the most recent completed run.
    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return `true` if a usable credential was supplied.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Inference client.
    pub fn client(&self) -> &InferenceClient<T> {
        &self.client
    }

    /// Capture frame size.
    pub fn capture_size(&self) -> FrameSize {
        self.capture_size
    }

    /// Capture the strokes as seen from `view`, caption the image, then summarize the caption.
    ///
    /// The capture happens before this returns, so `store` and `view` are free again while the
    /// returned future waits on the network. Resolves to `Err` only when the run is refused
    /// before starting: no credential, or another run in flight. Stage failures come back as
    /// [`RunOutcome::Failed`].
    pub fn run<'a>(
        &'a self,
        store: &StrokeStore,
        view: &ViewTransform,
    ) -> impl Future<Output = SketchResult<RunOutcome>> + use<'a, T> {
        let span = tracing::info_span!("run");
        let started = span.in_scope(|| self.start(store, view));
        async move {
            match started {
                Ok(Started::Captured {
                    flight,
                    credential,
                    request,
                    capture,
                }) => Ok(self.infer(flight, credential, request, capture).await),
                Ok(Started::Finished(outcome)) => Ok(outcome),
                Err(e) => Err(e),
            }
        }
        .instrument(span)
    }

    /// Claim the slot and capture. Everything that touches the strokes happens here.
    fn start(&self, store: &StrokeStore, view: &ViewTransform) -> SketchResult<Started<'_>> {
        let Some(credential) = self.credential.as_ref() else {
            self.emit(StatusEvent::Rejected {
                reason: Rejection::CredentialMissing,
            });
            return Err(SketchError::CredentialMissing);
        };
        let Some(flight) = FlightGuard::acquire(&self.phase) else {
            tracing::info!(phase = %self.phase(), "run rejected: pipeline busy");
            self.emit(StatusEvent::Rejected {
                reason: Rejection::Busy,
            });
            return Err(SketchError::Busy);
        };

        let request = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::info!(%request, "capturing");
        self.emit(StatusEvent::Capturing { request });

        match self.rasterizer.capture(store, view, self.capture_size) {
            Ok(capture) => Ok(Started::Captured {
                flight,
                credential,
                request,
                capture,
            }),
            Err(e) => Ok(Started::Finished(self.fail(
                flight,
                request,
                StageFailure::capture(e.to_string()),
            ))),
        }
    }

    async fn infer(
        &self,
        flight: FlightGuard<'_>,
        credential: &Credential,
        request: RequestId,
        capture: CaptureResult,
    ) -> RunOutcome {
        flight.set(Phase::Describing);
        tracing::info!(%request, image_bytes = capture.png.len(), "describing");
        self.emit(StatusEvent::Describing {
            request,
            image_bytes: capture.png.len(),
        });

        let described = self.client.describe(credential, &capture.png).await;
        drop(capture);
        let caption = match described {
            Ok(caption) => caption,
            Err(failure) => return self.fail(flight, request, failure),
        };

        flight.set(Phase::Summarizing);
        tracing::info!(%request, "summarizing");
        self.emit(StatusEvent::Summarizing {
            request,
            caption: caption.0.clone(),
        });

        let summary = self.client.summarize(credential, caption.as_str()).await;

        tracing::info!(%request, degraded = summary.is_degraded(), "done");
        let outcome = RunOutcome::Done {
            request,
            caption: caption.0,
            summary: summary.clone(),
        };
        self.finish(flight, outcome, StatusEvent::Done { request, summary })
    }

    fn fail(&self, flight: FlightGuard<'_>, request: RequestId, failure: StageFailure) -> RunOutcome {
        tracing::warn!(
            %request,
            stage = %failure.stage,
            kind = ?failure.kind,
            status = ?failure.http_status,
            reason = %failure.reason,
            "run failed"
        );
        let outcome = RunOutcome::Failed {
            request,
            failure: failure.clone(),
        };
        self.finish(flight, outcome, StatusEvent::Failed { request, failure })
    }

    /// Record the outcome and free the slot before announcing it, so an observer reacting to
    /// the terminal event can start the next run immediately.
    fn finish(&self, flight: FlightGuard<'_>, outcome: RunOutcome, event: StatusEvent) -> RunOutcome {
        self.record(&outcome);
        drop(flight);
        self.emit(event);
        outcome
    }

    fn record(&self, outcome: &RunOutcome) {
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
    }

    fn emit(&self, event: StatusEvent) {
        // No subscribers is fine: events are fire-and-forget.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
