use futures::stream::Stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::state::Action;
use crate::client::ImageBackend;
use crate::error::StudioError;
use crate::models::{GeneratedArtifact, GenerationRequest, RANDOM_SEED_MAX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Draw a fresh seed in `[0, RANDOM_SEED_MAX)` for every image.
    Random,
    /// Reuse one seed for every image of the batch.
    Fixed(i64),
}

impl SeedPolicy {
    pub fn from_form(use_random_seed: bool, seed: i64) -> Self {
        if use_random_seed {
            SeedPolicy::Random
        } else {
            SeedPolicy::Fixed(seed)
        }
    }

    fn next_seed<R: Rng>(&self, rng: &mut R) -> i64 {
        match self {
            SeedPolicy::Random => rng.gen_range(0..RANDOM_SEED_MAX),
            SeedPolicy::Fixed(seed) => *seed,
        }
    }
}

/// The requests of one batch, produced lazily so each seed is drawn right
/// before its request is sent.
#[derive(Debug)]
pub struct BatchPlan<R = StdRng> {
    template: GenerationRequest,
    policy: SeedPolicy,
    total: usize,
    issued: usize,
    rng: R,
}

impl BatchPlan<StdRng> {
    pub fn new(template: GenerationRequest, policy: SeedPolicy, total: usize) -> Self {
        Self::with_rng(template, policy, total, StdRng::from_entropy())
    }
}

impl<R: Rng> BatchPlan<R> {
    pub fn with_rng(template: GenerationRequest, policy: SeedPolicy, total: usize, rng: R) -> Self {
        Self {
            template,
            policy,
            total,
            issued: 0,
            rng,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl<R: Rng> Iterator for BatchPlan<R> {
    type Item = GenerationRequest;

    fn next(&mut self) -> Option<Self::Item> {
        if self.issued >= self.total {
            return None;
        }
        self.issued += 1;
        let mut request = self.template.clone();
        request.seed = self.policy.next_seed(&mut self.rng);
        Some(request)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.issued;
        (left, Some(left))
    }
}

impl<R: Rng> ExactSizeIterator for BatchPlan<R> {}

/// Shared stop switch, checked before each batch iteration. An in-flight
/// request is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Artifact {
        artifact: GeneratedArtifact,
        completed: usize,
        total: usize,
    },
    Failed {
        message: String,
        completed: usize,
    },
    Cancelled {
        completed: usize,
    },
    Finished {
        completed: usize,
    },
}

impl From<BatchEvent> for Action {
    fn from(event: BatchEvent) -> Self {
        match event {
            BatchEvent::Artifact {
                artifact,
                completed,
                total,
            } => Action::ArtifactReceived {
                artifact,
                completed,
                total,
            },
            BatchEvent::Failed { message, .. } => Action::BatchFailed(message),
            BatchEvent::Cancelled { .. } => Action::BatchCancelled,
            BatchEvent::Finished { .. } => Action::BatchFinished,
        }
    }
}

#[derive(Debug)]
pub enum BatchStatus {
    Completed,
    Cancelled,
    Failed(StudioError),
}

#[derive(Debug)]
pub struct BatchReport {
    pub completed: usize,
    pub total: usize,
    pub status: BatchStatus,
}

impl BatchReport {
    pub fn failed(total: usize, error: StudioError) -> Self {
        Self {
            completed: 0,
            total,
            status: BatchStatus::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, BatchStatus::Completed)
    }

    pub fn error(&self) -> Option<&StudioError> {
        match &self.status {
            BatchStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Send the batch one request at a time. Every result is reported through
/// `on_event` as soon as it arrives; the first failure ends the batch.
pub async fn run_batch<B, I, F>(
    backend: &B,
    requests: I,
    cancel: &CancelFlag,
    mut on_event: F,
) -> BatchReport
where
    B: ImageBackend + ?Sized,
    I: IntoIterator<Item = GenerationRequest>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(BatchEvent),
{
    let requests = requests.into_iter();
    let total = requests.len();
    let mut completed = 0;

    log::info!("Starting batch of {} via {}", total, backend.name());

    for request in requests {
        if cancel.is_cancelled() {
            log::warn!("Batch cancelled after {}/{} images", completed, total);
            on_event(BatchEvent::Cancelled { completed });
            return BatchReport {
                completed,
                total,
                status: BatchStatus::Cancelled,
            };
        }

        match backend.generate(&request).await {
            Ok(response) => {
                completed += 1;
                log::info!("Image {}/{} received (seed {})", completed, total, request.seed);
                on_event(BatchEvent::Artifact {
                    artifact: GeneratedArtifact::new(response.image_data, request.seed),
                    completed,
                    total,
                });
            }
            Err(e) => {
                log::error!("Batch aborted at image {}/{}: {}", completed + 1, total, e);
                on_event(BatchEvent::Failed {
                    message: e.to_string(),
                    completed,
                });
                return BatchReport {
                    completed,
                    total,
                    status: BatchStatus::Failed(e),
                };
            }
        }
    }

    on_event(BatchEvent::Finished { completed });
    BatchReport {
        completed,
        total,
        status: BatchStatus::Completed,
    }
}

/// Run the batch on a spawned task and hand its events back as a stream.
/// The stream ends after the terminal `Failed`, `Cancelled` or `Finished`.
pub fn stream_batch(
    backend: Arc<dyn ImageBackend>,
    plan: BatchPlan,
    cancel: CancelFlag,
) -> Pin<Box<dyn Stream<Item = BatchEvent> + Send>> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        run_batch(backend.as_ref(), plan, &cancel, |event| {
            // receiver dropped means nobody is watching; keep going so the
            // batch still ends cleanly
            let _ = tx.send(event);
        })
        .await;
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
