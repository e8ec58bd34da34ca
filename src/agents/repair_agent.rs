use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::agents::{GuideLocator, ProgressChunk, SearchQuery, StepNormalizer};
use crate::error::{log_error, AppError};
use crate::ifixit::IfixitClient;

const CHANNEL_CAPACITY: usize = 16;

/// The consumer hung up; remaining work is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

// ============================================================================
// REPAIR AGENT
// ============================================================================

/// Drives interpret → locate → fetch steps → emit for one query per call.
/// Holds no per-request state; each call gets its own task and channel.
pub struct RepairAgent {
    locator: Arc<GuideLocator>,
    normalizer: Arc<StepNormalizer>,
}

impl RepairAgent {
    pub fn new(client: Arc<IfixitClient>) -> Self {
        Self {
            locator: Arc::new(GuideLocator::new(client.clone())),
            normalizer: Arc::new(StepNormalizer::new(client)),
        }
    }

    pub fn handle_request_stream(&self, query: String) -> mpsc::Receiver<ProgressChunk> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let run = Narration {
            request_id: Uuid::now_v7().to_string(),
            locator: self.locator.clone(),
            normalizer: self.normalizer.clone(),
            tx,
        };

        tokio::spawn(async move {
            log::info!("🛠️  [{}] repair request: {:?}", run.request_id, query);
            if run.narrate(&query).await.is_err() {
                log::info!("🔌 [{}] client disconnected, abandoning request", run.request_id);
            }
        });

        rx
    }
}

// ============================================================================
// NARRATION (one per request)
// ============================================================================

struct Narration {
    request_id: String,
    locator: Arc<GuideLocator>,
    normalizer: Arc<StepNormalizer>,
    tx: mpsc::Sender<ProgressChunk>,
}

impl Narration {
    async fn narrate(&self, raw: &str) -> Result<(), Cancelled> {
        // INTERPRET
        let query = SearchQuery::new(raw);
        self.emit(ProgressChunk::Interpreting {
            phrase: query.phrase.clone(),
        })
        .await?;

        // LOCATE
        let device = match self.remote(self.locator.find_device(&query)).await? {
            Ok(Some(device)) => device,
            Ok(None) => return self.not_found(&query).await,
            Err(e) => return self.fail(e).await,
        };
        log::info!("📱 [{}] device: {} ({})", self.request_id, device.name, device.slug);
        self.emit(ProgressChunk::DeviceFound {
            device: device.clone(),
        })
        .await?;

        let guide = match self.remote(self.locator.find_guide(&query, &device)).await? {
            Ok(Some(guide)) => guide,
            Ok(None) => return self.not_found(&query).await,
            Err(e) => return self.fail(e).await,
        };
        log::info!("📘 [{}] guide {}: {}", self.request_id, guide.id, guide.title);
        self.emit(ProgressChunk::GuideLoading {
            guide: guide.clone(),
        })
        .await?;

        // FETCH_STEPS
        let steps = match self.remote(self.normalizer.fetch_steps(guide.id)).await? {
            Ok(steps) => steps,
            Err(e) => return self.fail(e).await,
        };
        if steps.is_empty() {
            return self.emit(ProgressChunk::NoSteps { guide }).await;
        }

        // EMIT_STEPS
        let total = steps.len();
        for (i, step) in steps.into_iter().enumerate() {
            self.emit(ProgressChunk::Step { index: i + 1, step }).await?;
        }

        self.emit(ProgressChunk::Completed { steps: total }).await
    }

    async fn not_found(&self, query: &SearchQuery) -> Result<(), Cancelled> {
        self.emit(ProgressChunk::NotFound {
            phrase: query.phrase.clone(),
        })
        .await
    }

    async fn fail(&self, error: AppError) -> Result<(), Cancelled> {
        log_error(&error);
        self.emit(ProgressChunk::Failed {
            error: error.message,
        })
        .await
    }

    async fn emit(&self, chunk: ProgressChunk) -> Result<(), Cancelled> {
        if chunk.is_terminal() {
            log::info!("🏁 [{}] finished: {:?}", self.request_id, chunk);
        }
        self.tx.send(chunk).await.map_err(|_| Cancelled)
    }

    /// Awaits `fut` unless the consumer goes away first, in which case the
    /// future (and any HTTP request it holds) is dropped.
    async fn remote<T>(&self, fut: impl Future<Output = T>) -> Result<T, Cancelled> {
        tokio::select! {
            _ = self.tx.closed() => Err(Cancelled),
            out = fut => Ok(out),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
