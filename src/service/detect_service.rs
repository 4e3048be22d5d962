//! Detect Service - call processing
//!
//! Every call walks its images strictly in order with its own continuity
//! state. Per-image work runs on the blocking pool; the task yields between
//! images so keep-alive traffic and shutdown are serviced during long calls.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{DetectError, DetectResult};
use crate::pipeline::{AlarmPipeline, ContinuityState};
use crate::types::Annotation;

use super::lifecycle::Lifecycle;
use super::types::HealthResult;

/// Annotations buffered ahead of a slow stream consumer.
const STREAM_BUFFER: usize = 4;

pub struct DetectService {
    pipeline: Arc<AlarmPipeline>,
    lifecycle: Lifecycle,
}

impl DetectService {
    pub fn new(pipeline: Arc<AlarmPipeline>, lifecycle: Lifecycle) -> Self {
        Self {
            pipeline,
            lifecycle,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Detect objects in every image and return all annotations at once.
    pub async fn detect_batch(&self, images: Vec<String>) -> DetectResult<Vec<Annotation>> {
        let start = Instant::now();
        let total = images.len();
        let mut state = ContinuityState::new();
        let mut annotations = Vec::with_capacity(total);

        for image in images {
            self.check_open()?;
            let (annotation, next) = annotate_blocking(self.pipeline.clone(), image, state).await?;
            state = next;
            annotations.push(annotation);
            tokio::task::yield_now().await;
        }

        info!("Detected objects in {} images in {:?}", total, start.elapsed());
        Ok(annotations)
    }

    /// Detect objects and yield each annotation as soon as it is ready.
    ///
    /// The stream ends early when the receiver is dropped. An engine failure,
    /// or `ShuttingDown` once the host starts stopping, is sent as the last item.
    pub fn detect_stream(&self, images: Vec<String>) -> mpsc::Receiver<DetectResult<Annotation>> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let pipeline = self.pipeline.clone();
        let lifecycle = self.lifecycle.clone();

        tokio::spawn(async move {
            let mut state = ContinuityState::new();
            for image in images {
                if lifecycle.is_stopping() {
                    info!("Host stopping, ending object stream");
                    let _ = tx.send(Err(DetectError::ShuttingDown)).await;
                    return;
                }
                let annotation = match annotate_blocking(pipeline.clone(), image, state).await {
                    Ok((annotation, next)) => {
                        state = next;
                        annotation
                    }
                    Err(e) => {
                        error!("Object stream aborted: {}", e);
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                };
                if tx.send(Ok(annotation)).await.is_err() {
                    debug!("Object stream receiver gone");
                    return;
                }
                tokio::task::yield_now().await;
            }
        });

        rx
    }

    /// Run the stage chain on upstream annotations.
    pub async fn classify_batch(&self, annotations: Vec<Annotation>) -> DetectResult<Vec<Annotation>> {
        self.check_chain()?;
        let start = Instant::now();
        let total = annotations.len();
        let mut classified = Vec::with_capacity(total);

        for annotation in annotations {
            self.check_open()?;
            classified.push(classify_blocking(self.pipeline.clone(), annotation).await?);
            tokio::task::yield_now().await;
        }

        info!("Classified persons in {} images in {:?}", total, start.elapsed());
        Ok(classified)
    }

    pub fn classify_stream(
        &self,
        annotations: Vec<Annotation>,
    ) -> DetectResult<mpsc::Receiver<DetectResult<Annotation>>> {
        self.check_chain()?;
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let pipeline = self.pipeline.clone();
        let lifecycle = self.lifecycle.clone();

        tokio::spawn(async move {
            for annotation in annotations {
                if lifecycle.is_stopping() {
                    info!("Host stopping, ending person stream");
                    let _ = tx.send(Err(DetectError::ShuttingDown)).await;
                    return;
                }
                let result = classify_blocking(pipeline.clone(), annotation).await;
                let failed = result.is_err();
                if let Err(e) = &result {
                    error!("Person stream aborted: {}", e);
                }
                if tx.send(result).await.is_err() {
                    debug!("Person stream receiver gone");
                    return;
                }
                if failed {
                    return;
                }
                tokio::task::yield_now().await;
            }
        });

        Ok(rx)
    }

    pub fn health(&self) -> HealthResult {
        HealthResult::new(self.lifecycle.state(), self.pipeline.models())
    }

    fn check_open(&self) -> DetectResult<()> {
        if self.lifecycle.is_stopping() {
            return Err(DetectError::ShuttingDown);
        }
        Ok(())
    }

    fn check_chain(&self) -> DetectResult<()> {
        if !self.pipeline.has_chain() {
            return Err(DetectError::config("no person classification stages are configured"));
        }
        Ok(())
    }
}

/// Annotate one image on the blocking pool, handing the continuity state
/// there and back.
async fn annotate_blocking(
    pipeline: Arc<AlarmPipeline>,
    image: String,
    mut state: ContinuityState,
) -> DetectResult<(Annotation, ContinuityState)> {
    tokio::task::spawn_blocking(move || {
        let annotation = pipeline.annotate(&image, &mut state)?;
        Ok((annotation, state))
    })
    .await
    .map_err(|e| DetectError::inference(format!("detection worker failed: {}", e)))?
}

async fn classify_blocking(pipeline: Arc<AlarmPipeline>, annotation: Annotation) -> DetectResult<Annotation> {
    tokio::task::spawn_blocking(move || pipeline.classify(annotation))
        .await
        .map_err(|e| DetectError::inference(format!("classification worker failed: {}", e)))?
}
