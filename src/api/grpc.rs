//! gRPC service implementation

use std::pin::Pin;
use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status};

use crate::error::{DetectError, DetectResult};
use crate::service::DetectService;
use crate::types;

// Include generated protobuf code
pub mod proto {
    include!("../proto/alarmdet.rs");
}

use proto::alarm_detector_server::{AlarmDetector, AlarmDetectorServer};
use proto::*;

type AnnotationStream = Pin<Box<dyn Stream<Item = Result<proto::Annotation, Status>> + Send>>;

/// gRPC service implementation
pub struct GrpcHandler {
    service: Arc<DetectService>,
}

impl GrpcHandler {
    pub fn new(service: Arc<DetectService>) -> Self {
        Self { service }
    }

    pub fn into_server(self) -> AlarmDetectorServer<Self> {
        AlarmDetectorServer::new(self)
    }
}

/// Per-image kinds never get here; they degrade to empty annotations.
fn to_status(err: DetectError) -> Status {
    match err {
        DetectError::Inference(_) => Status::internal(err.to_string()),
        DetectError::Config(_) => Status::failed_precondition(err.to_string()),
        DetectError::ShuttingDown => Status::unavailable(err.to_string()),
        DetectError::PathParse(_) | DetectError::ImageRead { .. } | DetectError::EmptyRoi => {
            Status::invalid_argument(err.to_string())
        }
    }
}

fn annotation_stream(
    rx: tokio::sync::mpsc::Receiver<DetectResult<types::Annotation>>,
) -> AnnotationStream {
    Box::pin(ReceiverStream::new(rx).map(|item| item.map(proto::Annotation::from).map_err(to_status)))
}

impl From<types::BoundingBox> for proto::BoundingBox {
    fn from(b: types::BoundingBox) -> Self {
        Self {
            ymin: b.ymin,
            xmin: b.xmin,
            ymax: b.ymax,
            xmax: b.xmax,
        }
    }
}

impl From<proto::BoundingBox> for types::BoundingBox {
    fn from(b: proto::BoundingBox) -> Self {
        Self {
            ymin: b.ymin,
            xmin: b.xmin,
            ymax: b.ymax,
            xmax: b.xmax,
        }
    }
}

impl From<types::Label> for proto::Label {
    fn from(l: types::Label) -> Self {
        Self {
            id: l.id,
            name: l.name,
            score: l.score,
            bbox: Some(l.bbox.into()),
            face_checked: l.face.is_some(),
            face: l.face.flatten(),
            face_confidence: l.face_confidence,
        }
    }
}

impl From<proto::Label> for types::Label {
    fn from(l: proto::Label) -> Self {
        Self {
            id: l.id,
            name: l.name,
            score: l.score,
            bbox: l.bbox.map(Into::into).unwrap_or_default(),
            face: if l.face_checked || l.face.is_some() {
                Some(l.face)
            } else {
                None
            },
            face_confidence: l.face_confidence,
        }
    }
}

impl From<types::Annotation> for proto::Annotation {
    fn from(a: types::Annotation) -> Self {
        Self {
            image: a.image,
            labels: a.labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<proto::Annotation> for types::Annotation {
    fn from(a: proto::Annotation) -> Self {
        Self {
            image: a.image,
            labels: a.labels.into_iter().map(Into::into).collect(),
        }
    }
}

#[tonic::async_trait]
impl AlarmDetector for GrpcHandler {
    type StreamObjectsStream = AnnotationStream;
    type StreamPersonsStream = AnnotationStream;

    async fn detect_objects(
        &self,
        request: Request<DetectRequest>,
    ) -> Result<Response<DetectResponse>, Status> {
        let req = request.into_inner();

        let annotations = self.service.detect_batch(req.images).await.map_err(to_status)?;

        Ok(Response::new(DetectResponse {
            annotations: annotations.into_iter().map(Into::into).collect(),
        }))
    }

    async fn stream_objects(
        &self,
        request: Request<DetectRequest>,
    ) -> Result<Response<Self::StreamObjectsStream>, Status> {
        let req = request.into_inner();
        if self.service.lifecycle().is_stopping() {
            return Err(to_status(DetectError::ShuttingDown));
        }

        let rx = self.service.detect_stream(req.images);
        Ok(Response::new(annotation_stream(rx)))
    }

    async fn classify_persons(
        &self,
        request: Request<ClassifyRequest>,
    ) -> Result<Response<DetectResponse>, Status> {
        let req = request.into_inner();
        let upstream = req.annotations.into_iter().map(Into::into).collect();

        let annotations = self.service.classify_batch(upstream).await.map_err(to_status)?;

        Ok(Response::new(DetectResponse {
            annotations: annotations.into_iter().map(Into::into).collect(),
        }))
    }

    async fn stream_persons(
        &self,
        request: Request<ClassifyRequest>,
    ) -> Result<Response<Self::StreamPersonsStream>, Status> {
        let req = request.into_inner();
        if self.service.lifecycle().is_stopping() {
            return Err(to_status(DetectError::ShuttingDown));
        }
        let upstream = req.annotations.into_iter().map(Into::into).collect();

        let rx = self.service.classify_stream(upstream).map_err(to_status)?;
        Ok(Response::new(annotation_stream(rx)))
    }

    async fn health(
        &self,
        _request: Request<HealthRequest>,
    ) -> Result<Response<HealthResponse>, Status> {
        let health = self.service.health();

        Ok(Response::new(HealthResponse {
            healthy: health.healthy,
            version: health.version,
            state: health.state.to_string(),
            models_loaded: health.models_loaded,
        }))
    }
}
