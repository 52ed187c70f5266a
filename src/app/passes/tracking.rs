use crate::core::tracker::WormTracker;
use crate::core::{FrameStore, RenderPass};
use crate::domain::model::{FrameKind, OutputFormat, RenderInput, RenderOutput, TrackingParams};
use crate::utils::error::Result;
use image::DynamicImage;
use std::path::PathBuf;

pub struct TrackingPass<S: FrameStore> {
    store: S,
    tracker: WormTracker,
    format: OutputFormat,
}

impl<S: FrameStore> TrackingPass<S> {
    pub fn new(store: S, params: TrackingParams, format: OutputFormat) -> Self {
        Self {
            store,
            tracker: WormTracker::new(params),
            format,
        }
    }
}

#[async_trait::async_trait]
impl<S: FrameStore> RenderPass for TrackingPass<S> {
    fn kind(&self) -> FrameKind {
        FrameKind::Track
    }

    async fn extract(&self, frame: u32) -> Result<RenderInput> {
        Ok(RenderInput {
            primary: self.store.read_frame(frame, FrameKind::Raw).await?,
            secondary: None,
        })
    }

    async fn transform(&self, frame: u32, input: RenderInput) -> Result<RenderOutput> {
        let result = self.tracker.track(frame, &input.primary);
        if result.detections.is_empty() {
            tracing::debug!("Frame {}: no worm-sized contour found", frame);
        }

        Ok(RenderOutput {
            image: DynamicImage::ImageLuma8(result.annotated),
            detections: result.detections,
        })
    }

    async fn load(&self, frame: u32, output: &RenderOutput) -> Result<PathBuf> {
        self.store
            .write_frame(frame, FrameKind::Track, &output.image, self.format)
            .await
    }
}
