use crate::core::filter::{apply_threshold, to_gray};
use crate::core::{FrameStore, RenderPass};
use crate::domain::model::{FrameKind, OutputFormat, RenderInput, RenderOutput, ThresholdParams};
use crate::utils::error::Result;
use image::DynamicImage;
use std::path::PathBuf;

/// Binary threshold of each raw frame.
pub struct OtsuPass<S: FrameStore> {
    store: S,
    params: ThresholdParams,
    format: OutputFormat,
}

impl<S: FrameStore> OtsuPass<S> {
    pub fn new(store: S, params: ThresholdParams, format: OutputFormat) -> Self {
        Self {
            store,
            params,
            format,
        }
    }
}

#[async_trait::async_trait]
impl<S: FrameStore> RenderPass for OtsuPass<S> {
    fn kind(&self) -> FrameKind {
        FrameKind::Otsu
    }

    async fn extract(&self, frame: u32) -> Result<RenderInput> {
        Ok(RenderInput {
            primary: self.store.read_frame(frame, FrameKind::Raw).await?,
            secondary: None,
        })
    }

    async fn transform(&self, frame: u32, input: RenderInput) -> Result<RenderOutput> {
        let (level, binary) = apply_threshold(&to_gray(&input.primary), &self.params);
        tracing::debug!("Frame {} thresholded at level {}", frame, level);

        Ok(RenderOutput {
            image: DynamicImage::ImageLuma8(binary),
            detections: Vec::new(),
        })
    }

    async fn load(&self, frame: u32, output: &RenderOutput) -> Result<PathBuf> {
        self.store
            .write_frame(frame, FrameKind::Otsu, &output.image, self.format)
            .await
    }
}
