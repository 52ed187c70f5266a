use crate::core::filter::absolute_difference;
use crate::core::{FrameStore, RenderPass};
use crate::domain::model::{FrameKind, FrameRange, OutputFormat, RenderInput, RenderOutput};
use crate::utils::error::{EleganceError, Result};
use image::DynamicImage;
use std::path::PathBuf;

/// Absolute difference between raw frame `f` and raw frame `f + diff`.
pub struct DifferencePass<S: FrameStore> {
    store: S,
    range: FrameRange,
    format: OutputFormat,
}

impl<S: FrameStore> DifferencePass<S> {
    pub fn new(store: S, range: FrameRange, format: OutputFormat) -> Self {
        Self {
            store,
            range,
            format,
        }
    }
}

#[async_trait::async_trait]
impl<S: FrameStore> RenderPass for DifferencePass<S> {
    fn kind(&self) -> FrameKind {
        FrameKind::Difference
    }

    async fn extract(&self, frame: u32) -> Result<RenderInput> {
        let partner = self.range.partner(frame);
        Ok(RenderInput {
            primary: self.store.read_frame(frame, FrameKind::Raw).await?,
            secondary: Some(self.store.read_frame(partner, FrameKind::Raw).await?),
        })
    }

    async fn transform(&self, frame: u32, input: RenderInput) -> Result<RenderOutput> {
        let partner = input.secondary.ok_or_else(|| {
            EleganceError::processing(format!("frame {} has no partner frame to diff", frame))
        })?;

        Ok(RenderOutput {
            image: DynamicImage::ImageRgb8(absolute_difference(&input.primary, &partner)?),
            detections: Vec::new(),
        })
    }

    async fn load(&self, frame: u32, output: &RenderOutput) -> Result<PathBuf> {
        self.store
            .write_frame(frame, FrameKind::Difference, &output.image, self.format)
            .await
    }
}
