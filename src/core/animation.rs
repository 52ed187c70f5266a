//! Animated GIF export of the pre-rendered frames.
//!
//! Each GIF frame is a 2x2 grid: raw (top left), difference (top right),
//! track (bottom left) and heat (bottom right).

use crate::domain::model::{AnimationParams, FrameKind, FrameRange};
use crate::domain::ports::FrameStore;
use crate::utils::error::Result;
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, DynamicImage, Frame, Rgba, RgbaImage};

/// Quantizer speed handed to the GIF encoder (1 is slowest, 30 fastest).
const GIF_SPEED: i32 = 10;

const PANELS: [(FrameKind, u32, u32); 4] = [
    (FrameKind::Raw, 0, 0),
    (FrameKind::Difference, 1, 0),
    (FrameKind::Track, 0, 1),
    (FrameKind::Heat, 1, 1),
];

pub struct AnimationComposer<'a, S: FrameStore> {
    store: &'a S,
    params: AnimationParams,
    delay_ms: u64,
}

impl<'a, S: FrameStore> AnimationComposer<'a, S> {
    pub fn new(store: &'a S, params: AnimationParams, delay_ms: u64) -> Self {
        Self {
            store,
            params,
            delay_ms,
        }
    }

    fn panel_size(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = self.params.scale.clamp(f32::MIN_POSITIVE, 1.0);
        (
            ((width as f32 * scale).round() as u32).max(1),
            ((height as f32 * scale).round() as u32).max(1),
        )
    }

    async fn optional_panel(&self, frame: u32, kind: FrameKind) -> Result<Option<DynamicImage>> {
        if !self.store.frame_exists(frame, kind).await {
            tracing::debug!("Frame {} has no {} image, leaving panel blank", frame, kind);
            return Ok(None);
        }
        Ok(Some(self.store.read_frame(frame, kind).await?))
    }

    pub async fn compose_frame(&self, frame: u32) -> Result<RgbaImage> {
        let raw = self.store.read_frame(frame, FrameKind::Raw).await?;
        let (pw, ph) = self.panel_size(raw.width(), raw.height());

        let mut canvas = RgbaImage::from_pixel(pw * 2, ph * 2, Rgba([0, 0, 0, 255]));
        for (kind, column, row) in PANELS {
            let image = if kind == FrameKind::Raw {
                Some(raw.clone())
            } else {
                self.optional_panel(frame, kind).await?
            };
            let Some(image) = image else { continue };

            let mut rgba = image.to_rgba8();
            if rgba.dimensions() != (pw, ph) {
                rgba = imageops::resize(&rgba, pw, ph, FilterType::Triangle);
            }
            imageops::overlay(&mut canvas, &rgba, (column * pw) as i64, (row * ph) as i64);
        }

        Ok(canvas)
    }

    /// Encodes every frame of `range` into a looping GIF.
    pub async fn render_gif(&self, range: FrameRange) -> Result<Vec<u8>> {
        tracing::info!(
            ">>> RENDERING ANIMATION ({} frames, {} ms per frame) <<<",
            range.len(),
            self.delay_ms
        );

        let delay = Delay::from_numer_denom_ms(self.delay_ms.min(u32::MAX as u64) as u32, 1);
        let mut buffer = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buffer, GIF_SPEED);
            encoder.set_repeat(Repeat::Infinite)?;

            for frame in range.frames() {
                tracing::info!("Animation progress: {}/{} frames", frame, range.end);
                let canvas = self.compose_frame(frame).await?;
                encoder.encode_frame(Frame::from_parts(canvas, 0, 0, delay))?;
            }
        }

        Ok(buffer)
    }

    pub fn output(&self) -> &str {
        &self.params.output
    }
}
