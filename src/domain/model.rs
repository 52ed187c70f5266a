use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The directories a frame can live in under `<root>/images/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Raw,
    Otsu,
    Difference,
    Track,
    Heat,
}

impl FrameKind {
    pub const ALL: [FrameKind; 5] = [
        FrameKind::Raw,
        FrameKind::Otsu,
        FrameKind::Difference,
        FrameKind::Track,
        FrameKind::Heat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameKind::Raw => "raw",
            FrameKind::Otsu => "otsu",
            FrameKind::Difference => "difference",
            FrameKind::Track => "track",
            FrameKind::Heat => "heat",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding used when frames are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

/// Inclusive range of frame numbers plus the offset used when pairing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
    pub diff: u32,
}

impl FrameRange {
    pub fn new(start: u32, end: u32, diff: u32) -> Self {
        Self { start, end, diff }
    }

    pub fn frames(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frame paired with `frame` by the difference pass.
    pub fn partner(&self, frame: u32) -> u32 {
        frame.saturating_add(self.diff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub start: u32,
    pub end: u32,
    pub diff: u32,
    /// Delay between adjacent frames, in milliseconds.
    pub interval_ms: u64,
    pub speed_factor: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            start: 1,
            end: 59,
            diff: 1,
            interval_ms: 100,
            speed_factor: 1,
        }
    }
}

impl FrameSettings {
    pub fn range(&self) -> FrameRange {
        FrameRange::new(self.start, self.end, self.diff)
    }

    pub fn frame_delay_ms(&self) -> u64 {
        self.interval_ms.saturating_mul(self.speed_factor as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// A contour that passed the tracker's area filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub frame: u32,
    pub bbox: BoundingBox,
    pub area: f64,
    pub x: f64,
    pub y: f64,
}

/// One row of the trajectory file: the worm position in a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub frame: u32,
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
    pub area: f64,
}

impl From<&Detection> for TrackPoint {
    fn from(d: &Detection) -> Self {
        Self {
            frame: d.frame,
            x: d.x,
            y: d.y,
            width: d.bbox.width,
            height: d.bbox.height,
            area: d.area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMethod {
    Fixed,
    Otsu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    pub method: ThresholdMethod,
    /// Only used by `ThresholdMethod::Fixed`.
    pub level: u8,
    pub max_value: u8,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            method: ThresholdMethod::Fixed,
            level: 127,
            max_value: 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Worm darker than the background.
    Dark,
    Bright,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    pub threshold: u8,
    pub dilation_iterations: u32,
    pub min_area: f64,
    pub max_area: f64,
    pub polarity: Polarity,
    pub box_thickness: u32,
}

impl Default for TrackingParams {
    fn default() -> Self {
        // worm ~150x15 = 2250 pixels^2
        Self {
            threshold: 30,
            dilation_iterations: 3,
            min_area: 500.0,
            max_area: 3000.0,
            polarity: Polarity::Dark,
            box_thickness: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapParams {
    pub cell_size: u32,
    pub render_frames: bool,
}

impl Default for HeatmapParams {
    fn default() -> Self {
        Self {
            cell_size: 16,
            render_frames: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    pub output: String,
    pub scale: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            output: "video/tracker.gif".to_string(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticParams {
    pub width: u32,
    pub height: u32,
    pub frames: u32,
    pub seed: u64,
    pub worm_length: u32,
    pub worm_thickness: u32,
    pub background: u8,
    pub worm_intensity: u8,
    pub noise: u8,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            frames: 60,
            seed: 7,
            worm_length: 90,
            worm_thickness: 8,
            background: 180,
            worm_intensity: 15,
            noise: 20,
        }
    }
}

/// Frames read by a render pass for one frame number.
#[derive(Debug, Clone)]
pub struct RenderInput {
    pub primary: DynamicImage,
    pub secondary: Option<DynamicImage>,
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: DynamicImage,
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone)]
pub struct PassReport {
    pub kind: FrameKind,
    pub frames_rendered: u64,
    pub outputs: Vec<PathBuf>,
    pub detections: Vec<Detection>,
    pub elapsed: Duration,
    pub fps: f64,
    pub finished_at: DateTime<Utc>,
}
