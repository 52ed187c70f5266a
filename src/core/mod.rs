pub mod animation;
pub mod contour;
pub mod engine;
pub mod filter;
pub mod heatmap;
pub mod synthetic;
pub mod tracker;
pub mod trajectory;

pub use crate::domain::model::{
    Detection, FrameKind, FrameRange, PassReport, RenderInput, RenderOutput, TrackPoint,
};
pub use crate::domain::ports::{ConfigProvider, FrameStore, RenderPass};
pub use crate::utils::error::Result;
