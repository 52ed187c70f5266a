use crate::domain::model::{
    AnimationParams, FrameKind, FrameSettings, HeatmapParams, OutputFormat, RenderInput,
    RenderOutput, SyntheticParams, ThresholdParams, TrackingParams,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;

pub trait FrameStore: Send + Sync {
    fn read_frame(
        &self,
        frame: u32,
        kind: FrameKind,
    ) -> impl std::future::Future<Output = Result<DynamicImage>> + Send;

    fn write_frame(
        &self,
        frame: u32,
        kind: FrameKind,
        image: &DynamicImage,
        format: OutputFormat,
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;

    fn frame_exists(
        &self,
        frame: u32,
        kind: FrameKind,
    ) -> impl std::future::Future<Output = bool> + Send;

    fn read_artifact(&self, name: &str)
        -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    fn write_artifact(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_root(&self) -> &str;
    fn output_format(&self) -> OutputFormat;
    fn frames(&self) -> &FrameSettings;
    fn threshold(&self) -> &ThresholdParams;
    fn tracking(&self) -> &TrackingParams;
    fn heatmap(&self) -> &HeatmapParams;
    fn animation(&self) -> &AnimationParams;
    fn synthetic(&self) -> &SyntheticParams;
    fn monitoring_enabled(&self) -> bool;
}

/// A per-frame filter whose output is pre-rendered to disk.
#[async_trait]
pub trait RenderPass: Send + Sync {
    fn kind(&self) -> FrameKind;
    async fn extract(&self, frame: u32) -> Result<RenderInput>;
    async fn transform(&self, frame: u32, input: RenderInput) -> Result<RenderOutput>;
    async fn load(&self, frame: u32, output: &RenderOutput) -> Result<PathBuf>;
}
