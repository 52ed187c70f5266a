use crate::app::passes::{DifferencePass, OtsuPass, TrackingPass};
use crate::core::animation::AnimationComposer;
use crate::core::engine::PreRenderEngine;
use crate::core::heatmap::{
    HeatMap, HeatMetric, HeatmapSummary, DURATION_ARTIFACT, SUMMARY_ARTIFACT, VISITS_ARTIFACT,
};
use crate::core::synthetic::{ground_truth_csv, SyntheticWormGenerator, GROUND_TRUTH_ARTIFACT};
use crate::core::trajectory::{Trajectory, TRAJECTORY_ARTIFACT};
use crate::core::{ConfigProvider, FrameKind, FrameStore, PassReport, RenderPass};
use crate::domain::model::OutputFormat;
use crate::utils::error::{EleganceError, Result};
use crate::utils::monitor::SystemMonitor;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;

/// Kinds produced by `prerender_all`, in run order.
pub const PRERENDER_ORDER: [FrameKind; 3] =
    [FrameKind::Otsu, FrameKind::Difference, FrameKind::Track];

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub frames: u32,
    pub ground_truth: PathBuf,
}

#[derive(Debug, Clone)]
pub struct HeatmapReport {
    pub summary: HeatmapSummary,
    pub outputs: Vec<PathBuf>,
    pub frames_rendered: u32,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub passes: Vec<PassReport>,
    pub heatmap: HeatmapReport,
    pub animation: PathBuf,
}

/// Coordinates the frame store with the filtering, heat map and animation
/// stages.
pub struct Controller<S: FrameStore + Clone, C: ConfigProvider> {
    store: S,
    config: C,
    monitor: SystemMonitor,
}

impl<S: FrameStore + Clone, C: ConfigProvider> Controller<S, C> {
    pub fn new(store: S, config: C) -> Self {
        let monitor = SystemMonitor::new(config.monitoring_enabled());
        Self {
            store,
            config,
            monitor,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes a synthetic raw sequence and its ground truth.
    pub async fn generate(&self) -> Result<GenerateReport> {
        let generator = SyntheticWormGenerator::new(*self.config.synthetic());
        tracing::info!(
            ">>> GENERATING {} SYNTHETIC FRAMES ({}x{}) <<<",
            generator.params().frames,
            generator.params().width,
            generator.params().height
        );

        let mut truths = Vec::new();
        for frame in generator.frames() {
            // Raw data stays lossless regardless of the output format.
            self.store
                .write_frame(
                    frame.frame,
                    FrameKind::Raw,
                    &DynamicImage::ImageLuma8(frame.image),
                    OutputFormat::Png,
                )
                .await?;
            truths.push(frame.truth);
        }

        let ground_truth = self
            .store
            .write_artifact(GROUND_TRUTH_ARTIFACT, &ground_truth_csv(&truths)?)
            .await?;
        self.monitor.log_stats("Synthetic frames generated");

        Ok(GenerateReport {
            frames: truths.len() as u32,
            ground_truth,
        })
    }

    async fn run_pass<P: RenderPass>(&self, pass: P) -> Result<PassReport> {
        let engine = PreRenderEngine::new_with_monitoring(
            pass,
            self.config.frames().range(),
            self.config.monitoring_enabled(),
        );
        let report = engine.run().await?;
        tracing::info!(
            "{} pass: {} frames in {:.2?} ({:.2} fps)",
            report.kind,
            report.frames_rendered,
            report.elapsed,
            report.fps
        );
        Ok(report)
    }

    pub async fn prerender(&self, kind: FrameKind) -> Result<PassReport> {
        let format = self.config.output_format();
        match kind {
            FrameKind::Otsu => {
                let pass = OtsuPass::new(self.store.clone(), *self.config.threshold(), format);
                self.run_pass(pass).await
            }
            FrameKind::Difference => {
                let range = self.config.frames().range();
                let pass = DifferencePass::new(self.store.clone(), range, format);
                self.run_pass(pass).await
            }
            FrameKind::Track => {
                let pass = TrackingPass::new(self.store.clone(), *self.config.tracking(), format);
                let report = self.run_pass(pass).await?;

                let trajectory = Trajectory::from_detections(&report.detections);
                let path = self
                    .store
                    .write_artifact(TRAJECTORY_ARTIFACT, &trajectory.to_csv()?)
                    .await?;
                tracing::info!(
                    "Worm found in {}/{} frames, trajectory saved to {}",
                    trajectory.len(),
                    report.frames_rendered,
                    path.display()
                );
                Ok(report)
            }
            FrameKind::Raw | FrameKind::Heat => Err(EleganceError::config(format!(
                "'{}' frames are not produced by a pre-render pass",
                kind
            ))),
        }
    }

    pub async fn prerender_all(&self) -> Result<Vec<PassReport>> {
        let mut reports = Vec::with_capacity(PRERENDER_ORDER.len());
        for kind in PRERENDER_ORDER {
            reports.push(self.prerender(kind).await?);
        }
        Ok(reports)
    }

    /// Builds heat maps from the saved trajectory.
    pub async fn build_heatmaps(&self) -> Result<HeatmapReport> {
        let frames = *self.config.frames();
        let params = *self.config.heatmap();
        let range = frames.range();

        let data = self
            .store
            .read_artifact(TRAJECTORY_ARTIFACT)
            .await
            .map_err(|e| match e {
                EleganceError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    EleganceError::processing(format!(
                        "no trajectory at {}, run `elegance prerender --only track` first",
                        TRAJECTORY_ARTIFACT
                    ))
                }
                other => other,
            })?;
        let trajectory = Trajectory::from_csv(&data)?;
        if trajectory.is_empty() {
            tracing::warn!("Trajectory is empty, heat maps will be blank");
        }

        let reference = self.store.read_frame(range.start, FrameKind::Raw).await?;
        let mut map = HeatMap::new(
            reference.width(),
            reference.height(),
            params.cell_size,
            frames.interval_ms,
        );

        tracing::info!(">>> RENDERING HEAT MAPS STARTING <<<");
        let mut points = trajectory
            .points()
            .iter()
            .filter(|p| p.frame >= range.start && p.frame <= range.end)
            .peekable();
        let mut frames_rendered = 0;

        for frame in range.frames() {
            while let Some(point) = points.next_if(|p| p.frame <= frame) {
                map.record(point);
            }
            if params.render_frames {
                tracing::debug!("Heat rendering progress: {}/{} frames", frame, range.end);
                let image = DynamicImage::ImageRgb8(map.render(HeatMetric::Duration));
                self.store
                    .write_frame(frame, FrameKind::Heat, &image, self.config.output_format())
                    .await?;
                frames_rendered += 1;
            }
        }

        let summary = map.summary();
        let outputs = vec![
            self.store
                .write_artifact(DURATION_ARTIFACT, &encode_png(map.render(HeatMetric::Duration))?)
                .await?,
            self.store
                .write_artifact(VISITS_ARTIFACT, &encode_png(map.render(HeatMetric::Visits))?)
                .await?,
            self.store
                .write_artifact(SUMMARY_ARTIFACT, &serde_json::to_vec_pretty(&summary)?)
                .await?,
        ];
        self.monitor.log_stats("Heat maps complete");
        tracing::info!(">>> RENDERING HEAT MAPS COMPLETE <<<");

        Ok(HeatmapReport {
            summary,
            outputs,
            frames_rendered,
        })
    }

    pub async fn animate(&self) -> Result<PathBuf> {
        self.animate_to(&self.config.animation().output).await
    }

    pub async fn animate_to(&self, output: &str) -> Result<PathBuf> {
        let frames = self.config.frames();
        let composer = AnimationComposer::new(
            &self.store,
            self.config.animation().clone(),
            frames.frame_delay_ms(),
        );
        let gif = composer.render_gif(frames.range()).await?;
        let path = self.store.write_artifact(output, &gif).await?;
        self.monitor.log_stats("Animation complete");
        Ok(path)
    }

    pub async fn run_all(&self) -> Result<RunSummary> {
        let passes = self.prerender_all().await?;
        let heatmap = self.build_heatmaps().await?;
        let animation = self.animate().await?;
        self.monitor.log_final_stats();

        Ok(RunSummary {
            passes,
            heatmap,
            animation,
        })
    }
}

fn encode_png(image: RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
