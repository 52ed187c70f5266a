use crate::core::RenderPass;
use crate::domain::model::{FrameRange, PassReport};
use crate::utils::error::Result;
use crate::utils::monitor::{FrameRateMeter, SystemMonitor};

/// Runs a render pass over every frame of a range, in order.
pub struct PreRenderEngine<P: RenderPass> {
    pass: P,
    range: FrameRange,
    monitor: SystemMonitor,
}

impl<P: RenderPass> PreRenderEngine<P> {
    pub fn new(pass: P, range: FrameRange) -> Self {
        Self::new_with_monitoring(pass, range, false)
    }

    pub fn new_with_monitoring(pass: P, range: FrameRange, monitor_enabled: bool) -> Self {
        Self {
            pass,
            range,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pass(&self) -> &P {
        &self.pass
    }

    pub async fn run(&self) -> Result<PassReport> {
        let kind = self.pass.kind();
        tracing::info!(">>> PRE-RENDERING {} IMAGES STARTING <<<", kind.as_str().to_uppercase());
        self.monitor.log_stats("Start");

        let mut meter = FrameRateMeter::start(kind.as_str());
        let mut outputs = Vec::new();
        let mut detections = Vec::new();

        for frame in self.range.frames() {
            tracing::info!(
                "{} rendering progress: {}/{} frames",
                kind,
                frame,
                self.range.end
            );

            let input = self.pass.extract(frame).await?;
            let output = self.pass.transform(frame, input).await?;
            let path = self.pass.load(frame, &output).await?;

            tracing::debug!("Frame {} written to {}", frame, path.display());
            outputs.push(path);
            detections.extend(output.detections);
            meter.tick();
        }

        self.monitor.log_stats(&format!("{} complete", kind));
        tracing::info!(">>> PRE-RENDERING {} IMAGES COMPLETE <<<", kind.as_str().to_uppercase());

        Ok(PassReport {
            kind,
            frames_rendered: meter.frames(),
            outputs,
            detections,
            elapsed: meter.elapsed(),
            fps: meter.fps(),
            finished_at: chrono::Utc::now(),
        })
    }
}
