mod common;

use common::{count_files, TestEnv};
use elegance::core::heatmap::HeatmapSummary;
use elegance::core::trajectory::{Trajectory, TRAJECTORY_ARTIFACT};
use elegance::domain::model::{FrameKind, OutputFormat};
use elegance::domain::ports::FrameStore;
use elegance::utils::error::{EleganceError, ErrorCategory};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GrayImage, Luma};
use std::fs;

#[tokio::test]
async fn test_end_to_end_run_on_synthetic_frames() {
    let env = TestEnv::new();
    let controller = env.controller();

    let generated = controller.generate().await.unwrap();
    assert_eq!(generated.frames, 6);
    assert!(generated.ground_truth.exists());
    assert!(env.image("raw", 6, "png").exists());

    let summary = controller.run_all().await.unwrap();

    // Passes run in order and each renders the whole range
    let kinds: Vec<FrameKind> = summary.passes.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![FrameKind::Otsu, FrameKind::Difference, FrameKind::Track]
    );
    for report in &summary.passes {
        assert_eq!(report.frames_rendered, 5);
        assert_eq!(report.outputs.len(), 5);
    }
    for kind in ["otsu", "difference", "track", "heat"] {
        assert_eq!(count_files(&env.root.join("images").join(kind)), 5, "{}", kind);
        assert!(env.image(kind, 1, "png").exists());
    }

    // One detection per frame is carried into the trajectory
    let trajectory =
        Trajectory::from_csv(&fs::read(env.artifact("tracking/trajectory.csv")).unwrap()).unwrap();
    assert_eq!(trajectory.len(), 5);
    assert_eq!(
        trajectory.points().iter().map(|p| p.frame).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );

    // Heat map totals follow the frame interval
    let json = fs::read(env.artifact("heatmap/summary.json")).unwrap();
    let heat: HeatmapSummary = serde_json::from_slice(&json).unwrap();
    assert_eq!(heat.total_points, 5);
    assert_eq!(heat.total_duration_ms, 5 * 40);
    assert_eq!(heat.columns, 20);
    assert_eq!(heat.rows, 15);
    assert_eq!(heat, summary.heatmap.summary);
    assert!(env.artifact("heatmap/duration.png").exists());
    assert!(env.artifact("heatmap/visits.png").exists());

    // 2x2 grid of quarter-size panels, delay = interval x speed factor
    assert_eq!(summary.animation, env.artifact("video/tracker.gif"));
    let gif = fs::read(&summary.animation).unwrap();
    let frames = GifDecoder::new(std::io::Cursor::new(gif))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 5);
    assert_eq!(frames[0].buffer().dimensions(), (160, 120));
    assert_eq!(
        std::time::Duration::from(frames[0].delay()),
        std::time::Duration::from_millis(80)
    );
}

#[tokio::test]
async fn test_prerender_without_raw_frames_reports_missing_frame() {
    let env = TestEnv::new();
    let controller = env.controller();

    let err = controller.prerender(FrameKind::Otsu).await.unwrap_err();
    assert!(matches!(err, EleganceError::FrameNotFound { frame: 1, .. }));
    assert_eq!(err.category(), ErrorCategory::Input);
    assert!(err.recovery_suggestion().contains("elegance generate"));
}

#[tokio::test]
async fn test_heatmap_requires_trajectory() {
    let env = TestEnv::new();
    let controller = env.controller();
    controller.generate().await.unwrap();

    let err = controller.build_heatmaps().await.unwrap_err();
    assert!(matches!(err, EleganceError::ProcessingError { .. }));
    assert!(err.to_string().contains("prerender"));
}

#[tokio::test]
async fn test_raw_and_heat_are_not_prerender_passes() {
    let env = TestEnv::new();
    let controller = env.controller();

    for kind in [FrameKind::Raw, FrameKind::Heat] {
        let err = controller.prerender(kind).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}

#[tokio::test]
async fn test_animation_tolerates_missing_derived_frames() {
    let env = TestEnv::new();
    let controller = env.controller();
    controller.generate().await.unwrap();

    let path = controller.animate_to("video/raw_only.gif").await.unwrap();
    assert_eq!(path, env.artifact("video/raw_only.gif"));
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

/// Raw frame 1 (32x16, two 16 px cells) and a trajectory visiting the left
/// cell in frame 1 and the right cell in frame 3.
async fn two_cell_fixture(env: &TestEnv) {
    let store = env.store();
    let raw = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 16, Luma([180])));
    store
        .write_frame(1, FrameKind::Raw, &raw, OutputFormat::Png)
        .await
        .unwrap();
    let csv = "frame,x,y,width,height,area\n1,2.0,2.0,4,4,600.0\n3,20.0,2.0,4,4,600.0\n";
    store
        .write_artifact(TRAJECTORY_ARTIFACT, csv.as_bytes())
        .await
        .unwrap();
}

fn heat_pixel(env: &TestEnv, frame: u32, x: u32, y: u32) -> [u8; 3] {
    image::open(env.image("heat", frame, "png"))
        .unwrap()
        .to_rgb8()
        .get_pixel(x, y)
        .0
}

#[tokio::test]
async fn test_heat_frames_accumulate_up_to_their_frame() {
    let env = TestEnv::new();
    two_cell_fixture(&env).await;

    let mut config = env.config();
    config.frames.end = 3;
    let report = env.controller_with(config).build_heatmaps().await.unwrap();
    assert_eq!(report.frames_rendered, 3);

    // frames 1 and 2 only know the first point
    for frame in [1, 2] {
        assert_eq!(heat_pixel(&env, frame, 2, 2), [255, 255, 255], "frame {}", frame);
        assert_eq!(heat_pixel(&env, frame, 20, 2), [0, 0, 0], "frame {}", frame);
    }
    // frame 3 includes its own point
    assert_eq!(heat_pixel(&env, 3, 2, 2), [255, 255, 255]);
    assert_eq!(heat_pixel(&env, 3, 20, 2), [255, 255, 255]);

    assert_eq!(report.summary.total_points, 2);
    assert_eq!(report.summary.total_duration_ms, 2 * 40);
}

#[tokio::test]
async fn test_heat_frames_can_be_disabled() {
    let env = TestEnv::new();
    two_cell_fixture(&env).await;

    let mut config = env.config();
    config.frames.end = 3;
    config.heatmap.render_frames = false;
    let report = env.controller_with(config).build_heatmaps().await.unwrap();

    assert_eq!(report.frames_rendered, 0);
    assert!(!env.root.join("images").join("heat").exists());
    assert!(env.artifact("heatmap/duration.png").exists());
    assert!(env.artifact("heatmap/visits.png").exists());
    assert_eq!(report.summary.total_points, 2);
}
