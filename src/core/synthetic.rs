//! Synthetic raw frames: a dark worm wriggling along a Lissajous path over a
//! noisy bright background. Deterministic for a given seed.

use crate::domain::model::SyntheticParams;
use crate::utils::error::{EleganceError, Result};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, TAU};

pub const GROUND_TRUTH_ARTIFACT: &str = "synthetic/ground_truth.csv";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub frame: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    pub frame: u32,
    pub image: GrayImage,
    pub truth: GroundTruth,
}

#[derive(Debug, Clone)]
pub struct SyntheticWormGenerator {
    params: SyntheticParams,
}

impl SyntheticWormGenerator {
    pub fn new(params: SyntheticParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SyntheticParams {
        &self.params
    }

    fn margin(&self) -> f64 {
        self.params.worm_length as f64 / 2.0 + self.params.worm_thickness as f64 * 1.5 + 2.0
    }

    fn phase(&self, frame: u32) -> f64 {
        (frame.saturating_sub(1)) as f64 / self.params.frames.max(1) as f64
    }

    /// Centre of the worm in frame `frame` (numbered from 1).
    pub fn center_at(&self, frame: u32) -> (f64, f64) {
        let t = self.phase(frame);
        let (w, h) = (self.params.width as f64, self.params.height as f64);
        let ax = (w / 2.0 - self.margin()).max(0.0);
        let ay = (h / 2.0 - self.margin()).max(0.0);
        (
            w / 2.0 + ax * (TAU * t).sin(),
            h / 2.0 + ay * (2.0 * TAU * t + FRAC_PI_4).sin(),
        )
    }

    fn heading_at(&self, frame: u32) -> f64 {
        let t = self.phase(frame);
        let (w, h) = (self.params.width as f64, self.params.height as f64);
        let ax = (w / 2.0 - self.margin()).max(0.0);
        let ay = (h / 2.0 - self.margin()).max(0.0);
        let dx = ax * TAU * (TAU * t).cos();
        let dy = ay * 2.0 * TAU * (2.0 * TAU * t + FRAC_PI_4).cos();
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            0.0
        } else {
            dy.atan2(dx)
        }
    }

    /// Points along the body centreline, head to tail.
    fn centreline(&self, frame: u32) -> Vec<(f64, f64)> {
        let (cx, cy) = self.center_at(frame);
        let heading = self.heading_at(frame);
        let (along_x, along_y) = (heading.cos(), heading.sin());
        let (normal_x, normal_y) = (-along_y, along_x);

        let length = self.params.worm_length as f64;
        let amplitude = self.params.worm_thickness as f64 * 0.8;
        let undulation = frame as f64 * 0.6;

        (0..=self.params.worm_length)
            .map(|s| {
                let s = s as f64;
                let u = s - length / 2.0;
                let offset = amplitude * (TAU * 0.75 * s / length.max(1.0) + undulation).sin();
                (
                    cx + u * along_x + offset * normal_x,
                    cy + u * along_y + offset * normal_y,
                )
            })
            .collect()
    }

    pub fn render(&self, frame: u32, rng: &mut StdRng) -> SyntheticFrame {
        let p = &self.params;
        let noise = p.noise as i16;

        let mut image = GrayImage::from_fn(p.width, p.height, |_, _| {
            let jitter = if noise > 0 {
                rng.gen_range(-noise..=noise)
            } else {
                0
            };
            Luma([(p.background as i16 + jitter).clamp(0, 255) as u8])
        });

        let radius = p.worm_thickness as f64 / 2.0;
        let reach = radius.ceil() as i64;
        for (px, py) in self.centreline(frame) {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    if ((dx * dx + dy * dy) as f64).sqrt() > radius {
                        continue;
                    }
                    let (x, y) = (px.round() as i64 + dx, py.round() as i64 + dy);
                    if x < 0 || y < 0 || x >= p.width as i64 || y >= p.height as i64 {
                        continue;
                    }
                    let shade = if noise > 0 {
                        rng.gen_range(0..=(p.noise / 4))
                    } else {
                        0
                    };
                    let value = p.worm_intensity.saturating_add(shade);
                    image.put_pixel(x as u32, y as u32, Luma([value]));
                }
            }
        }

        let (x, y) = self.center_at(frame);
        SyntheticFrame {
            frame,
            image,
            truth: GroundTruth { frame, x, y },
        }
    }

    pub fn frames(&self) -> SyntheticFrames<'_> {
        SyntheticFrames {
            generator: self,
            rng: StdRng::seed_from_u64(self.params.seed),
            next: 1,
        }
    }
}

/// Frames `1..=frames`, rendered lazily from one seeded generator.
pub struct SyntheticFrames<'a> {
    generator: &'a SyntheticWormGenerator,
    rng: StdRng,
    next: u32,
}

impl Iterator for SyntheticFrames<'_> {
    type Item = SyntheticFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.generator.params.frames {
            return None;
        }
        let frame = self.generator.render(self.next, &mut self.rng);
        self.next += 1;
        Some(frame)
    }
}

pub fn ground_truth_csv(truths: &[GroundTruth]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for truth in truths {
        writer.serialize(truth)?;
    }
    writer
        .into_inner()
        .map_err(|e| EleganceError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracker::WormTracker;
    use crate::domain::model::TrackingParams;
    use image::DynamicImage;

    fn small_params() -> SyntheticParams {
        SyntheticParams {
            frames: 6,
            ..SyntheticParams::default()
        }
    }

    #[test]
    fn test_same_seed_same_frames() {
        let generator = SyntheticWormGenerator::new(small_params());
        let a: Vec<_> = generator.frames().map(|f| f.image).collect();
        let b: Vec<_> = generator.frames().map(|f| f.image).collect();
        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
    }

    #[test]
    fn test_worm_stays_inside_frame() {
        let generator = SyntheticWormGenerator::new(SyntheticParams::default());
        for frame in 1..=generator.params().frames {
            let (x, y) = generator.center_at(frame);
            assert!(x > 45.0 && x < 275.0, "x = {}", x);
            assert!(y > 45.0 && y < 195.0, "y = {}", y);
        }
    }

    #[test]
    fn test_tracker_finds_synthetic_worm() {
        let generator = SyntheticWormGenerator::new(small_params());
        let tracker = WormTracker::new(TrackingParams::default());

        for frame in generator.frames() {
            let result = tracker.track(frame.frame, &DynamicImage::ImageLuma8(frame.image));
            assert_eq!(result.detections.len(), 1, "frame {}", frame.frame);
            let d = &result.detections[0];
            assert!((d.x - frame.truth.x).abs() < 15.0);
            assert!((d.y - frame.truth.y).abs() < 15.0);
        }
    }

    #[test]
    fn test_ground_truth_csv_header() {
        let csv = ground_truth_csv(&[GroundTruth {
            frame: 1,
            x: 2.0,
            y: 3.0,
        }])
        .unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("frame,x,y\n"));
    }
}
