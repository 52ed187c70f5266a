use crate::domain::model::{Detection, TrackPoint};
use crate::utils::error::{EleganceError, Result};
use std::collections::BTreeMap;

pub const TRAJECTORY_ARTIFACT: &str = "tracking/trajectory.csv";

/// Worm positions ordered by frame, at most one per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<TrackPoint>,
}

impl Trajectory {
    /// Keeps the largest detection of each frame as the worm.
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut best: BTreeMap<u32, &Detection> = BTreeMap::new();
        for detection in detections {
            best.entry(detection.frame)
                .and_modify(|current| {
                    if detection.area > current.area {
                        *current = detection;
                    }
                })
                .or_insert(detection);
        }

        Self {
            points: best.values().map(|d| TrackPoint::from(*d)).collect(),
        }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for point in &self.points {
            writer.serialize(point)?;
        }
        writer
            .into_inner()
            .map_err(|e| EleganceError::IoError(e.into_error()))
    }

    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data);
        let mut points = Vec::new();
        for row in reader.deserialize() {
            let point: TrackPoint = row?;
            points.push(point);
        }
        points.sort_by_key(|p| p.frame);
        Ok(Self { points })
    }
}
