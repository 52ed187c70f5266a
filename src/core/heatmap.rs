//! Time-duration and visit-count heat maps over a grid of square cells.

use crate::core::trajectory::Trajectory;
use crate::domain::model::TrackPoint;
use chrono::{DateTime, Utc};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

pub const SUMMARY_ARTIFACT: &str = "heatmap/summary.json";
pub const DURATION_ARTIFACT: &str = "heatmap/duration.png";
pub const VISITS_ARTIFACT: &str = "heatmap/visits.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatMetric {
    /// Milliseconds spent in a cell.
    Duration,
    /// Number of times the worm entered a cell.
    Visits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    pub column: u32,
    pub row: u32,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSummary {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: u32,
    pub interval_ms: u64,
    pub total_points: u64,
    pub total_duration_ms: u64,
    pub total_visits: u64,
    pub hottest_duration: Option<CellValue>,
    pub hottest_visits: Option<CellValue>,
    pub durations_ms: Vec<Vec<u64>>,
    pub visits: Vec<Vec<u64>>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HeatMap {
    frame_width: u32,
    frame_height: u32,
    cell_size: u32,
    columns: u32,
    rows: u32,
    interval_ms: u64,
    durations: Vec<u64>,
    visits: Vec<u64>,
    points: u64,
    last: Option<(u32, usize)>,
}

impl HeatMap {
    pub fn new(frame_width: u32, frame_height: u32, cell_size: u32, interval_ms: u64) -> Self {
        let cell_size = cell_size.max(1);
        let columns = frame_width.div_ceil(cell_size);
        let rows = frame_height.div_ceil(cell_size);
        let cells = (columns * rows) as usize;
        Self {
            frame_width,
            frame_height,
            cell_size,
            columns,
            rows,
            interval_ms,
            durations: vec![0; cells],
            visits: vec![0; cells],
            points: 0,
            last: None,
        }
    }

    pub fn from_trajectory(
        trajectory: &Trajectory,
        frame_width: u32,
        frame_height: u32,
        cell_size: u32,
        interval_ms: u64,
    ) -> Self {
        let mut map = Self::new(frame_width, frame_height, cell_size, interval_ms);
        for point in trajectory.points() {
            map.record(point);
        }
        map
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_of(&self, x: f64, y: f64) -> Option<usize> {
        if !(x >= 0.0 && y >= 0.0 && x < self.frame_width as f64 && y < self.frame_height as f64) {
            return None;
        }
        let column = (x as u32) / self.cell_size;
        let row = (y as u32) / self.cell_size;
        Some((row * self.columns + column) as usize)
    }

    /// Points must arrive in frame order; a skipped frame counts as leaving.
    pub fn record(&mut self, point: &TrackPoint) {
        let Some(cell) = self.cell_of(point.x, point.y) else {
            self.last = None;
            return;
        };

        let continues = matches!(
            self.last,
            Some((frame, last_cell)) if point.frame == frame + 1 && last_cell == cell
        );
        if !continues {
            self.visits[cell] = self.visits[cell].saturating_add(1);
        }

        self.durations[cell] = self.durations[cell].saturating_add(self.interval_ms);
        self.points += 1;
        self.last = Some((point.frame, cell));
    }

    fn values(&self, metric: HeatMetric) -> &[u64] {
        match metric {
            HeatMetric::Duration => &self.durations,
            HeatMetric::Visits => &self.visits,
        }
    }

    pub fn value(&self, metric: HeatMetric, column: u32, row: u32) -> u64 {
        if column >= self.columns || row >= self.rows {
            return 0;
        }
        self.values(metric)[(row * self.columns + column) as usize]
    }

    pub fn max(&self, metric: HeatMetric) -> u64 {
        self.values(metric).iter().copied().max().unwrap_or(0)
    }

    /// First cell in raster order holding the maximum, if any cell is non-zero.
    pub fn hottest(&self, metric: HeatMetric) -> Option<CellValue> {
        let max = self.max(metric);
        if max == 0 {
            return None;
        }
        let index = self.values(metric).iter().position(|v| *v == max)? as u32;
        Some(CellValue {
            column: index % self.columns,
            row: index / self.columns,
            value: max,
        })
    }

    /// Frame-sized image, each pixel coloured by its cell's normalised value.
    pub fn render(&self, metric: HeatMetric) -> RgbImage {
        let max = self.max(metric);
        RgbImage::from_fn(self.frame_width, self.frame_height, |x, y| {
            let value = self.value(metric, x / self.cell_size, y / self.cell_size);
            if max == 0 {
                Rgb([0, 0, 0])
            } else {
                hot_colormap(value as f64 / max as f64)
            }
        })
    }

    fn matrix(&self, metric: HeatMetric) -> Vec<Vec<u64>> {
        self.values(metric)
            .chunks(self.columns.max(1) as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    pub fn summary(&self) -> HeatmapSummary {
        HeatmapSummary {
            columns: self.columns,
            rows: self.rows,
            cell_size: self.cell_size,
            interval_ms: self.interval_ms,
            total_points: self.points,
            total_duration_ms: saturating_total(&self.durations),
            total_visits: saturating_total(&self.visits),
            hottest_duration: self.hottest(HeatMetric::Duration),
            hottest_visits: self.hottest(HeatMetric::Visits),
            durations_ms: self.matrix(HeatMetric::Duration),
            visits: self.matrix(HeatMetric::Visits),
            generated_at: Utc::now(),
        }
    }
}

fn saturating_total(values: &[u64]) -> u64 {
    values.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
}

/// Black → red → yellow → white for `t` in `[0, 1]`.
pub fn hot_colormap(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0) * 3.0;
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(t), channel(t - 1.0), channel(t - 2.0)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(frame: u32, x: f64, y: f64) -> TrackPoint {
        TrackPoint {
            frame,
            x,
            y,
            width: 10,
            height: 10,
            area: 600.0,
        }
    }

    #[test]
    fn test_grid_covers_partial_cells() {
        let map = HeatMap::new(100, 50, 16, 100);
        assert_eq!(map.columns(), 7);
        assert_eq!(map.rows(), 4);
        assert_eq!(map.cell_of(99.9, 49.0), Some(3 * 7 + 6));
        assert_eq!(map.cell_of(100.0, 10.0), None);
        assert_eq!(map.cell_of(-1.0, 10.0), None);
    }

    #[test]
    fn test_duration_and_visits() {
        let mut map = HeatMap::new(64, 64, 16, 100);
        // stays in cell (0,0) for three frames, moves to (1,0), comes back
        for p in [
            point(1, 2.0, 2.0),
            point(2, 5.0, 3.0),
            point(3, 8.0, 8.0),
            point(4, 20.0, 8.0),
            point(5, 4.0, 4.0),
        ] {
            map.record(&p);
        }

        assert_eq!(map.value(HeatMetric::Duration, 0, 0), 400);
        assert_eq!(map.value(HeatMetric::Visits, 0, 0), 2);
        assert_eq!(map.value(HeatMetric::Duration, 1, 0), 100);
        assert_eq!(map.value(HeatMetric::Visits, 1, 0), 1);

        let hottest = map.hottest(HeatMetric::Duration).unwrap();
        assert_eq!((hottest.column, hottest.row, hottest.value), (0, 0, 400));
    }

    #[test]
    fn test_gap_in_frames_starts_new_visit() {
        let mut map = HeatMap::new(32, 32, 16, 50);
        map.record(&point(1, 1.0, 1.0));
        map.record(&point(4, 2.0, 2.0));
        assert_eq!(map.value(HeatMetric::Visits, 0, 0), 2);
        assert_eq!(map.value(HeatMetric::Duration, 0, 0), 100);
    }

    #[test]
    fn test_points_outside_frame_are_ignored() {
        let mut map = HeatMap::new(32, 32, 16, 50);
        map.record(&point(1, 1.0, 1.0));
        map.record(&point(2, 500.0, 1.0));
        map.record(&point(3, 1.0, 1.0));

        let summary = map.summary();
        assert_eq!(summary.total_points, 2);
        assert_eq!(summary.total_visits, 2);
        assert_eq!(summary.durations_ms.len(), 2);
        assert_eq!(summary.durations_ms[0], vec![100, 0]);
    }

    #[test]
    fn test_empty_map_renders_black() {
        let map = HeatMap::new(20, 10, 4, 100);
        let image = map.render(HeatMetric::Visits);
        assert_eq!(image.dimensions(), (20, 10));
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0]));
        assert!(map.hottest(HeatMetric::Visits).is_none());
    }

    #[test]
    fn test_render_marks_hottest_cell_white() {
        let mut map = HeatMap::new(32, 16, 16, 100);
        map.record(&point(1, 20.0, 5.0));
        let image = map.render(HeatMetric::Duration);
        assert_eq!(image.get_pixel(31, 15).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_huge_interval_saturates() {
        let mut map = HeatMap::new(16, 16, 16, u64::MAX / 2 + 1);
        for frame in 1..=3 {
            map.record(&point(frame, 1.0, 1.0));
        }
        assert_eq!(map.value(HeatMetric::Duration, 0, 0), u64::MAX);
        assert_eq!(map.summary().total_duration_ms, u64::MAX);
    }

    #[test]
    fn test_hot_colormap_endpoints() {
        assert_eq!(hot_colormap(0.0).0, [0, 0, 0]);
        assert_eq!(hot_colormap(1.0).0, [255, 255, 255]);
        assert_eq!(hot_colormap(1.0 / 3.0).0, [255, 0, 0]);
        assert_eq!(hot_colormap(2.0).0, [255, 255, 255]);
    }
}
