use crate::core::contour::find_contours;
use crate::core::filter::{dilate, draw_rectangle, threshold_binary, threshold_binary_inv, to_gray};
use crate::domain::model::{Detection, Polarity, TrackingParams};
use image::{DynamicImage, GrayImage};

const WHITE: u8 = 255;

/// Finds worm-sized blobs in a frame and boxes them.
#[derive(Debug, Clone)]
pub struct WormTracker {
    params: TrackingParams,
}

#[derive(Debug, Clone)]
pub struct TrackingResult {
    /// Grayscale frame with a white box around each detection.
    pub annotated: GrayImage,
    pub mask: GrayImage,
    pub detections: Vec<Detection>,
}

impl WormTracker {
    pub fn new(params: TrackingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrackingParams {
        &self.params
    }

    /// Binary image where worm pixels are white, grown by the configured
    /// number of dilations to join broken body segments.
    pub fn worm_mask(&self, gray: &GrayImage) -> GrayImage {
        let binary = match self.params.polarity {
            Polarity::Dark => threshold_binary_inv(gray, self.params.threshold, WHITE),
            Polarity::Bright => threshold_binary(gray, self.params.threshold, WHITE),
        };
        dilate(&binary, self.params.dilation_iterations)
    }

    pub fn track(&self, frame: u32, image: &DynamicImage) -> TrackingResult {
        let mut annotated = to_gray(image);
        let mask = self.worm_mask(&annotated);

        let mut detections = Vec::new();
        for contour in find_contours(&mask) {
            let area = contour.area();
            if !(area > self.params.min_area && area < self.params.max_area) {
                continue;
            }

            let bbox = contour.bounding_rect();
            draw_rectangle(&mut annotated, &bbox, WHITE, self.params.box_thickness);
            tracing::trace!(
                "Frame {}: contour at ({} {}) ({} {}), area {}",
                frame,
                bbox.x,
                bbox.y,
                bbox.width,
                bbox.height,
                area
            );

            let (x, y) = bbox.center();
            detections.push(Detection {
                frame,
                bbox,
                area,
                x,
                y,
            });
        }

        TrackingResult {
            annotated,
            mask,
            detections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn frame_with_blob(x: u32, y: u32, w: u32, h: u32, value: u8) -> DynamicImage {
        let mut gray = GrayImage::from_pixel(200, 120, Luma([180]));
        for yy in y..y + h {
            for xx in x..x + w {
                gray.put_pixel(xx, yy, Luma([value]));
            }
        }
        DynamicImage::ImageLuma8(gray)
    }

    #[test]
    fn test_dark_worm_is_detected_and_boxed() {
        let tracker = WormTracker::new(TrackingParams::default());
        let result = tracker.track(4, &frame_with_blob(50, 40, 60, 10, 10));

        assert_eq!(result.detections.len(), 1);
        let detection = &result.detections[0];
        assert_eq!(detection.frame, 4);
        // 3 dilations grow the blob by 3 pixels on each side
        assert_eq!(detection.bbox.x, 47);
        assert_eq!(detection.bbox.y, 37);
        assert_eq!(detection.bbox.width, 66);
        assert_eq!(detection.bbox.height, 16);
        assert_eq!(detection.area, 65.0 * 15.0);
        assert_eq!((detection.x, detection.y), (80.0, 45.0));

        assert_eq!(result.annotated.get_pixel(47, 37).0[0], WHITE);
        assert_eq!(result.annotated.get_pixel(0, 0).0[0], 180);
    }

    #[test]
    fn test_worm_touching_left_edge_is_still_detected() {
        let tracker = WormTracker::new(TrackingParams::default());
        let result = tracker.track(1, &frame_with_blob(0, 50, 60, 10, 10));

        assert_eq!(result.detections.len(), 1);
        let bbox = &result.detections[0].bbox;
        // dilation is clipped by the image edge on the left only
        assert_eq!((bbox.x, bbox.y), (0, 47));
        assert_eq!((bbox.width, bbox.height), (63, 16));
        assert_eq!(result.detections[0].area, 62.0 * 15.0);
    }

    #[test]
    fn test_blobs_outside_area_range_are_ignored() {
        let tracker = WormTracker::new(TrackingParams::default());

        let small = tracker.track(1, &frame_with_blob(20, 20, 4, 4, 10));
        assert!(small.detections.is_empty());

        let large = tracker.track(1, &frame_with_blob(10, 10, 150, 80, 10));
        assert!(large.detections.is_empty());
    }

    #[test]
    fn test_bright_polarity() {
        let params = TrackingParams {
            polarity: Polarity::Bright,
            threshold: 200,
            dilation_iterations: 0,
            ..TrackingParams::default()
        };
        let mut gray = GrayImage::from_pixel(100, 100, Luma([20]));
        for y in 10..40 {
            for x in 10..50 {
                gray.put_pixel(x, y, Luma([250]));
            }
        }

        let result = WormTracker::new(params).track(1, &DynamicImage::ImageLuma8(gray));
        assert_eq!(result.detections.len(), 1);
        assert_eq!(result.detections[0].area, 39.0 * 29.0);
    }

    #[test]
    fn test_area_bounds_are_exclusive() {
        let params = TrackingParams {
            dilation_iterations: 0,
            min_area: 39.0 * 19.0,
            ..TrackingParams::default()
        };
        let result = WormTracker::new(params).track(1, &frame_with_blob(10, 10, 40, 20, 5));
        assert!(result.detections.is_empty());
    }
}
