//! Outer borders of connected foreground regions in a binary image.

use crate::domain::model::{BoundingBox, Point};
use image::GrayImage;
use std::collections::VecDeque;

// Clockwise with y pointing down: W, NW, N, NE, E, SE, S, SW.
const DIRECTIONS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    /// Shoelace area of the border polygon through pixel centres.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }

    pub fn bounding_rect(&self) -> BoundingBox {
        let min_x = self.points.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = self.points.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = self.points.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = self.points.iter().map(|p| p.y).max().unwrap_or(0);
        BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }
}

struct Labels {
    width: i64,
    height: i64,
    data: Vec<u32>,
}

impl Labels {
    fn get(&self, x: i64, y: i64) -> u32 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            0
        } else {
            self.data[(y * self.width + x) as usize]
        }
    }
}

/// 8-connected component labelling; label 0 is background.
/// Returns the labels and each component's first pixel in raster order.
fn label_components(binary: &GrayImage) -> (Labels, Vec<(i64, i64)>) {
    let (width, height) = (binary.width() as i64, binary.height() as i64);
    let mut labels = Labels {
        width,
        height,
        data: vec![0; (width * height) as usize],
    };
    let mut starts = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            if binary.get_pixel(x as u32, y as u32).0[0] == 0 || labels.data[idx] != 0 {
                continue;
            }

            let label = starts.len() as u32 + 1;
            starts.push((x, y));
            labels.data[idx] = label;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                for (dx, dy) in DIRECTIONS {
                    let (nx, ny) = (cx + dx, cy + dy);
                    if nx < 0 || ny < 0 || nx >= width || ny >= height {
                        continue;
                    }
                    let nidx = (ny * width + nx) as usize;
                    if labels.data[nidx] == 0 && binary.get_pixel(nx as u32, ny as u32).0[0] != 0 {
                        labels.data[nidx] = label;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    }

    (labels, starts)
}

fn direction_index(dx: i64, dy: i64) -> usize {
    DIRECTIONS
        .iter()
        .position(|d| *d == (dx, dy))
        .unwrap_or(0)
}

/// Next border pixel clockwise from `current`, searching after the
/// background neighbour at `backtrack`. Returns the pixel and the direction
/// from it to the new backtrack neighbour.
fn next_border(
    labels: &Labels,
    label: u32,
    current: (i64, i64),
    backtrack: usize,
) -> Option<((i64, i64), usize)> {
    for i in 1..=8 {
        let dir = (backtrack + i) % 8;
        let (dx, dy) = DIRECTIONS[dir];
        let next = (current.0 + dx, current.1 + dy);
        if labels.get(next.0, next.1) == label {
            let (bx, by) = DIRECTIONS[(dir + 7) % 8];
            let back = (current.0 + bx, current.1 + by);
            return Some((next, direction_index(back.0 - next.0, back.1 - next.1)));
        }
    }
    None
}

fn trace(labels: &Labels, label: u32, start: (i64, i64)) -> Contour {
    let to_point = |(x, y): (i64, i64)| Point::new(x as u32, y as u32);

    // The west neighbour of a raster-order start pixel is never in the component.
    let Some((second, mut backtrack)) = next_border(labels, label, start, 0) else {
        return Contour {
            points: vec![to_point(start)],
        };
    };

    let mut points = vec![to_point(start)];
    let mut current = second;
    let limit = 4 * labels.data.len() + 8;

    loop {
        if current == start {
            match next_border(labels, label, current, backtrack) {
                Some((next, _)) if next == second => break,
                _ => {}
            }
        }
        points.push(to_point(current));
        if points.len() > limit {
            break;
        }
        match next_border(labels, label, current, backtrack) {
            Some((next, back)) => {
                current = next;
                backtrack = back;
            }
            None => break,
        }
    }

    Contour { points }
}

/// Outer contours of all 8-connected non-zero regions, ordered by the
/// raster position of their top-left-most pixel.
pub fn find_contours(binary: &GrayImage) -> Vec<Contour> {
    let (labels, starts) = label_components(binary);
    starts
        .iter()
        .enumerate()
        .map(|(i, start)| trace(&labels, i as u32 + 1, *start))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(image: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                image.put_pixel(xx, yy, Luma([255]));
            }
        }
    }

    #[test]
    fn test_square_contour_is_clockwise_border() {
        let mut image = GrayImage::new(6, 6);
        fill(&mut image, 1, 1, 2, 2);

        let contours = find_contours(&image);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].points,
            vec![
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(2, 2),
                Point::new(1, 2)
            ]
        );
        assert_eq!(contours[0].area(), 1.0);
    }

    #[test]
    fn test_filled_rectangle_area_and_bounds() {
        let mut image = GrayImage::new(60, 40);
        fill(&mut image, 5, 7, 40, 20);

        let contours = find_contours(&image);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 39.0 * 19.0);
        assert_eq!(
            contours[0].bounding_rect(),
            BoundingBox {
                x: 5,
                y: 7,
                width: 40,
                height: 20
            }
        );
    }

    #[test]
    fn test_single_pixel_and_line_have_zero_area() {
        let mut image = GrayImage::new(10, 10);
        image.put_pixel(1, 1, Luma([255]));
        fill(&mut image, 4, 6, 5, 1);

        let contours = find_contours(&image);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points, vec![Point::new(1, 1)]);
        assert_eq!(contours[0].area(), 0.0);
        assert_eq!(contours[1].area(), 0.0);
        assert_eq!(contours[1].bounding_rect().width, 5);
    }

    #[test]
    fn test_diagonal_pixels_are_one_component() {
        let mut image = GrayImage::new(5, 5);
        image.put_pixel(1, 1, Luma([255]));
        image.put_pixel(2, 2, Luma([255]));
        image.put_pixel(3, 3, Luma([255]));

        let contours = find_contours(&image);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect().width, 3);
    }

    #[test]
    fn test_shape_touching_image_border() {
        let mut image = GrayImage::new(8, 8);
        fill(&mut image, 0, 0, 8, 3);

        let contours = find_contours(&image);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 7.0 * 2.0);
    }

    #[test]
    fn test_empty_image_has_no_contours() {
        assert!(find_contours(&GrayImage::new(4, 4)).is_empty());
    }
}
