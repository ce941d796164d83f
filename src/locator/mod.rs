//! Plate localization
//!
//! [`ContourLocator`] is a first-match filter: trace contours of the binary
//! mask, rank them by enclosed area, and return the first of the largest few
//! whose simplified outline is a quadrilateral. There is no plate classifier;
//! any rectangular shape qualifies.

pub mod geometry;

use crate::config::PipelineConfig;
use crate::preprocessing::{BinaryMask, Preprocessor};
use image::DynamicImage;
use imageproc::contours::find_contours;
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;

/// Axis-aligned rectangle of a plate-shaped contour, in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The single crop handed to text extraction
#[derive(Debug, Clone)]
pub struct PlateCrop {
    pub region: CandidateRegion,
    pub image: DynamicImage,
}

/// Finds the plate region in a frame
pub trait PlateLocator: Send + Sync {
    fn locate(&self, frame: &DynamicImage) -> Option<PlateCrop>;
}

/// A traced contour with its enclosed area
#[derive(Debug, Clone)]
pub struct Candidate {
    pub points: Vec<Point<i32>>,
    pub area: f64,
}

/// Quadrilateral contour search over the preprocessed frame
#[derive(Debug, Clone, Copy)]
pub struct ContourLocator {
    preprocessor: Preprocessor,
    max_candidates: usize,
    epsilon_ratio: f64,
    plate_vertices: usize,
}

impl Default for ContourLocator {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl ContourLocator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            preprocessor: Preprocessor::new(config),
            max_candidates: config.max_candidates,
            epsilon_ratio: config.epsilon_ratio,
            plate_vertices: config.plate_vertices,
        }
    }

    /// Outer and hole borders of the mask, largest area first, capped at
    /// `max_candidates`. Equal areas keep their tracing order.
    pub fn candidates(&self, mask: &BinaryMask) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = find_contours::<i32>(mask)
            .into_iter()
            .map(|contour| {
                let area = contour_area(&contour.points);
                Candidate {
                    points: contour.points,
                    area,
                }
            })
            .collect();

        candidates.sort_by(|a, b| b.area.total_cmp(&a.area));
        candidates.truncate(self.max_candidates);
        candidates
    }

    /// Simplified outline of a candidate, or `None` if it has no length
    pub fn approximate(&self, candidate: &Candidate) -> Option<Vec<Point<i32>>> {
        if candidate.points.len() < 3 {
            return None;
        }
        let perimeter = arc_length(candidate.points.as_slice(), true);
        if perimeter <= 0.0 {
            return None;
        }
        Some(geometry::approximate_closed_polygon(
            &candidate.points,
            self.epsilon_ratio * perimeter,
        ))
    }
}

impl PlateLocator for ContourLocator {
    fn locate(&self, frame: &DynamicImage) -> Option<PlateCrop> {
        let mask = self.preprocessor.preprocess(frame);
        let candidates = self.candidates(&mask);

        tracing::debug!("Examining {} contour candidates", candidates.len());

        for (rank, candidate) in candidates.iter().enumerate() {
            let Some(polygon) = self.approximate(candidate) else {
                continue;
            };

            tracing::trace!(
                "Candidate {}: area {:.1}, {} vertices",
                rank,
                candidate.area,
                polygon.len()
            );

            if polygon.len() != self.plate_vertices {
                continue;
            }

            let region = region_within(&polygon, frame.width(), frame.height())?;
            tracing::debug!("Plate candidate {} selected at {:?}", rank, region);

            return Some(PlateCrop {
                region,
                image: frame.crop_imm(region.x, region.y, region.width, region.height),
            });
        }

        None
    }
}

/// Bounding rectangle of `polygon`, clipped to a `width` x `height` frame
fn region_within(polygon: &[Point<i32>], width: u32, height: u32) -> Option<CandidateRegion> {
    let (x, y, w, h) = geometry::bounding_rect(polygon)?;

    let x0 = x.clamp(0, width as i32) as u32;
    let y0 = y.clamp(0, height as i32) as u32;
    let x1 = (x + w).clamp(0, width as i32) as u32;
    let y1 = (y + h).clamp(0, height as i32) as u32;

    Some(CandidateRegion {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn blank() -> RgbImage {
        RgbImage::from_pixel(400, 600, WHITE)
    }

    /// Black frame of `thickness` around a white interior
    fn draw_border(img: &mut RgbImage, x: i32, y: i32, w: u32, h: u32, thickness: u32) {
        draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), BLACK);
        draw_filled_rect_mut(
            img,
            Rect::at(x + thickness as i32, y + thickness as i32)
                .of_size(w - 2 * thickness, h - 2 * thickness),
            WHITE,
        );
    }

    #[test]
    fn test_blank_frame_has_no_plate() {
        let frame = DynamicImage::ImageRgb8(blank());
        assert!(ContourLocator::default().locate(&frame).is_none());
    }

    #[test]
    fn test_bordered_rectangle_is_located() {
        let mut img = blank();
        draw_border(&mut img, 80, 250, 240, 80, 6);
        let frame = DynamicImage::ImageRgb8(img);

        let crop = ContourLocator::default().locate(&frame).expect("plate found");

        // The crop hugs the outer edge of the border, give or take the blur
        assert!(crop.region.x.abs_diff(80) <= 3, "{:?}", crop.region);
        assert!(crop.region.y.abs_diff(250) <= 3, "{:?}", crop.region);
        assert!(crop.region.width.abs_diff(240) <= 6, "{:?}", crop.region);
        assert!(crop.region.height.abs_diff(80) <= 6, "{:?}", crop.region);
        assert_eq!(crop.image.width(), crop.region.width);
        assert_eq!(crop.image.height(), crop.region.height);
    }

    #[test]
    fn test_round_shapes_are_ignored() {
        let mut img = blank();
        draw_filled_circle_mut(&mut img, (200, 300), 80, BLACK);
        let frame = DynamicImage::ImageRgb8(img);

        assert!(ContourLocator::default().locate(&frame).is_none());
    }

    #[test]
    fn test_largest_rectangle_wins() {
        let mut img = blank();
        draw_border(&mut img, 40, 60, 120, 50, 5);
        draw_border(&mut img, 60, 300, 280, 120, 5);
        let frame = DynamicImage::ImageRgb8(img);

        let crop = ContourLocator::default().locate(&frame).expect("plate found");
        assert!(crop.region.y.abs_diff(300) <= 3, "{:?}", crop.region);
        assert!(crop.region.width.abs_diff(280) <= 6, "{:?}", crop.region);
    }

    #[test]
    fn test_larger_round_shape_skipped_for_rectangle() {
        let mut img = blank();
        draw_filled_circle_mut(&mut img, (200, 170), 120, BLACK);
        draw_border(&mut img, 100, 400, 200, 60, 6);
        let frame = DynamicImage::ImageRgb8(img);

        let locator = ContourLocator::default();
        let mask = Preprocessor::default().preprocess(&frame);
        let candidates = locator.candidates(&mask);
        assert!(
            locator.approximate(&candidates[0]).unwrap().len() != 4,
            "largest contour should be the circle"
        );

        let crop = locator.locate(&frame).expect("plate found");
        assert!(crop.region.x.abs_diff(100) <= 3, "{:?}", crop.region);
        assert!(crop.region.y.abs_diff(400) <= 3, "{:?}", crop.region);
        assert!(crop.region.width.abs_diff(200) <= 6, "{:?}", crop.region);
        assert!(crop.region.height.abs_diff(60) <= 6, "{:?}", crop.region);
    }

    #[test]
    fn test_rectangle_outside_largest_candidates_is_missed() {
        let mut img = blank();
        for i in 0..6 {
            let cx = 100 + (i % 2) * 200;
            let cy = 80 + (i / 2) * 120;
            draw_filled_circle_mut(&mut img, (cx, cy), 45, BLACK);
        }
        draw_border(&mut img, 170, 500, 60, 20, 4);
        let frame = DynamicImage::ImageRgb8(img);

        // Twelve circle borders outrank both rectangle borders
        assert!(ContourLocator::default().locate(&frame).is_none());

        let wider = ContourLocator::new(&PipelineConfig {
            max_candidates: 20,
            ..PipelineConfig::default()
        });
        let crop = wider.locate(&frame).expect("plate found once the cap allows it");
        assert!(crop.region.y.abs_diff(500) <= 3, "{:?}", crop.region);
    }

    #[test]
    fn test_candidates_are_ranked_and_capped() {
        let mut img = blank();
        for i in 0..6 {
            let x = 20 + (i % 2) * 190;
            let y = 20 + (i / 2) * 190;
            let size = 60 + i as u32 * 15;
            draw_border(&mut img, x, y, size, size, 4);
        }
        let locator = ContourLocator::default();
        let mask = Preprocessor::default().preprocess(&DynamicImage::ImageRgb8(img));

        let candidates = locator.candidates(&mask);

        assert_eq!(candidates.len(), 10);
        assert!(candidates.windows(2).all(|w| w[0].area >= w[1].area));
    }

    #[test]
    fn test_region_clipped_to_frame() {
        let polygon = vec![
            Point::new(-5, 10),
            Point::new(420, 10),
            Point::new(420, 40),
            Point::new(-5, 40),
        ];
        let region = region_within(&polygon, 400, 600).unwrap();
        assert_eq!(
            region,
            CandidateRegion {
                x: 0,
                y: 10,
                width: 400,
                height: 31
            }
        );
    }
}
