use anyhow::Result;
use opencv::prelude::*;

use crate::color;
use crate::detection::{Detection, DetectionBatch};
use crate::utils;

/// Only this class is rendered.
const DRAW_CLASS: &str = "person";
/// Detections at or below this confidence are skipped (strict inequality).
const MIN_DRAW_CONFIDENCE: f32 = 0.4;

const BOX_THICKNESS: i32 = 2;
const FONT_SCALE: f64 = 0.6;

/// Whether a detection gets drawn at all.
pub fn qualifies(det: &Detection) -> bool {
    det.confidence > MIN_DRAW_CONFIDENCE && det.class_name == DRAW_CLASS
}

/// Label shown above the box, e.g. "person 0.57".
pub fn label_text(det: &Detection) -> String {
    format!("{} {:.2}", det.class_name, det.confidence)
}

/// Label anchor: 10 px above the box top, clamped so it never renders
/// above pixel row 20.
pub fn label_origin(x1: i32, y1: i32) -> (i32, i32) {
    (x1, (y1 - 10).max(20))
}

/// Draw boxes and labels for qualifying detections, mutating the frame in
/// place. Detections are drawn in the order the tracker produced them.
pub fn annotate_frame(frame: &mut Mat, batches: &[DetectionBatch]) -> Result<()> {
    for batch in batches {
        for det in batch.detections() {
            if !qualifies(det) {
                continue;
            }

            let color = color::class_scalar(det.class_id);
            let [x1, y1, x2, y2] = det.bbox.map(|v| v as i32);

            utils::draw_box(frame, [x1, y1, x2, y2], color, BOX_THICKNESS)?;
            utils::put_text(
                frame,
                &label_text(det),
                label_origin(x1, y1),
                color,
                FONT_SCALE,
                BOX_THICKNESS,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::class_name;
    use opencv::core::{Scalar, Size, Vec3b, CV_8UC3};

    fn det(class_id: i32, confidence: f32, bbox: [f32; 4]) -> Detection {
        Detection {
            bbox,
            confidence,
            class_id,
            class_name: class_name(class_id),
        }
    }

    fn black_frame() -> Mat {
        Mat::new_size_with_default(Size::new(128, 128), CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_person_above_threshold_qualifies() {
        assert!(qualifies(&det(0, 0.41, [0.0, 0.0, 10.0, 10.0])));
        assert!(qualifies(&det(0, 0.9, [0.0, 0.0, 10.0, 10.0])));
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        assert!(!qualifies(&det(0, 0.4, [0.0, 0.0, 10.0, 10.0])));
    }

    #[test]
    fn test_other_classes_never_qualify() {
        // class 2 is "car"
        assert!(!qualifies(&det(2, 0.95, [0.0, 0.0, 10.0, 10.0])));
    }

    #[test]
    fn test_label_text_two_decimals() {
        assert_eq!(label_text(&det(0, 0.567, [0.0, 0.0, 1.0, 1.0])), "person 0.57");
        assert_eq!(label_text(&det(0, 0.5, [0.0, 0.0, 1.0, 1.0])), "person 0.50");
    }

    #[test]
    fn test_label_origin_clamps_near_top() {
        assert_eq!(label_origin(10, 5), (10, 20));
        assert_eq!(label_origin(10, 100), (10, 90));
    }

    #[test]
    fn test_qualifying_detection_marks_pixels() {
        let mut frame = black_frame();
        let batch = DetectionBatch::new(vec![det(0, 0.9, [10.0, 30.0, 50.0, 70.0])]);
        annotate_frame(&mut frame, &[batch]).unwrap();

        // Top-left corner of the box outline must no longer be black.
        let px: &Vec3b = frame.at_2d::<Vec3b>(30, 10).unwrap();
        assert_ne!(px.0, [0, 0, 0]);
    }

    #[test]
    fn test_non_qualifying_frame_left_untouched() {
        let mut frame = black_frame();
        let batch = DetectionBatch::new(vec![
            det(0, 0.4, [10.0, 30.0, 50.0, 70.0]),
            det(2, 0.95, [10.0, 30.0, 50.0, 70.0]),
        ]);
        annotate_frame(&mut frame, &[batch]).unwrap();

        let px: &Vec3b = frame.at_2d::<Vec3b>(30, 10).unwrap();
        assert_eq!(px.0, [0, 0, 0]);
    }
}
