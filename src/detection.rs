use anyhow::Result;
use log::debug;
use opencv::{
    core::{Mat, Size, CV_32F},
    imgproc,
    prelude::*,
};
use tch::{Device, Kind, Tensor};

use crate::error::PipelineError;
use crate::track::TrackSet;
use crate::utils;

/// COCO class names, indexed by class id. The same table ships with the
/// pretrained YOLOv8 weights.
pub const COCO_NAMES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Resolve a class id to its display name.
pub fn class_name(class_id: i32) -> String {
    COCO_NAMES
        .get(class_id as usize)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("class_{}", class_id))
}

/// A single detection result in frame pixel coordinates.
#[derive(Debug, Clone)]
pub struct Detection {
    /// [x1, y1, x2, y2] with x1 < x2 and y1 < y2.
    pub bbox: [f32; 4],
    pub confidence: f32,
    pub class_id: i32,
    pub class_name: String,
}

/// One inference pass's worth of detections. `ObjectTracker::track` yields a
/// finite sequence of these per frame; consumers drain the whole sequence
/// before advancing to the next frame.
#[derive(Debug, Clone, Default)]
pub struct DetectionBatch {
    detections: Vec<Detection>,
}

impl DetectionBatch {
    pub fn new(detections: Vec<Detection>) -> Self {
        DetectionBatch { detections }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Per-frame detection with identity carried across calls.
pub trait ObjectTracker {
    fn track(&mut self, frame: &Mat) -> Result<Vec<DetectionBatch>>;
}

/// Wraps a TorchScript YOLOv8 model plus the track state that persists
/// object identity across frames.
pub struct YoloTracker {
    model: tch::CModule,
    device: Device,
    input_size: (i64, i64),
    conf_threshold: f32,
    nms_threshold: f32,
    tracks: TrackSet,
}

impl YoloTracker {
    /// Create a new tracker from a model file and device ("cpu"/"cuda").
    pub fn new(
        model_path: &str,
        device: &str,
        input_size: (i64, i64),
        conf_threshold: f32,
        nms_threshold: f32,
    ) -> Result<Self, PipelineError> {
        let device = if device == "cuda" && tch::Cuda::is_available() {
            Device::Cuda(0)
        } else {
            Device::Cpu
        };

        let model = tch::CModule::load_on_device(model_path, device).map_err(|source| {
            PipelineError::ModelLoad {
                path: model_path.to_string(),
                source,
            }
        })?;

        Ok(YoloTracker {
            model,
            device,
            input_size,
            conf_threshold,
            nms_threshold,
            tracks: TrackSet::new(),
        })
    }

    pub fn active_tracks(&self) -> usize {
        self.tracks.active()
    }

    /// Resize, BGR->RGB, normalize to [0,1], NCHW tensor.
    fn preprocess(&self, frame: &Mat) -> Result<Tensor> {
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size.0 as i32, self.input_size.1 as i32),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&resized, &mut rgb, imgproc::COLOR_BGR2RGB)?;

        let mut float_mat = Mat::default();
        rgb.convert_to(&mut float_mat, CV_32F, 1.0 / 255.0, 0.0)?;

        let rows = float_mat.rows();
        let cols = float_mat.cols();
        let channels = float_mat.channels();
        let total_elements = (rows * cols * channels) as usize;
        let data =
            unsafe { std::slice::from_raw_parts(float_mat.data() as *const f32, total_elements) };

        // HWC slice to [1, C, H, W]
        let tensor = Tensor::from_slice(data)
            .reshape(&[1, rows as i64, cols as i64, channels as i64])
            .permute(&[0, 3, 1, 2])
            .contiguous()
            .to_device(self.device)
            .to_kind(Kind::Float);

        Ok(tensor)
    }

    fn inference(&self, input: &Tensor) -> Result<Tensor> {
        let output = self.model.forward_ts(&[input])?;
        Ok(output)
    }

    /// Decode the raw YOLOv8 output `[1, 84, N]` (4 box coords + 80 class
    /// scores per candidate, no objectness column) into detections scaled
    /// back to the original frame.
    fn postprocess(&self, output: &Tensor, orig_size: (i32, i32)) -> Result<Vec<Detection>> {
        let output_shape = output.size();
        if output_shape.len() != 3 || output_shape[1] != 84 {
            anyhow::bail!("unexpected model output shape: {:?}", output_shape);
        }

        let (orig_w, orig_h) = orig_size;
        let scale_w = orig_w as f32 / self.input_size.0 as f32;
        let scale_h = orig_h as f32 / self.input_size.1 as f32;

        // [1, 84, N] -> [N, 84], flattened row-major on the CPU.
        let preds = output
            .get(0)
            .transpose(0, 1)
            .contiguous()
            .to_device(Device::Cpu)
            .view(-1);
        let data: Vec<f32> = Vec::<f32>::try_from(&preds).map_err(PipelineError::Inference)?;

        let mut detections = Vec::new();
        for row in data.chunks_exact(84) {
            let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);

            let mut best_score = 0.0f32;
            let mut best_class = 0i32;
            for (c, &score) in row[4..].iter().enumerate() {
                if score > best_score {
                    best_score = score;
                    best_class = c as i32;
                }
            }
            if best_score < self.conf_threshold {
                continue;
            }

            let x1 = ((cx - w / 2.0) * scale_w).clamp(0.0, orig_w as f32);
            let y1 = ((cy - h / 2.0) * scale_h).clamp(0.0, orig_h as f32);
            let x2 = ((cx + w / 2.0) * scale_w).clamp(0.0, orig_w as f32);
            let y2 = ((cy + h / 2.0) * scale_h).clamp(0.0, orig_h as f32);
            if x2 <= x1 || y2 <= y1 {
                continue;
            }

            detections.push(Detection {
                bbox: [x1, y1, x2, y2],
                confidence: best_score,
                class_id: best_class,
                class_name: class_name(best_class),
            });
        }

        if detections.len() > 1 {
            let boxes: Vec<[f32; 4]> = detections.iter().map(|d| d.bbox).collect();
            let scores: Vec<f32> = detections.iter().map(|d| d.confidence).collect();
            let keep = utils::nms(&boxes, &scores, self.nms_threshold);
            detections = keep.into_iter().map(|i| detections[i].clone()).collect();
        }

        Ok(detections)
    }

    fn detect(&self, frame: &Mat) -> Result<Vec<Detection>> {
        let orig_size = (frame.cols(), frame.rows());
        let input = self.preprocess(frame)?;
        let output = self.inference(&input)?;
        self.postprocess(&output, orig_size)
    }
}

impl ObjectTracker for YoloTracker {
    fn track(&mut self, frame: &Mat) -> Result<Vec<DetectionBatch>> {
        let detections = self.detect(frame)?;
        self.tracks.update(&detections);
        debug!(
            "{} detections, {} active tracks",
            detections.len(),
            self.tracks.active()
        );
        Ok(vec![DetectionBatch::new(detections)])
    }
}
