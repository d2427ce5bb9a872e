use anyhow::Result;
use log::info;
use opencv::{
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::error::PipelineError;

/// A sequential, finite stream of decoded frames. `Ok(None)` is
/// end-of-stream.
pub trait FrameSource {
    fn read(&mut self) -> Result<Option<Mat>>;
    fn release(&mut self) -> Result<()>;
}

/// Frame source backed by an OpenCV `VideoCapture` on a file.
pub struct VideoFileSource {
    cap: VideoCapture,
}

impl VideoFileSource {
    /// Open a video file, failing immediately if it cannot be read.
    pub fn open(path: &str) -> Result<Self, PipelineError> {
        let cap = VideoCapture::from_file(path, videoio::CAP_ANY)
            .map_err(|e| PipelineError::VideoOpen(format!("{}: {}", path, e)))?;
        let opened = cap
            .is_opened()
            .map_err(|e| PipelineError::VideoOpen(format!("{}: {}", path, e)))?;
        if !opened {
            return Err(PipelineError::VideoOpen(path.to_string()));
        }

        if let (Ok(width), Ok(height), Ok(fps)) = (
            cap.get(videoio::CAP_PROP_FRAME_WIDTH),
            cap.get(videoio::CAP_PROP_FRAME_HEIGHT),
            cap.get(videoio::CAP_PROP_FPS),
        ) {
            info!(
                "Opened {}: {}x{} @ {:.2} fps",
                path, width as i32, height as i32, fps
            );
        }

        Ok(VideoFileSource { cap })
    }
}

impl FrameSource for VideoFileSource {
    fn read(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.cap.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn release(&mut self) -> Result<()> {
        self.cap.release()?;
        Ok(())
    }
}
