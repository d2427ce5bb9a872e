pub mod annotate;
pub mod color;
pub mod config;
pub mod detection;
pub mod display;
pub mod error;
pub mod runner;
pub mod source;
pub mod track;
pub mod utils;

// Re-export main types
pub use crate::config::Config;
pub use crate::detection::{Detection, DetectionBatch, ObjectTracker, YoloTracker};
pub use crate::display::{DisplaySink, WindowDisplay};
pub use crate::error::PipelineError;
pub use crate::runner::{run, StopReason};
pub use crate::source::{FrameSource, VideoFileSource};
