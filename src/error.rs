use thiserror::Error;

/// Failure classes the pipeline can report before or during processing.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("could not open video source: {0}")]
    VideoOpen(String),

    #[error("model loading failed: {path}: {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: tch::TchError,
    },

    #[error("inference failed: {0}")]
    Inference(#[from] tch::TchError),
}
