use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelLoadError {
    #[error("could not fetch model from {source_uri}: {reason}")]
    Fetch { source_uri: String, reason: String },
    #[error("model at {source_uri} is malformed: {reason}")]
    Malformed { source_uri: String, reason: String },
    #[error("model load was already requested")]
    AlreadyRequested,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("image {height}x{width} has no pixels")]
    EmptyImage { height: usize, width: usize },
    #[error("model expects input shape {expected:?}, got {actual:?}")]
    InvalidInputShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("model returned {actual} scores for {expected} labels")]
    InvalidOutputShape { expected: usize, actual: usize },
    #[error("model is not ready")]
    ModelNotReady,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("tensor error: {0}")]
    Tensor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    #[error("The model is still loading, please wait.")]
    ModelLoading,
    #[error("The model failed to load.")]
    ModelFailed,
    #[error("Select an image first.")]
    NoImageSelected,
    #[error("A prediction is already running.")]
    PredictionInFlight,
}

#[derive(Debug, Error)]
pub enum ImageSourceError {
    #[error("could not open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("could not decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}
