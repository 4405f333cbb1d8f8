use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenClickError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("VLM inference failed: {0}")]
    Inference(String),

    #[error("Input injection failed: {0}")]
    Injection(String),

    /// Every sample either failed transport or failed to parse. Carries the
    /// raw responses that were received so the user can see what the model
    /// actually said.
    #[error("No valid predictions from {attempted} samples; raw responses: {responses:?}")]
    NoValidPredictions {
        attempted: usize,
        responses: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

pub type ScreenClickResult<T> = Result<T, ScreenClickError>;
