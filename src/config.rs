use chrono::Offset;
use std::time::Duration;

pub const ART_MOVEMENTS: [&str; 9] = [
    "Barroco",
    "Cubismo",
    "Expressionismo",
    "Impressionismo",
    "Minimalismo",
    "Pós-Impressionismo",
    "Realismo",
    "Romantismo",
    "Simbolismo",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub model_source: String,
    pub labels: Vec<String>,
    /// Side length of the square model input.
    pub input_size: u32,
    pub top_k: usize,
    pub loading_status_hide_after: Duration,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_source: "model/model.onnx".to_string(),
            labels: ART_MOVEMENTS.iter().map(|label| label.to_string()).collect(),
            input_size: 128,
            top_k: 3,
            loading_status_hide_after: Duration::from_secs(2),
            logger_timezone: chrono::Utc.fix(),
        }
    }
}
