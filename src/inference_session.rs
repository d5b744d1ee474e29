use crate::error::PipelineError;
use crate::image_source::ImageSource;
use crate::library::logger::interface::Logger;
use crate::model_gateway::gateway::ModelGateway;
use crate::preprocess::preprocess;
use crate::ranker::{rank, RankedResult};
use crate::tensor::TensorLedger;
use std::sync::Arc;
use std::time::Instant;

/// Runs one image through preprocess, predict and rank.
///
/// Tensors live in local bindings only, so every tensor created here is
/// released on every return path.
#[derive(Clone)]
pub struct InferenceSession {
    gateway: Arc<ModelGateway>,
    labels: Vec<String>,
    input_size: u32,
    top_k: usize,
    ledger: TensorLedger,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl InferenceSession {
    pub fn new(
        gateway: Arc<ModelGateway>,
        labels: Vec<String>,
        input_size: u32,
        top_k: usize,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            gateway,
            labels,
            input_size,
            top_k,
            ledger: TensorLedger::new(),
            logger: logger.with_namespace("session"),
        }
    }

    #[allow(dead_code)]
    pub fn ledger(&self) -> &TensorLedger {
        &self.ledger
    }

    pub fn run(&self, image: &ImageSource) -> Result<RankedResult, PipelineError> {
        let _ = self.logger.info(&format!("Classifying {:?}", image));
        let start = Instant::now();

        let outcome = self.run_pipeline(image);

        let live = self.ledger.live();
        if live > 0 {
            let _ = self
                .logger
                .error(&format!("{} tensors still live after session", live));
        }

        match outcome {
            Ok(result) => {
                if let Some(top) = result.first() {
                    let _ = self.logger.info(&format!(
                        "Top result {} (#{}) {} in {:?}",
                        top.label,
                        top.index,
                        top.percent(),
                        start.elapsed()
                    ));
                }
                Ok(result)
            }
            Err(e) => {
                let _ = self.logger.warn(&format!("Classification aborted: {}", e));
                Err(e)
            }
        }
    }

    fn run_pipeline(&self, image: &ImageSource) -> Result<RankedResult, PipelineError> {
        let normalized = preprocess(image, self.input_size, &self.ledger)?;

        let prediction = self.gateway.predict(&normalized, &self.ledger)?;
        drop(normalized);

        let probabilities = prediction.to_vec();
        drop(prediction);

        if probabilities.len() != self.labels.len() {
            return Err(PipelineError::InvalidOutputShape {
                expected: self.labels.len(),
                actual: probabilities.len(),
            });
        }

        Ok(rank(&probabilities, &self.labels, self.top_k))
    }
}
