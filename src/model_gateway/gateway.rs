use crate::error::{ModelLoadError, PipelineError};
use crate::library::logger::interface::Logger;
use crate::model_gateway::interface::{ModelHandle, ModelLoader};
use crate::tensor::{Tensor, TensorLedger};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

enum Slot {
    Unloaded,
    Loading,
    Ready(Box<dyn ModelHandle>),
    Failed,
}

/// Owns the single model handle of the process.
///
/// The model is loaded at most once. After it is ready the handle is only
/// read; there is no reload.
pub struct ModelGateway {
    source: String,
    loader: Arc<dyn ModelLoader>,
    slot: RwLock<Slot>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ModelGateway {
    pub fn new(
        source: impl Into<String>,
        loader: Arc<dyn ModelLoader>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            source: source.into(),
            loader,
            slot: RwLock::new(Slot::Unloaded),
            logger: logger.with_namespace("gateway"),
        }
    }

    #[allow(dead_code)]
    pub fn status(&self) -> GatewayStatus {
        match &*self.slot.read().unwrap_or_else(PoisonError::into_inner) {
            Slot::Unloaded => GatewayStatus::Unloaded,
            Slot::Loading => GatewayStatus::Loading,
            Slot::Ready(_) => GatewayStatus::Ready,
            Slot::Failed => GatewayStatus::Failed,
        }
    }

    /// Blocks until the model is loaded or has failed. Never retried.
    pub fn load(&self) -> Result<(), ModelLoadError> {
        {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            if !matches!(*slot, Slot::Unloaded) {
                return Err(ModelLoadError::AlreadyRequested);
            }
            *slot = Slot::Loading;
        }

        let _ = self.logger.info(&format!("Loading model from {}", self.source));
        let start = Instant::now();
        let loaded = self.loader.load(&self.source);

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        match loaded {
            Ok(handle) => {
                let _ = self.logger.info(&format!(
                    "Model loaded in {:?}, input shape {:?}",
                    start.elapsed(),
                    handle.input_shape()
                ));
                *slot = Slot::Ready(handle);
                Ok(())
            }
            Err(e) => {
                let _ = self.logger.error(&format!("Failed to load model: {}", e));
                *slot = Slot::Failed;
                Err(e)
            }
        }
    }

    /// Runs the model on `input`. The returned tensor is the raw prediction,
    /// owned by the caller.
    pub fn predict(
        &self,
        input: &Tensor<f32>,
        ledger: &TensorLedger,
    ) -> Result<Tensor<f32>, PipelineError> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        let handle = match &*slot {
            Slot::Ready(handle) => handle,
            _ => return Err(PipelineError::ModelNotReady),
        };

        if handle.input_shape() != input.shape() {
            return Err(PipelineError::InvalidInputShape {
                expected: handle.input_shape().to_vec(),
                actual: input.shape().to_vec(),
            });
        }

        let scores = handle
            .run(input)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        Tensor::from_shape_vec(vec![1, scores.len()], scores, ledger).map_err(PipelineError::Tensor)
    }
}
