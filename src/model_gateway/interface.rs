use crate::error::ModelLoadError;
use crate::tensor::Tensor;

/// An initialized model, ready to run.
pub trait ModelHandle: Send + Sync {
    fn input_shape(&self) -> &[usize];

    /// Runs one forward pass and returns the flattened output scores.
    fn run(&self, input: &Tensor<f32>) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait ModelLoader: Send + Sync {
    fn load(&self, source: &str) -> Result<Box<dyn ModelHandle>, ModelLoadError>;
}
