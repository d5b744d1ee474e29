use crate::error::ModelLoadError;
use crate::library::logger::interface::Logger;
use crate::model_gateway::interface::{ModelHandle, ModelLoader};
use crate::tensor::Tensor;
use rand::distr::{Distribution, Uniform};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Stands in for a real model. Returns fixed scores when given some,
/// random ones otherwise.
pub struct ModelLoaderFake {
    logger: Arc<dyn Logger + Send + Sync>,
    label_count: usize,
    input_shape: Vec<usize>,
    probabilities: Option<Vec<f32>>,
    load_delay: Duration,
    fail_load: bool,
    fail_run: bool,
    run_count: Arc<AtomicUsize>,
}

impl ModelLoaderFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, label_count: usize, input_size: u32) -> Self {
        let input_size = input_size as usize;
        Self {
            logger: logger.with_namespace("model").with_namespace("fake"),
            label_count,
            input_shape: vec![1, input_size, input_size, 3],
            probabilities: None,
            load_delay: Duration::ZERO,
            fail_load: false,
            fail_run: false,
            run_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[allow(dead_code)]
    pub fn with_probabilities(mut self, probabilities: Vec<f32>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    #[allow(dead_code)]
    pub fn with_load_delay(mut self, load_delay: Duration) -> Self {
        self.load_delay = load_delay;
        self
    }

    #[allow(dead_code)]
    pub fn failing(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Loads fine, but every forward pass errors.
    #[allow(dead_code)]
    pub fn failing_run(mut self) -> Self {
        self.fail_run = true;
        self
    }

    /// Number of forward passes run by handles from this loader.
    #[allow(dead_code)]
    pub fn run_count(&self) -> usize {
        self.run_count.load(Ordering::SeqCst)
    }
}

impl ModelLoader for ModelLoaderFake {
    fn load(&self, source: &str) -> Result<Box<dyn ModelHandle>, ModelLoadError> {
        let _ = self.logger.info(&format!("Loading {}...", source));
        std::thread::sleep(self.load_delay);

        if self.fail_load {
            return Err(ModelLoadError::Fetch {
                source_uri: source.to_string(),
                reason: "fake loader configured to fail".to_string(),
            });
        }

        Ok(Box::new(ModelHandleFake {
            logger: self.logger.clone(),
            label_count: self.label_count,
            input_shape: self.input_shape.clone(),
            probabilities: self.probabilities.clone(),
            fail_run: self.fail_run,
            run_count: self.run_count.clone(),
        }))
    }
}

struct ModelHandleFake {
    logger: Arc<dyn Logger + Send + Sync>,
    label_count: usize,
    input_shape: Vec<usize>,
    probabilities: Option<Vec<f32>>,
    fail_run: bool,
    run_count: Arc<AtomicUsize>,
}

impl ModelHandle for ModelHandleFake {
    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn run(&self, _input: &Tensor<f32>) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        self.run_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_run {
            return Err("fake model configured to fail".into());
        }

        if let Some(probabilities) = &self.probabilities {
            return Ok(probabilities.clone());
        }

        self.logger.info("Scoring image with random probabilities")?;
        let mut rng = rand::rng();
        let score_dist = Uniform::new(0.0f32, 1.0)?;

        Ok((0..self.label_count)
            .map(|_| score_dist.sample(&mut rng))
            .collect())
    }
}
