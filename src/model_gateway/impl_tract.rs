use crate::error::ModelLoadError;
use crate::library::logger::interface::Logger;
use crate::model_gateway::interface::{ModelHandle, ModelLoader};
use crate::tensor::Tensor;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

/// Loads an ONNX image classifier taking NHWC `f32` input.
pub struct ModelLoaderTract {
    logger: Arc<dyn Logger + Send + Sync>,
    input_size: usize,
}

impl ModelLoaderTract {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, input_size: u32) -> Self {
        Self {
            logger: logger.with_namespace("model").with_namespace("tract"),
            input_size: input_size as usize,
        }
    }

    /// Input shape the model declares, when every dimension is concrete.
    fn declared_input_shape(model: &InferenceModel) -> Option<Vec<usize>> {
        let typed = model.clone().into_typed().ok()?;
        let fact = typed.input_fact(0).ok()?;
        fact.shape.as_concrete().map(|shape| shape.to_vec())
    }

    fn build(&self, source: &str) -> TractResult<(TypedRunnableModel<TypedModel>, Vec<usize>)> {
        let model = tract_onnx::onnx().model_for_path(source)?;

        let (model, input_shape) = match Self::declared_input_shape(&model) {
            Some(shape) => (model, shape),
            None => {
                let size = self.input_size;
                let shape = vec![1, size, size, 3];
                let model = model.with_input_fact(0, f32::fact(shape.clone()).into())?;
                (model, shape)
            }
        };

        let plan = model.into_optimized()?.into_runnable()?;
        Ok((plan, input_shape))
    }
}

impl ModelLoader for ModelLoaderTract {
    fn load(&self, source: &str) -> Result<Box<dyn ModelHandle>, ModelLoadError> {
        if !Path::new(source).is_file() {
            return Err(ModelLoadError::Fetch {
                source_uri: source.to_string(),
                reason: "no such file".to_string(),
            });
        }

        let (plan, input_shape) = self.build(source).map_err(|e| ModelLoadError::Malformed {
            source_uri: source.to_string(),
            reason: format!("{:#}", e),
        })?;

        let _ = self.logger.info(&format!(
            "Optimized plan ready for {} with input {:?}",
            source, input_shape
        ));

        Ok(Box::new(ModelHandleTract { plan, input_shape }))
    }
}

struct ModelHandleTract {
    plan: TypedRunnableModel<TypedModel>,
    input_shape: Vec<usize>,
}

impl ModelHandle for ModelHandleTract {
    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn run(&self, input: &Tensor<f32>) -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
        let tensor = tract_onnx::prelude::Tensor::from_shape(input.shape(), input.as_slice())?;
        let outputs = self.plan.run(tvec!(tensor.into_tvalue()))?;
        let scores = outputs[0].to_array_view::<f32>()?;

        Ok(scores.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::model_gateway::gateway::ModelGateway;
    use crate::tensor::TensorLedger;
    use chrono::{Offset, Utc};

    fn logger() -> Arc<dyn Logger + Send + Sync> {
        Arc::new(LoggerConsole::new(Utc.fix()))
    }

    fn varint(mut value: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                return;
            }
            out.push(byte | 0x80);
        }
    }

    fn field_varint(field: u64, value: u64, out: &mut Vec<u8>) {
        varint(field << 3, out);
        varint(value, out);
    }

    fn field_bytes(field: u64, bytes: &[u8], out: &mut Vec<u8>) {
        varint((field << 3) | 2, out);
        varint(bytes.len() as u64, out);
        out.extend_from_slice(bytes);
    }

    /// Protobuf bytes of a one-node `Identity` graph whose float input `x`
    /// declares `dims`, or no shape at all when `dims` is `None`.
    fn identity_model(dims: Option<&[u64]>) -> Vec<u8> {
        let mut tensor_type = Vec::new();
        field_varint(1, 1, &mut tensor_type);
        if let Some(dims) = dims {
            let mut shape = Vec::new();
            for dim in dims {
                let mut dimension = Vec::new();
                field_varint(1, *dim, &mut dimension);
                field_bytes(1, &dimension, &mut shape);
            }
            field_bytes(2, &shape, &mut tensor_type);
        }
        let mut type_proto = Vec::new();
        field_bytes(1, &tensor_type, &mut type_proto);

        let mut input = Vec::new();
        field_bytes(1, b"x", &mut input);
        field_bytes(2, &type_proto, &mut input);

        let mut output = Vec::new();
        field_bytes(1, b"y", &mut output);

        let mut node = Vec::new();
        field_bytes(1, b"x", &mut node);
        field_bytes(2, b"y", &mut node);
        field_bytes(4, b"Identity", &mut node);

        let mut graph = Vec::new();
        field_bytes(1, &node, &mut graph);
        field_bytes(2, b"identity", &mut graph);
        field_bytes(11, &input, &mut graph);
        field_bytes(12, &output, &mut graph);

        let mut opset = Vec::new();
        field_varint(2, 13, &mut opset);

        let mut model = Vec::new();
        field_varint(1, 7, &mut model);
        field_bytes(7, &graph, &mut model);
        field_bytes(8, &opset, &mut model);
        model
    }

    fn write_model(tag: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "art-movement-classifier-{}-{}.onnx",
            tag,
            std::process::id()
        ));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let loader = ModelLoaderTract::new(logger(), 128);

        let result = loader.load("./does/not/exist.onnx");

        assert!(matches!(result, Err(ModelLoadError::Fetch { .. })));
    }

    #[test]
    fn test_garbage_file_is_malformed() {
        let path = write_model("garbage", b"definitely not protobuf");
        let loader = ModelLoaderTract::new(logger(), 128);

        let result = loader.load(&path.to_string_lossy());

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ModelLoadError::Malformed { .. })));
    }

    #[test]
    fn test_declared_input_shape_wins_over_config() {
        let path = write_model("declared", &identity_model(Some(&[1u64, 224, 224, 3][..])));
        let loader = ModelLoaderTract::new(logger(), 128);

        let handle = loader.load(&path.to_string_lossy());

        std::fs::remove_file(&path).unwrap();
        assert_eq!(handle.unwrap().input_shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_config_sized_input_rejected_by_declared_model() {
        let path = write_model("mismatch", &identity_model(Some(&[1u64, 224, 224, 3][..])));
        let gateway = ModelGateway::new(
            path.to_string_lossy().to_string(),
            Arc::new(ModelLoaderTract::new(logger(), 128)),
            logger(),
        );
        let ledger = TensorLedger::new();

        let loaded = gateway.load();
        std::fs::remove_file(&path).unwrap();
        loaded.unwrap();

        let input =
            Tensor::from_shape_vec(vec![1, 128, 128, 3], vec![0.5; 128 * 128 * 3], &ledger).unwrap();
        let result = gateway.predict(&input, &ledger);

        assert_eq!(
            result.unwrap_err(),
            PipelineError::InvalidInputShape {
                expected: vec![1, 224, 224, 3],
                actual: vec![1, 128, 128, 3],
            }
        );
        assert_eq!(ledger.live(), 1);
    }

    #[test]
    fn test_undeclared_input_shape_falls_back_to_config() {
        let path = write_model("undeclared", &identity_model(None));
        let loader = ModelLoaderTract::new(logger(), 128);

        let handle = loader.load(&path.to_string_lossy());

        std::fs::remove_file(&path).unwrap();
        assert_eq!(handle.unwrap().input_shape(), &[1, 128, 128, 3]);
    }
}
