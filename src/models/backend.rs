use crate::config::OnnxConfig;
use crate::utils::error::AgriError;
use crate::Result;
use ndarray::ArrayD;
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// 推理后端：输入一个f32张量，返回第一个输出张量
pub trait InferenceBackend: Send + Sync {
    fn run(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>>;

    /// 用于日志和 /api/info 的描述
    fn describe(&self) -> String;
}

/// ONNX Runtime 会话
pub struct OnnxBackend {
    session: Mutex<Session>,
    input_name: String,
    output_name: String, // 动态发现的输出名称
    model_path: PathBuf,
}

impl OnnxBackend {
    pub fn load(model_path: &Path, onnx_config: &OnnxConfig) -> Result<Self> {
        if !model_path.exists() {
            return Err(AgriError::ModelLoad(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading ONNX model from: {}", model_path.display());

        let session = Session::builder()?
            .with_optimization_level(optimization_level(onnx_config.optimization_level))?
            .with_intra_threads(onnx_config.intra_threads)?
            .commit_from_file(model_path)?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => {
                return Err(AgriError::ModelLoad(format!(
                    "Model has no inputs: {}",
                    model_path.display()
                )))
            }
        };

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => {
                return Err(AgriError::ModelLoad(format!(
                    "Model has no outputs: {}",
                    model_path.display()
                )))
            }
        };

        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("{} output[{}]: '{}'", model_path.display(), i, output.name);
        }
        tracing::info!(
            "Model ready: input='{}', output='{}'",
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl InferenceBackend for OnnxBackend {
    fn run(&self, input: ArrayD<f32>) -> Result<ArrayD<f32>> {
        let input_tensor = Tensor::from_array(input)?;

        let mut session = self.session.lock();
        let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

        match outputs.get(self.output_name.as_str()) {
            Some(output) => Ok(output.try_extract_array::<f32>()?.into_owned()),
            None => {
                let available_outputs: Vec<String> =
                    outputs.keys().map(|s| s.to_string()).collect();
                Err(AgriError::Inference(format!(
                    "Output '{}' not found. Available outputs: {:?}",
                    self.output_name, available_outputs
                )))
            }
        }
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.model_path.display())
    }
}

fn optimization_level(level: i32) -> GraphOptimizationLevel {
    match level {
        i32::MIN..=0 => GraphOptimizationLevel::Disable,
        1 => GraphOptimizationLevel::Level1,
        2 => GraphOptimizationLevel::Level2,
        _ => GraphOptimizationLevel::Level3,
    }
}
