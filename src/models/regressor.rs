use crate::agri::types::{Field, YieldInput};
use crate::models::backend::{InferenceBackend, OnnxBackend};
use crate::utils::error::AgriError;
use crate::{Config, Result};
use ndarray::{Array2, ArrayD};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// 未见过的类别的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    #[default]
    Error,
    /// 编码为全零
    Ignore,
}

/// 单列特征变换
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransform {
    OneHot {
        column: Field,
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: UnknownPolicy,
    },
    Scale {
        column: Field,
        mean: f64,
        scale: f64,
    },
    Passthrough {
        column: Field,
    },
}

impl ColumnTransform {
    pub fn column(&self) -> Field {
        match self {
            ColumnTransform::OneHot { column, .. }
            | ColumnTransform::Scale { column, .. }
            | ColumnTransform::Passthrough { column } => *column,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            ColumnTransform::OneHot { categories, .. } => categories.len(),
            _ => 1,
        }
    }

    fn encode_into(&self, input: &YieldInput, features: &mut Vec<f32>) -> Result<()> {
        let value = input.value(self.column());

        match self {
            ColumnTransform::OneHot {
                column,
                categories,
                handle_unknown,
            } => {
                let category = value.as_category();
                let position = categories.iter().position(|c| *c == category);

                if position.is_none() && *handle_unknown == UnknownPolicy::Error {
                    return Err(AgriError::UnknownCategory {
                        column: column.to_string(),
                        value: category.into_owned(),
                    });
                }

                features.extend((0..categories.len()).map(|i| {
                    if Some(i) == position {
                        1.0
                    } else {
                        0.0
                    }
                }));
            }
            ColumnTransform::Scale { column, mean, scale } => {
                let x = numeric(*column, value.as_number())?;
                features.push(((x - mean) / scale) as f32);
            }
            ColumnTransform::Passthrough { column } => {
                let x = numeric(*column, value.as_number())?;
                features.push(x as f32);
            }
        }

        Ok(())
    }
}

fn numeric(column: Field, value: Option<f64>) -> Result<f64> {
    value.ok_or_else(|| {
        AgriError::Schema(format!(
            "column '{}' holds text but the encoder expects a number",
            column
        ))
    })
}

/// 特征编码器（对应训练时的列变换）
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureEncoder {
    pub columns: Vec<ColumnTransform>,
}

impl FeatureEncoder {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgriError::ModelLoad(format!(
                "Feature encoder not found: {}",
                path.display()
            )));
        }

        tracing::info!("Loading feature encoder from: {}", path.display());
        let load_error = |e: AgriError| {
            AgriError::ModelLoad(format!("Feature encoder {}: {}", path.display(), e))
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.into()))?;
        let encoder: FeatureEncoder =
            serde_json::from_str(&content).map_err(|e| load_error(e.into()))?;
        encoder.validate().map_err(load_error)?;

        tracing::info!(
            "Feature encoder ready: {} columns -> {} features",
            encoder.columns.len(),
            encoder.width()
        );
        Ok(encoder)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(AgriError::ModelLoad("Feature encoder has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for transform in &self.columns {
            if !seen.insert(transform.column()) {
                return Err(AgriError::ModelLoad(format!(
                    "Column '{}' is encoded more than once",
                    transform.column()
                )));
            }

            match transform {
                ColumnTransform::OneHot { column, categories, .. } if categories.is_empty() => {
                    return Err(AgriError::ModelLoad(format!(
                        "Column '{}' has no categories",
                        column
                    )));
                }
                ColumnTransform::Scale { column, scale, .. } if *scale == 0.0 || !scale.is_finite() => {
                    return Err(AgriError::ModelLoad(format!(
                        "Column '{}' has an invalid scale {}",
                        column, scale
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// 编码后的特征数
    pub fn width(&self) -> usize {
        self.columns.iter().map(ColumnTransform::width).sum()
    }

    /// 编码为 [1, width] 的行
    pub fn transform(&self, input: &YieldInput) -> Result<Array2<f32>> {
        let mut features = Vec::with_capacity(self.width());
        for transform in &self.columns {
            transform.encode_into(input, &mut features)?;
        }

        Array2::from_shape_vec((1, features.len()), features)
            .map_err(|e| AgriError::Internal(format!("Failed to shape feature row: {}", e)))
    }
}

/// 产量回归流水线：特征编码 + 回归模型
pub struct YieldRegressor {
    encoder: FeatureEncoder,
    backend: Box<dyn InferenceBackend>,
}

impl YieldRegressor {
    pub fn new(config: &Config) -> Result<Self> {
        let encoder = FeatureEncoder::load(&config.yield_encoder_path())?;
        let backend = OnnxBackend::load(&config.yield_model_path(), &config.onnx_config)?;
        Ok(Self::with_backend(encoder, Box::new(backend)))
    }

    pub fn with_backend(encoder: FeatureEncoder, backend: Box<dyn InferenceBackend>) -> Self {
        Self { encoder, backend }
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn backend_description(&self) -> String {
        self.backend.describe()
    }

    /// 预测单条记录的产量 (tons/ha)
    pub fn predict(&self, input: &YieldInput) -> Result<f64> {
        let features = self.encoder.transform(input)?;
        let output: ArrayD<f32> = self.backend.run(features.into_dyn())?;

        let value = output.iter().next().copied().ok_or_else(|| {
            AgriError::Schema("Regression model returned an empty output".to_string())
        })?;

        if !value.is_finite() {
            return Err(AgriError::Inference(format!(
                "Regression model returned a non-finite value: {}",
                value
            )));
        }

        Ok(value as f64)
    }
}

/// 两位小数格式
pub fn format_yield(value: f64) -> String {
    format!("{:.2}", value)
}
