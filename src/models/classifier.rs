use crate::agri::labels::{DiseaseLabel, LabelSet};
use crate::image::ImageTransforms;
use crate::models::backend::{InferenceBackend, OnnxBackend};
use crate::utils::error::AgriError;
use crate::{Config, Result};
use image::DynamicImage;
use ndarray::ArrayViewD;
use std::borrow::Cow;

/// 模型输入边长 (NHWC: 1 x 256 x 256 x 3)
pub const INPUT_SIZE: usize = 256;

/// 单张图像的分类结果
#[derive(Debug, Clone)]
pub struct Classification {
    pub label: DiseaseLabel,
    pub class_index: usize,
    pub score: f32,
    pub scores: Vec<f32>,
}

/// 叶片病害分类器
pub struct DiseaseClassifier {
    backend: Box<dyn InferenceBackend>,
    labels: LabelSet,
}

impl DiseaseClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        let labels_path = config.labels_path();
        let labels = if labels_path.exists() {
            tracing::info!("Loading disease labels from: {}", labels_path.display());
            LabelSet::from_file(&labels_path)?
        } else {
            LabelSet::default_classes()?
        };

        let backend = OnnxBackend::load(&config.disease_model_path(), &config.onnx_config)?;
        Ok(Self::with_backend(Box::new(backend), labels))
    }

    pub fn with_backend(backend: Box<dyn InferenceBackend>, labels: LabelSet) -> Self {
        Self { backend, labels }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn backend_description(&self) -> String {
        self.backend.describe()
    }

    /// 叶片病害分类
    pub fn classify(&self, image: &DynamicImage) -> Result<Classification> {
        // JPEG解码后通常已是RGB8，此时不复制原图
        let rgb = match image.as_rgb8() {
            Some(rgb) => Cow::Borrowed(rgb),
            None => Cow::Owned(image.to_rgb8()),
        };
        let resized = ImageTransforms::resize_to_bgr(&rgb, INPUT_SIZE, INPUT_SIZE)?;

        // 添加batch维度
        let input_tensor = ImageTransforms::to_batch(resized).into_dyn();

        let predictions = self.backend.run(input_tensor)?;
        self.parse_classification(&predictions.view())
    }

    /// 解析分类结果
    fn parse_classification(&self, predictions: &ArrayViewD<f32>) -> Result<Classification> {
        let scores: Vec<f32> = predictions.iter().copied().collect();

        let class_index = argmax(&scores).ok_or_else(|| {
            AgriError::Inference("Classification output contains no comparable scores".to_string())
        })?;

        let label = self.labels.get(class_index).cloned().ok_or_else(|| {
            AgriError::Inference(format!(
                "Class index {} out of range for {} labels",
                class_index,
                self.labels.len()
            ))
        })?;

        Ok(Classification {
            label,
            class_index,
            score: scores[class_index],
            scores,
        })
    }
}

/// 第一个最大值的索引，跳过NaN
fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((i, value)),
        }
    }

    best.map(|(i, _)| i)
}
