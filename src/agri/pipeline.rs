use crate::{
    agri::advice::yield_advice,
    agri::types::{DiseaseReport, YieldInput, YieldReport},
    image::ImageLoader,
    models::{regressor::format_yield, ModelManager},
    Result,
};
use image::DynamicImage;
use std::time::Instant;

/// 预测流水线：把请求数据整理成模型需要的形状，再渲染结果
pub struct AgriPipeline;

impl AgriPipeline {
    /// 处理base64图像
    pub fn classify_base64(models: &ModelManager, base64_data: &str) -> Result<DiseaseReport> {
        let start_time = Instant::now();
        let image = ImageLoader::from_base64(base64_data)?;
        Self::classify_image(models, &image, start_time)
    }

    /// 处理上传的字节
    pub fn classify_bytes(models: &ModelManager, bytes: &[u8]) -> Result<DiseaseReport> {
        let start_time = Instant::now();
        let image = ImageLoader::from_bytes(bytes)?;
        Self::classify_image(models, &image, start_time)
    }

    fn classify_image(
        models: &ModelManager,
        image: &DynamicImage,
        start_time: Instant,
    ) -> Result<DiseaseReport> {
        let classification = models.classifier().classify(image)?;
        let processing_time = start_time.elapsed();

        tracing::info!(
            "Disease classified: label={}, score={:.4}, time={:.3}s",
            classification.label.label,
            classification.score,
            processing_time.as_secs_f32()
        );

        Ok(DiseaseReport {
            message: classification.label.sentence(),
            label: classification.label,
            class_index: classification.class_index,
            score: classification.score,
            scores: classification.scores,
            processing_time: processing_time.as_secs_f32(),
        })
    }

    /// 产量预测
    pub fn predict_yield(models: &ModelManager, input: &YieldInput) -> Result<YieldReport> {
        let start_time = Instant::now();
        let value = models.regressor().predict(input)?;
        let formatted = format_yield(value);
        let processing_time = start_time.elapsed();

        tracing::info!(
            "Yield predicted: crop={}, state={}, yield={}, time={:.3}s",
            input.crop,
            input.state,
            formatted,
            processing_time.as_secs_f32()
        );

        Ok(YieldReport {
            yield_tons_per_ha: value,
            message: format!("Estimated Crop Yield: {} tons/ha", formatted),
            formatted,
            advice: yield_advice(),
            processing_time: processing_time.as_secs_f32(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agri::dataset::CropCatalog;
    use crate::agri::labels::LabelSet;
    use crate::agri::types::sample_input;
    use crate::models::classifier::tests::FixedScores;
    use crate::models::regressor::tests::{encoder, Linear};
    use crate::models::{DiseaseClassifier, YieldRegressor};
    use crate::utils::error::AgriError;
    use crate::Config;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn models() -> ModelManager {
        let config = Config::new(
            "127.0.0.1:0".to_string(),
            "models".to_string(),
            "crop_yield.csv".to_string(),
            false,
        )
        .unwrap();
        let classifier = DiseaseClassifier::with_backend(
            Box::new(FixedScores::new(vec![0.8, 0.1, 0.1])),
            LabelSet::default_classes().unwrap(),
        );
        let mut weights = vec![0.0; 9];
        weights[2] = 0.001; // Crop_Year
        let regressor = YieldRegressor::with_backend(encoder(), Box::new(Linear { weights, bias: 0.0 }));
        ModelManager::from_parts(config, classifier, regressor, CropCatalog::default())
    }

    fn jpeg() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 180, Rgb([90, 140, 40])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn disease_report_renders_sentence() {
        let report = AgriPipeline::classify_bytes(&models(), &jpeg()).unwrap();
        assert_eq!(report.label.label, "Tomato-Bacterial_spot");
        assert_eq!(
            report.message,
            "This is a Tomato leaf with Bacterial_spot disease."
        );
    }

    #[test]
    fn yield_report_has_two_decimals_and_advice() {
        let report = AgriPipeline::predict_yield(&models(), &sample_input()).unwrap();
        assert_eq!(report.formatted, "2.01");
        assert_eq!(report.message, "Estimated Crop Yield: 2.01 tons/ha");
        assert_eq!(report.advice.len(), 2);
    }

    #[test]
    fn unseen_state_surfaces_message() {
        let mut input = sample_input();
        input.state = "Atlantis".to_string();
        let err = AgriPipeline::predict_yield(&models(), &input).unwrap_err();
        assert!(matches!(err, AgriError::UnknownCategory { .. }));
        assert!(err.to_string().contains("Atlantis"));
    }
}
