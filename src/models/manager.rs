use crate::agri::dataset::CropCatalog;
use crate::models::{DiseaseClassifier, YieldRegressor};
use crate::utils::error::AgriError;
use crate::{Config, Result};

/// 启动时加载、进程内只读的模型集合
pub struct ModelManager {
    classifier: DiseaseClassifier,
    regressor: YieldRegressor,
    catalog: CropCatalog,
    config: Config,
}

impl ModelManager {
    /// 加载全部模型与数据集，任何一项缺失都视为启动失败
    pub fn load(config: Config) -> Result<Self> {
        tracing::info!("Initializing model manager...");

        let classifier = DiseaseClassifier::new(&config)?;
        tracing::info!(
            "Disease classifier loaded with {} labels",
            classifier.labels().len()
        );

        let regressor = YieldRegressor::new(&config)?;
        tracing::info!("Yield regressor loaded");

        let catalog = CropCatalog::load(&config.dataset_path)?;

        tracing::info!("Model manager initialized successfully");
        Ok(Self::from_parts(config, classifier, regressor, catalog))
    }

    pub fn from_parts(
        config: Config,
        classifier: DiseaseClassifier,
        regressor: YieldRegressor,
        catalog: CropCatalog,
    ) -> Self {
        Self {
            classifier,
            regressor,
            catalog,
            config,
        }
    }

    pub fn classifier(&self) -> &DiseaseClassifier {
        &self.classifier
    }

    pub fn regressor(&self) -> &YieldRegressor {
        &self.regressor
    }

    pub fn catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 模型健康检查
    pub fn health_check(&self) -> Result<()> {
        if self.classifier.labels().is_empty() {
            return Err(AgriError::ModelLoad("Disease classifier has no labels".to_string()));
        }
        if self.regressor.encoder().width() == 0 {
            return Err(AgriError::ModelLoad("Feature encoder produces no features".to_string()));
        }
        if self.catalog.crops.is_empty() || self.catalog.states.is_empty() {
            return Err(AgriError::ModelLoad("Crop dataset has no options".to_string()));
        }

        tracing::debug!("Model health check passed");
        Ok(())
    }

    pub fn get_stats(&self) -> ModelStats {
        ModelStats {
            disease_model: self.classifier.backend_description(),
            disease_labels: self
                .classifier
                .labels()
                .iter()
                .map(|l| l.label.clone())
                .collect(),
            yield_model: self.regressor.backend_description(),
            yield_features: self.regressor.encoder().width(),
            crop_options: self.catalog.crops.len(),
            state_options: self.catalog.states.len(),
            intra_threads: self.config.onnx_config.intra_threads,
            optimization_level: self.config.onnx_config.optimization_level,
        }
    }
}

/// 模型统计信息
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStats {
    pub disease_model: String,
    pub disease_labels: Vec<String>,
    pub yield_model: String,
    pub yield_features: usize,
    pub crop_options: usize,
    pub state_options: usize,
    pub intra_threads: usize,
    pub optimization_level: i32,
}
