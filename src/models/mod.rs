pub mod backend;
pub mod classifier;
pub mod regressor;
pub mod manager;

pub use backend::{InferenceBackend, OnnxBackend};
pub use classifier::{Classification, DiseaseClassifier};
pub use regressor::{FeatureEncoder, YieldRegressor};
pub use manager::{ModelManager, ModelStats};
