pub mod advice;
pub mod dataset;
pub mod labels;
pub mod pipeline;
pub mod types;

pub use dataset::CropCatalog;
pub use labels::{DiseaseLabel, LabelSet};
pub use pipeline::AgriPipeline;
pub use types::{DiseaseReport, Field, YieldInput, YieldReport};
