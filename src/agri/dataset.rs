use crate::utils::error::AgriError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// 数据集中只关心 Crop 与 State 两列，其余列忽略
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Crop")]
    crop: String,
    #[serde(rename = "State")]
    state: String,
}

/// 下拉框选项：数据集中出现过的作物与邦（按首次出现顺序去重）
#[derive(Debug, Clone, Default, Serialize)]
pub struct CropCatalog {
    pub crops: Vec<String>,
    pub states: Vec<String>,
}

impl CropCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgriError::ModelLoad(format!(
                "Dataset not found: {}",
                path.display()
            )));
        }

        tracing::info!("Loading crop dataset from: {}", path.display());
        let load_error =
            |e: AgriError| AgriError::ModelLoad(format!("Dataset {}: {}", path.display(), e));

        let file = std::fs::File::open(path).map_err(|e| load_error(e.into()))?;
        let catalog = Self::from_reader(file).map_err(load_error)?;

        if catalog.crops.is_empty() || catalog.states.is_empty() {
            return Err(AgriError::ModelLoad(format!(
                "Dataset {} has no Crop/State rows",
                path.display()
            )));
        }

        tracing::info!(
            "Crop dataset loaded: {} crops, {} states",
            catalog.crops.len(),
            catalog.states.len()
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let mut crops = Distinct::default();
        let mut states = Distinct::default();

        for row in csv_reader.deserialize::<CatalogRow>() {
            let row = row?;
            crops.push(row.crop);
            states.push(row.state);
        }

        Ok(Self {
            crops: crops.values,
            states: states.values,
        })
    }
}

#[derive(Default)]
struct Distinct {
    seen: HashSet<String>,
    values: Vec<String>,
}

impl Distinct {
    fn push(&mut self, value: String) {
        if self.seen.insert(value.clone()) {
            self.values.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Crop,Crop_Year,Season,State,Area,Production,Annual_Rainfall,Fertilizer,Pesticide,Yield
Arecanut,1997,Whole Year,Assam,73814,56708,2051.4,7024878.38,22882.34,0.79
Rice,1997,Kharif,Assam,607358,398311,2051.4,57802260.86,188280.98,0.42
Arecanut,1998,Whole Year,Karnataka,1000,900,3000.1,95000.0,300.0,0.9
Wheat,1999,Rabi,Punjab,5000,20000,650.0,800000.0,1500.0,4.1
Rice,2000,Kharif,Punjab,4000,12000,640.0,700000.0,1200.0,3.0
";

    #[test]
    fn options_are_distinct_in_first_seen_order() {
        let catalog = CropCatalog::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(catalog.crops, vec!["Arecanut", "Rice", "Wheat"]);
        assert_eq!(catalog.states, vec!["Assam", "Karnataka", "Punjab"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = CropCatalog::from_reader("Crop,Season\nRice,Kharif\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AgriError::Csv(_)));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = CropCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.crops.len(), 3);
    }

    #[test]
    fn malformed_csv_is_a_load_error_naming_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Crop,Season\nRice,Kharif\n").unwrap();

        let err = CropCatalog::load(file.path()).unwrap_err();
        let path = file.path().display().to_string();
        assert!(matches!(err, AgriError::ModelLoad(msg) if msg.contains(&path)));
    }

    #[test]
    fn header_only_dataset_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.lines().next().unwrap().as_bytes()).unwrap();

        let err = CropCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, AgriError::ModelLoad(msg) if msg.contains("no Crop/State rows")));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = CropCatalog::load(Path::new("/nonexistent/crop_yield.csv")).unwrap_err();
        assert!(matches!(err, AgriError::ModelLoad(_)));
    }
}
