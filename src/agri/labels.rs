use crate::utils::error::AgriError;
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// 默认病害类别（顺序与模型输出索引一致）
pub const DEFAULT_PLANT_CLASSES: [&str; 3] = [
    "Tomato-Bacterial_spot",
    "Potato-Barly blight",
    "Corn-Common_rust",
];

/// `<Plant>-<Disease>` 形式的标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseLabel {
    pub label: String,
    pub plant: String,
    pub disease: String,
}

impl DiseaseLabel {
    /// 解析标签，要求恰好一个连字符且两侧非空
    pub fn parse(raw: &str) -> Result<Self> {
        let label = raw.trim();

        if label.matches('-').count() != 1 {
            return Err(AgriError::Config(format!(
                "Label '{}' must contain exactly one '-' separator",
                label
            )));
        }

        let (plant, disease) = label
            .split_once('-')
            .ok_or_else(|| AgriError::Config(format!("Label '{}' has no separator", label)))?;

        if plant.trim().is_empty() || disease.trim().is_empty() {
            return Err(AgriError::Config(format!(
                "Label '{}' needs both a plant and a disease name",
                label
            )));
        }

        Ok(Self {
            label: label.to_string(),
            plant: plant.trim().to_string(),
            disease: disease.trim().to_string(),
        })
    }

    /// 渲染给用户的结果句子
    pub fn sentence(&self) -> String {
        format!("This is a {} leaf with {} disease.", self.plant, self.disease)
    }
}

/// 有序标签集合，索引对应模型输出
#[derive(Debug, Clone)]
pub struct LabelSet {
    labels: Vec<DiseaseLabel>,
}

impl LabelSet {
    pub fn new<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = raw
            .into_iter()
            .map(|s| DiseaseLabel::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if labels.is_empty() {
            return Err(AgriError::Config("Label set is empty".to_string()));
        }

        Ok(Self { labels })
    }

    pub fn default_classes() -> Result<Self> {
        Self::new(DEFAULT_PLANT_CLASSES)
    }

    /// 从文本文件加载（每行一个标签，忽略空行）
    pub fn from_file(path: &Path) -> Result<Self> {
        let load_error =
            |e: AgriError| AgriError::ModelLoad(format!("Labels {}: {}", path.display(), e));

        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.into()))?;
        Self::from_text(&content).map_err(load_error)
    }

    pub fn from_text(content: &str) -> Result<Self> {
        Self::new(content.lines().filter(|line| !line.trim().is_empty()))
    }

    pub fn get(&self, index: usize) -> Option<&DiseaseLabel> {
        self.labels.get(index)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiseaseLabel> {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_labels_split_into_two_parts() {
        let labels = LabelSet::default_classes().unwrap();
        assert_eq!(labels.len(), 3);

        for (label, raw) in labels.iter().zip(DEFAULT_PLANT_CLASSES) {
            let (plant, disease) = raw.split_once('-').unwrap();
            assert!(!plant.is_empty() && !disease.is_empty());
            assert_eq!(label.plant, plant);
            assert_eq!(label.disease, disease);
        }
    }

    #[test]
    fn sentence_names_plant_and_disease() {
        let label = DiseaseLabel::parse("Potato-Barly blight").unwrap();
        assert_eq!(
            label.sentence(),
            "This is a Potato leaf with Barly blight disease."
        );
    }

    #[test]
    fn rejects_malformed_labels() {
        assert!(DiseaseLabel::parse("Tomato").is_err());
        assert!(DiseaseLabel::parse("Tomato-Leaf-Mold").is_err());
        assert!(DiseaseLabel::parse("-Rust").is_err());
        assert!(DiseaseLabel::parse("Corn-").is_err());
    }

    #[test]
    fn label_file_skips_blank_lines() {
        let labels = LabelSet::from_text("Apple-Scab\n\nGrape-Black_rot\n").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get(1).unwrap().plant, "Grape");
        assert!(labels.get(2).is_none());
    }

    #[test]
    fn empty_label_file_is_rejected() {
        assert!(LabelSet::from_text("\n  \n").is_err());
    }

    #[test]
    fn malformed_label_file_is_a_load_error_naming_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "Apple-Scab\nTomato_Leaf_Mold\n").unwrap();

        let err = LabelSet::from_file(&path).unwrap_err();
        let shown = path.display().to_string();
        assert!(matches!(err, AgriError::ModelLoad(msg) if msg.contains(&shown) && msg.contains("Tomato_Leaf_Mold")));
    }
}
