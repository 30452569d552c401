use crate::agri::advice::AdviceBlock;
use crate::agri::labels::DiseaseLabel;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::ops::RangeInclusive;

/// 固定的季节选项
pub const SEASONS: [&str; 6] = ["Kharif", "Rabi", "Whole Year", "Summer", "Winter", "Autumn"];

/// 允许的作物年份
pub const CROP_YEAR_RANGE: RangeInclusive<i32> = 1997..=2040;

/// 产量记录的列，顺序即模型训练时的列顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Crop,
    #[serde(rename = "Crop_Year")]
    CropYear,
    Season,
    State,
    Area,
    Production,
    #[serde(rename = "Annual_Rainfall")]
    AnnualRainfall,
    Fertilizer,
    Pesticide,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Crop,
        Field::CropYear,
        Field::Season,
        Field::State,
        Field::Area,
        Field::Production,
        Field::AnnualRainfall,
        Field::Fertilizer,
        Field::Pesticide,
    ];

    /// 数据集中的列名
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Crop => "Crop",
            Field::CropYear => "Crop_Year",
            Field::Season => "Season",
            Field::State => "State",
            Field::Area => "Area",
            Field::Production => "Production",
            Field::AnnualRainfall => "Annual_Rainfall",
            Field::Fertilizer => "Fertilizer",
            Field::Pesticide => "Pesticide",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// 单个字段的值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> FieldValue<'a> {
    /// 作为类别值（数值按其文本形式比较）
    pub fn as_category(&self) -> Cow<'a, str> {
        match *self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self {
            FieldValue::Number(n) => Some(n),
            FieldValue::Text(_) => None,
        }
    }
}

/// 单行产量输入记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldInput {
    #[serde(alias = "Crop")]
    pub crop: String,
    #[serde(alias = "Crop_Year")]
    pub crop_year: i32,
    #[serde(alias = "Season")]
    pub season: String,
    #[serde(alias = "State")]
    pub state: String,
    #[serde(alias = "Area")]
    pub area: f64,
    #[serde(alias = "Production")]
    pub production: f64,
    #[serde(alias = "Annual_Rainfall")]
    pub annual_rainfall: f64,
    #[serde(alias = "Fertilizer")]
    pub fertilizer: f64,
    #[serde(alias = "Pesticide")]
    pub pesticide: f64,
}

impl YieldInput {
    pub fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Crop => FieldValue::Text(&self.crop),
            Field::CropYear => FieldValue::Number(self.crop_year as f64),
            Field::Season => FieldValue::Text(&self.season),
            Field::State => FieldValue::Text(&self.state),
            Field::Area => FieldValue::Number(self.area),
            Field::Production => FieldValue::Number(self.production),
            Field::AnnualRainfall => FieldValue::Number(self.annual_rainfall),
            Field::Fertilizer => FieldValue::Number(self.fertilizer),
            Field::Pesticide => FieldValue::Number(self.pesticide),
        }
    }

    /// 检查取值范围，返回第一个问题
    pub fn check_ranges(&self) -> Result<(), String> {
        let text_fields = [
            (Field::Crop, &self.crop),
            (Field::Season, &self.season),
            (Field::State, &self.state),
        ];
        for (field, value) in text_fields {
            if value.trim().is_empty() {
                return Err(format!("{} cannot be empty", field));
            }
        }

        if !SEASONS.contains(&self.season.as_str()) {
            return Err(format!(
                "Invalid season '{}'. Supported seasons: {}",
                self.season,
                SEASONS.join(", ")
            ));
        }

        if !CROP_YEAR_RANGE.contains(&self.crop_year) {
            return Err(format!(
                "Crop_Year must be between {} and {}",
                CROP_YEAR_RANGE.start(),
                CROP_YEAR_RANGE.end()
            ));
        }

        for field in Field::ALL {
            if let Some(n) = self.value(field).as_number() {
                if !n.is_finite() || n < 0.0 {
                    return Err(format!("{} must be a non-negative number", field));
                }
            }
        }

        Ok(())
    }
}

/// 表单默认值
#[derive(Debug, Clone, Serialize)]
pub struct YieldDefaults {
    pub crop_year: i32,
    pub area: f64,
    pub production: f64,
    pub annual_rainfall: f64,
    pub fertilizer: f64,
    pub pesticide: f64,
}

impl Default for YieldDefaults {
    fn default() -> Self {
        Self {
            crop_year: *CROP_YEAR_RANGE.start(),
            area: 100.0,
            production: 100.0,
            annual_rainfall: 1000.0,
            fertilizer: 1000.0,
            pesticide: 10.0,
        }
    }
}

/// 病害检测结果
#[derive(Debug, Clone, Serialize)]
pub struct DiseaseReport {
    #[serde(flatten)]
    pub label: DiseaseLabel,
    pub class_index: usize,
    pub score: f32,
    pub scores: Vec<f32>,
    pub message: String,
    pub processing_time: f32,
}

/// 产量预测结果
#[derive(Debug, Clone, Serialize)]
pub struct YieldReport {
    pub yield_tons_per_ha: f64,
    /// 保留两位小数
    pub formatted: String,
    pub message: String,
    pub advice: Vec<AdviceBlock>,
    pub processing_time: f32,
}

#[cfg(test)]
pub(crate) fn sample_input() -> YieldInput {
    YieldInput {
        crop: "Rice".to_string(),
        crop_year: 2010,
        season: "Kharif".to_string(),
        state: "Assam".to_string(),
        area: 100.0,
        production: 250.0,
        annual_rainfall: 2051.4,
        fertilizer: 9600.0,
        pesticide: 30.0,
    }
}
