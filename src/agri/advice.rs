use serde::Serialize;

/// 产量预测结果旁展示的静态农艺建议
#[derive(Debug, Clone, Serialize)]
pub struct AdviceItem {
    pub title: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdviceBlock {
    pub heading: &'static str,
    pub items: Vec<AdviceItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceLink {
    pub title: &'static str,
    pub url: &'static str,
}

const IMPROVING_YIELD: [(&str, &str); 5] = [
    (
        "Water Management",
        "Ensure proper irrigation systems to avoid water stress during critical growth stages.",
    ),
    (
        "Fertilizer Application",
        "Apply fertilizers based on soil health and crop requirement. Over-fertilization can harm the soil.",
    ),
    (
        "Pest Control",
        "Use effective pest management practices to reduce damage to crops.",
    ),
    (
        "Climate Considerations",
        "Choose the right crop for the local climate and season, and consider climate change impacts.",
    ),
    (
        "Crop Rotation",
        "Practice crop rotation to maintain soil fertility and reduce pest buildup.",
    ),
];

const CROP_TYPES: [(&str, &str); 4] = [
    ("For High Rainfall Areas", "Rice, Sugarcane, Coconut."),
    ("For Drier Regions", "Sorghum, Millet, Chickpeas."),
    ("For Moderate Rainfall", "Wheat, Maize, Barley."),
    ("For Cold Regions", "Barley, Rye, Peas."),
];

const RESOURCES: [(&str, &str); 4] = [
    (
        "Government Schemes",
        "https://pib.gov.in/PressReleaseIframePage.aspx?PRID=2002012",
    ),
    ("Best Practices", "https://upagripardarshi.gov.in/Index.aspx"),
    ("Weather Forecast", "https://www.accuweather.com/"),
    (
        "Market Prices",
        "https://agmarknet.gov.in/PriceAndArrivals/CommodityDailyStateWise.aspx",
    ),
];

pub const FEEDBACK_ACK: &str = "Thank you for your feedback!";

fn block(heading: &'static str, items: &[(&'static str, &'static str)]) -> AdviceBlock {
    AdviceBlock {
        heading,
        items: items
            .iter()
            .map(|&(title, text)| AdviceItem { title, text })
            .collect(),
    }
}

/// 产量预测成功后展示的两组建议
pub fn yield_advice() -> Vec<AdviceBlock> {
    vec![
        block("Solutions to Improve Crop Yield", &IMPROVING_YIELD),
        block("Suggested Crop Types for Specific Conditions", &CROP_TYPES),
    ]
}

/// 页面底部的外部资源链接
pub fn resources() -> Vec<ResourceLink> {
    RESOURCES
        .iter()
        .map(|&(title, url)| ResourceLink { title, url })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advice_has_both_blocks() {
        let advice = yield_advice();
        assert_eq!(advice.len(), 2);
        assert_eq!(advice[0].items.len(), 5);
        assert_eq!(advice[1].items[3].text, "Barley, Rye, Peas.");
    }

    #[test]
    fn resource_links_are_absolute() {
        assert!(resources().iter().all(|r| r.url.starts_with("https://")));
    }
}
