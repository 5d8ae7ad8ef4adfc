use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single crop suggestion as returned by the model (e.g., "Maize", 90% suitable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    /// Crop name, e.g. "Maize", "Cassava"
    pub name: String,
    /// Suitability score from 0 to 100
    pub suitability: f64,
    /// Planting window, e.g. "March - May"
    pub planting_time: String,
    /// Harvest window, e.g. "July - September"
    pub harvest_time: String,
    /// "Low", "Medium" or "High"
    pub water_needs: String,
    /// Temperature range, e.g. "20°C - 30°C"
    pub temp_range: String,
    /// Preferred soil, e.g. "Loamy"
    pub soil_type: String,
    /// Preferred pH range, e.g. "5.5 - 7.0"
    #[serde(rename = "pHRange")]
    pub ph_range: String,
    /// Days from planting to harvest
    pub growth_duration: u32,
    /// Relative profitability on a 0-5 scale
    pub profitability_index: f64,
    /// Free-text agronomy tips
    #[serde(default)]
    pub additional_tips: String,
}

/// Farm details submitted for a crop recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CropRequest {
    /// State or region, e.g. "kano"
    pub location: String,
    /// Soil type, e.g. "loamy"
    pub soil_type: String,
    /// Typical temperature, free text (e.g. "28°C")
    pub temperature: String,
    /// Rainfall level, e.g. "medium (800-1500mm/year)"
    pub rainfall: String,
    /// What the farmer is optimizing for, e.g. "food security", "profit"
    pub farming_goal: String,
    /// Soil pH measured on a 0-14 scale
    #[serde(default)]
    pub soil_ph: Option<f64>,
    /// Farm size in hectares
    #[serde(default)]
    pub farm_size_hectares: Option<f64>,
}

impl CropRequest {
    /// Names of required fields that are empty or whitespace-only, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("location", &self.location),
            ("soilType", &self.soil_type),
            ("temperature", &self.temperature),
            ("rainfall", &self.rainfall),
            ("farmingGoal", &self.farming_goal),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Management guidance for one pest, the input record of the guide formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PestGuide {
    /// Common name, e.g. "Fall Armyworm"
    pub name: String,
    /// Binomial name, e.g. "Spodoptera frugiperda"
    pub scientific_name: String,
    /// Crop the guide was requested for, e.g. "Maize"
    pub affected_crop: String,
    /// Expected yield loss without control, as a percentage
    pub severity: f64,
    /// How to recognise the pest and its damage
    pub description: String,
    pub strategies: PestStrategies,
}

/// Control strategies grouped by approach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PestStrategies {
    pub organic: Vec<String>,
    pub chemical: Vec<String>,
    pub prevention: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_recommendation_uses_model_field_names() {
        let raw = r#"{
            "name": "Cassava",
            "suitability": 85,
            "plantingTime": "April - June",
            "harvestTime": "October - December",
            "waterNeeds": "Low",
            "tempRange": "22°C - 35°C",
            "soilType": "Sandy Loam",
            "pHRange": "5.0 - 6.5",
            "growthDuration": 180,
            "profitabilityIndex": 4.5,
            "additionalTips": "Ideal for food security and industrial use."
        }"#;
        let crop: CropRecommendation = serde_json::from_str(raw).unwrap();
        assert_eq!(crop.ph_range, "5.0 - 6.5");
        assert_eq!(crop.growth_duration, 180);
    }

    #[test]
    fn missing_fields_lists_blank_values() {
        let request = CropRequest {
            location: "kano".to_string(),
            soil_type: "  ".to_string(),
            temperature: "30".to_string(),
            ..Default::default()
        };
        assert_eq!(
            request.missing_fields(),
            vec!["soilType", "rainfall", "farmingGoal"]
        );
    }
}
