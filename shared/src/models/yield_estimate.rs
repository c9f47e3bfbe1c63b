//! Crop yield estimate models

use serde::{Deserialize, Serialize};

/// Projected yield figures for a field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldEstimate {
    pub crop_type: CropType,
    /// Estimated current yield in tonnes per hectare
    pub current_yield: f64,
    /// Attainable yield under optimal management, >= current_yield
    pub potential_yield: f64,
    /// potential_yield - current_yield
    pub yield_gap: f64,
    /// Ordered, never empty
    pub recommendations: Vec<String>,
    /// Five-year backward-looking series, oldest first
    pub yield_history: Vec<YearPoint>,
    /// Confidence in [0, 1]
    pub accuracy: f64,
    /// Tag identifying which tier produced the estimate
    pub data_source: String,
}

/// One point of a yearly series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i32,
    pub value: f64,
}

/// Crops the dashboard projects yield for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Wheat,
    Corn,
    Soybean,
    Rice,
    Barley,
    /// Custom crop with name
    Custom(String),
}

impl Default for CropType {
    fn default() -> Self {
        CropType::Wheat
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropType::Wheat => write!(f, "Wheat"),
            CropType::Corn => write!(f, "Corn"),
            CropType::Soybean => write!(f, "Soybean"),
            CropType::Rice => write!(f, "Rice"),
            CropType::Barley => write!(f, "Barley"),
            CropType::Custom(name) => write!(f, "{}", name),
        }
    }
}
