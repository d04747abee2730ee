use crate::config::WeightsConfig;

use super::ViolationCategory;

/// Negative score applied per occurrence of each category.
///
/// Built from [`WeightsConfig`] so every category always has a weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: [f64; 6],
}

impl WeightTable {
    pub fn weight(&self, category: ViolationCategory) -> f64 {
        self.weights[category.index()]
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        WeightsConfig::default().into()
    }
}

impl From<WeightsConfig> for WeightTable {
    fn from(c: WeightsConfig) -> Self {
        Self {
            weights: [
                c.speech,
                c.mouse_off_screen,
                c.fullscreen_exit,
                c.face_missing,
                c.copy_action,
                c.multiple_faces,
            ],
        }
    }
}

impl From<&WeightsConfig> for WeightTable {
    fn from(c: &WeightsConfig) -> Self {
        c.clone().into()
    }
}
