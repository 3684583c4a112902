//! Loyalty program settings

use serde::{Deserialize, Serialize};

/// Configuration of the visit-based discount program.
///
/// The server applies the discount; the client only edits the settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltySettings {
    /// Whether discounts are granted at all.
    pub enabled: bool,
    /// Completed visits needed to earn a discount.
    pub visits_required: u32,
    /// Discount granted, as a percentage.
    pub discount_percent: f64,
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            visits_required: 10,
            discount_percent: 10.0,
        }
    }
}
