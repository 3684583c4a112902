//! Dashboard figures

use serde::{Deserialize, Serialize};

/// Reporting window for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Today.
    Day,
    /// Last seven days.
    Week,
    /// Current month.
    #[default]
    Month,
    /// Current year.
    Year,
}

impl Period {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// A service with its sales in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRanking {
    /// Service name.
    pub name: String,
    /// Times sold.
    pub count: u32,
    /// Revenue it brought.
    pub revenue: f64,
}

/// Aggregates computed by the server for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    /// Revenue in the window.
    pub revenue: f64,
    /// Appointments completed in the window.
    pub appointments: u32,
    /// Customers registered in the window.
    pub new_customers: u32,
    /// Discounts granted by the loyalty program.
    pub loyalty_discounts: f64,
    /// Best selling services.
    pub top_services: Vec<ServiceRanking>,
}
