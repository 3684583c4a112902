//! Appointments and the sales registered against them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Lifecycle of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Booked, not yet served.
    #[default]
    Scheduled,
    /// Served and paid.
    Completed,
    /// Called off.
    Cancelled,
}

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash at the counter.
    #[default]
    Cash,
    /// Debit or credit card.
    Card,
    /// Bank transfer.
    Transfer,
}

/// One line of an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentItem {
    /// Catalog entry sold.
    pub item_id: EntityId,
    /// Name at the time of sale.
    #[serde(default)]
    pub name: String,
    /// Units sold.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Price per unit charged.
    #[serde(default)]
    pub unit_price: f64,
}

const fn default_quantity() -> u32 {
    1
}

/// An appointment or walk-in sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Server id.
    pub id: EntityId,
    /// Customer served, if registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,
    /// Barber who served.
    pub barber_id: EntityId,
    /// Lines sold.
    #[serde(default)]
    pub items: Vec<AppointmentItem>,
    /// Loyalty discount applied by the server.
    #[serde(default)]
    pub discount: f64,
    /// Amount charged after discount.
    #[serde(default)]
    pub total: f64,
    /// Payment method.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Current status.
    #[serde(default)]
    pub status: AppointmentStatus,
    /// When it takes place.
    pub scheduled_at: DateTime<Utc>,
}

/// A line of a new appointment; prices come from the catalog server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointmentItem {
    /// Catalog entry.
    pub item_id: EntityId,
    /// Units.
    pub quantity: u32,
}

/// Body for registering an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    /// Customer, if registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,
    /// Barber.
    pub barber_id: EntityId,
    /// Lines.
    pub items: Vec<NewAppointmentItem>,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// When it takes place.
    pub scheduled_at: DateTime<Utc>,
}

/// Partial update of an appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    /// New time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// New payment method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}
