//! Barbershop records as the API exposes them.
//!
//! These are client-side mirrors. Totals, discounts and loyalty progress are
//! computed by the server and only carried here.

mod analytics;
mod appointment;
mod catalog;
mod customer;
mod loyalty;
mod staff;

pub use analytics::{DashboardSummary, Period, ServiceRanking};
pub use appointment::{
    Appointment, AppointmentItem, AppointmentStatus, AppointmentUpdate, NewAppointment,
    NewAppointmentItem, PaymentMethod,
};
pub use catalog::{CatalogItem, CatalogItemUpdate, CatalogKind, NewCatalogItem};
pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use loyalty::LoyaltySettings;
pub use staff::{NewStaffMember, StaffMember, StaffUpdate};
