pub mod notifications;
pub mod wasm_api;

pub use wasm_api::{DashboardHandle, start_dashboard};
