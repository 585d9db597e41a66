use wasm_bindgen::prelude::*;

use crate::domain::logging::LogComponent;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use presentation::{DashboardHandle, start_dashboard};

/// Start hook: panic messages to the console, logger and clock installed.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = if cfg!(debug_assertions) {
        infrastructure::ConsoleLogger::new_development()
    } else {
        infrastructure::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(console_logger));
    domain::logging::init_time_provider(Box::new(infrastructure::BrowserTimeProvider));

    crate::log_info!(LogComponent::Presentation("Initialize"), "trading dashboard module loaded");
}
