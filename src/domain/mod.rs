//! Dashboard data model and the store that owns it.

pub mod category;
pub mod entities;
pub mod errors;
pub mod logging;
pub mod state;
pub mod value_objects;

pub use category::{Category, ChangeSet};
pub use entities::*;
pub use state::{ClientStateStore, DashboardSnapshot, Payload};
pub use value_objects::{Direction, Selection, SymbolId, Timeframe};
