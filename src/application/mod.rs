pub mod config;
pub mod dispatcher;
pub mod format;
pub mod gateway;
pub mod notify;
pub mod scheduler;
pub mod timer;
pub mod view_models;

pub use config::DashboardConfig;
pub use dispatcher::{Fragment, FragmentRenderer, RenderDispatcher};
pub use gateway::DataGateway;
pub use notify::{LogNotifier, NotificationLevel, Notifier};
pub use scheduler::{FetchKey, FetchRequest, LoopKind, LoopState, SyncScheduler, TickOutcome};
pub use timer::{ManualTimer, Timer};
pub use view_models::{FragmentView, ViewLimits};
