pub mod dom;
pub mod http;
pub mod services;

pub use dom::{DomRenderer, UserAction};
pub use http::HttpGateway;
pub use services::{BrowserTimeProvider, BrowserTimer, ConsoleLogger};
