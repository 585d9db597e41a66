use derive_more::Display;

/// Failure of a single gateway round trip. Always recoverable.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum GatewayError {
    #[display(fmt = "Network Error: {}", _0)]
    Network(String),
    #[display(fmt = "Decode Error: {}", _0)]
    Decode(String),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Network(_) => "network",
            GatewayError::Decode(_) => "decode",
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConfigError {
    #[display(fmt = "interval `{}` must be greater than zero", _0)]
    InvalidInterval(&'static str),
    #[display(fmt = "limit `{}` must be greater than zero", _0)]
    InvalidLimit(&'static str),
    #[display(fmt = "malformed configuration: {}", _0)]
    Malformed(String),
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum DomError {
    #[display(fmt = "window or document not available")]
    WindowUnavailable,
    #[display(fmt = "element `{}` not found", _0)]
    ElementMissing(String),
    #[display(fmt = "browser call failed: {}", _0)]
    Js(String),
}

impl std::error::Error for DomError {}

/// Root error type surfaced at the wasm boundary.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum DashboardError {
    #[display(fmt = "{}", _0)]
    Gateway(GatewayError),
    #[display(fmt = "Configuration Error: {}", _0)]
    Config(ConfigError),
    #[display(fmt = "DOM Error: {}", _0)]
    Dom(DomError),
}

impl std::error::Error for DashboardError {}

impl From<GatewayError> for DashboardError {
    fn from(error: GatewayError) -> Self {
        DashboardError::Gateway(error)
    }
}

impl From<ConfigError> for DashboardError {
    fn from(error: ConfigError) -> Self {
        DashboardError::Config(error)
    }
}

impl From<DomError> for DashboardError {
    fn from(error: DomError) -> Self {
        DashboardError::Dom(error)
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
pub type DomResult<T> = Result<T, DomError>;
