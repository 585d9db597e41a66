use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Value Object - trading symbol identifier as sent by the server (`BTC/USDT`, `AAPL`).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SymbolId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Value Object - chart timeframe
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Timeframe {
    #[strum(serialize = "1m")]
    #[serde(rename = "1m")]
    OneMinute,

    #[strum(serialize = "5m")]
    #[serde(rename = "5m")]
    FiveMinutes,

    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,

    #[strum(serialize = "30m")]
    #[serde(rename = "30m")]
    ThirtyMinutes,

    #[default]
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,

    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    FourHours,

    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    OneDay,

    #[strum(serialize = "1w")]
    #[serde(rename = "1w")]
    OneWeek,
}

impl Timeframe {
    pub fn as_query(&self) -> &str {
        self.as_ref()
    }

    /// Lenient parse used for server-provided labels; unknown or missing labels map to `1h`.
    pub fn parse_or_default(label: Option<&str>) -> Self {
        label
            .and_then(|l| Self::from_str(l.trim()).ok())
            .unwrap_or_default()
    }
}

/// The symbol + timeframe the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub symbol: SymbolId,
    pub timeframe: Timeframe,
}

impl Selection {
    pub fn new(symbol: impl Into<SymbolId>, timeframe: Timeframe) -> Self {
        Self { symbol: symbol.into(), timeframe }
    }
}

/// Trade direction derived from the free-form kind labels the server sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Direction {
    #[display(fmt = "LONG")]
    Long,
    #[display(fmt = "SHORT")]
    Short,
    #[display(fmt = "-")]
    Unknown,
}

impl Direction {
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_uppercase()).as_deref() {
            Some("LONG" | "BUY") => Self::Long,
            Some("SHORT" | "SELL") => Self::Short,
            _ => Self::Unknown,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
            Self::Unknown => "neutral",
        }
    }
}
