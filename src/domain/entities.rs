//! Dashboard entities as delivered by the trading API.
//!
//! Every field the server may omit is optional; defaults are substituted only
//! when a view model is built (see `application::format`).

use std::cmp::Ordering;

use super::value_objects::{SymbolId, Timeframe};
use serde::{Deserialize, Serialize};

/// Account summary plus open positions. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub balance: Option<f64>,
    pub daily_pnl: Option<f64>,
    pub win_rate: Option<f64>,
    pub total_trades: Option<u64>,
    pub winning_trades: Option<u64>,
    pub losing_trades: Option<u64>,
    pub positions: Vec<Position>,
    pub balance_history: Vec<BalancePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub symbol: Option<String>,
    #[serde(alias = "type")]
    pub direction: Option<String>,
    pub size: Option<f64>,
    pub pnl: Option<f64>,
    #[serde(alias = "entry")]
    pub entry_price: Option<f64>,
    #[serde(alias = "time", alias = "timestamp")]
    pub opened_at: Option<String>,
    pub timeframe: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancePoint {
    pub timestamp: Option<String>,
    pub balance: Option<f64>,
}

/// One row of `/api/symbols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolQuote {
    pub symbol: SymbolId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub timeframe: Option<String>,
}

impl SymbolQuote {
    pub fn timeframe_or_default(&self) -> Timeframe {
        Timeframe::parse_or_default(self.timeframe.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signal {
    pub symbol: Option<String>,
    pub timestamp: Option<String>,
    #[serde(alias = "type")]
    pub signal_type: Option<String>,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub timeframe: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trade {
    pub symbol: Option<String>,
    #[serde(alias = "time")]
    pub timestamp: Option<String>,
    #[serde(alias = "type")]
    pub signal_type: Option<String>,
    #[serde(alias = "size")]
    pub position_size: Option<f64>,
    pub pnl: Option<f64>,
    pub profit_potential: Option<f64>,
    pub timeframe: Option<String>,
}

/// Candle open time: epoch number or ISO-8601 label, whichever the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandleTime {
    Epoch(f64),
    Label(String),
}

impl CandleTime {
    /// Epochs compare numerically and labels lexically (ISO-8601 sorts that way); epochs go first.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Epoch(a), Self::Epoch(b)) => a.total_cmp(b),
            (Self::Label(a), Self::Label(b)) => a.cmp(b),
            (Self::Epoch(_), Self::Label(_)) => Ordering::Less,
            (Self::Label(_), Self::Epoch(_)) => Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: CandleTime,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Candles for one symbol at the timeframe they were fetched with, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    pub symbol: SymbolId,
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    /// The market-data endpoint may answer newest first; the series is kept in time order.
    pub fn new(symbol: SymbolId, timeframe: Timeframe, mut candles: Vec<Candle>) -> Self {
        candles.sort_by(|a, b| a.time.chronological_cmp(&b.time));
        Self { symbol, timeframe, candles }
    }

    pub fn first_open(&self) -> Option<f64> {
        self.candles.first().and_then(|c| c.open)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().and_then(|c| c.close)
    }

    /// `(last_close - first_open) / first_open * 100`; `None` for an empty series or a zero open.
    pub fn change_percent(&self) -> Option<f64> {
        let open = self.first_open()?;
        let close = self.last_close()?;
        if open == 0.0 {
            return None;
        }
        Some((close - open) / open * 100.0)
    }

    /// Min/max over all known prices of the series.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.candles
            .iter()
            .flat_map(|c| [c.low, c.high, c.open, c.close])
            .flatten()
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }
}

/// Latest tick from `/api/real-time-data`; most recent wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealTimeTick {
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub volume: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub timestamp: Option<String>,
}
