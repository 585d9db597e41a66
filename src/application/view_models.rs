//! Pure projections from a `DashboardSnapshot` to what each page region shows.

use serde::Serialize;

use super::format::{self, MISSING_TEXT};
use crate::domain::{BalancePoint, DashboardSnapshot, Direction, Portfolio, Signal, Trade};

pub const NO_SYMBOLS: &str = "No symbols available";
pub const NO_SIGNALS: &str = "No signals yet";
pub const NO_TRADES: &str = "No trades yet";
pub const NO_POSITIONS: &str = "No open positions";
pub const NO_CHART_DATA: &str = "Loading chart data...";

/// Display caps for list fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLimits {
    pub max_list_entries: usize,
    pub max_ticker_symbols: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self { max_list_entries: 10, max_ticker_symbols: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub balance: String,
    pub daily_pnl: String,
    pub daily_pnl_class: &'static str,
    pub win_rate: String,
    pub live_price: String,
    pub live_change: String,
    pub live_change_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeStatsView {
    pub total_trades: String,
    pub winning_trades: String,
    pub losing_trades: String,
    /// Balance history, oldest first.
    pub balance_history: Vec<f64>,
    pub balance_change: String,
    pub balance_change_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerItem {
    pub symbol: String,
    pub price: String,
    pub change: String,
    pub change_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerView {
    pub items: Vec<TickerItem>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolItem {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub change_class: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolListView {
    pub items: Vec<SymbolItem>,
    pub selected_timeframe: Option<String>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalItem {
    pub symbol: String,
    pub kind: String,
    pub kind_class: &'static str,
    pub timestamp: String,
    pub entry: String,
    pub stop_loss: String,
    pub take_profit: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalsView {
    pub items: Vec<SignalItem>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeItem {
    pub symbol: String,
    pub kind: String,
    pub kind_class: &'static str,
    pub timestamp: String,
    pub size: String,
    pub pnl: String,
    pub pnl_class: &'static str,
    pub potential: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradesView {
    pub items: Vec<TradeItem>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionItem {
    pub symbol: String,
    pub direction: String,
    pub direction_class: &'static str,
    pub size: String,
    pub entry: String,
    pub pnl: String,
    pub pnl_class: &'static str,
    pub opened_at: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionsView {
    pub items: Vec<PositionItem>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub symbol: String,
    pub timeframe: String,
    pub change: String,
    pub change_class: &'static str,
    pub last_price: String,
    pub closes: Vec<f64>,
    /// Low/high over every price of the series; the canvas is scaled to it.
    pub price_range: Option<(f64, f64)>,
    pub empty_message: Option<&'static str>,
}

/// One fragment's freshly computed content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "fragment", rename_all = "snake_case")]
pub enum FragmentView {
    Header(HeaderView),
    TradeStats(TradeStatsView),
    Ticker(TickerView),
    SymbolList(SymbolListView),
    Signals(SignalsView),
    Trades(TradesView),
    Positions(PositionsView),
    Chart(ChartView),
}

fn empty_state<T>(items: &[T], message: &'static str) -> Option<&'static str> {
    items.is_empty().then_some(message)
}

pub fn header_view(snapshot: &DashboardSnapshot) -> HeaderView {
    let portfolio = snapshot.portfolio.as_deref();
    let tick = snapshot.real_time.as_deref();
    let daily_pnl = portfolio.and_then(|p| p.daily_pnl);
    let live_change = tick.and_then(|t| t.change);
    HeaderView {
        balance: format::money(portfolio.and_then(|p| p.balance)),
        daily_pnl: format::money(daily_pnl),
        daily_pnl_class: format::trend_class(daily_pnl),
        win_rate: format::whole_percent(portfolio.and_then(|p| p.win_rate)),
        live_price: format::money(tick.and_then(|t| t.price)),
        live_change: format::signed_percent(live_change),
        live_change_class: format::trend_class(live_change),
    }
}

pub fn trade_stats_view(snapshot: &DashboardSnapshot) -> TradeStatsView {
    let portfolio = snapshot.portfolio.as_deref();
    let balance_history = portfolio.map(balance_history).unwrap_or_default();
    let balance_change = match (balance_history.first(), balance_history.last()) {
        (Some(&first), Some(&last)) if first != 0.0 => Some((last - first) / first * 100.0),
        _ => None,
    };
    TradeStatsView {
        total_trades: format::count(portfolio.and_then(|p| p.total_trades)),
        winning_trades: format::count(portfolio.and_then(|p| p.winning_trades)),
        losing_trades: format::count(portfolio.and_then(|p| p.losing_trades)),
        balance_history,
        balance_change: format::signed_percent(balance_change),
        balance_change_class: format::trend_class(balance_change),
    }
}

/// Balances in time order; points without a balance are skipped, undated ones lead.
fn balance_history(portfolio: &Portfolio) -> Vec<f64> {
    let mut points: Vec<&BalancePoint> = portfolio
        .balance_history
        .iter()
        .filter(|point| point.balance.is_some())
        .collect();
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    points.iter().filter_map(|point| point.balance).collect()
}

pub fn ticker_view(snapshot: &DashboardSnapshot, limits: &ViewLimits) -> TickerView {
    let items: Vec<TickerItem> = snapshot
        .symbols
        .iter()
        .take(limits.max_ticker_symbols)
        .map(|quote| TickerItem {
            symbol: quote.symbol.to_string(),
            price: format::money(quote.price),
            change: format::signed_percent(quote.change),
            change_class: format::trend_class(quote.change),
        })
        .collect();
    let empty_message = empty_state(&items, NO_SYMBOLS);
    TickerView { items, empty_message }
}

pub fn symbol_list_view(snapshot: &DashboardSnapshot) -> SymbolListView {
    let selected = snapshot.selection.as_ref();
    let items: Vec<SymbolItem> = snapshot
        .symbols
        .iter()
        .map(|quote| SymbolItem {
            symbol: quote.symbol.to_string(),
            name: format::text(quote.name.as_deref()),
            price: format::money(quote.price),
            change: format::signed_percent(quote.change),
            change_class: format::trend_class(quote.change),
            active: selected.is_some_and(|s| s.symbol == quote.symbol),
        })
        .collect();
    let empty_message = empty_state(&items, NO_SYMBOLS);
    SymbolListView {
        items,
        selected_timeframe: selected.map(|s| s.timeframe.to_string()),
        empty_message,
    }
}

/// Newest first by timestamp label; entries without a timestamp go last, server order breaks ties.
fn most_recent<T: Clone>(
    entries: &[T],
    timestamp: impl Fn(&T) -> Option<&str>,
    limit: usize,
) -> Vec<T> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| timestamp(b).cmp(&timestamp(a)));
    sorted.truncate(limit);
    sorted
}

pub fn signals_view(snapshot: &DashboardSnapshot, limits: &ViewLimits) -> SignalsView {
    let recent = most_recent(snapshot.signals.as_slice(), |s: &Signal| s.timestamp.as_deref(), limits.max_list_entries);
    let items: Vec<SignalItem> = recent
        .iter()
        .map(|signal| {
            let direction = Direction::from_label(signal.signal_type.as_deref());
            SignalItem {
                symbol: format::text(signal.symbol.as_deref()),
                kind: format::text(signal.signal_type.as_deref()),
                kind_class: direction.css_class(),
                timestamp: format::text(signal.timestamp.as_deref()),
                entry: format::money(signal.entry_price),
                stop_loss: format::money(signal.stop_loss),
                take_profit: format::money(signal.take_profit),
                timeframe: format::text(signal.timeframe.as_deref()),
            }
        })
        .collect();
    let empty_message = empty_state(&items, NO_SIGNALS);
    SignalsView { items, empty_message }
}

pub fn trades_view(snapshot: &DashboardSnapshot, limits: &ViewLimits) -> TradesView {
    let recent = most_recent(snapshot.trades.as_slice(), |t: &Trade| t.timestamp.as_deref(), limits.max_list_entries);
    let items: Vec<TradeItem> = recent
        .iter()
        .map(|trade| TradeItem {
            symbol: format::text(trade.symbol.as_deref()),
            kind: format::text(trade.signal_type.as_deref()),
            kind_class: Direction::from_label(trade.signal_type.as_deref()).css_class(),
            timestamp: format::text(trade.timestamp.as_deref()),
            size: format::quantity(trade.position_size),
            pnl: format::money(trade.pnl),
            pnl_class: format::trend_class(trade.pnl),
            potential: format::money(trade.profit_potential),
            timeframe: format::text(trade.timeframe.as_deref()),
        })
        .collect();
    let empty_message = empty_state(&items, NO_TRADES);
    TradesView { items, empty_message }
}

pub fn positions_view(snapshot: &DashboardSnapshot) -> PositionsView {
    let items: Vec<PositionItem> = snapshot
        .portfolio
        .as_deref()
        .map(|p| p.positions.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|position| {
            let direction = Direction::from_label(position.direction.as_deref());
            PositionItem {
                symbol: format::text(position.symbol.as_deref()),
                direction: direction.to_string(),
                direction_class: direction.css_class(),
                size: format::quantity(position.size),
                entry: format::money(position.entry_price),
                pnl: format::money(position.pnl),
                pnl_class: format::trend_class(position.pnl),
                opened_at: format::text(position.opened_at.as_deref()),
                timeframe: format::text(position.timeframe.as_deref()),
            }
        })
        .collect();
    let empty_message = empty_state(&items, NO_POSITIONS);
    PositionsView { items, empty_message }
}

/// Chart content for the current selection. A series fetched for another
/// symbol or timeframe is never shown.
pub fn chart_view(snapshot: &DashboardSnapshot) -> ChartView {
    let selection = snapshot.selection.as_ref();
    let symbol = selection.map(|s| s.symbol.to_string()).unwrap_or_else(|| MISSING_TEXT.to_string());
    let timeframe =
        selection.map(|s| s.timeframe.to_string()).unwrap_or_else(|| MISSING_TEXT.to_string());

    match snapshot.selected_series().filter(|series| !series.candles.is_empty()) {
        Some(series) => {
            let change = series.change_percent();
            ChartView {
                symbol,
                timeframe,
                change: format::percent(change),
                change_class: format::trend_class(change),
                last_price: format::money(series.last_close()),
                closes: series.candles.iter().filter_map(|c| c.close).collect(),
                price_range: series.price_range(),
                empty_message: None,
            }
        }
        None => ChartView {
            symbol,
            timeframe,
            change: format::percent(None),
            change_class: format::trend_class(None),
            last_price: format::money(None),
            closes: Vec::new(),
            price_range: None,
            empty_message: Some(NO_CHART_DATA),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Candle, CandleSeries, CandleTime, ClientStateStore, Payload, Portfolio, SymbolId,
        Timeframe,
    };

    #[test]
    fn header_for_empty_snapshot_uses_defaults() {
        let view = header_view(&DashboardSnapshot::default());
        assert_eq!(view.balance, "$0.00");
        assert_eq!(view.daily_pnl, "$0.00");
        assert_eq!(view.win_rate, "0%");
        assert_eq!(view.live_price, "$0.00");
        assert_eq!(view.live_change, "+0.00%");
    }

    #[test]
    fn header_formats_portfolio() {
        let mut store = ClientStateStore::new();
        store.merge(Payload::Portfolio(Portfolio {
            balance: Some(12500.5),
            daily_pnl: Some(-42.1),
            win_rate: Some(63.0),
            ..Portfolio::default()
        }));
        let view = header_view(&store.get());
        assert_eq!(view.balance, "$12500.50");
        assert_eq!(view.daily_pnl, "$-42.10");
        assert_eq!(view.daily_pnl_class, "negative");
        assert_eq!(view.win_rate, "63%");
    }

    #[test]
    fn balance_history_is_plotted_oldest_first() {
        let point = |timestamp: &str, balance: Option<f64>| BalancePoint {
            timestamp: Some(timestamp.to_string()),
            balance,
        };
        let mut store = ClientStateStore::new();
        store.merge(Payload::Portfolio(Portfolio {
            balance_history: vec![
                point("2024-01-03T00:00:00", Some(10200.0)),
                point("2024-01-02T00:00:00", None),
                point("2024-01-02T00:00:00", Some(10100.0)),
                point("2024-01-01T00:00:00", Some(10000.0)),
            ],
            ..Portfolio::default()
        }));

        let view = trade_stats_view(&store.get());
        assert_eq!(view.balance_history, vec![10000.0, 10100.0, 10200.0]);
        assert_eq!(view.balance_change, "+2.00%");
        assert_eq!(view.balance_change_class, "positive");

        let empty = trade_stats_view(&DashboardSnapshot::default());
        assert!(empty.balance_history.is_empty());
        assert_eq!(empty.balance_change, "+0.00%");
    }

    #[test]
    fn lists_show_explicit_empty_state() {
        let snapshot = DashboardSnapshot::default();
        let limits = ViewLimits::default();
        assert_eq!(signals_view(&snapshot, &limits).empty_message, Some(NO_SIGNALS));
        assert_eq!(trades_view(&snapshot, &limits).empty_message, Some(NO_TRADES));
        assert_eq!(positions_view(&snapshot).empty_message, Some(NO_POSITIONS));
        assert_eq!(ticker_view(&snapshot, &limits).empty_message, Some(NO_SYMBOLS));
        assert_eq!(chart_view(&snapshot).empty_message, Some(NO_CHART_DATA));
    }

    #[test]
    fn chart_change_runs_from_oldest_open_to_newest_close() {
        let mut store = ClientStateStore::new();
        store.set_selection(SymbolId::from("BTC"), Timeframe::OneHour);
        let candle = |time: f64, open: f64, close: f64| Candle {
            time: CandleTime::Epoch(time),
            open: Some(open),
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        };
        store.merge(Payload::Candles(CandleSeries::new(
            SymbolId::from("BTC"),
            Timeframe::OneHour,
            vec![candle(2.0, 110.0, 90.0), candle(1.0, 100.0, 110.0)],
        )));
        let view = chart_view(&store.get());
        assert_eq!(view.change, "-10.00%");
        assert_eq!(view.change_class, "negative");
        assert_eq!(view.last_price, "$90.00");
        assert_eq!(view.closes, vec![110.0, 90.0]);
        assert_eq!(view.price_range, Some((90.0, 110.0)));
        assert_eq!(view.empty_message, None);
    }

    #[test]
    fn most_recent_sorts_descending_with_missing_last() {
        let signal = |ts: Option<&str>| Signal {
            timestamp: ts.map(str::to_string),
            ..Signal::default()
        };
        let signals = vec![signal(None), signal(Some("2024-01-01")), signal(Some("2024-03-01"))];
        let recent = most_recent(&signals, |s: &Signal| s.timestamp.as_deref(), 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp.as_deref(), Some("2024-03-01"));
        assert_eq!(recent[1].timestamp.as_deref(), Some("2024-01-01"));
    }
}
