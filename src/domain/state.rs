use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::category::{Category, ChangeSet};
use super::entities::{CandleSeries, Portfolio, RealTimeTick, Signal, SymbolQuote, Trade};
use super::value_objects::{Selection, SymbolId, Timeframe};

/// Immutable view of everything the dashboard knows.
///
/// Collections are `Arc`-shared so taking a snapshot is cheap and renderers
/// can never mutate store-owned data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub portfolio: Option<Arc<Portfolio>>,
    pub symbols: Arc<Vec<SymbolQuote>>,
    pub signals: Arc<Vec<Signal>>,
    pub trades: Arc<Vec<Trade>>,
    pub candles: Arc<HashMap<SymbolId, Arc<CandleSeries>>>,
    pub real_time: Option<Arc<RealTimeTick>>,
    pub selection: Option<Selection>,
}

impl DashboardSnapshot {
    /// Series for the current selection, only when symbol and timeframe both match.
    pub fn selected_series(&self) -> Option<&CandleSeries> {
        let selection = self.selection.as_ref()?;
        self.candles
            .get(&selection.symbol)
            .map(|series| series.as_ref())
            .filter(|series| series.timeframe == selection.timeframe)
    }
}

/// A fetched value for exactly one category slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Portfolio(Portfolio),
    Symbols(Vec<SymbolQuote>),
    Signals(Vec<Signal>),
    Trades(Vec<Trade>),
    Candles(CandleSeries),
    RealTime(RealTimeTick),
}

impl Payload {
    pub fn category(&self) -> Category {
        match self {
            Payload::Portfolio(_) => Category::Portfolio,
            Payload::Symbols(_) => Category::Symbols,
            Payload::Signals(_) => Category::Signals,
            Payload::Trades(_) => Category::Trades,
            Payload::Candles(_) => Category::Candles,
            Payload::RealTime(_) => Category::RealTime,
        }
    }
}

/// Single owner of dashboard data. All writes are synchronous, last-write-wins.
#[derive(Debug, Default)]
pub struct ClientStateStore {
    state: DashboardSnapshot,
}

impl ClientStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> DashboardSnapshot {
        self.state.clone()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.state.selection.as_ref()
    }

    /// Replace one category wholesale and report what actually changed.
    pub fn merge(&mut self, payload: Payload) -> ChangeSet {
        let mut changes = ChangeSet::new();
        let category = payload.category();
        let changed = match payload {
            Payload::Portfolio(portfolio) => {
                replace_option(&mut self.state.portfolio, portfolio)
            }
            Payload::Symbols(symbols) => {
                replace_arc(&mut self.state.symbols, dedup_symbols(symbols))
            }
            Payload::Signals(signals) => replace_arc(&mut self.state.signals, signals),
            Payload::Trades(trades) => replace_arc(&mut self.state.trades, trades),
            Payload::Candles(series) => self.merge_candles(series),
            Payload::RealTime(tick) => replace_option(&mut self.state.real_time, tick),
        };
        if changed {
            changes.insert(category);
        }
        if category == Category::Symbols && self.apply_default_selection() {
            changes.insert(Category::Selection);
        }
        changes
    }

    /// Ticker refresh: update price/change of symbols already known, keep everything else.
    pub fn merge_quotes(&mut self, quotes: Vec<SymbolQuote>) -> ChangeSet {
        if self.state.symbols.is_empty() {
            return self.merge(Payload::Symbols(quotes));
        }
        let latest: HashMap<&SymbolId, &SymbolQuote> =
            quotes.iter().map(|q| (&q.symbol, q)).collect();
        let updated: Vec<SymbolQuote> = self
            .state
            .symbols
            .iter()
            .map(|existing| match latest.get(&existing.symbol) {
                Some(quote) => SymbolQuote {
                    price: quote.price,
                    change: quote.change,
                    ..existing.clone()
                },
                None => existing.clone(),
            })
            .collect();
        if replace_arc(&mut self.state.symbols, updated) {
            ChangeSet::of(Category::Symbols)
        } else {
            ChangeSet::new()
        }
    }

    /// Returns `true` when the selection differs from the previous one.
    pub fn set_selection(&mut self, symbol: SymbolId, timeframe: Timeframe) -> bool {
        let next = Selection { symbol, timeframe };
        if self.state.selection.as_ref() == Some(&next) {
            return false;
        }
        self.state.selection = Some(next);
        true
    }

    fn merge_candles(&mut self, series: CandleSeries) -> bool {
        if self
            .state
            .candles
            .get(&series.symbol)
            .is_some_and(|current| current.as_ref() == &series)
        {
            return false;
        }
        let mut candles = (*self.state.candles).clone();
        candles.insert(series.symbol.clone(), Arc::new(series));
        self.state.candles = Arc::new(candles);
        true
    }

    fn apply_default_selection(&mut self) -> bool {
        if self.state.selection.is_some() {
            return false;
        }
        match self.state.symbols.first() {
            Some(first) => {
                self.state.selection =
                    Some(Selection::new(first.symbol.clone(), first.timeframe_or_default()));
                true
            }
            None => false,
        }
    }
}

fn replace_arc<T: PartialEq>(slot: &mut Arc<T>, next: T) -> bool {
    if slot.as_ref() == &next {
        return false;
    }
    *slot = Arc::new(next);
    true
}

fn replace_option<T: PartialEq>(slot: &mut Option<Arc<T>>, next: T) -> bool {
    if slot.as_deref() == Some(&next) {
        return false;
    }
    *slot = Some(Arc::new(next));
    true
}

/// Keep the first row per identifier, preserving server order.
fn dedup_symbols(symbols: Vec<SymbolQuote>) -> Vec<SymbolQuote> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|quote| seen.insert(quote.symbol.clone()))
        .collect()
}
