//! Polling loops, in-flight coalescing and stale-response protection.
//!
//! Every network round trip goes through [`SyncScheduler::refresh`]. A request
//! whose [`FetchKey`] is already in flight joins the outstanding fetch instead
//! of issuing a new one, and each fetch carries an issue ticket so a response
//! that lost the race against a newer one for the same store slot is dropped.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use derive_more::Display;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use strum::{AsRefStr, EnumIter};

use super::config::DashboardConfig;
use super::dispatcher::RenderDispatcher;
use super::gateway::DataGateway;
use super::notify::{NotificationLevel, Notifier};
use super::timer::Timer;
use crate::domain::errors::GatewayError;
use crate::domain::logging::LogComponent;
use crate::domain::{
    CandleSeries, ChangeSet, ClientStateStore, Payload, Selection, SymbolId, SymbolQuote,
    Timeframe,
};
use crate::{log_debug, log_info, log_trace, log_warn};

const COMPONENT: LogComponent = LogComponent::Application("Scheduler");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LoopKind {
    #[display(fmt = "full resync")]
    FullResync,
    #[display(fmt = "ticker")]
    Ticker,
    #[display(fmt = "real-time")]
    RealTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoopState {
    Idle,
    Fetching,
    Backoff,
}

/// What happened to one scheduled tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The loop was still fetching from its previous tick.
    Skipped,
    Completed,
    Failed(Vec<(FetchKey, GatewayError)>),
}

/// One independently timed polling loop.
#[derive(Debug)]
pub struct PollLoop {
    kind: LoopKind,
    interval: Duration,
    state: Cell<LoopState>,
    ticks: Cell<u64>,
    failures: Cell<u64>,
    last_started_ms: Cell<Option<u64>>,
}

impl PollLoop {
    pub fn new(kind: LoopKind, interval: Duration) -> Self {
        Self {
            kind,
            interval,
            state: Cell::new(LoopState::Idle),
            ticks: Cell::new(0),
            failures: Cell::new(0),
            last_started_ms: Cell::new(None),
        }
    }

    pub fn kind(&self) -> LoopKind {
        self.kind
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    pub fn failures(&self) -> u64 {
        self.failures.get()
    }

    pub fn last_started_ms(&self) -> Option<u64> {
        self.last_started_ms.get()
    }

    /// Idle or Backoff -> Fetching. Returns `false` if the loop is already fetching.
    fn begin(&self) -> bool {
        if self.state.get() == LoopState::Fetching {
            return false;
        }
        self.state.set(LoopState::Fetching);
        self.ticks.set(self.ticks.get() + 1);
        true
    }

    fn finish(&self, failed: bool) {
        if failed {
            self.failures.set(self.failures.get() + 1);
            self.state.set(LoopState::Backoff);
        } else {
            self.state.set(LoopState::Idle);
        }
    }
}

/// Coalescing key: at most one outstanding network call per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum FetchKey {
    #[display(fmt = "portfolio")]
    Portfolio,
    #[display(fmt = "symbols")]
    Symbols,
    #[display(fmt = "signals")]
    Signals,
    #[display(fmt = "trades")]
    Trades,
    #[display(fmt = "real-time")]
    RealTime,
    #[display(fmt = "candles {} {}", _0, _1)]
    Candles(SymbolId, Timeframe),
}

/// Store slot a response is written to; tickets are compared per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreSlot {
    Portfolio,
    Symbols,
    Signals,
    Trades,
    RealTime,
    Candles(SymbolId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Portfolio,
    Symbols,
    /// Ticker refresh: same endpoint as `Symbols`, merged as price/change only.
    Quotes,
    Signals,
    Trades,
    RealTime,
    Candles(Selection),
}

impl FetchRequest {
    pub fn key(&self) -> FetchKey {
        match self {
            FetchRequest::Portfolio => FetchKey::Portfolio,
            FetchRequest::Symbols | FetchRequest::Quotes => FetchKey::Symbols,
            FetchRequest::Signals => FetchKey::Signals,
            FetchRequest::Trades => FetchKey::Trades,
            FetchRequest::RealTime => FetchKey::RealTime,
            FetchRequest::Candles(selection) => {
                FetchKey::Candles(selection.symbol.clone(), selection.timeframe)
            }
        }
    }

    pub fn slot(&self) -> StoreSlot {
        match self {
            FetchRequest::Portfolio => StoreSlot::Portfolio,
            FetchRequest::Symbols | FetchRequest::Quotes => StoreSlot::Symbols,
            FetchRequest::Signals => StoreSlot::Signals,
            FetchRequest::Trades => StoreSlot::Trades,
            FetchRequest::RealTime => StoreSlot::RealTime,
            FetchRequest::Candles(selection) => StoreSlot::Candles(selection.symbol.clone()),
        }
    }
}

/// Last applied issue ticket per store slot.
#[derive(Debug, Default)]
pub struct TicketLedger {
    applied: HashMap<StoreSlot, u64>,
}

impl TicketLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `ticket` for `slot` unless a newer ticket was already applied there.
    pub fn admit(&mut self, slot: StoreSlot, ticket: u64) -> bool {
        match self.applied.get(&slot) {
            Some(&applied) if applied > ticket => false,
            _ => {
                self.applied.insert(slot, ticket);
                true
            }
        }
    }

    pub fn last_applied(&self, slot: &StoreSlot) -> Option<u64> {
        self.applied.get(slot).copied()
    }
}

pub type FetchResult = Result<ChangeSet, GatewayError>;
pub type SharedFetch = Shared<LocalBoxFuture<'static, FetchResult>>;

/// An outstanding fetch and the ticket its response will be admitted with.
/// Joining the fetch re-issues the ticket, so the response counts as the newest request.
struct InFlight {
    fetch: SharedFetch,
    ticket: Rc<Cell<u64>>,
}

enum Fetched {
    Full(Payload),
    Quotes(Vec<SymbolQuote>),
}

/// Drives gateway calls, store merges and render dispatch for the dashboard.
pub struct SyncScheduler<G: DataGateway> {
    gateway: G,
    store: Rc<RefCell<ClientStateStore>>,
    dispatcher: Rc<RenderDispatcher>,
    notifier: Rc<dyn Notifier>,
    in_flight: RefCell<HashMap<FetchKey, InFlight>>,
    next_ticket: Cell<u64>,
    ledger: RefCell<TicketLedger>,
    full_resync: PollLoop,
    ticker: PollLoop,
    real_time: PollLoop,
}

impl<G: DataGateway + 'static> SyncScheduler<G> {
    pub fn new(
        gateway: G,
        store: Rc<RefCell<ClientStateStore>>,
        dispatcher: Rc<RenderDispatcher>,
        notifier: Rc<dyn Notifier>,
        config: &DashboardConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            gateway,
            store,
            dispatcher,
            notifier,
            in_flight: RefCell::new(HashMap::new()),
            next_ticket: Cell::new(0),
            ledger: RefCell::new(TicketLedger::new()),
            full_resync: PollLoop::new(LoopKind::FullResync, config.full_resync_interval()),
            ticker: PollLoop::new(LoopKind::Ticker, config.ticker_interval()),
            real_time: PollLoop::new(LoopKind::RealTime, config.real_time_interval()),
        })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn poll_loop(&self, kind: LoopKind) -> &PollLoop {
        match kind {
            LoopKind::FullResync => &self.full_resync,
            LoopKind::Ticker => &self.ticker,
            LoopKind::RealTime => &self.real_time,
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.borrow().len()
    }

    fn issue_ticket(&self) -> u64 {
        let ticket = self.next_ticket.get() + 1;
        self.next_ticket.set(ticket);
        ticket
    }

    fn current_selection(&self) -> Option<Selection> {
        self.store.borrow().selection().cloned()
    }

    /// Fetch, merge and dispatch one category, joining an outstanding fetch for the same key.
    pub fn refresh(self: &Rc<Self>, request: FetchRequest) -> SharedFetch {
        let key = request.key();
        if let Some(pending) = self.in_flight.borrow().get(&key) {
            pending.ticket.set(self.issue_ticket());
            log_trace!(COMPONENT, "coalescing {} into in-flight fetch", key);
            return pending.fetch.clone();
        }

        let ticket = Rc::new(Cell::new(self.issue_ticket()));
        let this = Rc::clone(self);
        let admitted_with = Rc::clone(&ticket);
        let fetch = async move {
            let result = this.fetch_and_apply(&request, &admitted_with).await;
            this.in_flight.borrow_mut().remove(&request.key());
            result
        }
        .boxed_local()
        .shared();

        self.in_flight
            .borrow_mut()
            .insert(key, InFlight { fetch: fetch.clone(), ticket });
        fetch
    }

    async fn fetch_and_apply(&self, request: &FetchRequest, ticket: &Cell<u64>) -> FetchResult {
        let fetched = self.fetch(request).await?;

        let ticket = ticket.get();
        if !self.ledger.borrow_mut().admit(request.slot(), ticket) {
            log_debug!(COMPONENT, "dropping stale {} response (ticket {})", request.key(), ticket);
            return Ok(ChangeSet::new());
        }

        let changes = {
            let mut store = self.store.borrow_mut();
            match fetched {
                Fetched::Full(payload) => store.merge(payload),
                Fetched::Quotes(quotes) => store.merge_quotes(quotes),
            }
        };
        self.dispatcher.dispatch(&changes);
        Ok(changes)
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Fetched, GatewayError> {
        let gateway = &self.gateway;
        let fetched = match request {
            FetchRequest::Portfolio => Fetched::Full(Payload::Portfolio(gateway.fetch_portfolio().await?)),
            FetchRequest::Symbols => Fetched::Full(Payload::Symbols(gateway.fetch_symbols().await?)),
            FetchRequest::Quotes => Fetched::Quotes(gateway.fetch_symbols().await?),
            FetchRequest::Signals => Fetched::Full(Payload::Signals(gateway.fetch_signals().await?)),
            FetchRequest::Trades => Fetched::Full(Payload::Trades(gateway.fetch_trades().await?)),
            FetchRequest::RealTime => {
                Fetched::Full(Payload::RealTime(gateway.fetch_real_time().await?))
            }
            FetchRequest::Candles(selection) => {
                let candles = gateway.fetch_candles(&selection.symbol, selection.timeframe).await?;
                Fetched::Full(Payload::Candles(CandleSeries::new(
                    selection.symbol.clone(),
                    selection.timeframe,
                    candles,
                )))
            }
        };
        Ok(fetched)
    }

    /// Portfolio, symbols, signals and trades concurrently; candles once the
    /// symbols step has settled. Returns every failure, successful categories
    /// are already merged and rendered.
    pub async fn full_resync(self: &Rc<Self>) -> Vec<(FetchKey, GatewayError)> {
        let symbols_then_candles = async {
            let symbols = self.refresh(FetchRequest::Symbols).await;
            let candles = match self.current_selection() {
                Some(selection) => {
                    let request = FetchRequest::Candles(selection);
                    let key = request.key();
                    Some((key, self.refresh(request).await))
                }
                None => {
                    log_debug!(COMPONENT, "no selection yet, skipping candles");
                    None
                }
            };
            (symbols, candles)
        };

        let (portfolio, (symbols, candles), signals, trades) = futures::join!(
            self.refresh(FetchRequest::Portfolio),
            symbols_then_candles,
            self.refresh(FetchRequest::Signals),
            self.refresh(FetchRequest::Trades),
        );

        let mut failures = Vec::new();
        let settled = [
            (FetchKey::Portfolio, portfolio),
            (FetchKey::Symbols, symbols),
            (FetchKey::Signals, signals),
            (FetchKey::Trades, trades),
        ];
        for (key, result) in settled.into_iter().chain(candles) {
            if let Err(err) = result {
                failures.push((key, err));
            }
        }
        failures
    }

    /// Run one tick of `kind`, unless that loop is still busy with its previous tick.
    pub async fn tick(self: &Rc<Self>, kind: LoopKind, now_ms: u64) -> TickOutcome {
        let poll_loop = self.poll_loop(kind);
        if !poll_loop.begin() {
            log_trace!(COMPONENT, "{} tick skipped, previous tick still fetching", kind);
            return TickOutcome::Skipped;
        }
        poll_loop.last_started_ms.set(Some(now_ms));

        let failures = match kind {
            LoopKind::FullResync => self.full_resync().await,
            LoopKind::Ticker => self.single(FetchRequest::Quotes).await,
            LoopKind::RealTime => self.single(FetchRequest::RealTime).await,
        };

        poll_loop.finish(!failures.is_empty());
        if failures.is_empty() {
            return TickOutcome::Completed;
        }
        for (key, err) in &failures {
            self.report(kind, key, err);
        }
        TickOutcome::Failed(failures)
    }

    async fn single(self: &Rc<Self>, request: FetchRequest) -> Vec<(FetchKey, GatewayError)> {
        let key = request.key();
        match self.refresh(request).await {
            Ok(_) => Vec::new(),
            Err(err) => vec![(key, err)],
        }
    }

    fn report(&self, kind: LoopKind, key: &FetchKey, err: &GatewayError) {
        log_warn!(COMPONENT, "{} refresh of {} failed: {}", kind, key, err);
        self.notifier
            .notify(NotificationLevel::Warning, &format!("Could not refresh {}: {}", key, err));
    }

    /// Tick `kind` on a fixed schedule forever. Each tick is handed to `spawn`
    /// so a slow fetch never delays the schedule; overlapping ticks are skipped.
    pub async fn run_loop<T: Timer>(
        self: Rc<Self>,
        kind: LoopKind,
        timer: T,
        spawn: impl Fn(LocalBoxFuture<'static, ()>),
    ) {
        let interval = self.poll_loop(kind).interval();
        log_info!(COMPONENT, "starting {} loop every {}ms", kind, interval.as_millis());
        if kind != LoopKind::FullResync {
            timer.sleep(interval).await;
        }
        loop {
            let this = Rc::clone(&self);
            let now_ms = timer.now_ms();
            spawn(
                async move {
                    this.tick(kind, now_ms).await;
                }
                .boxed_local(),
            );
            timer.sleep(interval).await;
        }
    }

    /// Change the selection from a user click and load candles for it.
    ///
    /// A new symbol keeps the current timeframe; with no selection yet it
    /// starts from the symbol's own timeframe. A timeframe without any
    /// selected symbol is ignored.
    pub async fn select(
        self: &Rc<Self>,
        symbol: Option<SymbolId>,
        timeframe: Option<Timeframe>,
    ) -> FetchResult {
        let next = {
            let store = self.store.borrow();
            let current = store.selection();
            let symbol = symbol.or_else(|| current.map(|s| s.symbol.clone()));
            let Some(symbol) = symbol else {
                log_debug!(COMPONENT, "ignoring timeframe change without a selected symbol");
                return Ok(ChangeSet::new());
            };
            let timeframe = timeframe
                .or_else(|| current.map(|s| s.timeframe))
                .unwrap_or_else(|| {
                    store
                        .get()
                        .symbols
                        .iter()
                        .find(|quote| quote.symbol == symbol)
                        .map(SymbolQuote::timeframe_or_default)
                        .unwrap_or_default()
                });
            Selection::new(symbol, timeframe)
        };

        let changed = self
            .store
            .borrow_mut()
            .set_selection(next.symbol.clone(), next.timeframe);
        let mut changes = ChangeSet::new();
        if changed {
            changes.insert(crate::domain::Category::Selection);
            self.dispatcher.dispatch(&changes);
        }

        let request = FetchRequest::Candles(next);
        let key = request.key();
        match self.refresh(request).await {
            Ok(fetched) => {
                changes.extend(fetched);
                Ok(changes)
            }
            Err(err) => {
                self.report_action(&key, &err);
                Err(err)
            }
        }
    }

    /// On-demand portfolio reload from the refresh button.
    pub async fn refresh_portfolio(self: &Rc<Self>) -> FetchResult {
        let result = self.refresh(FetchRequest::Portfolio).await;
        match &result {
            Ok(_) => self.notifier.notify(NotificationLevel::Info, "Portfolio refreshed"),
            Err(err) => self.report_action(&FetchKey::Portfolio, err),
        }
        result
    }

    fn report_action(&self, key: &FetchKey, err: &GatewayError) {
        log_warn!(COMPONENT, "on-demand refresh of {} failed: {}", key, err);
        self.notifier
            .notify(NotificationLevel::Error, &format!("Could not refresh {}: {}", key, err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_rejects_older_tickets_per_slot() {
        let mut ledger = TicketLedger::new();
        assert!(ledger.admit(StoreSlot::Signals, 2));
        assert!(!ledger.admit(StoreSlot::Signals, 1));
        assert!(ledger.admit(StoreSlot::Trades, 1));
        assert!(ledger.admit(StoreSlot::Signals, 3));
        assert_eq!(ledger.last_applied(&StoreSlot::Signals), Some(3));
    }

    #[test]
    fn candles_share_slot_across_timeframes_but_not_keys() {
        let hourly = FetchRequest::Candles(Selection::new("BTC", Timeframe::OneHour));
        let daily = FetchRequest::Candles(Selection::new("BTC", Timeframe::OneDay));
        assert_ne!(hourly.key(), daily.key());
        assert_eq!(hourly.slot(), daily.slot());
        assert_eq!(FetchRequest::Quotes.key(), FetchKey::Symbols);
    }

    #[test]
    fn poll_loop_never_overlaps_itself() {
        let poll_loop = PollLoop::new(LoopKind::RealTime, Duration::from_secs(5));
        assert!(poll_loop.begin());
        assert!(!poll_loop.begin());
        poll_loop.finish(true);
        assert_eq!(poll_loop.state(), LoopState::Backoff);
        assert!(poll_loop.begin());
        poll_loop.finish(false);
        assert_eq!(poll_loop.state(), LoopState::Idle);
        assert_eq!((poll_loop.ticks(), poll_loop.failures()), (2, 1));
    }

    #[test]
    fn fetch_key_display() {
        assert_eq!(
            FetchKey::Candles(SymbolId::from("BTC/USDT"), Timeframe::FourHours).to_string(),
            "candles BTC/USDT 4h"
        );
    }
}
