#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use trading_dashboard_wasm::application::{
    DashboardConfig, DataGateway, FragmentRenderer, FragmentView, NotificationLevel, Notifier,
    RenderDispatcher, SyncScheduler,
};
use trading_dashboard_wasm::domain::errors::{GatewayError, GatewayResult};
use trading_dashboard_wasm::domain::{
    Candle, CandleTime, ClientStateStore, Portfolio, RealTimeTick, Signal, SymbolId, SymbolQuote,
    Timeframe, Trade,
};

enum Reply<T> {
    Now(GatewayResult<T>),
    Later(oneshot::Receiver<GatewayResult<T>>),
}

/// Replies for one endpoint, consumed in call order. An empty script answers `Ok(T::default())`.
pub struct Script<T> {
    replies: RefCell<VecDeque<Reply<T>>>,
    calls: Cell<usize>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self { replies: RefCell::new(VecDeque::new()), calls: Cell::new(0) }
    }
}

impl<T: Default> Script<T> {
    pub fn push(&self, reply: GatewayResult<T>) {
        self.replies.borrow_mut().push_back(Reply::Now(reply));
    }

    /// The next call waits until the returned sender fires.
    pub fn defer(&self) -> oneshot::Sender<GatewayResult<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.borrow_mut().push_back(Reply::Later(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    async fn next(&self) -> GatewayResult<T> {
        self.calls.set(self.calls.get() + 1);
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            None => Ok(T::default()),
            Some(Reply::Now(result)) => result,
            Some(Reply::Later(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::Network("reply dropped".to_string()))),
        }
    }
}

#[derive(Default)]
pub struct MockGateway {
    pub portfolio: Script<Portfolio>,
    pub symbols: Script<Vec<SymbolQuote>>,
    pub signals: Script<Vec<Signal>>,
    pub trades: Script<Vec<Trade>>,
    pub candles: Script<Vec<Candle>>,
    pub real_time: Script<RealTimeTick>,
    pub candle_requests: RefCell<Vec<(SymbolId, Timeframe)>>,
}

impl DataGateway for MockGateway {
    async fn fetch_portfolio(&self) -> GatewayResult<Portfolio> {
        self.portfolio.next().await
    }

    async fn fetch_symbols(&self) -> GatewayResult<Vec<SymbolQuote>> {
        self.symbols.next().await
    }

    async fn fetch_signals(&self) -> GatewayResult<Vec<Signal>> {
        self.signals.next().await
    }

    async fn fetch_trades(&self) -> GatewayResult<Vec<Trade>> {
        self.trades.next().await
    }

    async fn fetch_candles(&self, symbol: &SymbolId, timeframe: Timeframe) -> GatewayResult<Vec<Candle>> {
        self.candle_requests.borrow_mut().push((symbol.clone(), timeframe));
        self.candles.next().await
    }

    async fn fetch_real_time(&self) -> GatewayResult<RealTimeTick> {
        self.real_time.next().await
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub rendered: RefCell<Vec<FragmentView>>,
}

impl RecordingRenderer {
    pub fn take(&self) -> Vec<FragmentView> {
        self.rendered.borrow_mut().drain(..).collect()
    }
}

impl FragmentRenderer for RecordingRenderer {
    fn render(&self, view: &FragmentView) {
        self.rendered.borrow_mut().push(view.clone());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<(NotificationLevel, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

pub struct Harness {
    pub scheduler: Rc<SyncScheduler<MockGateway>>,
    pub store: Rc<RefCell<ClientStateStore>>,
    pub dispatcher: Rc<RenderDispatcher>,
    pub renderer: Rc<RecordingRenderer>,
    pub notifier: Rc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::default())
    }

    pub fn with_config(config: DashboardConfig) -> Self {
        let store = Rc::new(RefCell::new(ClientStateStore::new()));
        let renderer = Rc::new(RecordingRenderer::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let dispatcher = Rc::new(RenderDispatcher::new(
            Rc::clone(&store),
            renderer.clone(),
            config.view_limits(),
        ));
        let scheduler = SyncScheduler::new(
            MockGateway::default(),
            Rc::clone(&store),
            Rc::clone(&dispatcher),
            notifier.clone(),
            &config,
        );
        Self { scheduler, store, dispatcher, renderer, notifier }
    }

    pub fn gateway(&self) -> &MockGateway {
        self.scheduler.gateway()
    }
}

pub fn quote(symbol: &str, price: f64, timeframe: Option<&str>) -> SymbolQuote {
    SymbolQuote {
        symbol: SymbolId::from(symbol),
        name: Some(format!("{symbol} name")),
        price: Some(price),
        change: Some(1.5),
        timeframe: timeframe.map(str::to_string),
    }
}

pub fn candle(time: f64, open: f64, close: f64) -> Candle {
    Candle {
        time: CandleTime::Epoch(time),
        open: Some(open),
        high: None,
        low: None,
        close: Some(close),
        volume: None,
    }
}
