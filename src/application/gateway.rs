use crate::domain::errors::GatewayResult;
use crate::domain::{Candle, Portfolio, RealTimeTick, Signal, SymbolId, SymbolQuote, Timeframe, Trade};

/// Remote data source: one round trip per call, no retries.
#[allow(async_fn_in_trait)]
pub trait DataGateway {
    async fn fetch_portfolio(&self) -> GatewayResult<Portfolio>;
    async fn fetch_symbols(&self) -> GatewayResult<Vec<SymbolQuote>>;
    async fn fetch_signals(&self) -> GatewayResult<Vec<Signal>>;
    async fn fetch_trades(&self) -> GatewayResult<Vec<Trade>>;
    async fn fetch_candles(&self, symbol: &SymbolId, timeframe: Timeframe) -> GatewayResult<Vec<Candle>>;
    async fn fetch_real_time(&self) -> GatewayResult<RealTimeTick>;
}
