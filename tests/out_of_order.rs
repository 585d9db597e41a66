mod common;

use std::rc::Rc;

use common::{Harness, candle};
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use quickcheck_macros::quickcheck;
use strum::IntoEnumIterator;
use trading_dashboard_wasm::application::FetchRequest;
use trading_dashboard_wasm::application::scheduler::{StoreSlot, TicketLedger};
use trading_dashboard_wasm::domain::errors::GatewayResult;
use trading_dashboard_wasm::domain::{Candle, Selection, SymbolId, Timeframe};

/// Turn arbitrary bytes into a permutation of `0..len`.
fn completion_order(seed: &[u8], len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&i| (seed.get(i).copied().unwrap_or(0), i));
    order
}

#[quickcheck]
fn newest_issued_candles_win_regardless_of_completion_order(seed: Vec<u8>, count: u8) -> bool {
    let timeframes: Vec<Timeframe> = Timeframe::iter().collect();
    let count = 1 + count as usize % timeframes.len();

    let mut pool = LocalPool::new();
    let h = Harness::new();
    let spawner = pool.spawner();

    // Issue one request per timeframe, strictly in order, each left pending.
    let mut replies: Vec<oneshot::Sender<GatewayResult<Vec<Candle>>>> = Vec::new();
    for timeframe in timeframes.iter().take(count) {
        replies.push(h.gateway().candles.defer());
        let scheduler = Rc::clone(&h.scheduler);
        let request = FetchRequest::Candles(Selection::new("BTC", *timeframe));
        spawner
            .spawn_local(async move {
                let _ = scheduler.refresh(request).await;
            })
            .unwrap();
        pool.run_until_stalled();
    }

    let mut replies: Vec<Option<_>> = replies.into_iter().map(Some).collect();
    for index in completion_order(&seed, count) {
        if let Some(reply) = replies[index].take() {
            let close = index as f64;
            let _ = reply.send(Ok(vec![candle(1.0, 1.0, close)]));
        }
        pool.run_until_stalled();
    }

    let snapshot = h.store.borrow().get();
    let series = match snapshot.candles.get(&SymbolId::from("BTC")) {
        Some(series) => series,
        None => return false,
    };
    series.timeframe == timeframes[count - 1] && series.last_close() == Some((count - 1) as f64)
}

#[quickcheck]
fn ledger_keeps_the_highest_ticket(tickets: Vec<u16>) -> bool {
    let mut ledger = TicketLedger::new();
    for ticket in &tickets {
        ledger.admit(StoreSlot::Trades, *ticket as u64);
    }
    ledger.last_applied(&StoreSlot::Trades) == tickets.iter().max().map(|t| *t as u64)
}

#[test]
fn stale_response_is_dropped() {
    let mut pool = LocalPool::new();
    let h = Harness::new();
    let spawner = pool.spawner();
    let older = h.gateway().candles.defer();
    let newer = h.gateway().candles.defer();

    for timeframe in [Timeframe::OneHour, Timeframe::OneDay] {
        let scheduler = Rc::clone(&h.scheduler);
        spawner
            .spawn_local(async move {
                let _ = scheduler
                    .refresh(FetchRequest::Candles(Selection::new("BTC", timeframe)))
                    .await;
            })
            .unwrap();
        pool.run_until_stalled();
    }

    newer.send(Ok(vec![candle(1.0, 1.0, 2.0)])).unwrap();
    pool.run_until_stalled();
    older.send(Ok(vec![candle(1.0, 1.0, 1.0)])).unwrap();
    pool.run_until_stalled();

    let snapshot = h.store.borrow().get();
    let series = snapshot.candles.get(&SymbolId::from("BTC")).unwrap();
    assert_eq!(series.timeframe, Timeframe::OneDay);
    assert_eq!(series.last_close(), Some(2.0));
}
