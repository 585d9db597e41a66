mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Harness, candle};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use trading_dashboard_wasm::application::FetchRequest;
use trading_dashboard_wasm::application::scheduler::FetchResult;
use trading_dashboard_wasm::domain::{Category, Selection, SymbolId, Timeframe};

#[test]
fn second_request_for_same_candles_joins_the_first() {
    let mut pool = LocalPool::new();
    let h = Harness::new();
    let reply = h.gateway().candles.defer();
    let results: Rc<RefCell<Vec<FetchResult>>> = Rc::default();

    for _ in 0..2 {
        let scheduler = Rc::clone(&h.scheduler);
        let results = Rc::clone(&results);
        pool.spawner()
            .spawn_local(async move {
                let request = FetchRequest::Candles(Selection::new("BTC", Timeframe::OneHour));
                let result = scheduler.refresh(request).await;
                results.borrow_mut().push(result);
            })
            .unwrap();
    }
    pool.run_until_stalled();

    assert_eq!(h.gateway().candles.calls(), 1);
    assert_eq!(h.scheduler.in_flight_count(), 1);
    assert!(results.borrow().is_empty());

    reply.send(Ok(vec![candle(1.0, 1.0, 2.0)])).unwrap();
    pool.run_until_stalled();

    let results = results.borrow();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], results[1]);
    assert!(results[0].as_ref().unwrap().contains(Category::Candles));
    assert_eq!(h.gateway().candles.calls(), 1);
    assert_eq!(h.scheduler.in_flight_count(), 0);

    let snapshot = h.store.borrow().get();
    assert_eq!(
        snapshot.candles.get(&SymbolId::from("BTC")).map(|s| s.candles.len()),
        Some(1)
    );
}

#[test]
fn settled_fetch_does_not_absorb_later_requests() {
    let mut pool = LocalPool::new();
    let h = Harness::new();
    let request = FetchRequest::Candles(Selection::new("BTC", Timeframe::OneHour));

    pool.run_until(h.scheduler.refresh(request.clone())).unwrap();
    pool.run_until(h.scheduler.refresh(request)).unwrap();

    assert_eq!(h.gateway().candles.calls(), 2);
}

#[test]
fn different_timeframes_are_fetched_separately() {
    let mut pool = LocalPool::new();
    let h = Harness::new();
    let first = h.gateway().candles.defer();
    let second = h.gateway().candles.defer();

    let hourly = h.scheduler.refresh(FetchRequest::Candles(Selection::new("BTC", Timeframe::OneHour)));
    let daily = h.scheduler.refresh(FetchRequest::Candles(Selection::new("BTC", Timeframe::OneDay)));
    let spawner = pool.spawner();
    spawner.spawn_local(async move { let _ = hourly.await; }).unwrap();
    pool.run_until_stalled();
    spawner.spawn_local(async move { let _ = daily.await; }).unwrap();
    pool.run_until_stalled();

    assert_eq!(h.gateway().candles.calls(), 2);
    assert_eq!(h.scheduler.in_flight_count(), 2);

    first.send(Ok(Vec::new())).unwrap();
    second.send(Ok(Vec::new())).unwrap();
    pool.run_until_stalled();
    assert_eq!(h.scheduler.in_flight_count(), 0);
}
