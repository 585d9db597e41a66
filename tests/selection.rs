mod common;

use std::rc::Rc;

use common::{Harness, candle, quote};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use trading_dashboard_wasm::application::FragmentView;
use trading_dashboard_wasm::domain::{Category, Selection, SymbolId, Timeframe};

fn loaded(pool: &mut LocalPool) -> Harness {
    let h = Harness::new();
    h.gateway()
        .symbols
        .push(Ok(vec![quote("BTC", 1.0, Some("4h")), quote("ETH", 2.0, Some("1d"))]));
    pool.run_until(h.scheduler.full_resync());
    h.renderer.take();
    h
}

#[test]
fn clicking_a_symbol_keeps_the_current_timeframe() {
    let mut pool = LocalPool::new();
    let h = loaded(&mut pool);

    let changes = pool
        .run_until(h.scheduler.select(Some(SymbolId::from("ETH")), None))
        .unwrap();

    assert!(changes.contains(Category::Selection));
    assert_eq!(
        h.store.borrow().selection(),
        Some(&Selection::new("ETH", Timeframe::FourHours))
    );
    assert_eq!(
        h.gateway().candle_requests.borrow().last(),
        Some(&(SymbolId::from("ETH"), Timeframe::FourHours))
    );
}

#[test]
fn first_click_without_selection_uses_symbol_timeframe() {
    let mut pool = LocalPool::new();
    let h = Harness::new();

    pool.run_until(h.scheduler.select(Some(SymbolId::from("AAPL")), None)).unwrap();

    assert_eq!(
        h.store.borrow().selection(),
        Some(&Selection::new("AAPL", Timeframe::OneHour))
    );
}

#[test]
fn timeframe_without_symbol_is_ignored() {
    let mut pool = LocalPool::new();
    let h = Harness::new();

    let changes = pool.run_until(h.scheduler.select(None, Some(Timeframe::OneDay))).unwrap();

    assert!(changes.is_empty());
    assert!(h.store.borrow().selection().is_none());
    assert_eq!(h.gateway().candles.calls(), 0);
}

#[test]
fn chart_shows_loading_until_matching_series_arrives() {
    let mut pool = LocalPool::new();
    let h = loaded(&mut pool);
    h.gateway().candles.push(Ok(vec![candle(1.0, 10.0, 11.0)]));
    pool.run_until(h.scheduler.select(None, Some(Timeframe::OneHour))).unwrap();
    h.renderer.take();

    let reply = h.gateway().candles.defer();
    let scheduler = Rc::clone(&h.scheduler);
    pool.spawner()
        .spawn_local(async move {
            let _ = scheduler.select(None, Some(Timeframe::OneDay)).await;
        })
        .unwrap();
    pool.run_until_stalled();

    let charts: Vec<_> = h
        .renderer
        .take()
        .into_iter()
        .filter_map(|view| match view {
            FragmentView::Chart(chart) => Some(chart),
            _ => None,
        })
        .collect();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].timeframe, "1d");
    assert!(charts[0].closes.is_empty(), "1h series must not be drawn for 1d");

    reply.send(Ok(vec![candle(1.0, 10.0, 12.0)])).unwrap();
    pool.run_until_stalled();
    let chart = h
        .renderer
        .take()
        .into_iter()
        .find_map(|view| match view {
            FragmentView::Chart(chart) => Some(chart),
            _ => None,
        })
        .expect("chart re-rendered");
    assert_eq!(chart.closes, vec![12.0]);
    assert_eq!(chart.change, "20.00%");
}

#[test]
fn symbol_list_marks_selected_symbol() {
    let mut pool = LocalPool::new();
    let h = loaded(&mut pool);
    pool.run_until(h.scheduler.select(Some(SymbolId::from("ETH")), None)).unwrap();

    let list = h
        .renderer
        .take()
        .into_iter()
        .find_map(|view| match view {
            FragmentView::SymbolList(list) => Some(list),
            _ => None,
        })
        .expect("symbol list rendered");
    let active: Vec<&str> = list
        .items
        .iter()
        .filter(|item| item.active)
        .map(|item| item.symbol.as_str())
        .collect();
    assert_eq!(active, vec!["ETH"]);
    assert_eq!(list.selected_timeframe.as_deref(), Some("4h"));
}

/// Select 1h, then 1d, then 1h again while both fetches are still pending.
/// The third click joins the outstanding 1h fetch instead of issuing a new one.
fn return_to_earlier_timeframe(daily_first: bool) {
    let mut pool = LocalPool::new();
    let h = loaded(&mut pool);
    let calls_before = h.gateway().candles.calls();
    let hourly = h.gateway().candles.defer();
    let daily = h.gateway().candles.defer();

    for timeframe in [Timeframe::OneHour, Timeframe::OneDay, Timeframe::OneHour] {
        let scheduler = Rc::clone(&h.scheduler);
        pool.spawner()
            .spawn_local(async move {
                let _ = scheduler.select(None, Some(timeframe)).await;
            })
            .unwrap();
        pool.run_until_stalled();
    }
    assert_eq!(h.gateway().candles.calls() - calls_before, 2);

    let hourly_reply = Ok(vec![candle(1.0, 10.0, 11.0)]);
    let daily_reply = Ok(vec![candle(1.0, 10.0, 30.0)]);
    if daily_first {
        daily.send(daily_reply).unwrap();
        pool.run_until_stalled();
        hourly.send(hourly_reply).unwrap();
    } else {
        hourly.send(hourly_reply).unwrap();
        pool.run_until_stalled();
        daily.send(daily_reply).unwrap();
    }
    pool.run_until_stalled();

    let snapshot = h.store.borrow().get();
    assert_eq!(snapshot.selection, Some(Selection::new("BTC", Timeframe::OneHour)));
    let series = snapshot.selected_series().expect("series for the current selection");
    assert_eq!(series.last_close(), Some(11.0));

    let chart = h
        .renderer
        .take()
        .into_iter()
        .filter_map(|view| match view {
            FragmentView::Chart(chart) => Some(chart),
            _ => None,
        })
        .last()
        .expect("chart rendered");
    assert_eq!(chart.timeframe, "1h");
    assert_eq!(chart.closes, vec![11.0]);
    assert_eq!(chart.empty_message, None);
}

#[test]
fn returning_to_an_earlier_timeframe_shows_its_series_when_the_other_reply_lands_first() {
    return_to_earlier_timeframe(true);
}

#[test]
fn returning_to_an_earlier_timeframe_ignores_the_abandoned_reply() {
    return_to_earlier_timeframe(false);
}
