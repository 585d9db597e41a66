//! Thin `web-sys` adapter: applies fragment view models to the page and turns
//! clicks into [`UserAction`]s. All content is computed upstream; this module
//! only clears and rebuilds the target elements.

use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use crate::application::dispatcher::FragmentRenderer;
use crate::application::format::{NEGATIVE_CLASS, POSITIVE_CLASS};
use crate::application::view_models::{
    ChartView, FragmentView, HeaderView, PositionsView, SignalsView, SymbolListView, TickerView,
    TradeStatsView, TradesView,
};
use crate::domain::errors::{DomError, DomResult};
use crate::domain::logging::LogComponent;
use crate::domain::{SymbolId, Timeframe};
use crate::{log_debug, log_warn};

const COMPONENT: LogComponent = LogComponent::Infrastructure("DOM");

const CHART_PADDING: f64 = 10.0;
const CHART_LINE_COLOR: &str = "#3b82f6";
const CHART_TEXT_COLOR: &str = "#9ca3af";

pub fn document() -> DomResult<Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(DomError::WindowUnavailable)
}

fn js_error(err: JsValue) -> DomError {
    DomError::Js(format!("{err:?}"))
}

/// Map values onto canvas coordinates, oldest on the left, highest at the top.
/// The vertical scale is `range` when given, otherwise the values' own min/max.
pub fn chart_points(
    values: &[f64],
    range: Option<(f64, f64)>,
    width: f64,
    height: f64,
) -> Vec<(f64, f64)> {
    if values.is_empty() {
        return Vec::new();
    }
    let (min, max) = range.unwrap_or_else(|| {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    });
    let span = if max > min { max - min } else { 1.0 };
    let plot_w = (width - 2.0 * CHART_PADDING).max(0.0);
    let plot_h = (height - 2.0 * CHART_PADDING).max(0.0);
    let step = if values.len() > 1 { plot_w / (values.len() - 1) as f64 } else { 0.0 };

    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let x = CHART_PADDING + step * i as f64;
            let y = CHART_PADDING + plot_h * (1.0 - (value - min) / span);
            (x, y)
        })
        .collect()
}

fn draw_line(context: &CanvasRenderingContext2d, points: &[(f64, f64)]) {
    let Some(((x0, y0), rest)) = points.split_first() else {
        return;
    };
    context.set_stroke_style_str(CHART_LINE_COLOR);
    context.set_line_width(2.0);
    context.begin_path();
    context.move_to(*x0, *y0);
    for (x, y) in rest {
        context.line_to(*x, *y);
    }
    context.stroke();
}

/// Renders fragments into the live document.
pub struct DomRenderer {
    document: Document,
}

impl DomRenderer {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Missing elements are expected on partial pages: log and skip.
    fn find(&self, selector: &str) -> Option<Element> {
        match self.document.query_selector(selector) {
            Ok(Some(element)) => Some(element),
            Ok(None) => {
                log_debug!(COMPONENT, "{}", DomError::ElementMissing(selector.to_string()));
                None
            }
            Err(err) => {
                log_warn!(COMPONENT, "{}", js_error(err));
                None
            }
        }
    }

    fn set_text(&self, selector: &str, text: &str) {
        if let Some(element) = self.find(selector) {
            element.set_text_content(Some(text));
        }
    }

    fn set_trend(&self, selector: &str, text: &str, class: &str) -> DomResult<()> {
        let Some(element) = self.find(selector) else {
            return Ok(());
        };
        element.set_text_content(Some(text));
        let classes = element.class_list();
        classes.remove_2(POSITIVE_CLASS, NEGATIVE_CLASS).map_err(js_error)?;
        classes.add_1(class).map_err(js_error)
    }

    fn create(&self, tag: &str, class: &str, text: Option<&str>) -> DomResult<Element> {
        let element = self.document.create_element(tag).map_err(js_error)?;
        element.set_class_name(class);
        if let Some(text) = text {
            element.set_text_content(Some(text));
        }
        Ok(element)
    }

    fn row(&self, class: &str, cells: &[(&str, &str)]) -> DomResult<Element> {
        let row = self.create("div", class, None)?;
        for (cell_class, text) in cells {
            let cell = self.create("span", cell_class, Some(text))?;
            row.append_child(&cell).map_err(js_error)?;
        }
        Ok(row)
    }

    /// Replace a container's children with `rows`, or with an empty-state line.
    fn rebuild(
        &self,
        selector: &str,
        rows: Vec<Element>,
        empty_message: Option<&str>,
    ) -> DomResult<()> {
        let Some(container) = self.find(selector) else {
            return Ok(());
        };
        container.set_text_content(None);
        if let Some(message) = empty_message {
            let empty = self.create("div", "empty-state", Some(message))?;
            container.append_child(&empty).map_err(js_error)?;
            return Ok(());
        }
        for row in rows {
            container.append_child(&row).map_err(js_error)?;
        }
        Ok(())
    }

    fn render_header(&self, view: &HeaderView) -> DomResult<()> {
        self.set_text("#portfolio-balance", &view.balance);
        self.set_trend("#daily-pnl", &view.daily_pnl, view.daily_pnl_class)?;
        self.set_text("#win-rate", &view.win_rate);
        self.set_text("#live-price", &view.live_price);
        self.set_trend("#live-change", &view.live_change, view.live_change_class)
    }

    fn render_trade_stats(&self, view: &TradeStatsView) -> DomResult<()> {
        self.set_text("#total-trades", &view.total_trades);
        self.set_text("#winning-trades", &view.winning_trades);
        self.set_text("#losing-trades", &view.losing_trades);
        self.set_trend("#balance-change", &view.balance_change, view.balance_change_class)?;

        let Some((context, width, height)) = self.canvas("#balance-chart")? else {
            return Ok(());
        };
        context.clear_rect(0.0, 0.0, width, height);
        draw_line(&context, &chart_points(&view.balance_history, None, width, height));
        Ok(())
    }

    fn render_ticker(&self, view: &TickerView) -> DomResult<()> {
        let rows = view
            .items
            .iter()
            .map(|item| {
                self.row(
                    "ticker-item",
                    &[
                        ("ticker-symbol", item.symbol.as_str()),
                        ("ticker-price", item.price.as_str()),
                        (format!("ticker-change {}", item.change_class).as_str(), item.change.as_str()),
                    ],
                )
            })
            .collect::<DomResult<Vec<_>>>()?;
        self.rebuild(".ticker-feed", rows, view.empty_message)
    }

    fn render_symbol_list(&self, view: &SymbolListView) -> DomResult<()> {
        let mut rows = Vec::with_capacity(view.items.len());
        for item in &view.items {
            let class = if item.active { "symbol-item active" } else { "symbol-item" };
            let row = self.row(
                class,
                &[
                    ("symbol-name", item.symbol.as_str()),
                    ("symbol-description", item.name.as_str()),
                    ("symbol-price", item.price.as_str()),
                    (format!("symbol-change {}", item.change_class).as_str(), item.change.as_str()),
                ],
            )?;
            row.set_attribute("data-symbol", item.symbol.as_str()).map_err(js_error)?;
            rows.push(row);
        }
        self.rebuild(".symbol-selector", rows, view.empty_message)?;
        self.mark_timeframe(view.selected_timeframe.as_deref())
    }

    fn mark_timeframe(&self, selected: Option<&str>) -> DomResult<()> {
        let buttons = self
            .document
            .query_selector_all(".timeframe-selector [data-timeframe]")
            .map_err(js_error)?;
        for index in 0..buttons.length() {
            let Some(button) = buttons.item(index).and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let active = selected.is_some() && button.get_attribute("data-timeframe").as_deref() == selected;
            button.class_list().toggle_with_force("active", active).map_err(js_error)?;
        }
        Ok(())
    }

    fn render_signals(&self, view: &SignalsView) -> DomResult<()> {
        let rows = view
            .items
            .iter()
            .map(|item| {
                self.row(
                    &format!("signal-item {}", item.kind_class),
                    &[
                        ("signal-symbol", item.symbol.as_str()),
                        ("signal-type", item.kind.as_str()),
                        ("signal-entry", item.entry.as_str()),
                        ("signal-stop", format!("SL {}", item.stop_loss).as_str()),
                        ("signal-target", format!("TP {}", item.take_profit).as_str()),
                        ("signal-timeframe", item.timeframe.as_str()),
                        ("signal-time", item.timestamp.as_str()),
                    ],
                )
            })
            .collect::<DomResult<Vec<_>>>()?;
        self.rebuild(".signals-list", rows, view.empty_message)
    }

    fn render_trades(&self, view: &TradesView) -> DomResult<()> {
        let rows = view
            .items
            .iter()
            .map(|item| {
                self.row(
                    &format!("trade-item {}", item.kind_class),
                    &[
                        ("trade-symbol", item.symbol.as_str()),
                        ("trade-type", item.kind.as_str()),
                        ("trade-size", item.size.as_str()),
                        (format!("trade-pnl {}", item.pnl_class).as_str(), item.pnl.as_str()),
                        ("trade-potential", item.potential.as_str()),
                        ("trade-timeframe", item.timeframe.as_str()),
                        ("trade-time", item.timestamp.as_str()),
                    ],
                )
            })
            .collect::<DomResult<Vec<_>>>()?;
        self.rebuild(".trades-list", rows, view.empty_message)
    }

    fn render_positions(&self, view: &PositionsView) -> DomResult<()> {
        let rows = view
            .items
            .iter()
            .map(|item| {
                self.row(
                    &format!("position-item {}", item.direction_class),
                    &[
                        ("position-symbol", item.symbol.as_str()),
                        ("position-direction", item.direction.as_str()),
                        ("position-size", item.size.as_str()),
                        ("position-entry", item.entry.as_str()),
                        (format!("position-pnl {}", item.pnl_class).as_str(), item.pnl.as_str()),
                        ("position-timeframe", item.timeframe.as_str()),
                        ("position-time", item.opened_at.as_str()),
                    ],
                )
            })
            .collect::<DomResult<Vec<_>>>()?;
        self.rebuild(".positions-list", rows, view.empty_message)
    }

    /// 2d context and size of the canvas at `selector`, if the page has one.
    fn canvas(&self, selector: &str) -> DomResult<Option<(CanvasRenderingContext2d, f64, f64)>> {
        let Some(canvas) = self
            .find(selector)
            .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
        else {
            return Ok(None);
        };
        let context = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| DomError::Js("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| DomError::Js("unexpected context type".to_string()))?;
        Ok(Some((context, canvas.width() as f64, canvas.height() as f64)))
    }

    fn render_chart(&self, view: &ChartView) -> DomResult<()> {
        self.set_text("#chart-symbol", &format!("{} · {}", view.symbol, view.timeframe));
        self.set_trend("#chart-change", &view.change, view.change_class)?;

        let Some((context, width, height)) = self.canvas("#price-chart")? else {
            return Ok(());
        };
        context.clear_rect(0.0, 0.0, width, height);

        if let Some(message) = view.empty_message {
            context.set_fill_style_str(CHART_TEXT_COLOR);
            context.set_text_align("center");
            return context.fill_text(message, width / 2.0, height / 2.0).map_err(js_error);
        }

        draw_line(&context, &chart_points(&view.closes, view.price_range, width, height));

        context.set_fill_style_str(CHART_TEXT_COLOR);
        context.set_text_align("right");
        context.fill_text(&view.last_price, width - 10.0, 20.0).map_err(js_error)
    }
}

impl FragmentRenderer for DomRenderer {
    fn render(&self, view: &FragmentView) {
        let result = match view {
            FragmentView::Header(v) => self.render_header(v),
            FragmentView::TradeStats(v) => self.render_trade_stats(v),
            FragmentView::Ticker(v) => self.render_ticker(v),
            FragmentView::SymbolList(v) => self.render_symbol_list(v),
            FragmentView::Signals(v) => self.render_signals(v),
            FragmentView::Trades(v) => self.render_trades(v),
            FragmentView::Positions(v) => self.render_positions(v),
            FragmentView::Chart(v) => self.render_chart(v),
        };
        if let Err(err) = result {
            log_warn!(COMPONENT, "render failed: {}", err);
        }
    }
}

/// A click the dashboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SelectSymbol(SymbolId),
    SelectTimeframe(Timeframe),
    RefreshPortfolio,
    OpenTerminal,
}

impl UserAction {
    /// Decode the data attributes of the clicked element's nearest tagged ancestors.
    /// Unknown timeframes and actions are ignored.
    pub fn from_attributes(
        symbol: Option<&str>,
        timeframe: Option<&str>,
        action: Option<&str>,
    ) -> Option<Self> {
        if let Some(action) = action {
            return match action {
                "refresh-portfolio" => Some(Self::RefreshPortfolio),
                "open-terminal" => Some(Self::OpenTerminal),
                _ => None,
            };
        }
        if let Some(timeframe) = timeframe {
            return timeframe.trim().parse().ok().map(Self::SelectTimeframe);
        }
        symbol
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::SelectSymbol(SymbolId::from(s)))
    }

    fn from_target(target: &Element) -> Option<Self> {
        let attribute = |selector: &str, name: &str| {
            target
                .closest(selector)
                .ok()
                .flatten()
                .and_then(|element| element.get_attribute(name))
        };
        Self::from_attributes(
            attribute(".symbol-selector [data-symbol]", "data-symbol").as_deref(),
            attribute(".timeframe-selector [data-timeframe]", "data-timeframe").as_deref(),
            attribute("[data-action]", "data-action").as_deref(),
        )
    }
}

/// One delegated click listener on the document. Dropping it unbinds.
pub fn bind_actions(
    document: &Document,
    on_action: Rc<dyn Fn(UserAction)>,
) -> EventListener {
    EventListener::new(document, "click", move |event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Some(action) = UserAction::from_target(&target) {
            log_debug!(COMPONENT, "user action: {:?}", action);
            on_action(action);
        }
    })
}

/// Navigate the current tab.
pub fn navigate(path: &str) -> DomResult<()> {
    web_sys::window()
        .ok_or(DomError::WindowUnavailable)?
        .location()
        .set_href(path)
        .map_err(js_error)
}
