use std::cell::RefCell;
use std::rc::Rc;

use gloo::utils::format::JsValueSerdeExt;
use strum::IntoEnumIterator;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::notifications::ToastNotifier;
use crate::application::{
    DashboardConfig, FragmentRenderer, LogNotifier, LoopKind, Notifier, RenderDispatcher,
    SyncScheduler,
};
use crate::domain::errors::{ConfigError, DashboardError};
use crate::domain::logging::LogComponent;
use crate::domain::{ClientStateStore, SymbolId, Timeframe};
use crate::infrastructure::dom::{self, DomRenderer, UserAction};
use crate::infrastructure::http::HttpGateway;
use crate::infrastructure::services::{BrowserTimer, ConsoleLogger};
use crate::{log_error, log_info, log_warn};

const COMPONENT: LogComponent = LogComponent::Presentation("WasmApi");

fn to_js(err: impl Into<DashboardError>) -> JsValue {
    JsValue::from_str(&err.into().to_string())
}

/// `undefined` or `null` means "all defaults".
fn parse_config(value: &JsValue) -> Result<DashboardConfig, ConfigError> {
    if value.is_undefined() || value.is_null() {
        return Ok(DashboardConfig::default());
    }
    let config: DashboardConfig =
        value.into_serde().map_err(|e| ConfigError::Malformed(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Everything a running dashboard needs to react to user actions.
struct Dashboard {
    scheduler: Rc<SyncScheduler<HttpGateway>>,
    terminal_path: String,
}

impl Dashboard {
    fn perform(&self, action: UserAction) {
        match action {
            UserAction::SelectSymbol(symbol) => self.select(Some(symbol), None),
            UserAction::SelectTimeframe(timeframe) => self.select(None, Some(timeframe)),
            UserAction::RefreshPortfolio => {
                let scheduler = Rc::clone(&self.scheduler);
                spawn_local(async move {
                    let _ = scheduler.refresh_portfolio().await;
                });
            }
            UserAction::OpenTerminal => {
                if let Err(err) = dom::navigate(&self.terminal_path) {
                    log_warn!(COMPONENT, "could not open terminal: {}", err);
                }
            }
        }
    }

    fn select(&self, symbol: Option<SymbolId>, timeframe: Option<Timeframe>) {
        let scheduler = Rc::clone(&self.scheduler);
        spawn_local(async move {
            let _ = scheduler.select(symbol, timeframe).await;
        });
    }
}

/// JS-facing handle returned by `start_dashboard`.
#[wasm_bindgen]
pub struct DashboardHandle {
    dashboard: Rc<Dashboard>,
}

#[wasm_bindgen]
impl DashboardHandle {
    pub fn select_symbol(&self, symbol: String) {
        self.dashboard.perform(UserAction::SelectSymbol(SymbolId::new(symbol)));
    }

    pub fn select_timeframe(&self, timeframe: String) -> Result<(), JsValue> {
        let timeframe: Timeframe = timeframe
            .parse()
            .map_err(|_| JsValue::from_str(&format!("unknown timeframe `{timeframe}`")))?;
        self.dashboard.perform(UserAction::SelectTimeframe(timeframe));
        Ok(())
    }

    pub fn refresh_portfolio(&self) {
        self.dashboard.perform(UserAction::RefreshPortfolio);
    }
}

/// Wire store, gateway, dispatcher and scheduler, paint once, then start the polling loops.
#[wasm_bindgen]
pub fn start_dashboard(config: JsValue) -> Result<DashboardHandle, JsValue> {
    let config = parse_config(&config).map_err(|err| {
        log_error!(COMPONENT, "rejected dashboard configuration: {}", err);
        to_js(err)
    })?;
    ConsoleLogger::set_min_level(config.log_level());

    let document = dom::document().map_err(|err| {
        log_error!(COMPONENT, "cannot start without a document: {}", err);
        to_js(err)
    })?;
    let store = Rc::new(RefCell::new(ClientStateStore::new()));
    let renderer: Rc<dyn FragmentRenderer> = Rc::new(DomRenderer::new(document.clone()));
    let dispatcher = Rc::new(RenderDispatcher::new(
        Rc::clone(&store),
        renderer,
        config.view_limits(),
    ));
    let notifier: Rc<dyn Notifier> = match ToastNotifier::mount(config.notification_ttl_ms) {
        Some(toasts) => Rc::new(toasts),
        None => Rc::new(LogNotifier),
    };
    let scheduler = SyncScheduler::new(
        HttpGateway::new(&config.base_url),
        store,
        Rc::clone(&dispatcher),
        notifier,
        &config,
    );

    dispatcher.render_all();
    for kind in LoopKind::iter() {
        let run = Rc::clone(&scheduler).run_loop(kind, BrowserTimer, |task| spawn_local(task));
        spawn_local(run);
    }

    let dashboard = Rc::new(Dashboard {
        scheduler,
        terminal_path: config.terminal_path.clone(),
    });
    let clicks = Rc::clone(&dashboard);
    // Clicks stay bound for the lifetime of the page.
    dom::bind_actions(&document, Rc::new(move |action| clicks.perform(action))).forget();

    log_info!(COMPONENT, "dashboard started against `{}`", config.base_url);
    Ok(DashboardHandle { dashboard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_become_readable_strings() {
        let err: DashboardError = ConfigError::InvalidInterval("ticker_interval_ms").into();
        assert_eq!(
            err.to_string(),
            "Configuration Error: interval `ticker_interval_ms` must be greater than zero"
        );
    }
}
