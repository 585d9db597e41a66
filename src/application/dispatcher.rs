use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use strum::{AsRefStr, EnumIter};

use super::view_models::{self, FragmentView, ViewLimits};
use crate::domain::{Category, ChangeSet, ClientStateStore, DashboardSnapshot};
use crate::log_debug;

/// Independently rendered page regions, declared in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Fragment {
    Header,
    TradeStats,
    Ticker,
    SymbolList,
    Signals,
    Trades,
    Positions,
    Chart,
}

/// Static dependency table: which fragments read a category.
pub fn fragments_for(category: Category) -> &'static [Fragment] {
    match category {
        Category::Portfolio => &[Fragment::Header, Fragment::TradeStats, Fragment::Positions],
        Category::Symbols => &[Fragment::Ticker, Fragment::SymbolList],
        Category::Signals => &[Fragment::Signals],
        Category::Trades => &[Fragment::Trades],
        Category::Candles => &[Fragment::Chart],
        Category::RealTime => &[Fragment::Header],
        Category::Selection => &[Fragment::SymbolList, Fragment::Chart],
    }
}

impl Fragment {
    pub fn build(self, snapshot: &DashboardSnapshot, limits: &ViewLimits) -> FragmentView {
        match self {
            Fragment::Header => FragmentView::Header(view_models::header_view(snapshot)),
            Fragment::TradeStats => FragmentView::TradeStats(view_models::trade_stats_view(snapshot)),
            Fragment::Ticker => FragmentView::Ticker(view_models::ticker_view(snapshot, limits)),
            Fragment::SymbolList => FragmentView::SymbolList(view_models::symbol_list_view(snapshot)),
            Fragment::Signals => FragmentView::Signals(view_models::signals_view(snapshot, limits)),
            Fragment::Trades => FragmentView::Trades(view_models::trades_view(snapshot, limits)),
            Fragment::Positions => FragmentView::Positions(view_models::positions_view(snapshot)),
            Fragment::Chart => FragmentView::Chart(view_models::chart_view(snapshot)),
        }
    }
}

/// Writes one fragment's content to the page. Must be idempotent.
pub trait FragmentRenderer {
    fn render(&self, view: &FragmentView);
}

/// Maps changed categories to fragments and re-renders each affected one once.
pub struct RenderDispatcher {
    store: Rc<RefCell<ClientStateStore>>,
    renderer: Rc<dyn FragmentRenderer>,
    limits: ViewLimits,
}

impl RenderDispatcher {
    pub fn new(
        store: Rc<RefCell<ClientStateStore>>,
        renderer: Rc<dyn FragmentRenderer>,
        limits: ViewLimits,
    ) -> Self {
        Self { store, renderer, limits }
    }

    /// Fragments touched by a change set, deduplicated and in render order.
    pub fn affected(changes: &ChangeSet) -> Vec<Fragment> {
        changes
            .iter()
            .flat_map(|category| fragments_for(category).iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Render every fragment affected by `changes` from one fresh snapshot.
    pub fn dispatch(&self, changes: &ChangeSet) -> Vec<Fragment> {
        let fragments = Self::affected(changes);
        if fragments.is_empty() {
            return fragments;
        }
        // Release the store before any renderer runs.
        let snapshot = self.store.borrow().get();
        for fragment in &fragments {
            self.renderer.render(&fragment.build(&snapshot, &self.limits));
        }
        log_debug!(
            crate::domain::logging::LogComponent::Application("Dispatcher"),
            "rendered {} fragment(s) for {} change(s)",
            fragments.len(),
            changes.len()
        );
        fragments
    }

    /// Initial paint: every fragment from whatever the store holds.
    pub fn render_all(&self) {
        use strum::IntoEnumIterator;
        let snapshot = self.store.borrow().get();
        for fragment in Fragment::iter() {
            self.renderer.render(&fragment.build(&snapshot, &self.limits));
        }
    }
}
