use std::collections::BTreeSet;
use strum::{AsRefStr, EnumIter};

/// Independently refreshed slices of dashboard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Portfolio,
    Symbols,
    Signals,
    Trades,
    Candles,
    RealTime,
    Selection,
}

/// Categories changed by one store write, iterated in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(BTreeSet<Category>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(category: Category) -> Self {
        let mut set = Self::new();
        set.insert(category);
        set
    }

    pub fn insert(&mut self, category: Category) {
        self.0.insert(category);
    }

    pub fn extend(&mut self, other: ChangeSet) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Category> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
