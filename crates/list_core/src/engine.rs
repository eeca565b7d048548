//! Pure state transitions for the active and purchased collections.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::domain::{coerce_price, normalize_name, Item, ItemId};

/// The two collections. Values are only produced by [`apply`] and [`transition`], so an id is
/// held by at most one collection and `checked` always matches the collection holding the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState {
    items: Vec<Item>,
    purchased_items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        name: String,
        price: Option<Decimal>,
    },
    Remove {
        id: ItemId,
    },
    Edit {
        id: ItemId,
        name: String,
        price: Option<Decimal>,
    },
    Toggle {
        id: ItemId,
    },
    Replace {
        items: Option<Vec<Item>>,
        purchased_items: Option<Vec<Item>>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Edit { .. } => "edit",
            Command::Toggle { .. } => "toggle",
            Command::Replace { .. } => "replace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        self == Outcome::Changed
    }

    fn from_changed(changed: bool) -> Self {
        if changed {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }
}

pub fn apply(state: ListState, command: Command) -> ListState {
    transition(state, command).0
}

/// Applies `command` and reports whether the resulting value differs from the input.
pub fn transition(mut state: ListState, command: Command) -> (ListState, Outcome) {
    let changed = match command {
        Command::Add { name, price } => state.add(&name, price),
        Command::Remove { id } => state.remove(&id),
        Command::Edit { id, name, price } => state.edit(&id, &name, price),
        Command::Toggle { id } => state.toggle(&id),
        Command::Replace {
            items,
            purchased_items,
        } => state.replace(items.unwrap_or_default(), purchased_items.unwrap_or_default()),
    };
    (state, Outcome::from_changed(changed))
}

/// Sum of prices over the active collection only. Saturates at `Decimal::MAX`.
pub fn select_total(state: &ListState) -> Decimal {
    state
        .items
        .iter()
        .fold(Decimal::ZERO, |total, item| total.saturating_add(item.price))
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn purchased_items(&self) -> &[Item] {
        &self.purchased_items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.purchased_items.is_empty()
    }

    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        self.items
            .iter()
            .chain(self.purchased_items.iter())
            .find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.find(id).is_some()
    }

    fn add(&mut self, name: &str, price: Option<Decimal>) -> bool {
        let Some(name) = normalize_name(name) else {
            return false;
        };
        self.items
            .push(Item::new(ItemId::generate(), name, coerce_price(price)));
        true
    }

    fn remove(&mut self, id: &ItemId) -> bool {
        if let Some(index) = position(&self.items, id) {
            self.items.remove(index);
            return true;
        }
        if let Some(index) = position(&self.purchased_items, id) {
            self.purchased_items.remove(index);
            return true;
        }
        false
    }

    // Purchased items are not editable.
    fn edit(&mut self, id: &ItemId, name: &str, price: Option<Decimal>) -> bool {
        let Some(name) = normalize_name(name) else {
            return false;
        };
        let Some(item) = self.items.iter_mut().find(|item| &item.id == id) else {
            return false;
        };

        let price = price.map_or(item.price, |price| coerce_price(Some(price)));
        if item.name == name && item.price == price {
            return false;
        }
        item.name = name;
        item.price = price;
        true
    }

    fn toggle(&mut self, id: &ItemId) -> bool {
        if let Some(index) = position(&self.items, id) {
            let mut item = self.items.remove(index);
            item.checked = true;
            self.purchased_items.push(item);
            return true;
        }
        if let Some(index) = position(&self.purchased_items, id) {
            let mut item = self.purchased_items.remove(index);
            item.checked = false;
            self.items.push(item);
            return true;
        }
        false
    }

    fn replace(&mut self, items: Vec<Item>, purchased_items: Vec<Item>) -> bool {
        let mut seen = HashSet::new();
        let next = ListState {
            items: sanitize(items, false, &mut seen),
            purchased_items: sanitize(purchased_items, true, &mut seen),
        };
        if *self == next {
            return false;
        }
        *self = next;
        true
    }
}

fn position(items: &[Item], id: &ItemId) -> Option<usize> {
    items.iter().position(|item| &item.id == id)
}

/// Forces seeded entries into a shape the partition invariants accept. First occurrence of an
/// id wins, across both collections.
fn sanitize(items: Vec<Item>, checked: bool, seen: &mut HashSet<ItemId>) -> Vec<Item> {
    items
        .into_iter()
        .filter_map(|item| {
            let name = normalize_name(&item.name)?;
            if !seen.insert(item.id.clone()) {
                return None;
            }
            Some(Item {
                id: item.id,
                name,
                price: coerce_price(Some(item.price)),
                checked,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
