//! Shopping list state engine with storage reconciliation and autosave.

pub mod engine;
pub mod reconcile;
pub mod session;

pub use engine::{apply, select_total, transition, Command, ListState, Outcome};
pub use reconcile::{load, save, PersistError, SaveError};
pub use session::{ListEvent, ShoppingList};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
