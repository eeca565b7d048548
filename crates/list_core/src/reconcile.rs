//! Load/save bridge between the persisted records and [`ListState`].

use shared::{
    domain::Item,
    protocol::{decode_items, encode_items, PURCHASED_ITEMS_KEY, SHOPPING_LIST_KEY},
};
use storage::KeyValueStore;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{Command, ListState};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("failed to write {key}: {source}")]
    Write {
        key: &'static str,
        source: anyhow::Error,
    },
}

impl PersistError {
    pub fn key(&self) -> &'static str {
        match self {
            PersistError::Encode { key, .. } | PersistError::Write { key, .. } => key,
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to persist shopping list: {}", describe(.0))]
    Records(Vec<PersistError>),
    #[error("autosave worker is not running")]
    WorkerStopped,
}

impl SaveError {
    /// Keys whose write did not land.
    pub fn failed_keys(&self) -> Vec<&'static str> {
        match self {
            SaveError::Records(failures) => failures.iter().map(PersistError::key).collect(),
            SaveError::WorkerStopped => Vec::new(),
        }
    }
}

fn describe(failures: &[PersistError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reads both records concurrently and folds them into one seeding command. A missing,
/// unreadable or malformed record seeds an empty collection.
pub async fn load<S>(store: &S) -> Command
where
    S: KeyValueStore + ?Sized,
{
    let (items, purchased_items) = futures::join!(
        store.get(SHOPPING_LIST_KEY),
        store.get(PURCHASED_ITEMS_KEY)
    );
    let items = read_record(SHOPPING_LIST_KEY, items);
    let purchased_items = read_record(PURCHASED_ITEMS_KEY, purchased_items);
    info!(
        items = items.len(),
        purchased_items = purchased_items.len(),
        "loaded shopping list"
    );

    Command::Replace {
        items: Some(items),
        purchased_items: Some(purchased_items),
    }
}

fn read_record(key: &'static str, raw: anyhow::Result<Option<String>>) -> Vec<Item> {
    match raw {
        Ok(Some(raw)) => decode_items(&raw).unwrap_or_else(|error| {
            warn!(key, %error, "discarding malformed record");
            Vec::new()
        }),
        Ok(None) => {
            debug!(key, "no persisted record");
            Vec::new()
        }
        Err(error) => {
            warn!(key, error = %format!("{error:#}"), "failed to read record; starting empty");
            Vec::new()
        }
    }
}

/// Writes both collections as independent records. Never retries and never touches `state`.
pub async fn save<S>(store: &S, state: &ListState) -> Result<(), SaveError>
where
    S: KeyValueStore + ?Sized,
{
    let (items, purchased_items) = futures::join!(
        write_record(store, SHOPPING_LIST_KEY, state.items()),
        write_record(store, PURCHASED_ITEMS_KEY, state.purchased_items())
    );

    let failures: Vec<PersistError> = [items, purchased_items]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(SaveError::Records(failures))
    }
}

async fn write_record<S>(store: &S, key: &'static str, items: &[Item]) -> Result<(), PersistError>
where
    S: KeyValueStore + ?Sized,
{
    let raw = encode_items(items).map_err(|source| PersistError::Encode { key, source })?;
    store
        .set(key, &raw)
        .await
        .map_err(|source| PersistError::Write { key, source })
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
