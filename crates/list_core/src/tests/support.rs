use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use storage::KeyValueStore;

/// In-memory store whose reads and writes can be made to fail per key.
#[derive(Default)]
pub(crate) struct ScriptedStore {
    records: Mutex<HashMap<String, String>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    write_delay: Option<Duration>,
    writes: AtomicUsize,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_record(self, key: &str, value: &str) -> Self {
        self.records
            .lock()
            .expect("records lock")
            .insert(key.to_string(), value.to_string());
        self
    }

    pub(crate) fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub(crate) fn fail_reads(&self, key: &str) {
        self.failing_reads
            .lock()
            .expect("reads lock")
            .insert(key.to_string());
    }

    pub(crate) fn fail_writes(&self, key: &str) {
        self.failing_writes
            .lock()
            .expect("writes lock")
            .insert(key.to_string());
    }

    pub(crate) fn heal_writes(&self) {
        self.failing_writes.lock().expect("writes lock").clear();
    }

    pub(crate) fn record(&self, key: &str) -> Option<String> {
        self.records.lock().expect("records lock").get(key).cloned()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for ScriptedStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.failing_reads.lock().expect("reads lock").contains(key) {
            return Err(anyhow!("read of {key} refused"));
        }
        Ok(self.record(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing_writes.lock().expect("writes lock").contains(key) {
            return Err(anyhow!("disk full while writing {key}"));
        }
        self.records
            .lock()
            .expect("records lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
