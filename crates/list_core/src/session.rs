use std::sync::Arc;

use rust_decimal::Decimal;
use storage::KeyValueStore;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::{
    engine::{apply, select_total, transition, Command, ListState, Outcome},
    reconcile::{self, SaveError},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum ListEvent {
    Changed { revision: u64, state: ListState },
    Saved { revision: u64 },
    SaveFailed { revision: u64, message: String },
}

enum AutosaveRequest {
    Write { revision: u64, state: ListState },
    Flush(oneshot::Sender<Result<(), SaveError>>),
}

struct Current {
    state: ListState,
    revision: u64,
}

/// Single owner of the list state. Commands are applied one at a time and every accepted change
/// is handed to a background writer without waiting for storage. Dropping the last handle lets
/// the writer drain what is queued and exit.
pub struct ShoppingList {
    current: Mutex<Current>,
    autosave: mpsc::UnboundedSender<AutosaveRequest>,
    events: broadcast::Sender<ListEvent>,
}

impl ShoppingList {
    /// Seeds from `store` and starts the autosave worker. Must be called inside a tokio runtime.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let seed = reconcile::load(store.as_ref()).await;
        let state = apply(ListState::new(), seed);

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (autosave, requests) = mpsc::unbounded_channel();
        tokio::spawn(run_autosave(store, requests, events.clone()));

        Arc::new(Self {
            current: Mutex::new(Current { state, revision: 0 }),
            autosave,
            events,
        })
    }

    pub async fn dispatch(&self, command: Command) -> Outcome {
        let command_name = command.name();
        let mut current = self.current.lock().await;
        let (next, outcome) = transition(std::mem::take(&mut current.state), command);
        current.state = next;

        if !outcome.is_changed() {
            debug!(command = command_name, "command left list unchanged");
            return outcome;
        }

        current.revision += 1;
        let revision = current.revision;
        debug!(command = command_name, revision, "applied command");

        let _ = self.events.send(ListEvent::Changed {
            revision,
            state: current.state.clone(),
        });
        // Enqueued under the lock so the writer sees snapshots in revision order.
        if self
            .autosave
            .send(AutosaveRequest::Write {
                revision,
                state: current.state.clone(),
            })
            .is_err()
        {
            warn!(revision, "autosave worker stopped; change kept in memory only");
        }
        outcome
    }

    pub async fn snapshot(&self) -> ListState {
        self.current.lock().await.state.clone()
    }

    pub async fn total(&self) -> Decimal {
        select_total(&self.current.lock().await.state)
    }

    pub async fn revision(&self) -> u64 {
        self.current.lock().await.revision
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    /// Waits for every snapshot queued so far to be written and reports the most recent write
    /// since the previous flush.
    pub async fn flush(&self) -> Result<(), SaveError> {
        let (reply, outcome) = oneshot::channel();
        self.autosave
            .send(AutosaveRequest::Flush(reply))
            .map_err(|_| SaveError::WorkerStopped)?;
        outcome.await.map_err(|_| SaveError::WorkerStopped)?
    }
}

async fn run_autosave(
    store: Arc<dyn KeyValueStore>,
    mut requests: mpsc::UnboundedReceiver<AutosaveRequest>,
    events: broadcast::Sender<ListEvent>,
) {
    let mut last_outcome: Option<Result<(), SaveError>> = None;

    while let Some(first) = requests.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = requests.try_recv() {
            batch.push(next);
        }

        let mut pending: Option<(u64, ListState)> = None;
        for request in batch {
            match request {
                AutosaveRequest::Write { revision, state } => {
                    if let Some((skipped, _)) = pending.replace((revision, state)) {
                        debug!(revision = skipped, "superseded snapshot skipped");
                    }
                }
                AutosaveRequest::Flush(reply) => {
                    if let Some((revision, state)) = pending.take() {
                        last_outcome = Some(persist(store.as_ref(), &events, revision, &state).await);
                    }
                    let _ = reply.send(last_outcome.take().unwrap_or(Ok(())));
                }
            }
        }

        if let Some((revision, state)) = pending.take() {
            last_outcome = Some(persist(store.as_ref(), &events, revision, &state).await);
        }
    }

    info!("autosave worker stopped");
}

async fn persist(
    store: &dyn KeyValueStore,
    events: &broadcast::Sender<ListEvent>,
    revision: u64,
    state: &ListState,
) -> Result<(), SaveError> {
    match reconcile::save(store, state).await {
        Ok(()) => {
            debug!(revision, "saved shopping list");
            let _ = events.send(ListEvent::Saved { revision });
            Ok(())
        }
        Err(error) => {
            warn!(revision, %error, "failed to save shopping list; in-memory state kept");
            let _ = events.send(ListEvent::SaveFailed {
                revision,
                message: error.to_string(),
            });
            Err(error)
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
