//! Store runtime: command loop, handle, and persistence worker.

use std::sync::Arc;

use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};

use crate::{
    core::store::{ProfileFilter, ProfileStore},
    persist::{PersistError, PersistedStateV1, StateSink},
    profile::{ProfileDraft, ProfilePatch, ProfileRecord},
    types::{ProfileId, Revision},
};

use super::events::ProfileEvent;

/// Errors surfaced by [`ProfileLogHandle`] calls.
#[derive(Debug)]
pub enum RuntimeError {
    /// Persistence failure (including queue pressure).
    Persist(PersistError),
    /// The runtime loop is gone.
    ChannelClosed,
}

impl From<PersistError> for RuntimeError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

/// Tuning for the runtime's persistence behavior.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Write the snapshot as soon as a mutation queues one.
    pub flush_on_mutation: bool,
    /// Deadline for coalesced writes when not flushing eagerly.
    pub coalesce_max_latency_ms: u64,
    /// Bound of the runtime → persistence queue.
    pub persist_queue_bound: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_on_mutation: true,
            coalesce_max_latency_ms: 75,
            persist_queue_bound: 64,
        }
    }
}

/// Handle to the single-writer store runtime.
pub struct ProfileLogHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ProfileEvent>,
}

impl Clone for ProfileLogHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Create {
        draft: ProfileDraft,
        resp: oneshot::Sender<Result<ProfileId, RuntimeError>>,
    },
    Update {
        id: ProfileId,
        patch: ProfilePatch,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Delete {
        id: ProfileId,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    BeginEdit {
        id: ProfileId,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    CancelEdit {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Get {
        id: ProfileId,
        resp: oneshot::Sender<Option<ProfileRecord>>,
    },
    List {
        resp: oneshot::Sender<Vec<ProfileRecord>>,
    },
    Filtered {
        filter: ProfileFilter,
        resp: oneshot::Sender<Vec<ProfileRecord>>,
    },
    EditingRecord {
        resp: oneshot::Sender<Option<ProfileRecord>>,
    },
    Flush {
        resp: oneshot::Sender<Result<Revision, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

enum PersistMsg {
    State {
        revision: Revision,
        state: PersistedStateV1,
    },
    Flush {
        resp: oneshot::Sender<Result<Revision, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Spawns the store runtime, optionally backed by a durable sink.
pub fn spawn_profilog(
    store: ProfileStore,
    sink: Option<Box<dyn StateSink>>,
    config: RuntimeConfig,
) -> ProfileLogHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<ProfileEvent>(1024);

    let (persist_tx_opt, mut durable_rx) = if let Some(sink) = sink {
        let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound);
        let (durable_tx, durable_rx) = mpsc::unbounded_channel::<Result<Revision, PersistError>>();
        spawn_persistence_worker(sink, persist_rx, durable_tx, config);
        (Some(persist_tx), Some(durable_rx))
    } else {
        (None, None)
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut store = store;
        let mut revision: Revision = 0;

        loop {
            if let Some(rx) = durable_rx.as_mut() {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        let done = handle_command(
                            cmd,
                            &mut store,
                            &events_tx_loop,
                            persist_tx_opt.as_ref(),
                            &mut revision,
                        ).await;
                        if done {
                            break;
                        }
                    }
                    durable = rx.recv() => {
                        if let Some(Ok(revision)) = durable {
                            let _ = events_tx_loop.send(ProfileEvent::PersistedUpTo { revision });
                        }
                    }
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break; };
                let done = handle_command(
                    cmd,
                    &mut store,
                    &events_tx_loop,
                    persist_tx_opt.as_ref(),
                    &mut revision,
                ).await;
                if done {
                    break;
                }
            }
        }
    });

    ProfileLogHandle { cmd_tx, events_tx }
}

impl ProfileLogHandle {
    /// Subscribes to store events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.events_tx.subscribe()
    }

    /// Creates a record and returns its id.
    pub async fn create(&self, draft: ProfileDraft) -> Result<ProfileId, RuntimeError> {
        self.send(|resp| Command::Create { draft, resp }).await?
    }

    /// Merges `patch` onto the record with id `id`.
    ///
    /// Returns false when the id is unknown (silent store no-op).
    pub async fn update(&self, id: impl Into<ProfileId>, patch: ProfilePatch) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.send(|resp| Command::Update { id, patch, resp }).await?
    }

    /// Deletes the record with id `id`; false when unknown.
    pub async fn delete(&self, id: impl Into<ProfileId>) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.send(|resp| Command::Delete { id, resp }).await?
    }

    /// Loads a record into the editor; false when unknown.
    pub async fn begin_edit(&self, id: impl Into<ProfileId>) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.send(|resp| Command::BeginEdit { id, resp }).await?
    }

    /// Clears the editing pointer.
    pub async fn cancel_edit(&self) -> Result<(), RuntimeError> {
        self.send(|resp| Command::CancelEdit { resp }).await?
    }

    /// Looks up a record by id.
    pub async fn get(&self, id: impl Into<ProfileId>) -> Result<Option<ProfileRecord>, RuntimeError> {
        let id = id.into();
        self.send(|resp| Command::Get { id, resp }).await
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<ProfileRecord>, RuntimeError> {
        self.send(|resp| Command::List { resp }).await
    }

    /// Records passing `filter`, newest first.
    pub async fn filtered(&self, filter: ProfileFilter) -> Result<Vec<ProfileRecord>, RuntimeError> {
        self.send(|resp| Command::Filtered { filter, resp }).await
    }

    /// Record currently loaded for editing, if any.
    pub async fn editing_record(&self) -> Result<Option<ProfileRecord>, RuntimeError> {
        self.send(|resp| Command::EditingRecord { resp }).await
    }

    /// Forces any pending snapshot write and reports the durable revision.
    pub async fn flush(&self) -> Result<Revision, RuntimeError> {
        self.send(|resp| Command::Flush { resp }).await?
    }

    /// Flushes and stops the runtime.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(|resp| Command::Shutdown { resp }).await?
    }

    async fn send<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    store: &mut ProfileStore,
    events_tx: &broadcast::Sender<ProfileEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
    revision: &mut Revision,
) -> bool {
    match cmd {
        Command::Create { draft, resp } => {
            let id = store.create(draft);
            let res = record_mutation(store, events_tx, persist_tx, revision).map(|()| {
                let _ = events_tx.send(ProfileEvent::Created { id: id.clone() });
                id
            });
            let _ = resp.send(res);
        }
        Command::Update { id, patch, resp } => {
            let res = if store.update(&id, patch) {
                record_mutation(store, events_tx, persist_tx, revision).map(|()| {
                    let _ = events_tx.send(ProfileEvent::Updated { id });
                    true
                })
            } else {
                Ok(false)
            };
            let _ = resp.send(res);
        }
        Command::Delete { id, resp } => {
            let res = if store.delete(&id) {
                record_mutation(store, events_tx, persist_tx, revision).map(|()| {
                    let _ = events_tx.send(ProfileEvent::Deleted { id });
                    true
                })
            } else {
                Ok(false)
            };
            let _ = resp.send(res);
        }
        Command::BeginEdit { id, resp } => {
            let res = if store.begin_edit(&id) {
                record_mutation(store, events_tx, persist_tx, revision).map(|()| {
                    let _ = events_tx.send(ProfileEvent::EditStarted { id });
                    true
                })
            } else {
                Ok(false)
            };
            let _ = resp.send(res);
        }
        Command::CancelEdit { resp } => {
            store.cancel_edit();
            let res = record_mutation(store, events_tx, persist_tx, revision).map(|()| {
                let _ = events_tx.send(ProfileEvent::EditCancelled);
            });
            let _ = resp.send(res);
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get_cloned(&id));
        }
        Command::List { resp } => {
            let _ = resp.send(store.ordered_cloned());
        }
        Command::Filtered { filter, resp } => {
            let _ = resp.send(store.filtered_cloned(&filter));
        }
        Command::EditingRecord { resp } => {
            let _ = resp.send(store.editing_record().cloned());
        }
        Command::Flush { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (flush_tx, flush_rx) = oneshot::channel();
                if tx.send(PersistMsg::Flush { resp: flush_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    flush_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(*revision)
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(PersistMsg::Shutdown { resp: done_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    done_rx.await.map_err(|_| RuntimeError::ChannelClosed)
                }
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

/// Advances the revision and queues the post-mutation snapshot.
fn record_mutation(
    store: &ProfileStore,
    events_tx: &broadcast::Sender<ProfileEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
    revision: &mut Revision,
) -> Result<(), RuntimeError> {
    *revision += 1;
    if let Some(tx) = persist_tx {
        let state = PersistedStateV1::new(store.export_snapshot());
        tx.try_send(PersistMsg::State {
            revision: *revision,
            state,
        })
        .map_err(|err| {
            RuntimeError::Persist(PersistError::Message(format!("persist queue error: {err}")))
        })?;
    } else {
        let _ = events_tx.send(ProfileEvent::PersistedUpTo {
            revision: *revision,
        });
    }
    Ok(())
}

fn spawn_persistence_worker(
    sink: Box<dyn StateSink>,
    mut rx: mpsc::Receiver<PersistMsg>,
    durable_tx: mpsc::UnboundedSender<Result<Revision, PersistError>>,
    config: RuntimeConfig,
) {
    let sink = Arc::new(Mutex::new(sink));
    tokio::spawn(async move {
        let mut pending: Option<(Revision, PersistedStateV1)> = None;
        let mut deadline = Instant::now() + Duration::from_millis(config.coalesce_max_latency_ms);
        let mut last_durable: Revision = 0;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = write_pending(&sink, &mut pending, &mut last_durable, &durable_tx).await;
                        break;
                    };

                    match msg {
                        PersistMsg::State { revision, state } => {
                            // Latest snapshot wins; intermediate states are
                            // subsumed by the newest one.
                            pending = Some((revision, state));
                            if config.flush_on_mutation {
                                let _ = write_pending(&sink, &mut pending, &mut last_durable, &durable_tx).await;
                                deadline = Instant::now() + Duration::from_millis(config.coalesce_max_latency_ms);
                            }
                        }
                        PersistMsg::Flush { resp } => {
                            let result = write_pending(&sink, &mut pending, &mut last_durable, &durable_tx).await;
                            let _ = resp.send(result.map(|_| last_durable));
                            deadline = Instant::now() + Duration::from_millis(config.coalesce_max_latency_ms);
                        }
                        PersistMsg::Shutdown { resp } => {
                            let _ = write_pending(&sink, &mut pending, &mut last_durable, &durable_tx).await;
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    let _ = write_pending(&sink, &mut pending, &mut last_durable, &durable_tx).await;
                    deadline = Instant::now() + Duration::from_millis(config.coalesce_max_latency_ms);
                }
            }
        }
    });
}

async fn write_pending(
    sink: &Arc<Mutex<Box<dyn StateSink>>>,
    pending: &mut Option<(Revision, PersistedStateV1)>,
    last_durable: &mut Revision,
    durable_tx: &mpsc::UnboundedSender<Result<Revision, PersistError>>,
) -> Result<(), PersistError> {
    let Some((revision, state)) = pending.take() else {
        return Ok(());
    };

    let sink_ref = Arc::clone(sink);
    let save_res: Result<(), PersistError> = tokio::task::spawn_blocking(move || {
        let mut sink = sink_ref.blocking_lock();
        sink.save(&state)
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))?;

    match save_res {
        Ok(()) => {
            *last_durable = (*last_durable).max(revision);
            let _ = durable_tx.send(Ok(*last_durable));
            Ok(())
        }
        Err(err) => {
            let _ = durable_tx.send(Err(PersistError::Message(format!("save failed: {err:?}"))));
            Err(err)
        }
    }
}
