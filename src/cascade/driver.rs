//! Single-writer async driver around [`CascadeMachine`].
//!
//! One spawned loop owns the machine; intents arrive as commands, fetches
//! run as detached tasks and report back through an internal channel with
//! their token, and the loop applies or discards each completion. Spawn one
//! driver per consumer; the form and the filter bar never share one.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    lookup::{LocationClient, PincodeOption, PostOffice, StateEntry, build_pincode_options},
    profile::ProfileRecord,
    types::{Country, Level, LoadStatus},
};

use super::machine::{CascadeMachine, FetchSpec, FetchToken};

/// Errors surfaced by [`SelectorHandle`] calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The driver loop is gone.
    ChannelClosed,
}

/// Events emitted as option lists settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    /// The state list is ready.
    StatesReady {
        /// Number of options loaded.
        count: usize,
    },
    /// The district list is ready.
    DistrictsReady {
        /// Number of options loaded.
        count: usize,
    },
    /// The pincode option list is ready.
    PincodesReady {
        /// Number of options loaded.
        count: usize,
    },
    /// A completion arrived after its level had moved on and was dropped.
    FetchSuperseded {
        /// Level whose stale result was discarded.
        level: Level,
    },
}

/// Cloneable view of one level, as consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelView<T> {
    /// Current load status.
    pub status: LoadStatus,
    /// Most recently loaded options.
    pub options: Vec<T>,
    /// Current selection, if any.
    pub selected: Option<String>,
}

/// Cloneable view of the whole selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSnapshot {
    /// Selected country, if any.
    pub country: Option<Country>,
    /// State level.
    pub states: LevelView<StateEntry>,
    /// District level.
    pub districts: LevelView<String>,
    /// Pincode level.
    pub pincodes: LevelView<PincodeOption>,
}

enum Command {
    SelectCountry {
        country: Option<Country>,
        resp: oneshot::Sender<()>,
    },
    SelectState {
        name: String,
        resp: oneshot::Sender<()>,
    },
    SelectDistrict {
        name: String,
        resp: oneshot::Sender<()>,
    },
    SelectPincode {
        value: String,
        resp: oneshot::Sender<()>,
    },
    Seed {
        country: Option<Country>,
        state: Option<String>,
        district: Option<String>,
        pincode: Option<String>,
        resp: oneshot::Sender<()>,
    },
    Snapshot {
        resp: oneshot::Sender<SelectorSnapshot>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

enum FetchDone {
    States {
        token: FetchToken,
        list: Vec<StateEntry>,
    },
    Districts {
        token: FetchToken,
        list: Vec<String>,
    },
    PostOffices {
        token: FetchToken,
        raw: Vec<PostOffice>,
    },
}

/// Handle to one spawned selector driver.
pub struct SelectorHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<SelectorEvent>,
}

impl Clone for SelectorHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

/// Spawns an independent selector driver over `client`.
pub fn spawn_selector(client: Arc<dyn LocationClient>) -> SelectorHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(64);
    let (events_tx, _) = broadcast::channel::<SelectorEvent>(256);
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchDone>();

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut machine = CascadeMachine::new();

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    match cmd {
                        Command::SelectCountry { country, resp } => {
                            if let Some(spec) = machine.select_country(country) {
                                dispatch_fetch(spec, &client, &fetch_tx);
                            }
                            let _ = resp.send(());
                        }
                        Command::SelectState { name, resp } => {
                            if let Some(spec) = machine.select_state(&name) {
                                dispatch_fetch(spec, &client, &fetch_tx);
                            }
                            let _ = resp.send(());
                        }
                        Command::SelectDistrict { name, resp } => {
                            if let Some(spec) = machine.select_district(&name) {
                                dispatch_fetch(spec, &client, &fetch_tx);
                            }
                            let _ = resp.send(());
                        }
                        Command::SelectPincode { value, resp } => {
                            machine.select_pincode(&value);
                            let _ = resp.send(());
                        }
                        Command::Seed { country, state, district, pincode, resp } => {
                            let specs = machine.seed(
                                country,
                                state.as_deref(),
                                district.as_deref(),
                                pincode.as_deref(),
                            );
                            for spec in specs {
                                dispatch_fetch(spec, &client, &fetch_tx);
                            }
                            let _ = resp.send(());
                        }
                        Command::Snapshot { resp } => {
                            let _ = resp.send(snapshot_of(&machine));
                        }
                        Command::Shutdown { resp } => {
                            let _ = resp.send(());
                            break;
                        }
                    }
                }
                done = fetch_rx.recv() => {
                    let Some(done) = done else { break; };
                    let event = match done {
                        FetchDone::States { token, list } => {
                            if machine.apply_states(&token, list) {
                                SelectorEvent::StatesReady {
                                    count: machine.states().options().len(),
                                }
                            } else {
                                SelectorEvent::FetchSuperseded { level: Level::State }
                            }
                        }
                        FetchDone::Districts { token, list } => {
                            if machine.apply_districts(&token, list) {
                                SelectorEvent::DistrictsReady {
                                    count: machine.districts().options().len(),
                                }
                            } else {
                                SelectorEvent::FetchSuperseded { level: Level::District }
                            }
                        }
                        FetchDone::PostOffices { token, raw } => {
                            let options = build_pincode_options(&raw);
                            if machine.apply_pincodes(&token, options) {
                                SelectorEvent::PincodesReady {
                                    count: machine.pincodes().options().len(),
                                }
                            } else {
                                SelectorEvent::FetchSuperseded { level: Level::Pincode }
                            }
                        }
                    };
                    let _ = events_tx_loop.send(event);
                }
            }
        }
    });

    SelectorHandle { cmd_tx, events_tx }
}

impl SelectorHandle {
    /// Subscribes to option-list events.
    pub fn subscribe(&self) -> broadcast::Receiver<SelectorEvent> {
        self.events_tx.subscribe()
    }

    /// Changes the country; `None` models the filter bar's "All".
    pub async fn select_country(&self, country: Option<Country>) -> Result<(), SelectorError> {
        self.send(|resp| Command::SelectCountry { country, resp }).await
    }

    /// Selects a state (empty string deselects).
    pub async fn select_state(&self, name: impl Into<String>) -> Result<(), SelectorError> {
        let name = name.into();
        self.send(|resp| Command::SelectState { name, resp }).await
    }

    /// Selects a district (empty string deselects).
    pub async fn select_district(&self, name: impl Into<String>) -> Result<(), SelectorError> {
        let name = name.into();
        self.send(|resp| Command::SelectDistrict { name, resp }).await
    }

    /// Selects a pincode.
    pub async fn select_pincode(&self, value: impl Into<String>) -> Result<(), SelectorError> {
        let value = value.into();
        self.send(|resp| Command::SelectPincode { value, resp }).await
    }

    /// Seeds the selector for edit mode without clearing the given values.
    pub async fn seed(
        &self,
        country: Option<Country>,
        state: Option<String>,
        district: Option<String>,
        pincode: Option<String>,
    ) -> Result<(), SelectorError> {
        self.send(|resp| Command::Seed {
            country,
            state,
            district,
            pincode,
            resp,
        })
        .await
    }

    /// Seeds the selector from an existing record's residency.
    pub async fn seed_from_record(&self, record: &ProfileRecord) -> Result<(), SelectorError> {
        let residency = &record.residency;
        self.seed(
            Some(record.country()),
            residency.state().map(str::to_string),
            residency.district().map(str::to_string),
            residency.postal_code().map(str::to_string),
        )
        .await
    }

    /// Current per-level statuses, options, and selections.
    pub async fn snapshot(&self) -> Result<SelectorSnapshot, SelectorError> {
        self.send(|resp| Command::Snapshot { resp }).await
    }

    /// Stops the driver loop.
    pub async fn shutdown(&self) -> Result<(), SelectorError> {
        self.send(|resp| Command::Shutdown { resp }).await
    }

    async fn send<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, SelectorError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| SelectorError::ChannelClosed)?;
        rx.await.map_err(|_| SelectorError::ChannelClosed)
    }
}

fn dispatch_fetch(
    spec: FetchSpec,
    client: &Arc<dyn LocationClient>,
    fetch_tx: &mpsc::UnboundedSender<FetchDone>,
) {
    let client = Arc::clone(client);
    let fetch_tx = fetch_tx.clone();
    tokio::spawn(async move {
        let done = match spec {
            FetchSpec::States { token, country } => FetchDone::States {
                token,
                list: client.list_states(&country).await,
            },
            FetchSpec::Districts {
                token,
                country,
                state,
            } => FetchDone::Districts {
                token,
                list: client.list_districts(&country, &state).await,
            },
            FetchSpec::PostOffices { token, district } => FetchDone::PostOffices {
                token,
                raw: client.list_post_offices(&district).await,
            },
        };
        let _ = fetch_tx.send(done);
    });
}

fn snapshot_of(machine: &CascadeMachine) -> SelectorSnapshot {
    SelectorSnapshot {
        country: machine.country(),
        states: LevelView {
            status: machine.states().status(),
            options: machine.states().options().to_vec(),
            selected: machine.states().selected().map(str::to_string),
        },
        districts: LevelView {
            status: machine.districts().status(),
            options: machine.districts().options().to_vec(),
            selected: machine.districts().selected().map(str::to_string),
        },
        pincodes: LevelView {
            status: machine.pincodes().status(),
            options: machine.pincodes().options().to_vec(),
            selected: machine.pincodes().selected().map(str::to_string),
        },
    }
}
