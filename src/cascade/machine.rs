//! Pure cascading-selector state machine.
//!
//! Owns the dependency chain and the per-level load state; performs no I/O.
//! Each transition that needs remote data returns a [`FetchSpec`] carrying a
//! generation-stamped [`FetchToken`]; the caller fetches and feeds the result
//! back through the matching `apply_*` method. Any reset or new load bumps
//! the level's generation, so a completion holding a stale token is refused.

use crate::{
    lookup::{PincodeOption, StateEntry},
    types::{Country, Generation, Level, LoadStatus},
};

/// Claim ticket for one in-flight fetch at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken {
    /// Level the fetch populates.
    pub level: Level,
    /// Generation the fetch was issued under.
    pub generation: Generation,
}

/// Remote work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSpec {
    /// Fetch the state list for `country`.
    States {
        /// Supersession token.
        token: FetchToken,
        /// Country label to query.
        country: String,
    },
    /// Fetch the district list for `state`.
    Districts {
        /// Supersession token.
        token: FetchToken,
        /// Country label to query.
        country: String,
        /// State the districts belong to.
        state: String,
    },
    /// Fetch raw post offices for `district`.
    PostOffices {
        /// Supersession token.
        token: FetchToken,
        /// District to query.
        district: String,
    },
}

/// Load state, option list, and selection for one level.
#[derive(Debug, Default)]
pub struct LevelSlot<T> {
    status: LoadStatus,
    options: Vec<T>,
    selected: Option<String>,
    generation: Generation,
}

impl<T> LevelSlot<T> {
    /// Current load status.
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Most recently loaded options.
    pub fn options(&self) -> &[T] {
        &self.options
    }

    /// Current selection at this level, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Generation that a fetch result must match to be applied.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Back to idle: no selection, no options; pending fetches invalidated.
    fn reset(&mut self) {
        self.generation += 1;
        self.status = LoadStatus::Idle;
        self.options.clear();
        self.selected = None;
    }

    /// Starts a load without touching the selection (edit-mode preload
    /// relies on this). Prior options are cleared.
    fn begin_load(&mut self) -> Generation {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        self.options.clear();
        self.generation
    }

    /// Applies a completed fetch if `token` is still current.
    fn apply(&mut self, token: &FetchToken, options: Vec<T>) -> bool {
        if token.generation != self.generation || self.status != LoadStatus::Loading {
            return false;
        }
        self.options = options;
        self.status = LoadStatus::Ready;
        true
    }
}

/// Dependent-selection chain for one consumer (form or filter bar).
///
/// Instances are fully independent; the form and the table filter each own
/// their own machine and never share lists, statuses, or fetches.
#[derive(Debug, Default)]
pub struct CascadeMachine {
    country: Option<Country>,
    states: LevelSlot<StateEntry>,
    districts: LevelSlot<String>,
    pincodes: LevelSlot<PincodeOption>,
}

impl CascadeMachine {
    /// Machine with nothing selected and every level idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected country, if any.
    pub fn country(&self) -> Option<Country> {
        self.country
    }

    /// State level view.
    pub fn states(&self) -> &LevelSlot<StateEntry> {
        &self.states
    }

    /// District level view.
    pub fn districts(&self) -> &LevelSlot<String> {
        &self.districts
    }

    /// Pincode level view.
    pub fn pincodes(&self) -> &LevelSlot<PincodeOption> {
        &self.pincodes
    }

    /// Changes the country; `None` models the filter bar's "All".
    ///
    /// Every level is cleared either way. Only the drill-down-supporting
    /// country starts a state-list fetch.
    pub fn select_country(&mut self, country: Option<Country>) -> Option<FetchSpec> {
        self.country = country;
        self.states.reset();
        self.districts.reset();
        self.pincodes.reset();

        let country = country.filter(|c| c.supports_drill_down())?;
        let generation = self.states.begin_load();
        Some(FetchSpec::States {
            token: FetchToken {
                level: Level::State,
                generation,
            },
            country: country.label().to_string(),
        })
    }

    /// Selects a state, clearing district and pincode levels and starting
    /// the district fetch. An empty name deselects without fetching.
    pub fn select_state(&mut self, name: &str) -> Option<FetchSpec> {
        let country = self.country.filter(|c| c.supports_drill_down())?;
        self.districts.reset();
        self.pincodes.reset();
        if name.is_empty() {
            self.states.selected = None;
            return None;
        }
        self.states.selected = Some(name.to_string());
        let generation = self.districts.begin_load();
        Some(FetchSpec::Districts {
            token: FetchToken {
                level: Level::District,
                generation,
            },
            country: country.label().to_string(),
            state: name.to_string(),
        })
    }

    /// Selects a district, clearing the pincode level and starting the
    /// post-office fetch. An empty name deselects without fetching.
    pub fn select_district(&mut self, name: &str) -> Option<FetchSpec> {
        self.country.filter(|c| c.supports_drill_down())?;
        if self.states.selected.is_none() {
            return None;
        }
        self.pincodes.reset();
        if name.is_empty() {
            self.districts.selected = None;
            return None;
        }
        self.districts.selected = Some(name.to_string());
        let generation = self.pincodes.begin_load();
        Some(FetchSpec::PostOffices {
            token: FetchToken {
                level: Level::Pincode,
                generation,
            },
            district: name.to_string(),
        })
    }

    /// Selects a pincode. Terminal: no downstream effect, no fetch.
    pub fn select_pincode(&mut self, value: &str) {
        if self.country.is_none_or(|c| !c.supports_drill_down()) {
            return;
        }
        self.pincodes.selected = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    /// Seeds the machine from an existing record for edit mode.
    ///
    /// Pre-fills the selections, then requests every option list the
    /// selections imply. Unlike the user-driven cascade there is no
    /// downstream clearing, so the record's values survive the loads.
    pub fn seed(
        &mut self,
        country: Option<Country>,
        state: Option<&str>,
        district: Option<&str>,
        pincode: Option<&str>,
    ) -> Vec<FetchSpec> {
        self.country = country;
        self.states.reset();
        self.districts.reset();
        self.pincodes.reset();

        let mut specs = Vec::new();
        let Some(country) = country.filter(|c| c.supports_drill_down()) else {
            return specs;
        };

        self.states.selected = non_empty(state);
        self.districts.selected = non_empty(district);
        self.pincodes.selected = non_empty(pincode);

        let generation = self.states.begin_load();
        specs.push(FetchSpec::States {
            token: FetchToken {
                level: Level::State,
                generation,
            },
            country: country.label().to_string(),
        });

        if let Some(state) = self.states.selected.clone() {
            let generation = self.districts.begin_load();
            specs.push(FetchSpec::Districts {
                token: FetchToken {
                    level: Level::District,
                    generation,
                },
                country: country.label().to_string(),
                state,
            });

            if let Some(district) = self.districts.selected.clone() {
                let generation = self.pincodes.begin_load();
                specs.push(FetchSpec::PostOffices {
                    token: FetchToken {
                        level: Level::Pincode,
                        generation,
                    },
                    district,
                });
            }
        }

        specs
    }

    /// Applies a completed state-list fetch; false when superseded.
    pub fn apply_states(&mut self, token: &FetchToken, list: Vec<StateEntry>) -> bool {
        token.level == Level::State && self.states.apply(token, list)
    }

    /// Applies a completed district-list fetch; false when superseded.
    pub fn apply_districts(&mut self, token: &FetchToken, list: Vec<String>) -> bool {
        token.level == Level::District && self.districts.apply(token, list)
    }

    /// Applies derived pincode options; false when superseded.
    pub fn apply_pincodes(&mut self, token: &FetchToken, options: Vec<PincodeOption>) -> bool {
        token.level == Level::Pincode && self.pincodes.apply(token, options)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
