//! Application state and the reducer that drives it.
//!
//! RULES:
//!   - `AggregationStore` is the single source of truth; views read it, never own it.
//!   - Every mutation lands in the store before the gateway sees it.
//!   - A gateway failure becomes an `AppEvent` notification. It never rolls
//!     back the local write and never aborts the session.
//!   - Validation errors stop the action and are returned as `Err`.

use crate::{
    aggregation::AggregationStore,
    config::NpsConfig,
    error::{NpsError, NpsResult},
    export::{export_month, ExportFile},
    gateway::{PersistenceGateway, SyncOutcome},
    metrics::{month_summary, month_trend, overall_general, DerivedMetrics, MonthSummary, MonthTrendPoint},
    record::{CommentCategories, CommentTally, ScoreDistribution, ScoreRecord},
    session::{SessionGate, SharedSecretGate},
    types::{validate_month, AdvisorName, MonthId, MonthSelector, NEW_MONTH_SENTINEL},
};
use serde::{Deserialize, Serialize};

// ── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub authenticated: bool,
    pub current_month: MonthSelector,
    pub selected_advisor: Option<AdvisorName>,
    pub score_form: ScoreDistribution,
    pub comment_form: CommentTally,
}

impl AppState {
    pub fn new(month: MonthId) -> Self {
        Self {
            authenticated: false,
            current_month: MonthSelector::Existing(month),
            selected_advisor: None,
            score_form: ScoreDistribution::zero(),
            comment_form: CommentTally::default(),
        }
    }

    fn reset_form(&mut self) {
        self.selected_advisor = None;
        self.score_form = ScoreDistribution::zero();
        self.comment_form = CommentTally::default();
    }
}

/// Everything an operator can do.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AppAction {
    Login { code: String },
    Logout,
    /// Raw picker value; `"new"` selects the new-month sentinel.
    SelectMonth { month: String },
    CreateMonth { month: String },
    SelectAdvisor { name: String },
    SetScore { rating: usize, count: u32 },
    SetComments { comments: CommentTally },
    SubmitRecord,
    AddAdvisor { name: String },
    Reload,
}

/// User-facing notifications produced by `dispatch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    LoginAccepted,
    LoginRejected,
    LoggedOut,
    DataLoaded {
        months: usize,
        records: usize,
        advisors: usize,
    },
    LoadFailed {
        reason: String,
    },
    ExampleDataSeeded {
        month: MonthId,
    },
    MonthSelected {
        selector: MonthSelector,
    },
    AdvisorSelected {
        name: AdvisorName,
        existing_record: bool,
    },
    RecordSaved {
        month: MonthId,
        advisor: AdvisorName,
    },
    SyncFailed {
        month: MonthId,
        advisor: AdvisorName,
        reason: String,
    },
    AdvisorAdded {
        name: AdvisorName,
    },
    AdvisorSyncFailed {
        name: AdvisorName,
        reason: String,
    },
}

// ── App ──────────────────────────────────────────────────────────────────────

pub struct NpsApp<G: PersistenceGateway> {
    pub config: NpsConfig,
    state: AppState,
    store: AggregationStore,
    gateway: G,
    gate: Box<dyn SessionGate>,
}

impl<G: PersistenceGateway> NpsApp<G> {
    /// App guarded by the configured shared access code.
    pub fn new(config: NpsConfig, gateway: G) -> Self {
        let gate = Box::new(SharedSecretGate::new(config.access_code.clone()));
        Self::with_gate(config, gateway, gate)
    }

    pub fn with_gate(config: NpsConfig, gateway: G, gate: Box<dyn SessionGate>) -> Self {
        let state = AppState::new(config.initial_month());
        let mut store = AggregationStore::new();
        store.replace_advisors(config.default_advisors.clone());
        Self {
            config,
            state,
            store,
            gateway,
            gate,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &AggregationStore {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Apply one action. Only `Login` is accepted before authentication.
    pub fn dispatch(&mut self, action: AppAction) -> NpsResult<Vec<AppEvent>> {
        if !self.state.authenticated && !matches!(action, AppAction::Login { .. }) {
            return Err(NpsError::NotAuthenticated);
        }

        match action {
            AppAction::Login { code } => Ok(self.login(&code)),
            AppAction::Logout => {
                self.state.authenticated = false;
                Ok(vec![AppEvent::LoggedOut])
            }
            AppAction::SelectMonth { month } => {
                let selector = MonthSelector::parse(&month)?;
                self.state.current_month = selector.clone();
                Ok(vec![AppEvent::MonthSelected { selector }])
            }
            AppAction::CreateMonth { month } => {
                let selector = MonthSelector::Existing(validate_month(&month)?);
                self.state.current_month = selector.clone();
                Ok(vec![AppEvent::MonthSelected { selector }])
            }
            AppAction::SelectAdvisor { name } => Ok(vec![self.select_advisor(name)]),
            AppAction::SetScore { rating, count } => {
                self.state.score_form.set(rating, count)?;
                Ok(Vec::new())
            }
            AppAction::SetComments { comments } => {
                self.state.comment_form = comments;
                Ok(Vec::new())
            }
            AppAction::SubmitRecord => self.submit_record(),
            AppAction::AddAdvisor { name } => Ok(self.add_advisor(&name)),
            AppAction::Reload => Ok(self.load()),
        }
    }

    fn login(&mut self, code: &str) -> Vec<AppEvent> {
        if !self.gate.verify(code) {
            log::warn!("rejected access code");
            return vec![AppEvent::LoginRejected];
        }
        self.state.authenticated = true;
        let mut events = vec![AppEvent::LoginAccepted];
        events.extend(self.load());
        events
    }

    /// Rebuild the working set from the gateway.
    fn load(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();

        let roster = match self.gateway.load_advisors() {
            Ok(names) if !names.is_empty() => names,
            Ok(_) => self.config.default_advisors.clone(),
            Err(e) => {
                log::error!("loading advisors failed: {e}");
                events.push(AppEvent::LoadFailed {
                    reason: e.to_string(),
                });
                self.store.advisors().to_vec()
            }
        };

        match self.gateway.load_all_records() {
            Ok(rows) => {
                self.store = AggregationStore::from_loaded(rows, roster);
                events.push(AppEvent::DataLoaded {
                    months: self.store.list_months().len(),
                    records: self.store.record_count(),
                    advisors: self.store.advisors().len(),
                });
            }
            Err(e) => {
                log::error!("loading records failed: {e}");
                events.push(AppEvent::LoadFailed {
                    reason: e.to_string(),
                });
                self.store.replace_advisors(roster);
                if self.config.seed_examples_on_load_failure {
                    if let Some(month) = self.state.current_month.month().map(str::to_string) {
                        seed_example_data(&mut self.store, &month);
                        events.push(AppEvent::ExampleDataSeeded { month });
                    }
                }
            }
        }
        events
    }

    /// Select an advisor; an existing record for the current month is loaded
    /// into the form for editing. Switching to an advisor with no record
    /// starts from a blank form.
    fn select_advisor(&mut self, name: AdvisorName) -> AppEvent {
        let existing = self
            .state
            .current_month
            .month()
            .and_then(|m| self.store.get(m, &name))
            .copied();
        match existing {
            Some(record) => {
                self.state.score_form = record.scores;
                self.state.comment_form = record.comments;
            }
            None if self.state.selected_advisor.as_deref() != Some(name.as_str()) => {
                self.state.reset_form();
            }
            None => {}
        }
        self.state.selected_advisor = Some(name.clone());
        AppEvent::AdvisorSelected {
            name,
            existing_record: existing.is_some(),
        }
    }

    fn submit_record(&mut self) -> NpsResult<Vec<AppEvent>> {
        let advisor = self
            .state
            .selected_advisor
            .clone()
            .ok_or(NpsError::NoAdvisorSelected)?;
        let month = self
            .state
            .current_month
            .month()
            .map(str::to_string)
            .ok_or_else(|| NpsError::InvalidMonth {
                value: NEW_MONTH_SENTINEL.to_string(),
            })?;

        let record = ScoreRecord::new(self.state.score_form, self.state.comment_form);
        self.store.upsert(&month, &advisor, record);

        let mut events = vec![AppEvent::RecordSaved {
            month: month.clone(),
            advisor: advisor.clone(),
        }];
        match SyncOutcome::from_result(self.gateway.save_record(&month, &advisor, &record)) {
            SyncOutcome::Synced => log::debug!("synced {month}/{advisor}"),
            SyncOutcome::Failed(e) => {
                log::error!("saving {month}/{advisor} failed: {e}");
                events.push(AppEvent::SyncFailed {
                    month,
                    advisor,
                    reason: e.to_string(),
                });
            }
        }

        self.state.reset_form();
        Ok(events)
    }

    fn add_advisor(&mut self, raw: &str) -> Vec<AppEvent> {
        let name = raw.trim();
        if !self.store.add_advisor(name) {
            log::debug!("advisor '{name}' ignored (blank or duplicate)");
            return Vec::new();
        }

        let mut events = vec![AppEvent::AdvisorAdded {
            name: name.to_string(),
        }];
        if let SyncOutcome::Failed(e) = SyncOutcome::from_result(self.gateway.save_advisor(name)) {
            log::error!("saving advisor '{name}' failed: {e}");
            events.push(AppEvent::AdvisorSyncFailed {
                name: name.to_string(),
                reason: e.to_string(),
            });
        }
        events
    }

    // ── Views ─────────────────────────────────────────────────────

    fn ensure_authenticated(&self) -> NpsResult<()> {
        if self.state.authenticated {
            Ok(())
        } else {
            Err(NpsError::NotAuthenticated)
        }
    }

    fn selected_month(&self) -> NpsResult<&str> {
        self.state
            .current_month
            .month()
            .ok_or_else(|| NpsError::InvalidMonth {
                value: NEW_MONTH_SENTINEL.to_string(),
            })
    }

    pub fn available_months(&self) -> NpsResult<Vec<MonthId>> {
        self.ensure_authenticated()?;
        Ok(self.store.list_months())
    }

    pub fn current_summary(&self) -> NpsResult<MonthSummary> {
        self.ensure_authenticated()?;
        Ok(month_summary(self.selected_month()?, &self.store))
    }

    pub fn overall(&self) -> NpsResult<DerivedMetrics> {
        self.ensure_authenticated()?;
        Ok(overall_general(&self.store))
    }

    pub fn trend(&self) -> NpsResult<Vec<MonthTrendPoint>> {
        self.ensure_authenticated()?;
        Ok(month_trend(&self.store))
    }

    pub fn export_current_month(&self) -> NpsResult<ExportFile> {
        self.ensure_authenticated()?;
        Ok(export_month(
            &self.config.export_scope,
            self.selected_month()?,
            &self.store,
        ))
    }
}

// ── Example data ─────────────────────────────────────────────────────────────

fn example_record(scores: [u32; 11], sentiment: [u64; 3], categories: [u64; 5]) -> ScoreRecord {
    let [positive, neutral, negative] = sentiment;
    let [price, delivery, service, inventory, other] = categories;
    ScoreRecord::new(
        ScoreDistribution::new(scores),
        CommentTally {
            positive,
            neutral,
            negative,
            categories: CommentCategories {
                price,
                delivery,
                service,
                inventory,
                other,
            },
        },
    )
}

/// Demo month used when the backing store cannot be read.
pub fn example_records() -> Vec<(&'static str, ScoreRecord)> {
    vec![
        (
            "Abidam",
            example_record([2, 3, 3, 0, 0, 2, 1, 14, 35, 47, 20], [15, 8, 4], [3, 8, 12, 2, 2]),
        ),
        (
            "Leo",
            example_record([0, 0, 2, 0, 0, 0, 6, 7, 20, 15, 5], [8, 5, 7], [5, 4, 6, 3, 2]),
        ),
        (
            "Lupita",
            example_record([0, 1, 0, 0, 3, 0, 0, 0, 0, 0, 0], [1, 1, 2], [2, 1, 1, 0, 0]),
        ),
    ]
}

pub fn seed_example_data(store: &mut AggregationStore, month: &str) {
    for (advisor, record) in example_records() {
        store.upsert(month, advisor, record);
    }
    log::info!("seeded example data into {month}");
}
