//! Employee directory: the list engine for one view session plus the loads
//! that feed it.
//!
//! A load is split into three steps so that several can be in flight at once:
//! [`Directory::begin_load`] issues a ticket, [`PendingLoad::fetch`] runs the
//! request without borrowing the directory, and [`Directory::apply`] decides
//! whether the result still belongs in the engine.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::engine::{EngineSettings, ListEngine};
use crate::errors::ServiceError;
use crate::models::Employee;
use crate::service::{EmployeeService, ListParams, ServiceResult};

pub const LOAD_FAILED: &str = "Failed to load employees";

/// Which of several overlapping loads ends up in the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadOrdering {
    /// Every result is applied as it resolves; the slowest response wins.
    LastResolved,
    /// Only the most recently issued load is applied.
    #[default]
    LastIssued,
}

/// What the view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    Idle,
    Loading,
    /// Blocking error panel with this message.
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A list request that has been issued but not yet run.
pub struct PendingLoad<S: EmployeeService + ?Sized> {
    ticket: LoadTicket,
    service: Arc<S>,
    params: ListParams,
    cancel: CancellationToken,
}

/// Result of a [`PendingLoad`]; `outcome` is `None` when the session was
/// disposed while the request was outstanding.
#[derive(Debug)]
pub struct FetchedLoad {
    ticket: LoadTicket,
    outcome: Option<ServiceResult<Vec<Employee>>>,
}

impl<S: EmployeeService + ?Sized> PendingLoad<S> {
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    pub async fn fetch(self) -> FetchedLoad {
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = self.service.list(&self.params) => Some(result),
        };
        FetchedLoad {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// How [`Directory::apply`] handled a fetched load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records replaced the raw set.
    Applied,
    /// The load failed; the raw set is untouched.
    Failed(ServiceError),
    /// A newer load was issued after this one.
    Stale,
    /// The session was disposed.
    Discarded,
}

pub struct Directory<S: EmployeeService + ?Sized> {
    service: Arc<S>,
    engine: ListEngine,
    status: LoadStatus,
    params: ListParams,
    ordering: ReloadOrdering,
    issued: u64,
    cancel: CancellationToken,
}

impl<S: EmployeeService + ?Sized> Directory<S> {
    pub fn new(service: Arc<S>, settings: EngineSettings, ordering: ReloadOrdering) -> Self {
        Self {
            service,
            engine: ListEngine::new(settings),
            status: LoadStatus::Idle,
            params: ListParams::new(),
            ordering,
            issued: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Server-side filters sent with every subsequent load.
    pub fn with_params(mut self, params: ListParams) -> Self {
        self.params = params;
        self
    }

    pub fn engine(&self) -> &ListEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ListEngine {
        &mut self.engine
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Issue a new load and mark the view as loading. A disposed view stays
    /// idle; the returned load resolves as discarded.
    pub fn begin_load(&mut self) -> PendingLoad<S> {
        self.issued += 1;
        if !self.is_disposed() {
            self.status = LoadStatus::Loading;
        }
        tracing::debug!("Issuing employee load #{}", self.issued);

        PendingLoad {
            ticket: LoadTicket(self.issued),
            service: Arc::clone(&self.service),
            params: self.params.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Apply a fetched load if it still belongs to this session.
    pub fn apply(&mut self, fetched: FetchedLoad) -> LoadOutcome {
        let LoadTicket(seq) = fetched.ticket;

        let result = match fetched.outcome {
            Some(result) if !self.is_disposed() => result,
            _ => {
                tracing::warn!("Discarding employee load #{} for a disposed view", seq);
                return LoadOutcome::Discarded;
            }
        };

        if self.ordering == ReloadOrdering::LastIssued && seq != self.issued {
            tracing::warn!(
                "Discarding stale employee load #{} (latest is #{})",
                seq,
                self.issued
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(records) => {
                tracing::debug!("Employee load #{} returned {} records", seq, records.len());
                self.engine.set_raw_set(records, true);
                self.status = LoadStatus::Ready;
                LoadOutcome::Applied
            }
            Err(err) => {
                tracing::warn!("Employee load #{} failed: {}", seq, err);
                self.status = LoadStatus::Failed(err.user_message(LOAD_FAILED));
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Fetch the full list and replace the raw set.
    ///
    /// Results that arrive after the session was disposed, or that were
    /// overtaken by a newer load, are dropped without error.
    pub async fn load(&mut self) -> Result<(), ServiceError> {
        let pending = self.begin_load();
        let fetched = pending.fetch().await;
        match self.apply(fetched) {
            LoadOutcome::Failed(err) => Err(err),
            LoadOutcome::Applied | LoadOutcome::Stale | LoadOutcome::Discarded => Ok(()),
        }
    }

    /// Tear the session down: outstanding loads stop waiting and the raw set
    /// is dropped.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
        self.engine.clear();
        self.status = LoadStatus::Idle;
    }
}
