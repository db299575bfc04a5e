//! Mutation coordinator: create, update and two-phase delete with UI feedback.
//!
//! Each mutation runs `Idle -> Submitting -> Success | Failed`. `Success`
//! returns to `Idle` after [`MutationCoordinator::settle`]; `Failed` returns on
//! the next user action or [`MutationCoordinator::dismiss`]. Drafts are only
//! borrowed, so a failed submission leaves the form intact for a retry.
//!
//! Like directory loads, every mutation can be driven in steps: `begin_*`
//! enters `Submitting` and returns an owned request, `send` runs it without
//! borrowing the coordinator, and `finish_*` records the result. The
//! `submit_*` and `confirm_delete` helpers do all three in one call.

use std::sync::Arc;
use std::time::Duration;

use crate::directory::Directory;
use crate::errors::ServiceError;
use crate::models::{validate_email, DeleteConfirmation, Employee, EmployeeDraft, EmployeeId};
use crate::service::{EmployeeService, ServiceResult};

pub const CREATED: &str = "Employee created";
pub const UPDATED: &str = "Employee updated";
pub const DELETED: &str = "Employee deleted";
pub const CREATE_FAILED: &str = "Create failed";
pub const UPDATE_FAILED: &str = "Update failed";
pub const DELETE_FAILED: &str = "Delete failed";
pub const LOAD_ONE_FAILED: &str = "Failed to load employee";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Submitting,
    /// Completed; carries the notification text.
    Success(String),
    /// Rejected locally or by the server; carries the notification text.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSettings {
    /// How long `Success` is shown before returning to `Idle`.
    pub success_delay: Duration,
}

impl Default for MutationSettings {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveKind {
    Create,
    Update,
}

enum SaveRequest {
    Create(EmployeeDraft),
    Update(EmployeeId, EmployeeDraft),
}

/// A create or update that has entered `Submitting` but not been sent.
pub struct PendingSave<S: EmployeeService + ?Sized> {
    service: Arc<S>,
    request: SaveRequest,
}

impl<S: EmployeeService + ?Sized> PendingSave<S> {
    pub async fn send(self) -> SavedMutation {
        match &self.request {
            SaveRequest::Create(draft) => SavedMutation {
                kind: SaveKind::Create,
                result: self.service.create(draft).await,
            },
            SaveRequest::Update(id, draft) => SavedMutation {
                kind: SaveKind::Update,
                result: self.service.update(id, draft).await,
            },
        }
    }
}

#[derive(Debug)]
pub struct SavedMutation {
    kind: SaveKind,
    result: ServiceResult<Employee>,
}

/// A confirmed delete that has entered `Submitting` but not been sent.
pub struct PendingDelete<S: EmployeeService + ?Sized> {
    service: Arc<S>,
    id: EmployeeId,
}

impl<S: EmployeeService + ?Sized> PendingDelete<S> {
    pub async fn send(self) -> DeletedMutation {
        let result = self.service.remove(&self.id).await;
        DeletedMutation {
            id: self.id,
            result,
        }
    }
}

#[derive(Debug)]
pub struct DeletedMutation {
    id: EmployeeId,
    result: ServiceResult<DeleteConfirmation>,
}

pub struct MutationCoordinator<S: EmployeeService + ?Sized> {
    service: Arc<S>,
    state: MutationState,
    pending_delete: Option<EmployeeId>,
    settings: MutationSettings,
}

impl<S: EmployeeService + ?Sized> MutationCoordinator<S> {
    pub fn new(service: Arc<S>, settings: MutationSettings) -> Self {
        Self {
            service,
            state: MutationState::Idle,
            pending_delete: None,
            settings,
        }
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == MutationState::Submitting
    }

    /// Id awaiting delete confirmation, if the dialog is open.
    pub fn pending_delete(&self) -> Option<&EmployeeId> {
        self.pending_delete.as_ref()
    }

    /// Fetch a record and turn it into form values for the edit view.
    pub async fn load_draft(&mut self, id: &EmployeeId) -> Result<EmployeeDraft, ServiceError> {
        match self.service.get_by_id(id).await {
            Ok(employee) => Ok(EmployeeDraft::from(employee)),
            Err(err) => {
                tracing::warn!("Loading employee {} failed: {}", id, err);
                self.state = MutationState::Failed(err.user_message(LOAD_ONE_FAILED));
                Err(err)
            }
        }
    }

    /// Create a record from `draft`.
    ///
    /// A malformed email is rejected before any request is made.
    pub async fn submit_create(&mut self, draft: &EmployeeDraft) -> Result<Employee, ServiceError> {
        let pending = self.begin_create(draft)?;
        let saved = pending.send().await;
        self.finish_save(saved)
    }

    pub async fn submit_update(
        &mut self,
        id: &EmployeeId,
        draft: &EmployeeDraft,
    ) -> Result<Employee, ServiceError> {
        let pending = self.begin_update(id, draft);
        let saved = pending.send().await;
        self.finish_save(saved)
    }

    /// Validate `draft` and enter `Submitting`. The returned request runs
    /// without borrowing the coordinator; hand its result to
    /// [`MutationCoordinator::finish_save`].
    pub fn begin_create(&mut self, draft: &EmployeeDraft) -> Result<PendingSave<S>, ServiceError> {
        if let Err(message) = validate_email(&draft.email_id) {
            self.state = MutationState::Failed(message.to_string());
            return Err(ServiceError::ValidationFailed(message.to_string()));
        }

        self.state = MutationState::Submitting;
        Ok(PendingSave {
            service: Arc::clone(&self.service),
            request: SaveRequest::Create(draft.clone()),
        })
    }

    pub fn begin_update(&mut self, id: &EmployeeId, draft: &EmployeeDraft) -> PendingSave<S> {
        self.state = MutationState::Submitting;
        PendingSave {
            service: Arc::clone(&self.service),
            request: SaveRequest::Update(id.clone(), draft.clone()),
        }
    }

    /// Record the result of a create or update.
    pub fn finish_save(&mut self, saved: SavedMutation) -> Result<Employee, ServiceError> {
        let (success, fallback) = match saved.kind {
            SaveKind::Create => (CREATED, CREATE_FAILED),
            SaveKind::Update => (UPDATED, UPDATE_FAILED),
        };

        match &saved.result {
            Ok(employee) => {
                tracing::info!("{}: {}", success, employee.id);
                self.state = MutationState::Success(success.to_string());
            }
            Err(err) => {
                tracing::warn!("{}: {}", fallback, err);
                self.state = MutationState::Failed(err.user_message(fallback));
            }
        }
        saved.result
    }

    /// First phase of a delete: remember the id and wait for confirmation.
    pub fn request_delete(&mut self, id: EmployeeId) {
        if matches!(self.state, MutationState::Failed(_)) {
            self.state = MutationState::Idle;
        }
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second phase of a delete: remove the pending id, then reload
    /// `directory` from the server.
    ///
    /// The raw set is never edited locally. Without a pending id this is a
    /// no-op. A failed reload shows up in the directory's status, not here.
    pub async fn confirm_delete(&mut self, directory: &mut Directory<S>) -> Result<(), ServiceError> {
        let Some(pending) = self.begin_delete() else {
            return Ok(());
        };
        let deleted = pending.send().await;
        self.finish_delete(deleted, directory).await
    }

    /// Take the pending id and enter `Submitting`.
    pub fn begin_delete(&mut self) -> Option<PendingDelete<S>> {
        let id = self.pending_delete.take()?;
        self.state = MutationState::Submitting;
        Some(PendingDelete {
            service: Arc::clone(&self.service),
            id,
        })
    }

    /// Record the result of a delete and, on success, reload `directory`.
    pub async fn finish_delete(
        &mut self,
        deleted: DeletedMutation,
        directory: &mut Directory<S>,
    ) -> Result<(), ServiceError> {
        let DeletedMutation { id, result } = deleted;
        match result {
            Ok(_) => {
                tracing::info!("Deleted employee {}", id);
                self.state = MutationState::Success(DELETED.to_string());
                if let Err(err) = directory.load().await {
                    tracing::warn!("Reload after deleting employee {} failed: {}", id, err);
                }
                self.state = MutationState::Idle;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Deleting employee {} failed: {}", id, err);
                self.state = MutationState::Failed(err.user_message(DELETE_FAILED));
                Err(err)
            }
        }
    }

    /// Hold `Success` for the configured delay, then return to `Idle`.
    ///
    /// Returns true when a success was settled, i.e. the caller should now
    /// navigate back to the list.
    pub async fn settle(&mut self) -> bool {
        if !matches!(self.state, MutationState::Success(_)) {
            return false;
        }
        tokio::time::sleep(self.settings.success_delay).await;
        self.state = MutationState::Idle;
        true
    }

    /// Close the failure notification.
    pub fn dismiss(&mut self) {
        if matches!(self.state, MutationState::Failed(_)) {
            self.state = MutationState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{LoadStatus, ReloadOrdering};
    use crate::engine::EngineSettings;
    use crate::testing::{employee, Call, ScriptedService};

    fn setup() -> (
        Arc<ScriptedService>,
        MutationCoordinator<ScriptedService>,
        Directory<ScriptedService>,
    ) {
        let service = Arc::new(ScriptedService::with_records(vec![
            employee(1, "Alice", "Acme Inc"),
            employee(2, "Bob", "Beta LLC"),
        ]));
        let coordinator = MutationCoordinator::new(
            service.clone(),
            MutationSettings {
                success_delay: Duration::from_millis(5),
            },
        );
        let directory = Directory::new(
            service.clone(),
            EngineSettings::default(),
            ReloadOrdering::default(),
        );
        (service, coordinator, directory)
    }

    fn draft(first: &str, email: &str) -> EmployeeDraft {
        EmployeeDraft {
            first_name: first.to_string(),
            company_name: "Gamma".to_string(),
            email_id: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_email_never_reaches_service() {
        let (service, mut coordinator, _) = setup();

        let err = coordinator
            .submit_create(&draft("Dana", "not-an-email"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::ValidationFailed(_)));
        assert!(service.calls().is_empty());
        assert_eq!(
            coordinator.state(),
            &MutationState::Failed("Please enter a valid email".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_then_reload_contains_record() {
        let (service, mut coordinator, mut directory) = setup();
        let submitted = draft("Dana", "dana@gamma.io");

        let created = coordinator.submit_create(&submitted).await.unwrap();
        assert_eq!(created.id, EmployeeId::Int(3));
        assert_eq!(
            coordinator.state(),
            &MutationState::Success(CREATED.to_string())
        );
        assert!(coordinator.settle().await);
        assert_eq!(coordinator.state(), &MutationState::Idle);

        directory.load().await.unwrap();
        let found = directory
            .engine()
            .raw_set()
            .iter()
            .find(|e| e.id == created.id)
            .cloned()
            .unwrap();
        assert_eq!(EmployeeDraft::from(found), submitted);
        assert_eq!(
            service.calls(),
            vec![Call::Create(submitted.clone()), Call::List]
        );
    }

    #[tokio::test]
    async fn test_submitting_is_visible_while_save_runs() {
        let (service, mut coordinator, _) = setup();
        service.delay_mutations(Duration::from_millis(200));
        assert!(!coordinator.is_submitting());

        let pending = coordinator
            .begin_create(&draft("Dana", "dana@gamma.io"))
            .unwrap();
        let handle = tokio::spawn(pending.send());
        tokio::task::yield_now().await;

        assert!(coordinator.is_submitting());
        assert!(!handle.is_finished());

        let saved = handle.await.unwrap();
        assert!(coordinator.is_submitting());
        let created = coordinator.finish_save(saved).unwrap();
        assert_eq!(created.first_name, "Dana");
        assert_eq!(
            coordinator.state(),
            &MutationState::Success(CREATED.to_string())
        );

        let pending = coordinator.begin_update(&created.id, &draft("Dina", ""));
        assert!(coordinator.is_submitting());
        let saved = pending.send().await;
        coordinator.finish_save(saved).unwrap();
        assert_eq!(
            coordinator.state(),
            &MutationState::Success(UPDATED.to_string())
        );
    }

    #[tokio::test]
    async fn test_submitting_is_visible_while_delete_runs() {
        let (service, mut coordinator, mut directory) = setup();
        directory.load().await.unwrap();
        service.delay_mutations(Duration::from_millis(200));

        assert!(coordinator.begin_delete().is_none());
        assert_eq!(coordinator.state(), &MutationState::Idle);

        coordinator.request_delete(EmployeeId::Int(1));
        let pending = coordinator.begin_delete().unwrap();
        assert!(coordinator.pending_delete().is_none());
        let handle = tokio::spawn(pending.send());
        tokio::task::yield_now().await;

        assert!(coordinator.is_submitting());
        assert_eq!(directory.engine().total(), 2);

        let deleted = handle.await.unwrap();
        coordinator
            .finish_delete(deleted, &mut directory)
            .await
            .unwrap();
        assert_eq!(coordinator.state(), &MutationState::Idle);
        assert_eq!(directory.engine().total(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_does_not_enter_submitting() {
        let (_, mut coordinator, _) = setup();

        assert!(coordinator.begin_create(&draft("Dana", "nope")).is_err());
        assert!(!coordinator.is_submitting());
        assert!(matches!(coordinator.state(), MutationState::Failed(_)));
    }

    #[tokio::test]
    async fn test_failed_create_keeps_message_and_draft() {
        let (service, mut coordinator, _) = setup();
        service.fail_next(ServiceError::request_failed(Some(500), "Database unavailable"));
        let submitted = draft("Dana", "");

        let err = coordinator.submit_create(&submitted).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(
            coordinator.state(),
            &MutationState::Failed("Database unavailable".to_string())
        );
        assert!(!coordinator.settle().await);

        coordinator.dismiss();
        assert_eq!(coordinator.state(), &MutationState::Idle);

        // Resubmitting the untouched draft works
        coordinator.submit_create(&submitted).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails_with_not_found() {
        let (_, mut coordinator, _) = setup();

        let err = coordinator
            .submit_update(&EmployeeId::Int(99), &draft("Zed", ""))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(coordinator.state(), MutationState::Failed(_)));
    }

    #[tokio::test]
    async fn test_update_skips_local_validation() {
        let (service, mut coordinator, _) = setup();

        let updated = coordinator
            .submit_update(&EmployeeId::Int(1), &draft("Alicia", "whatever"))
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(service.calls().len(), 1);
        assert_eq!(
            coordinator.state(),
            &MutationState::Success(UPDATED.to_string())
        );
    }

    #[tokio::test]
    async fn test_load_draft_for_edit() {
        let (_, mut coordinator, _) = setup();

        let loaded = coordinator.load_draft(&EmployeeId::Int(2)).await.unwrap();
        assert_eq!(loaded.first_name, "Bob");
        assert_eq!(loaded.company_name, "Beta LLC");
        assert_eq!(loaded.email_id, "");

        let err = coordinator.load_draft(&EmployeeId::Int(42)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_is_two_phase_and_reloads() {
        let (service, mut coordinator, mut directory) = setup();
        directory.load().await.unwrap();

        coordinator.request_delete(EmployeeId::Int(1));
        assert_eq!(coordinator.pending_delete(), Some(&EmployeeId::Int(1)));
        assert_eq!(service.calls(), vec![Call::List]);

        coordinator.confirm_delete(&mut directory).await.unwrap();

        assert!(coordinator.pending_delete().is_none());
        assert_eq!(coordinator.state(), &MutationState::Idle);
        assert_eq!(
            service.calls(),
            vec![Call::List, Call::Remove(EmployeeId::Int(1)), Call::List]
        );
        assert_eq!(directory.engine().total(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_raw_set_alone() {
        let (service, mut coordinator, mut directory) = setup();
        directory.load().await.unwrap();
        service.fail_next(ServiceError::request_failed(Some(503), ""));

        coordinator.request_delete(EmployeeId::Int(2));
        let err = coordinator.confirm_delete(&mut directory).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(coordinator.pending_delete().is_none());
        assert_eq!(
            coordinator.state(),
            &MutationState::Failed(DELETE_FAILED.to_string())
        );
        assert_eq!(directory.engine().total(), 2);
        assert_eq!(directory.status(), &LoadStatus::Ready);
    }

    #[tokio::test]
    async fn test_second_delete_of_same_id_fails() {
        let (_, mut coordinator, mut directory) = setup();

        coordinator.request_delete(EmployeeId::Int(2));
        coordinator.confirm_delete(&mut directory).await.unwrap();

        coordinator.request_delete(EmployeeId::Int(2));
        let err = coordinator.confirm_delete(&mut directory).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cancel_and_confirm_without_pending() {
        let (service, mut coordinator, mut directory) = setup();

        coordinator.request_delete(EmployeeId::Int(1));
        coordinator.cancel_delete();
        coordinator.confirm_delete(&mut directory).await.unwrap();

        assert!(service.calls().is_empty());
        assert_eq!(coordinator.state(), &MutationState::Idle);
    }

    #[tokio::test]
    async fn test_request_delete_clears_previous_failure() {
        let (_, mut coordinator, _) = setup();
        let _ = coordinator.submit_create(&draft("X", "bad")).await;
        assert!(matches!(coordinator.state(), MutationState::Failed(_)));

        coordinator.request_delete(EmployeeId::Int(1));
        assert_eq!(coordinator.state(), &MutationState::Idle);
    }
}
