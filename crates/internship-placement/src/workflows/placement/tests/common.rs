use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::placement::application::InternshipApplication;
use crate::workflows::placement::domain::{
    ApplicationId, InternshipLevel, Major, OpportunityId, RepresentativeId, RepresentativeProfile,
    StaffId, StudentId, StudentProfile, WithdrawalRequestId,
};
use crate::workflows::placement::engine::{FixedClock, PlacementEngine};
use crate::workflows::placement::memory::{
    InMemoryNoticePublisher, InMemoryPlacementRepository, SequentialIdGenerator,
};
use crate::workflows::placement::opportunity::{Opportunity, OpportunityDraft};
use crate::workflows::placement::policy::PlacementPolicy;
use crate::workflows::placement::repository::{
    ChangeSet, PlacementRepository, RepositoryError,
};
use crate::workflows::placement::withdrawal::WithdrawalRequest;

pub(super) type MemoryEngine =
    PlacementEngine<InMemoryPlacementRepository, SequentialIdGenerator, InMemoryNoticePublisher>;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn student(id: &str, year_of_study: u8) -> StudentProfile {
    StudentProfile {
        id: StudentId::from(id),
        name: format!("Student {id}"),
        year_of_study,
        major: Major::Cs,
    }
}

pub(super) fn representative(id: &str) -> RepresentativeProfile {
    RepresentativeProfile {
        id: RepresentativeId::from(id),
        company_name: "Acme Robotics".to_string(),
    }
}

pub(super) fn staff() -> StaffId {
    StaffId::from("staff-1")
}

pub(super) fn draft(title: &str, total_slots: u8) -> OpportunityDraft {
    OpportunityDraft {
        title: title.to_string(),
        description: "Build internal tooling".to_string(),
        level: InternshipLevel::Basic,
        preferred_major: Major::Cs,
        opening_date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
        closing_date: NaiveDate::from_ymd_opt(2025, 7, 31).expect("valid date"),
        total_slots,
    }
}

pub(super) fn build_engine() -> (
    MemoryEngine,
    Arc<InMemoryPlacementRepository>,
    Arc<InMemoryNoticePublisher>,
) {
    let repository = Arc::new(InMemoryPlacementRepository::default());
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let engine = PlacementEngine::with_clock(
        repository.clone(),
        Arc::new(SequentialIdGenerator::default()),
        notices.clone(),
        PlacementPolicy::default(),
        Arc::new(FixedClock(today())),
    );
    (engine, repository, notices)
}

/// Create, approve, and publish a listing so students can apply.
pub(super) fn open_opportunity(
    engine: &MemoryEngine,
    owner: &RepresentativeProfile,
    draft: OpportunityDraft,
) -> Opportunity {
    let created = engine
        .create_opportunity(owner, draft)
        .expect("opportunity created");
    engine
        .approve_opportunity(&staff(), &created.id)
        .expect("opportunity approved");
    engine
        .toggle_visibility(&owner.id, &created.id)
        .expect("opportunity published")
}

/// Apply and have the owner approve, leaving the application `Successful`.
pub(super) fn successful_application(
    engine: &MemoryEngine,
    owner: &RepresentativeProfile,
    applicant: &StudentProfile,
    opportunity: &OpportunityId,
) -> InternshipApplication {
    let application = engine
        .apply(applicant, opportunity)
        .expect("application filed");
    engine
        .approve_application(&owner.id, &application.id)
        .expect("application approved")
}

pub(super) fn stored_opportunity(
    repository: &InMemoryPlacementRepository,
    id: &OpportunityId,
) -> Opportunity {
    repository
        .opportunity(id)
        .expect("store readable")
        .expect("opportunity present")
}

pub(super) fn stored_application(
    repository: &InMemoryPlacementRepository,
    id: &ApplicationId,
) -> InternshipApplication {
    repository
        .application(id)
        .expect("store readable")
        .expect("application present")
}

/// Delegates to an in-memory store but can be switched to refuse commits.
#[derive(Default)]
pub(super) struct FlakyRepository {
    pub(super) inner: InMemoryPlacementRepository,
    pub(super) offline: AtomicBool,
}

impl FlakyRepository {
    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(super) fn come_back(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }
}

impl PlacementRepository for FlakyRepository {
    fn opportunity(&self, id: &OpportunityId) -> Result<Option<Opportunity>, RepositoryError> {
        self.inner.opportunity(id)
    }

    fn application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<InternshipApplication>, RepositoryError> {
        self.inner.application(id)
    }

    fn withdrawal(
        &self,
        id: &WithdrawalRequestId,
    ) -> Result<Option<WithdrawalRequest>, RepositoryError> {
        self.inner.withdrawal(id)
    }

    fn opportunities(&self) -> Result<Vec<Opportunity>, RepositoryError> {
        self.inner.opportunities()
    }

    fn applications(&self) -> Result<Vec<InternshipApplication>, RepositoryError> {
        self.inner.applications()
    }

    fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, RepositoryError> {
        self.inner.withdrawals()
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        self.inner.commit(changes)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
