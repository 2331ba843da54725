//! Internship placement lifecycle: opportunities, applications, and withdrawal requests.
//!
//! Entities are stored in a [`PlacementRepository`] keyed by identifier and reference each other
//! by ID only. [`PlacementEngine`] owns every cross-entity rule (capacity limits, slot accounting,
//! the accept cascade) and commits each operation as a single [`ChangeSet`].

pub mod application;
pub mod domain;
pub mod engine;
pub mod error;
pub mod memory;
pub mod opportunity;
pub mod policy;
pub mod query;
pub mod repository;
pub mod router;
pub mod withdrawal;

#[cfg(test)]
mod tests;

pub use application::InternshipApplication;
pub use domain::{
    ApplicationId, ApplicationStatus, InternshipLevel, Major, OpportunityId, OpportunityStatus,
    RepresentativeId, RepresentativeProfile, RequestStatus, StaffId, StudentId, StudentProfile,
    WithdrawalRequestId,
};
pub use engine::{
    Clock, FixedClock, PlacementAcceptance, PlacementEngine, SystemClock, WithdrawalDecision,
    WithdrawalOutcome,
};
pub use error::{IneligibilityReason, PlacementError};
pub use memory::{InMemoryNoticePublisher, InMemoryPlacementRepository, SequentialIdGenerator};
pub use opportunity::{Opportunity, OpportunityDraft, OpportunityEdit};
pub use policy::{PlacementPolicy, SLOT_CAP};
pub use query::OpportunityFilter;
pub use repository::{
    ChangeSet, EntityKind, IdGenerator, NoticeError, NoticePublisher, PlacementNotice,
    PlacementRepository, RepositoryError,
};
pub use router::placement_router;
pub use withdrawal::WithdrawalRequest;
