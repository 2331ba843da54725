use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use super::domain::{ApplicationId, InternshipLevel, Major, OpportunityId, WithdrawalRequestId};
use super::repository::RepositoryError;

/// Why a student may not apply to an opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibilityReason {
    LevelRequiresSeniorYear {
        level: InternshipLevel,
        minimum_year: u8,
    },
    NotAcceptingApplications,
    MajorMismatch {
        required: Major,
    },
}

impl std::fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelRequiresSeniorYear {
                level,
                minimum_year,
            } => write!(
                f,
                "{} internships are open to year {} students and above",
                level.label(),
                minimum_year
            ),
            Self::NotAcceptingApplications => {
                write!(f, "opportunity is not currently accepting applications")
            }
            Self::MajorMismatch { required } => {
                write!(f, "opportunity is restricted to {} majors", required.label())
            }
        }
    }
}

/// Business-rule violations and collaborator failures raised by the placement engine.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("actor does not own this record")]
    NotOwner,
    #[error("record has already been processed")]
    AlreadyProcessed,
    #[error("not eligible: {0}")]
    NotEligible(IneligibilityReason),
    #[error("an active application for this opportunity already exists")]
    DuplicateApplication,
    #[error("a withdrawal request for this application is already pending")]
    DuplicatePendingRequest,
    #[error("no slots available for this opportunity")]
    NoSlots,
    #[error("application has not been approved by the company")]
    NotApproved,
    #[error("placement has already been accepted")]
    AlreadyConfirmed,
    #[error("application cannot be withdrawn in its current state")]
    NotWithdrawable,
    #[error("application limit reached or a placement was already accepted")]
    CapacityExceeded,
    #[error("only pending or rejected opportunities can be edited")]
    InvalidStatusForEdit,
    #[error("only pending or rejected opportunities can be deleted")]
    InvalidStatusForDelete,
    #[error("opportunity has applications and cannot be deleted")]
    HasApplications,
    #[error("representative has reached the opportunity limit of {limit}")]
    OpportunityLimitReached { limit: usize },
    #[error("closing date precedes opening date")]
    InvalidDateRange,
    #[error("an opportunity needs at least one slot")]
    InvalidSlotCount,
    #[error("opportunity {0} not found")]
    OpportunityNotFound(OpportunityId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("withdrawal request {0} not found")]
    WithdrawalRequestNotFound(WithdrawalRequestId),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl PlacementError {
    /// Stable machine-readable tag surfaced to presentation layers.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotOwner => "not_owner",
            Self::AlreadyProcessed => "already_processed",
            Self::NotEligible(_) => "not_eligible",
            Self::DuplicateApplication => "duplicate_application",
            Self::DuplicatePendingRequest => "duplicate_pending_request",
            Self::NoSlots => "no_slots",
            Self::NotApproved => "not_approved",
            Self::AlreadyConfirmed => "already_confirmed",
            Self::NotWithdrawable => "not_withdrawable",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::InvalidStatusForEdit => "invalid_status_for_edit",
            Self::InvalidStatusForDelete => "invalid_status_for_delete",
            Self::HasApplications => "has_applications",
            Self::OpportunityLimitReached { .. } => "opportunity_limit_reached",
            Self::InvalidDateRange => "invalid_date_range",
            Self::InvalidSlotCount => "invalid_slot_count",
            Self::OpportunityNotFound(_) => "opportunity_not_found",
            Self::ApplicationNotFound(_) => "application_not_found",
            Self::WithdrawalRequestNotFound(_) => "withdrawal_request_not_found",
            Self::Persistence(_) => "persistence",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::OpportunityNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::WithdrawalRequestNotFound(_) => StatusCode::NOT_FOUND,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::InvalidDateRange | Self::InvalidSlotCount | Self::NotEligible(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for PlacementError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status_code(), axum::Json(payload)).into_response()
    }
}
