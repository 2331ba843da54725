use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::application::InternshipApplication;
use super::domain::{ApplicationId, OpportunityId, WithdrawalRequestId};
use super::opportunity::Opportunity;
use super::withdrawal::WithdrawalRequest;

/// Entities saved or removed by one engine operation. Repositories apply it all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub opportunities: Vec<Opportunity>,
    pub applications: Vec<InternshipApplication>,
    pub withdrawals: Vec<WithdrawalRequest>,
    pub removed_opportunities: Vec<OpportunityId>,
}

impl ChangeSet {
    pub fn save_opportunity(mut self, opportunity: Opportunity) -> Self {
        self.opportunities.push(opportunity);
        self
    }

    pub fn save_application(mut self, application: InternshipApplication) -> Self {
        self.applications.push(application);
        self
    }

    pub fn save_withdrawal(mut self, withdrawal: WithdrawalRequest) -> Self {
        self.withdrawals.push(withdrawal);
        self
    }

    pub fn remove_opportunity(mut self, id: OpportunityId) -> Self {
        self.removed_opportunities.push(id);
        self
    }
}

/// Storage abstraction so the engine can be exercised in isolation.
pub trait PlacementRepository: Send + Sync {
    fn opportunity(&self, id: &OpportunityId) -> Result<Option<Opportunity>, RepositoryError>;
    fn application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<InternshipApplication>, RepositoryError>;
    fn withdrawal(
        &self,
        id: &WithdrawalRequestId,
    ) -> Result<Option<WithdrawalRequest>, RepositoryError>;
    fn opportunities(&self) -> Result<Vec<Opportunity>, RepositoryError>;
    fn applications(&self) -> Result<Vec<InternshipApplication>, RepositoryError>;
    fn withdrawals(&self) -> Result<Vec<WithdrawalRequest>, RepositoryError>;
    fn commit(&self, changes: ChangeSet) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Entity families that receive their own ID sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Opportunity,
    Application,
    WithdrawalRequest,
}

impl EntityKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Opportunity => "INT",
            Self::Application => "APP",
            Self::WithdrawalRequest => "WR",
        }
    }
}

/// Source of monotonically increasing, human-readable identifiers.
pub trait IdGenerator: Send + Sync {
    fn next(&self, kind: EntityKind) -> String;
}

/// Outbound hook so a presentation layer can tell users what happened.
pub trait NoticePublisher: Send + Sync {
    fn publish(&self, notice: PlacementNotice) -> Result<(), NoticeError>;
}

/// Side-effect signal emitted after a committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementNotice {
    pub template: String,
    pub recipient: String,
    pub subject: String,
    pub details: BTreeMap<String, String>,
}

impl PlacementNotice {
    pub fn new(
        template: &str,
        recipient: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            template: template.to_string(),
            recipient: recipient.into(),
            subject: subject.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}
