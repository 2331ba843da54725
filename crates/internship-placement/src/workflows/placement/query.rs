use serde::{Deserialize, Serialize};

use super::application::InternshipApplication;
use super::domain::{
    ApplicationId, InternshipLevel, Major, OpportunityId, OpportunityStatus, RepresentativeId,
    RequestStatus, StudentId, StudentProfile, WithdrawalRequestId,
};
use super::engine::PlacementEngine;
use super::error::PlacementError;
use super::opportunity::Opportunity;
use super::repository::{IdGenerator, NoticePublisher, PlacementRepository};
use super::withdrawal::WithdrawalRequest;

/// Optional criteria for staff opportunity reports. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityFilter {
    #[serde(default)]
    pub status: Option<OpportunityStatus>,
    #[serde(default)]
    pub major: Option<Major>,
    #[serde(default)]
    pub level: Option<InternshipLevel>,
    #[serde(default)]
    pub company: Option<String>,
}

impl OpportunityFilter {
    pub fn matches(&self, opportunity: &Opportunity) -> bool {
        self.status.map_or(true, |status| opportunity.status == status)
            && self
                .major
                .map_or(true, |major| opportunity.preferred_major == major)
            && self.level.map_or(true, |level| opportunity.level == level)
            && self.company.as_deref().map_or(true, |company| {
                opportunity.company_name.eq_ignore_ascii_case(company.trim())
            })
    }
}

fn sort_by_title(opportunities: &mut [Opportunity]) {
    opportunities.sort_by_cached_key(|opportunity| opportunity.title.to_lowercase());
}

impl<R, I, N> PlacementEngine<R, I, N>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    pub fn opportunity(&self, id: &OpportunityId) -> Result<Opportunity, PlacementError> {
        self.load_opportunity(id)
    }

    pub fn application(&self, id: &ApplicationId) -> Result<InternshipApplication, PlacementError> {
        self.load_application(id)
    }

    pub fn withdrawal(&self, id: &WithdrawalRequestId) -> Result<WithdrawalRequest, PlacementError> {
        self.load_withdrawal(id)
    }

    /// Listings a student can see: visible, approved, matching major, and level-eligible.
    pub fn available_opportunities(
        &self,
        student: &StudentProfile,
    ) -> Result<Vec<Opportunity>, PlacementError> {
        let policy = self.policy();
        let mut visible: Vec<Opportunity> = self
            .repository()
            .opportunities()?
            .into_iter()
            .filter(|opportunity| {
                opportunity.visible
                    && opportunity.status == OpportunityStatus::Approved
                    && opportunity.preferred_major == student.major
                    && policy.is_level_eligible(student, opportunity.level)
            })
            .collect();
        sort_by_title(&mut visible);
        Ok(visible)
    }

    pub fn student_applications(
        &self,
        student: &StudentId,
    ) -> Result<Vec<InternshipApplication>, PlacementError> {
        Ok(self
            .repository()
            .applications()?
            .into_iter()
            .filter(|application| application.belongs_to(student))
            .collect())
    }

    pub fn student_withdrawals(
        &self,
        student: &StudentId,
    ) -> Result<Vec<WithdrawalRequest>, PlacementError> {
        Ok(self
            .repository()
            .withdrawals()?
            .into_iter()
            .filter(|request| &request.student == student)
            .collect())
    }

    /// The opportunity behind the student's confirmed placement, if any.
    pub fn accepted_placement(
        &self,
        student: &StudentId,
    ) -> Result<Option<Opportunity>, PlacementError> {
        let confirmed = self
            .repository()
            .applications()?
            .into_iter()
            .find(|application| {
                application.belongs_to(student) && application.is_confirmed_placement()
            });
        match confirmed {
            Some(application) => self.load_opportunity(&application.opportunity).map(Some),
            None => Ok(None),
        }
    }

    pub fn representative_opportunities(
        &self,
        representative: &RepresentativeId,
    ) -> Result<Vec<Opportunity>, PlacementError> {
        Ok(self
            .repository()
            .opportunities()?
            .into_iter()
            .filter(|opportunity| opportunity.is_owned_by(representative))
            .collect())
    }

    /// Applications filed against one of the representative's own listings.
    pub fn opportunity_applications(
        &self,
        representative: &RepresentativeId,
        id: &OpportunityId,
    ) -> Result<Vec<InternshipApplication>, PlacementError> {
        let opportunity = self.load_opportunity(id)?;
        if !opportunity.is_owned_by(representative) {
            return Err(PlacementError::NotOwner);
        }
        Ok(self
            .repository()
            .applications()?
            .into_iter()
            .filter(|application| application.opportunity == opportunity.id)
            .collect())
    }

    pub fn pending_opportunities(&self) -> Result<Vec<Opportunity>, PlacementError> {
        self.opportunity_report(&OpportunityFilter {
            status: Some(OpportunityStatus::Pending),
            ..OpportunityFilter::default()
        })
    }

    pub fn pending_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, PlacementError> {
        Ok(self
            .repository()
            .withdrawals()?
            .into_iter()
            .filter(|request| request.status == RequestStatus::Pending)
            .collect())
    }

    /// Filtered listings sorted by title, ignoring case.
    pub fn opportunity_report(
        &self,
        filter: &OpportunityFilter,
    ) -> Result<Vec<Opportunity>, PlacementError> {
        let mut matching: Vec<Opportunity> = self
            .repository()
            .opportunities()?
            .into_iter()
            .filter(|opportunity| filter.matches(opportunity))
            .collect();
        sort_by_title(&mut matching);
        Ok(matching)
    }
}
