use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::application::InternshipApplication;
use super::domain::{
    ApplicationId, OpportunityId, RepresentativeId, RepresentativeProfile, StaffId, StudentId,
    StudentProfile, WithdrawalRequestId,
};
use super::error::{IneligibilityReason, PlacementError};
use super::opportunity::{Opportunity, OpportunityDraft, OpportunityEdit};
use super::policy::PlacementPolicy;
use super::repository::{
    ChangeSet, EntityKind, IdGenerator, NoticePublisher, PlacementNotice, PlacementRepository,
};
use super::withdrawal::WithdrawalRequest;

/// Source of "today" for opening windows and audit dates.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Staff verdict on a pending withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalDecision {
    Approve,
    Reject,
}

/// Result of a successful placement acceptance, including the cascade.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementAcceptance {
    pub application: InternshipApplication,
    pub opportunity: Opportunity,
    pub withdrawn: Vec<ApplicationId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalOutcome {
    pub request: WithdrawalRequest,
    pub application: InternshipApplication,
    pub released_slot: bool,
}

/// Enforces every cross-entity placement rule.
///
/// Each mutating call loads fresh copies from the repository under a single writer lock,
/// validates and mutates those copies, then commits them as one [`ChangeSet`]. A failed commit
/// therefore leaves nothing half-applied and the caller may retry.
pub struct PlacementEngine<R, I, N> {
    repository: Arc<R>,
    ids: Arc<I>,
    notices: Arc<N>,
    policy: PlacementPolicy,
    clock: Arc<dyn Clock>,
    writer: Mutex<()>,
}

impl<R, I, N> PlacementEngine<R, I, N>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    pub fn new(repository: Arc<R>, ids: Arc<I>, notices: Arc<N>, policy: PlacementPolicy) -> Self {
        Self::with_clock(repository, ids, notices, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        ids: Arc<I>,
        notices: Arc<N>,
        policy: PlacementPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            ids,
            notices,
            policy,
            clock,
            writer: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &PlacementPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn repository(&self) -> &R {
        &self.repository
    }

    // The guard protects no data of its own, so a poisoned lock is still usable.
    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn load_opportunity(&self, id: &OpportunityId) -> Result<Opportunity, PlacementError> {
        self.repository
            .opportunity(id)?
            .ok_or_else(|| PlacementError::OpportunityNotFound(id.clone()))
    }

    pub(crate) fn load_application(
        &self,
        id: &ApplicationId,
    ) -> Result<InternshipApplication, PlacementError> {
        self.repository
            .application(id)?
            .ok_or_else(|| PlacementError::ApplicationNotFound(id.clone()))
    }

    pub(crate) fn load_withdrawal(
        &self,
        id: &WithdrawalRequestId,
    ) -> Result<WithdrawalRequest, PlacementError> {
        self.repository
            .withdrawal(id)?
            .ok_or_else(|| PlacementError::WithdrawalRequestNotFound(id.clone()))
    }

    fn commit(
        &self,
        changes: ChangeSet,
        notices: Vec<PlacementNotice>,
    ) -> Result<(), PlacementError> {
        self.repository.commit(changes)?;
        for notice in notices {
            let template = notice.template.clone();
            if let Err(error) = self.notices.publish(notice) {
                warn!(%error, %template, "placement notice dropped");
            }
        }
        Ok(())
    }

    fn owned_opportunity(
        &self,
        representative: &RepresentativeId,
        id: &OpportunityId,
    ) -> Result<Opportunity, PlacementError> {
        let opportunity = self.load_opportunity(id)?;
        if !opportunity.is_owned_by(representative) {
            return Err(PlacementError::NotOwner);
        }
        Ok(opportunity)
    }

    /// Post a new listing for staff review.
    pub fn create_opportunity(
        &self,
        representative: &RepresentativeProfile,
        draft: OpportunityDraft,
    ) -> Result<Opportunity, PlacementError> {
        let _writer = self.write_lock();

        if draft.closing_date < draft.opening_date {
            return Err(PlacementError::InvalidDateRange);
        }
        if draft.total_slots == 0 {
            return Err(PlacementError::InvalidSlotCount);
        }

        let owned = self
            .repository
            .opportunities()?
            .iter()
            .filter(|opportunity| opportunity.is_owned_by(&representative.id))
            .count();
        let limit = self.policy.max_opportunities_per_representative;
        if owned >= limit {
            return Err(PlacementError::OpportunityLimitReached { limit });
        }

        let id = OpportunityId(self.ids.next(EntityKind::Opportunity));
        let opportunity = Opportunity::new(
            id,
            representative.id.clone(),
            representative.company_name.clone(),
            draft,
            self.policy.slot_ceiling(),
        );

        let notice = PlacementNotice::new(
            "opportunity_submitted",
            representative.id.as_str(),
            opportunity.id.as_str(),
        )
        .detail("title", opportunity.title.clone());
        self.commit(
            ChangeSet::default().save_opportunity(opportunity.clone()),
            vec![notice],
        )?;

        info!(
            opportunity = %opportunity.id,
            representative = %representative.id,
            slots = opportunity.total_slots,
            "opportunity submitted for review"
        );
        Ok(opportunity)
    }

    pub fn edit_opportunity(
        &self,
        representative: &RepresentativeId,
        id: &OpportunityId,
        edit: OpportunityEdit,
    ) -> Result<Opportunity, PlacementError> {
        let _writer = self.write_lock();
        let mut opportunity = self.owned_opportunity(representative, id)?;
        let previous = opportunity.status;
        opportunity.revise(edit, self.policy.slot_ceiling())?;

        self.commit(
            ChangeSet::default().save_opportunity(opportunity.clone()),
            Vec::new(),
        )?;

        info!(
            opportunity = %opportunity.id,
            from = previous.label(),
            to = opportunity.status.label(),
            "opportunity revised"
        );
        Ok(opportunity)
    }

    pub fn delete_opportunity(
        &self,
        representative: &RepresentativeId,
        id: &OpportunityId,
    ) -> Result<(), PlacementError> {
        let _writer = self.write_lock();
        let opportunity = self.owned_opportunity(representative, id)?;
        opportunity.ensure_deletable()?;

        self.commit(
            ChangeSet::default().remove_opportunity(opportunity.id.clone()),
            Vec::new(),
        )?;

        info!(opportunity = %opportunity.id, "opportunity deleted");
        Ok(())
    }

    pub fn toggle_visibility(
        &self,
        representative: &RepresentativeId,
        id: &OpportunityId,
    ) -> Result<Opportunity, PlacementError> {
        let _writer = self.write_lock();
        let mut opportunity = self.owned_opportunity(representative, id)?;
        let visible = opportunity.toggle_visibility();

        self.commit(
            ChangeSet::default().save_opportunity(opportunity.clone()),
            Vec::new(),
        )?;

        debug!(opportunity = %opportunity.id, visible, "opportunity visibility toggled");
        Ok(opportunity)
    }

    pub fn approve_opportunity(
        &self,
        staff: &StaffId,
        id: &OpportunityId,
    ) -> Result<Opportunity, PlacementError> {
        self.review_opportunity(staff, id, true)
    }

    pub fn reject_opportunity(
        &self,
        staff: &StaffId,
        id: &OpportunityId,
    ) -> Result<Opportunity, PlacementError> {
        self.review_opportunity(staff, id, false)
    }

    fn review_opportunity(
        &self,
        staff: &StaffId,
        id: &OpportunityId,
        approve: bool,
    ) -> Result<Opportunity, PlacementError> {
        let _writer = self.write_lock();
        let mut opportunity = self.load_opportunity(id)?;
        let template = if approve {
            opportunity.approve()?;
            "opportunity_approved"
        } else {
            opportunity.reject()?;
            "opportunity_rejected"
        };

        let notice = PlacementNotice::new(
            template,
            opportunity.owner.as_str(),
            opportunity.id.as_str(),
        )
        .detail("reviewed_by", staff.as_str())
        .detail("title", opportunity.title.clone());
        self.commit(
            ChangeSet::default().save_opportunity(opportunity.clone()),
            vec![notice],
        )?;

        info!(
            opportunity = %opportunity.id,
            %staff,
            status = opportunity.status.label(),
            "opportunity reviewed"
        );
        Ok(opportunity)
    }

    /// File an application on behalf of a student.
    pub fn apply(
        &self,
        student: &StudentProfile,
        id: &OpportunityId,
    ) -> Result<InternshipApplication, PlacementError> {
        let _writer = self.write_lock();
        let mut opportunity = self.load_opportunity(id)?;

        let applications = self.repository.applications()?;
        let mine: Vec<&InternshipApplication> = applications
            .iter()
            .filter(|application| application.belongs_to(&student.id))
            .collect();

        let active = mine.iter().filter(|application| application.is_active()).count();
        let placed = mine
            .iter()
            .any(|application| application.is_confirmed_placement());
        if active >= self.policy.max_active_applications || placed {
            return Err(PlacementError::CapacityExceeded);
        }

        if mine
            .iter()
            .any(|application| application.opportunity == opportunity.id && application.is_active())
        {
            return Err(PlacementError::DuplicateApplication);
        }

        if !self.policy.is_level_eligible(student, opportunity.level) {
            return Err(PlacementError::NotEligible(
                IneligibilityReason::LevelRequiresSeniorYear {
                    level: opportunity.level,
                    minimum_year: self.policy.senior_year,
                },
            ));
        }

        let today = self.clock.today();
        if !opportunity.is_accepting_applications(today) {
            return Err(PlacementError::NotEligible(
                IneligibilityReason::NotAcceptingApplications,
            ));
        }

        if opportunity.preferred_major != student.major {
            return Err(PlacementError::NotEligible(
                IneligibilityReason::MajorMismatch {
                    required: opportunity.preferred_major,
                },
            ));
        }

        let application = InternshipApplication::new(
            ApplicationId(self.ids.next(EntityKind::Application)),
            student.id.clone(),
            opportunity.id.clone(),
            today,
        );
        opportunity.link_application(application.id.clone());

        let notices = vec![
            PlacementNotice::new(
                "application_submitted",
                student.id.as_str(),
                application.id.as_str(),
            )
            .detail("opportunity", opportunity.title.clone()),
            PlacementNotice::new(
                "application_received",
                opportunity.owner.as_str(),
                application.id.as_str(),
            )
            .detail("student", student.name.clone()),
        ];
        self.commit(
            ChangeSet::default()
                .save_application(application.clone())
                .save_opportunity(opportunity),
            notices,
        )?;

        info!(
            application = %application.id,
            student = %student.id,
            opportunity = %application.opportunity,
            active = active + 1,
            "application submitted"
        );
        Ok(application)
    }

    /// Offer the student a place. Slots are consumed only on acceptance.
    pub fn approve_application(
        &self,
        representative: &RepresentativeId,
        id: &ApplicationId,
    ) -> Result<InternshipApplication, PlacementError> {
        self.decide_application(representative, id, true)
    }

    pub fn reject_application(
        &self,
        representative: &RepresentativeId,
        id: &ApplicationId,
    ) -> Result<InternshipApplication, PlacementError> {
        self.decide_application(representative, id, false)
    }

    fn decide_application(
        &self,
        representative: &RepresentativeId,
        id: &ApplicationId,
        approve: bool,
    ) -> Result<InternshipApplication, PlacementError> {
        let _writer = self.write_lock();
        let mut application = self.load_application(id)?;
        let opportunity = self.load_opportunity(&application.opportunity)?;
        if !opportunity.is_owned_by(representative) {
            return Err(PlacementError::NotOwner);
        }

        let template = if approve {
            application.mark_successful()?;
            if !opportunity.has_available_slots() {
                return Err(PlacementError::NoSlots);
            }
            "application_successful"
        } else {
            application.mark_unsuccessful()?;
            "application_unsuccessful"
        };

        let notice = PlacementNotice::new(
            template,
            application.student.as_str(),
            application.id.as_str(),
        )
        .detail("opportunity", opportunity.title.clone());
        self.commit(
            ChangeSet::default().save_application(application.clone()),
            vec![notice],
        )?;

        info!(
            application = %application.id,
            %representative,
            status = application.status.label(),
            "application decided"
        );
        Ok(application)
    }

    /// Confirm a successful offer, fill a slot, and withdraw the student's other applications.
    pub fn accept_placement(
        &self,
        student: &StudentId,
        id: &ApplicationId,
    ) -> Result<PlacementAcceptance, PlacementError> {
        let _writer = self.write_lock();
        let mut application = self.load_application(id)?;
        if !application.belongs_to(student) {
            return Err(PlacementError::NotOwner);
        }
        application.confirm_placement()?;

        // re-read under the writer lock; a competing acceptance may have taken the last slot
        let mut opportunity = self.load_opportunity(&application.opportunity)?;
        opportunity.fill_slot()?;

        let mut changes = ChangeSet::default()
            .save_application(application.clone())
            .save_opportunity(opportunity.clone());
        let mut withdrawn = Vec::new();
        for mut sibling in self.repository.applications()? {
            if !sibling.belongs_to(student) || sibling.id == application.id {
                continue;
            }
            if sibling.can_be_withdrawn() {
                sibling.withdraw();
                withdrawn.push(sibling.id.clone());
                changes = changes.save_application(sibling);
            }
        }

        let mut notices = vec![PlacementNotice::new(
            "placement_accepted",
            student.as_str(),
            application.id.as_str(),
        )
        .detail("opportunity", opportunity.title.clone())
        .detail("withdrawn", withdrawn.len().to_string())];
        notices.push(
            PlacementNotice::new(
                "placement_confirmed",
                opportunity.owner.as_str(),
                application.id.as_str(),
            )
            .detail(
                "slots",
                format!("{}/{}", opportunity.filled_slots, opportunity.total_slots),
            ),
        );
        self.commit(changes, notices)?;

        info!(
            application = %application.id,
            %student,
            opportunity = %opportunity.id,
            filled = opportunity.filled_slots,
            total = opportunity.total_slots,
            withdrawn = withdrawn.len(),
            "placement accepted"
        );
        Ok(PlacementAcceptance {
            application,
            opportunity,
            withdrawn,
        })
    }

    pub fn request_withdrawal(
        &self,
        student: &StudentId,
        id: &ApplicationId,
        reason: String,
    ) -> Result<WithdrawalRequest, PlacementError> {
        let _writer = self.write_lock();
        let application = self.load_application(id)?;
        if !application.belongs_to(student) {
            return Err(PlacementError::NotOwner);
        }
        if !application.can_be_withdrawn() {
            return Err(PlacementError::NotWithdrawable);
        }

        let pending = self
            .repository
            .withdrawals()?
            .iter()
            .any(|request| request.application == application.id && request.is_pending());
        if pending {
            return Err(PlacementError::DuplicatePendingRequest);
        }

        let request = WithdrawalRequest::new(
            WithdrawalRequestId(self.ids.next(EntityKind::WithdrawalRequest)),
            student.clone(),
            application.id.clone(),
            !application.placement_confirmed,
            reason,
            self.clock.today(),
        );

        let notice = PlacementNotice::new(
            "withdrawal_requested",
            student.as_str(),
            request.id.as_str(),
        )
        .detail("application", application.id.as_str());
        self.commit(
            ChangeSet::default().save_withdrawal(request.clone()),
            vec![notice],
        )?;

        info!(
            request = %request.id,
            application = %application.id,
            before_placement = request.before_placement,
            "withdrawal requested"
        );
        Ok(request)
    }

    /// Resolve a pending withdrawal request. Approval releases a confirmed placement's slot.
    pub fn decide_withdrawal(
        &self,
        staff: &StaffId,
        id: &WithdrawalRequestId,
        decision: WithdrawalDecision,
        remarks: String,
    ) -> Result<WithdrawalOutcome, PlacementError> {
        let _writer = self.write_lock();
        let mut request = self.load_withdrawal(id)?;
        if !request.is_pending() {
            return Err(PlacementError::AlreadyProcessed);
        }
        let mut application = self.load_application(&request.application)?;
        let today = self.clock.today();

        let mut changes = ChangeSet::default();
        let mut released_slot = false;
        let template = match decision {
            WithdrawalDecision::Approve => {
                request.approve(staff.clone(), remarks, today)?;
                // an application that reached a terminal state while the request waited stays put
                if !application.status.is_terminal() {
                    if application.withdraw() {
                        let mut opportunity = self.load_opportunity(&application.opportunity)?;
                        released_slot = opportunity.release_slot();
                        changes = changes.save_opportunity(opportunity);
                    }
                    changes = changes.save_application(application.clone());
                }
                "withdrawal_approved"
            }
            WithdrawalDecision::Reject => {
                request.reject(staff.clone(), remarks, today)?;
                "withdrawal_rejected"
            }
        };
        changes = changes.save_withdrawal(request.clone());

        let notice = PlacementNotice::new(template, request.student.as_str(), request.id.as_str())
            .detail("application", application.id.as_str());
        self.commit(changes, vec![notice])?;

        info!(
            request = %request.id,
            %staff,
            status = request.status.label(),
            released_slot,
            "withdrawal request decided"
        );
        Ok(WithdrawalOutcome {
            request,
            application,
            released_slot,
        })
    }
}
