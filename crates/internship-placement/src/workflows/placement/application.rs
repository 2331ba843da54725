use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationStatus, OpportunityId, StudentId};
use super::error::PlacementError;

/// A student's bid for one opportunity.
///
/// `placement_confirmed` is only ever true while `status` is `Successful`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipApplication {
    pub id: ApplicationId,
    pub student: StudentId,
    pub opportunity: OpportunityId,
    pub status: ApplicationStatus,
    pub placement_confirmed: bool,
    pub applied_on: NaiveDate,
}

impl InternshipApplication {
    pub fn new(
        id: ApplicationId,
        student: StudentId,
        opportunity: OpportunityId,
        applied_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            student,
            opportunity,
            status: ApplicationStatus::Pending,
            placement_confirmed: false,
            applied_on,
        }
    }

    pub fn belongs_to(&self, student: &StudentId) -> bool {
        &self.student == student
    }

    /// Counts toward the student's application limit.
    pub fn is_active(&self) -> bool {
        self.status != ApplicationStatus::Withdrawn
    }

    pub fn is_confirmed_placement(&self) -> bool {
        self.placement_confirmed && self.status == ApplicationStatus::Successful
    }

    pub fn can_be_withdrawn(&self) -> bool {
        !self.status.is_terminal()
    }

    fn ensure_pending(&self) -> Result<(), PlacementError> {
        if self.status == ApplicationStatus::Pending {
            Ok(())
        } else {
            Err(PlacementError::AlreadyProcessed)
        }
    }

    pub fn mark_successful(&mut self) -> Result<(), PlacementError> {
        self.ensure_pending()?;
        self.status = ApplicationStatus::Successful;
        Ok(())
    }

    pub fn mark_unsuccessful(&mut self) -> Result<(), PlacementError> {
        self.ensure_pending()?;
        self.status = ApplicationStatus::Unsuccessful;
        Ok(())
    }

    pub fn confirm_placement(&mut self) -> Result<(), PlacementError> {
        if self.status != ApplicationStatus::Successful {
            return Err(PlacementError::NotApproved);
        }
        if self.placement_confirmed {
            return Err(PlacementError::AlreadyConfirmed);
        }
        self.placement_confirmed = true;
        Ok(())
    }

    /// Move to `Withdrawn`, returning whether a confirmed placement was given up.
    pub fn withdraw(&mut self) -> bool {
        let released = self.placement_confirmed;
        self.status = ApplicationStatus::Withdrawn;
        self.placement_confirmed = false;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> InternshipApplication {
        InternshipApplication::new(
            ApplicationId::from("APP0001"),
            StudentId::from("U2310001A"),
            OpportunityId::from("INT0001"),
            NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
        )
    }

    #[test]
    fn decisions_only_apply_to_pending_applications() {
        let mut app = application();
        app.mark_successful().expect("pending approves");
        assert!(matches!(
            app.mark_unsuccessful(),
            Err(PlacementError::AlreadyProcessed)
        ));
        assert_eq!(app.status, ApplicationStatus::Successful);
    }

    #[test]
    fn confirmation_requires_success_and_happens_once() {
        let mut app = application();
        assert!(matches!(
            app.confirm_placement(),
            Err(PlacementError::NotApproved)
        ));

        app.mark_successful().expect("approves");
        app.confirm_placement().expect("confirms");
        assert!(app.is_confirmed_placement());
        assert!(matches!(
            app.confirm_placement(),
            Err(PlacementError::AlreadyConfirmed)
        ));
    }

    #[test]
    fn withdrawing_clears_confirmation() {
        let mut app = application();
        app.mark_successful().expect("approves");
        app.confirm_placement().expect("confirms");

        assert!(app.withdraw());
        assert_eq!(app.status, ApplicationStatus::Withdrawn);
        assert!(!app.placement_confirmed);
        assert!(!app.is_active());
        assert!(!app.can_be_withdrawn());
    }

    #[test]
    fn unsuccessful_applications_still_count_as_active() {
        let mut app = application();
        app.mark_unsuccessful().expect("rejects");
        assert!(app.is_active());
        assert!(!app.can_be_withdrawn());
        assert!(app.status.is_terminal());
    }
}
