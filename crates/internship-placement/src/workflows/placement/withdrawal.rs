use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, RequestStatus, StaffId, StudentId, WithdrawalRequestId};
use super::error::PlacementError;

/// Student petition to cancel an application, adjudicated once by staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalRequestId,
    pub student: StudentId,
    pub application: ApplicationId,
    pub status: RequestStatus,
    /// Snapshot taken at creation; later confirmation changes do not reclassify the request.
    pub before_placement: bool,
    pub requested_on: NaiveDate,
    pub processed_on: Option<NaiveDate>,
    pub processed_by: Option<StaffId>,
    pub reason: String,
    pub remarks: Option<String>,
}

impl WithdrawalRequest {
    pub fn new(
        id: WithdrawalRequestId,
        student: StudentId,
        application: ApplicationId,
        before_placement: bool,
        reason: String,
        requested_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            student,
            application,
            status: RequestStatus::Pending,
            before_placement,
            requested_on,
            processed_on: None,
            processed_by: None,
            reason,
            remarks: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn approve(
        &mut self,
        staff: StaffId,
        remarks: String,
        today: NaiveDate,
    ) -> Result<(), PlacementError> {
        self.resolve(RequestStatus::Approved, staff, remarks, today)
    }

    pub fn reject(
        &mut self,
        staff: StaffId,
        remarks: String,
        today: NaiveDate,
    ) -> Result<(), PlacementError> {
        self.resolve(RequestStatus::Rejected, staff, remarks, today)
    }

    fn resolve(
        &mut self,
        status: RequestStatus,
        staff: StaffId,
        remarks: String,
        today: NaiveDate,
    ) -> Result<(), PlacementError> {
        if !self.is_pending() {
            return Err(PlacementError::AlreadyProcessed);
        }
        self.status = status;
        self.processed_on = Some(today);
        self.processed_by = Some(staff);
        self.remarks = Some(remarks);
        Ok(())
    }
}
