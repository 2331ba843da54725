use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, InternshipLevel, Major, OpportunityId, OpportunityStatus, RepresentativeId,
};
use super::error::PlacementError;

/// Fields a representative supplies when posting a new listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityDraft {
    pub title: String,
    pub description: String,
    pub level: InternshipLevel,
    pub preferred_major: Major,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub total_slots: u8,
}

/// Fields a representative may revise while a listing is still under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityEdit {
    pub title: String,
    pub description: String,
    pub total_slots: u8,
}

/// A posted internship listing and its slot capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    pub title: String,
    pub description: String,
    pub level: InternshipLevel,
    pub preferred_major: Major,
    pub opening_date: NaiveDate,
    pub closing_date: NaiveDate,
    pub status: OpportunityStatus,
    pub company_name: String,
    pub owner: RepresentativeId,
    pub total_slots: u8,
    pub filled_slots: u8,
    pub visible: bool,
    /// Back-references to applications filed against this listing.
    pub applications: Vec<ApplicationId>,
}

impl Opportunity {
    /// New listings start pending review and hidden from students.
    pub fn new(
        id: OpportunityId,
        owner: RepresentativeId,
        company_name: String,
        draft: OpportunityDraft,
        max_slots: u8,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            level: draft.level,
            preferred_major: draft.preferred_major,
            opening_date: draft.opening_date,
            closing_date: draft.closing_date,
            status: OpportunityStatus::Pending,
            company_name,
            owner,
            total_slots: draft.total_slots.min(max_slots),
            filled_slots: 0,
            visible: false,
            applications: Vec::new(),
        }
    }

    pub fn is_owned_by(&self, representative: &RepresentativeId) -> bool {
        &self.owner == representative
    }

    pub fn has_available_slots(&self) -> bool {
        self.filled_slots < self.total_slots
    }

    pub fn available_slots(&self) -> u8 {
        self.total_slots.saturating_sub(self.filled_slots)
    }

    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        today >= self.opening_date && today <= self.closing_date
    }

    pub fn is_accepting_applications(&self, today: NaiveDate) -> bool {
        self.status == OpportunityStatus::Approved
            && self.visible
            && self.has_available_slots()
            && self.is_open_on(today)
    }

    /// Consume one slot for a confirmed placement, moving to `Filled` on the last one.
    pub fn fill_slot(&mut self) -> Result<(), PlacementError> {
        if !self.has_available_slots() {
            return Err(PlacementError::NoSlots);
        }
        self.filled_slots += 1;
        if self.filled_slots == self.total_slots {
            self.status = OpportunityStatus::Filled;
        }
        Ok(())
    }

    /// Return a slot after a confirmed placement is withdrawn. Never drops below `Approved`.
    pub fn release_slot(&mut self) -> bool {
        if self.filled_slots == 0 {
            return false;
        }
        self.filled_slots -= 1;
        if self.status == OpportunityStatus::Filled {
            self.status = OpportunityStatus::Approved;
        }
        true
    }

    pub fn approve(&mut self) -> Result<(), PlacementError> {
        match self.status {
            OpportunityStatus::Pending => {
                self.status = OpportunityStatus::Approved;
                Ok(())
            }
            // rejected listings go back through edit before they can be approved
            OpportunityStatus::Approved | OpportunityStatus::Filled | OpportunityStatus::Rejected => {
                Err(PlacementError::AlreadyProcessed)
            }
        }
    }

    pub fn reject(&mut self) -> Result<(), PlacementError> {
        match self.status {
            OpportunityStatus::Approved | OpportunityStatus::Filled => {
                Err(PlacementError::AlreadyProcessed)
            }
            OpportunityStatus::Pending | OpportunityStatus::Rejected => {
                self.status = OpportunityStatus::Rejected;
                Ok(())
            }
        }
    }

    /// Apply a revision. Editing a rejected listing sends it back for review.
    pub fn revise(&mut self, edit: OpportunityEdit, max_slots: u8) -> Result<(), PlacementError> {
        if !self.status.is_open_for_revision() {
            return Err(PlacementError::InvalidStatusForEdit);
        }
        if edit.total_slots == 0 {
            return Err(PlacementError::InvalidSlotCount);
        }

        self.title = edit.title;
        self.description = edit.description;
        self.total_slots = edit.total_slots.min(max_slots);
        if self.status == OpportunityStatus::Rejected {
            self.status = OpportunityStatus::Pending;
        }
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), PlacementError> {
        if !self.applications.is_empty() {
            return Err(PlacementError::HasApplications);
        }
        if !self.status.is_open_for_revision() {
            return Err(PlacementError::InvalidStatusForDelete);
        }
        Ok(())
    }

    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn link_application(&mut self, application: ApplicationId) {
        if !self.applications.contains(&application) {
            self.applications.push(application);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
    }

    fn opportunity(total_slots: u8) -> Opportunity {
        Opportunity::new(
            OpportunityId::from("INT0001"),
            RepresentativeId::from("rep-1"),
            "Acme".to_string(),
            OpportunityDraft {
                title: "Backend Intern".to_string(),
                description: "Rust services".to_string(),
                level: InternshipLevel::Basic,
                preferred_major: Major::Cs,
                opening_date: date(1),
                closing_date: date(30),
                total_slots,
            },
            10,
        )
    }

    #[test]
    fn new_listing_is_pending_hidden_and_clamped() {
        let listing = opportunity(25);
        assert_eq!(listing.status, OpportunityStatus::Pending);
        assert!(!listing.visible);
        assert_eq!(listing.total_slots, 10);
        assert_eq!(listing.filled_slots, 0);
    }

    #[test]
    fn filling_last_slot_marks_filled_and_release_reverts() {
        let mut listing = opportunity(2);
        listing.approve().expect("pending listing approves");

        listing.fill_slot().expect("first slot");
        assert_eq!(listing.status, OpportunityStatus::Approved);
        listing.fill_slot().expect("second slot");
        assert_eq!(listing.status, OpportunityStatus::Filled);
        assert!(matches!(listing.fill_slot(), Err(PlacementError::NoSlots)));
        assert_eq!(listing.filled_slots, 2);

        assert!(listing.release_slot());
        assert_eq!(listing.status, OpportunityStatus::Approved);
        assert_eq!(listing.filled_slots, 1);
    }

    #[test]
    fn release_on_empty_listing_is_noop() {
        let mut listing = opportunity(1);
        listing.approve().expect("approves");
        assert!(!listing.release_slot());
        assert_eq!(listing.status, OpportunityStatus::Approved);
    }

    #[test]
    fn accepting_window_is_inclusive() {
        let mut listing = opportunity(1);
        listing.approve().expect("approves");
        listing.toggle_visibility();

        assert!(listing.is_accepting_applications(date(1)));
        assert!(listing.is_accepting_applications(date(30)));
        assert!(!listing.is_accepting_applications(
            NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid")
        ));
    }

    #[test]
    fn approval_and_rejection_are_asymmetric() {
        let mut rejected = opportunity(1);
        rejected.reject().expect("pending listing rejects");
        assert!(matches!(
            rejected.approve(),
            Err(PlacementError::AlreadyProcessed)
        ));

        let mut approved = opportunity(1);
        approved.approve().expect("approves");
        assert!(matches!(
            approved.reject(),
            Err(PlacementError::AlreadyProcessed)
        ));
    }

    #[test]
    fn revising_rejected_listing_resets_to_pending() {
        let mut listing = opportunity(3);
        listing.reject().expect("rejects");
        listing
            .revise(
                OpportunityEdit {
                    title: "Platform Intern".to_string(),
                    description: "Updated".to_string(),
                    total_slots: 4,
                },
                10,
            )
            .expect("rejected listing is editable");
        assert_eq!(listing.status, OpportunityStatus::Pending);
        assert_eq!(listing.title, "Platform Intern");
        assert_eq!(listing.total_slots, 4);

        listing.approve().expect("approves");
        let edit = OpportunityEdit {
            title: "Late edit".to_string(),
            description: String::new(),
            total_slots: 4,
        };
        assert!(matches!(
            listing.revise(edit, 10),
            Err(PlacementError::InvalidStatusForEdit)
        ));
    }

    #[test]
    fn deletion_requires_no_applications() {
        let mut listing = opportunity(1);
        listing.ensure_deletable().expect("fresh listing deletable");
        listing.link_application(ApplicationId::from("APP0001"));
        listing.link_application(ApplicationId::from("APP0001"));
        assert_eq!(listing.applications.len(), 1);
        assert!(matches!(
            listing.ensure_deletable(),
            Err(PlacementError::HasApplications)
        ));
    }
}
