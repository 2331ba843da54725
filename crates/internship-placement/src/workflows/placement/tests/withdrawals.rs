use super::common::*;
use crate::workflows::placement::domain::{
    ApplicationStatus, OpportunityStatus, RequestStatus, StudentId, WithdrawalRequestId,
};
use crate::workflows::placement::engine::WithdrawalDecision;
use crate::workflows::placement::error::PlacementError;

#[test]
fn only_the_applicant_may_request_withdrawal() {
    let (engine, _, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let application = engine.apply(&student("U1", 2), &listing.id).expect("apply");

    assert!(matches!(
        engine.request_withdrawal(&StudentId::from("U2"), &application.id, String::new()),
        Err(PlacementError::NotOwner)
    ));
}

#[test]
fn terminal_applications_are_not_withdrawable() {
    let (engine, _, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let applicant = student("U1", 2);
    let application = engine.apply(&applicant, &listing.id).expect("apply");
    engine
        .reject_application(&owner.id, &application.id)
        .expect("rejected");

    assert!(matches!(
        engine.request_withdrawal(&applicant.id, &application.id, String::new()),
        Err(PlacementError::NotWithdrawable)
    ));
}

#[test]
fn second_pending_request_is_refused_until_the_first_is_decided() {
    let (engine, _, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let applicant = student("U1", 2);
    let application = engine.apply(&applicant, &listing.id).expect("apply");

    let first = engine
        .request_withdrawal(&applicant.id, &application.id, "changed plans".to_string())
        .expect("first request");
    assert_eq!(first.id, WithdrawalRequestId::from("WR0001"));
    assert_eq!(first.reason, "changed plans");
    assert_eq!(first.requested_on, today());
    assert!(matches!(
        engine.request_withdrawal(&applicant.id, &application.id, String::new()),
        Err(PlacementError::DuplicatePendingRequest)
    ));

    engine
        .decide_withdrawal(&staff(), &first.id, WithdrawalDecision::Reject, String::new())
        .expect("rejected");
    engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("new request after rejection");
}

#[test]
fn request_snapshots_whether_placement_was_confirmed() {
    let (engine, _, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 2));
    let applicant = student("U1", 2);
    let application = successful_application(&engine, &owner, &applicant, &listing.id);

    let early = engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("request before acceptance");
    assert!(early.before_placement);

    engine
        .accept_placement(&applicant.id, &application.id)
        .expect("accepted while request pending");
    assert!(engine.withdrawal(&early.id).expect("stored").before_placement);

    engine
        .decide_withdrawal(&staff(), &early.id, WithdrawalDecision::Reject, String::new())
        .expect("rejected");
    let late = engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("request after acceptance");
    assert!(!late.before_placement);
}

#[test]
fn approving_confirmed_withdrawal_releases_exactly_one_slot() {
    let (engine, repository, notices) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let applicant = student("U1", 2);
    let application = successful_application(&engine, &owner, &applicant, &listing.id);
    engine
        .accept_placement(&applicant.id, &application.id)
        .expect("accepted");
    assert_eq!(
        stored_opportunity(&repository, &listing.id).status,
        OpportunityStatus::Filled
    );

    let request = engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("request");
    let outcome = engine
        .decide_withdrawal(
            &staff(),
            &request.id,
            WithdrawalDecision::Approve,
            "approved on appeal".to_string(),
        )
        .expect("approved");

    assert!(outcome.released_slot);
    assert_eq!(outcome.request.status, RequestStatus::Approved);
    assert_eq!(outcome.request.processed_by, Some(staff()));
    assert_eq!(outcome.request.processed_on, Some(today()));
    assert_eq!(outcome.request.remarks.as_deref(), Some("approved on appeal"));

    let stored = stored_application(&repository, &application.id);
    assert_eq!(stored.status, ApplicationStatus::Withdrawn);
    assert!(!stored.placement_confirmed);

    let listing = stored_opportunity(&repository, &listing.id);
    assert_eq!(listing.filled_slots, 0);
    assert_eq!(listing.status, OpportunityStatus::Approved);
    assert!(engine
        .accepted_placement(&applicant.id)
        .expect("readable")
        .is_none());
    assert!(notices
        .events()
        .iter()
        .any(|notice| notice.template == "withdrawal_approved" && notice.recipient == "U1"));
}

#[test]
fn approving_unconfirmed_withdrawal_leaves_slots_alone() {
    let (engine, repository, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 2));
    let placed = student("U1", 2);
    let placed_application = successful_application(&engine, &owner, &placed, &listing.id);
    engine
        .accept_placement(&placed.id, &placed_application.id)
        .expect("accepted");

    let waiting = student("U2", 2);
    let waiting_application = engine.apply(&waiting, &listing.id).expect("apply");
    let request = engine
        .request_withdrawal(&waiting.id, &waiting_application.id, String::new())
        .expect("request");
    let outcome = engine
        .decide_withdrawal(&staff(), &request.id, WithdrawalDecision::Approve, String::new())
        .expect("approved");

    assert!(!outcome.released_slot);
    assert_eq!(outcome.application.status, ApplicationStatus::Withdrawn);
    assert_eq!(stored_opportunity(&repository, &listing.id).filled_slots, 1);
}

#[test]
fn rejected_withdrawal_leaves_application_untouched() {
    let (engine, repository, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let applicant = student("U1", 2);
    let application = successful_application(&engine, &owner, &applicant, &listing.id);
    let before = stored_application(&repository, &application.id);

    let request = engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("request");
    let outcome = engine
        .decide_withdrawal(&staff(), &request.id, WithdrawalDecision::Reject, String::new())
        .expect("rejected");

    assert_eq!(outcome.request.status, RequestStatus::Rejected);
    assert!(!outcome.released_slot);
    assert_eq!(stored_application(&repository, &application.id), before);
}

#[test]
fn requests_are_decided_only_once() {
    let (engine, _, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let applicant = student("U1", 2);
    let application = engine.apply(&applicant, &listing.id).expect("apply");
    let request = engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("request");

    engine
        .decide_withdrawal(&staff(), &request.id, WithdrawalDecision::Approve, String::new())
        .expect("approved");
    assert!(matches!(
        engine.decide_withdrawal(&staff(), &request.id, WithdrawalDecision::Reject, String::new()),
        Err(PlacementError::AlreadyProcessed)
    ));
    assert!(matches!(
        engine.decide_withdrawal(
            &staff(),
            &WithdrawalRequestId::from("WR9999"),
            WithdrawalDecision::Approve,
            String::new()
        ),
        Err(PlacementError::WithdrawalRequestNotFound(_))
    ));
}

#[test]
fn approving_request_for_rejected_application_keeps_it_unsuccessful() {
    let (engine, repository, _) = build_engine();
    let owner = representative("rep-1");
    let listing = open_opportunity(&engine, &owner, draft("Alpha", 1));
    let applicant = student("U1", 2);
    let application = engine.apply(&applicant, &listing.id).expect("apply");
    let request = engine
        .request_withdrawal(&applicant.id, &application.id, String::new())
        .expect("request while pending");
    engine
        .reject_application(&owner.id, &application.id)
        .expect("rejected while request waits");

    let outcome = engine
        .decide_withdrawal(&staff(), &request.id, WithdrawalDecision::Approve, String::new())
        .expect("approved");

    assert_eq!(outcome.request.status, RequestStatus::Approved);
    assert_eq!(outcome.application.status, ApplicationStatus::Unsuccessful);
    assert!(!outcome.released_slot);
    assert_eq!(
        stored_application(&repository, &application.id).status,
        ApplicationStatus::Unsuccessful
    );
    assert_eq!(stored_opportunity(&repository, &listing.id).filled_slots, 0);
}
