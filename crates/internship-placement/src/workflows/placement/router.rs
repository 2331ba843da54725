use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::application::InternshipApplication;
use super::domain::{
    ApplicationId, OpportunityId, RepresentativeId, RepresentativeProfile, StaffId, StudentId,
    StudentProfile, WithdrawalRequestId,
};
use super::engine::{PlacementAcceptance, PlacementEngine, WithdrawalDecision, WithdrawalOutcome};
use super::error::PlacementError;
use super::opportunity::{Opportunity, OpportunityDraft, OpportunityEdit};
use super::query::OpportunityFilter;
use super::repository::{IdGenerator, NoticePublisher, PlacementRepository};
use super::withdrawal::WithdrawalRequest;

type SharedEngine<R, I, N> = State<Arc<PlacementEngine<R, I, N>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateOpportunityRequest {
    pub(crate) representative: RepresentativeProfile,
    pub(crate) opportunity: OpportunityDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EditOpportunityRequest {
    pub(crate) representative_id: RepresentativeId,
    pub(crate) changes: OpportunityEdit,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepresentativeRequest {
    pub(crate) representative_id: RepresentativeId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StaffRequest {
    pub(crate) staff_id: StaffId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub(crate) student: StudentProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentRequest {
    pub(crate) student_id: StudentId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawalRequestBody {
    pub(crate) student_id: StudentId,
    #[serde(default)]
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawalDecisionRequest {
    pub(crate) staff_id: StaffId,
    pub(crate) decision: WithdrawalDecision,
    #[serde(default)]
    pub(crate) remarks: String,
}

/// Router exposing every placement operation as JSON endpoints.
pub fn placement_router<R, I, N>(engine: Arc<PlacementEngine<R, I, N>>) -> Router
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/opportunities",
            get(report_handler::<R, I, N>).post(create_opportunity_handler::<R, I, N>),
        )
        .route(
            "/api/v1/opportunities/available",
            post(available_opportunities_handler::<R, I, N>),
        )
        .route(
            "/api/v1/opportunities/:opportunity_id",
            get(opportunity_handler::<R, I, N>)
                .put(edit_opportunity_handler::<R, I, N>)
                .delete(delete_opportunity_handler::<R, I, N>),
        )
        .route(
            "/api/v1/opportunities/:opportunity_id/visibility",
            post(toggle_visibility_handler::<R, I, N>),
        )
        .route(
            "/api/v1/opportunities/:opportunity_id/approve",
            post(approve_opportunity_handler::<R, I, N>),
        )
        .route(
            "/api/v1/opportunities/:opportunity_id/reject",
            post(reject_opportunity_handler::<R, I, N>),
        )
        .route(
            "/api/v1/opportunities/:opportunity_id/applications",
            get(opportunity_applications_handler::<R, I, N>).post(apply_handler::<R, I, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<R, I, N>),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_application_handler::<R, I, N>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_application_handler::<R, I, N>),
        )
        .route(
            "/api/v1/applications/:application_id/accept",
            post(accept_placement_handler::<R, I, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdrawals",
            post(request_withdrawal_handler::<R, I, N>),
        )
        .route(
            "/api/v1/withdrawals/pending",
            get(pending_withdrawals_handler::<R, I, N>),
        )
        .route(
            "/api/v1/withdrawals/:request_id/decision",
            post(decide_withdrawal_handler::<R, I, N>),
        )
        .route(
            "/api/v1/students/:student_id/applications",
            get(student_applications_handler::<R, I, N>),
        )
        .route(
            "/api/v1/students/:student_id/withdrawals",
            get(student_withdrawals_handler::<R, I, N>),
        )
        .route(
            "/api/v1/students/:student_id/placement",
            get(accepted_placement_handler::<R, I, N>),
        )
        .route(
            "/api/v1/representatives/:representative_id/opportunities",
            get(representative_opportunities_handler::<R, I, N>),
        )
        .with_state(engine)
}

pub(crate) async fn report_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Query(filter): Query<OpportunityFilter>,
) -> Result<Json<Vec<Opportunity>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.opportunity_report(&filter).map(Json)
}

pub(crate) async fn create_opportunity_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Json(request): Json<CreateOpportunityRequest>,
) -> Result<(StatusCode, Json<Opportunity>), PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    let opportunity = engine.create_opportunity(&request.representative, request.opportunity)?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

pub(crate) async fn opportunity_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
) -> Result<Json<Opportunity>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.opportunity(&opportunity_id).map(Json)
}

pub(crate) async fn edit_opportunity_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Json(request): Json<EditOpportunityRequest>,
) -> Result<Json<Opportunity>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .edit_opportunity(&request.representative_id, &opportunity_id, request.changes)
        .map(Json)
}

pub(crate) async fn delete_opportunity_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Query(request): Query<RepresentativeRequest>,
) -> Result<StatusCode, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.delete_opportunity(&request.representative_id, &opportunity_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn toggle_visibility_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Json(request): Json<RepresentativeRequest>,
) -> Result<Json<Opportunity>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .toggle_visibility(&request.representative_id, &opportunity_id)
        .map(Json)
}

pub(crate) async fn approve_opportunity_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Json(request): Json<StaffRequest>,
) -> Result<Json<Opportunity>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .approve_opportunity(&request.staff_id, &opportunity_id)
        .map(Json)
}

pub(crate) async fn reject_opportunity_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Json(request): Json<StaffRequest>,
) -> Result<Json<Opportunity>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .reject_opportunity(&request.staff_id, &opportunity_id)
        .map(Json)
}

pub(crate) async fn apply_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Json(request): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<InternshipApplication>), PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    let application = engine.apply(&request.student, &opportunity_id)?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub(crate) async fn application_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(application_id): Path<ApplicationId>,
) -> Result<Json<InternshipApplication>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.application(&application_id).map(Json)
}

pub(crate) async fn approve_application_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<RepresentativeRequest>,
) -> Result<Json<InternshipApplication>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .approve_application(&request.representative_id, &application_id)
        .map(Json)
}

pub(crate) async fn reject_application_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<RepresentativeRequest>,
) -> Result<Json<InternshipApplication>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .reject_application(&request.representative_id, &application_id)
        .map(Json)
}

pub(crate) async fn accept_placement_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<StudentRequest>,
) -> Result<Json<PlacementAcceptance>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .accept_placement(&request.student_id, &application_id)
        .map(Json)
}

pub(crate) async fn request_withdrawal_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<WithdrawalRequestBody>,
) -> Result<(StatusCode, Json<WithdrawalRequest>), PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    let withdrawal =
        engine.request_withdrawal(&request.student_id, &application_id, request.reason)?;
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub(crate) async fn pending_withdrawals_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
) -> Result<Json<Vec<WithdrawalRequest>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.pending_withdrawals().map(Json)
}

pub(crate) async fn decide_withdrawal_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(request_id): Path<WithdrawalRequestId>,
    Json(request): Json<WithdrawalDecisionRequest>,
) -> Result<Json<WithdrawalOutcome>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .decide_withdrawal(
            &request.staff_id,
            &request_id,
            request.decision,
            request.remarks,
        )
        .map(Json)
}

pub(crate) async fn student_applications_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Vec<InternshipApplication>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.student_applications(&student_id).map(Json)
}

pub(crate) async fn available_opportunities_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<Vec<Opportunity>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.available_opportunities(&request.student).map(Json)
}

pub(crate) async fn opportunity_applications_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(opportunity_id): Path<OpportunityId>,
    Query(request): Query<RepresentativeRequest>,
) -> Result<Json<Vec<InternshipApplication>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine
        .opportunity_applications(&request.representative_id, &opportunity_id)
        .map(Json)
}

pub(crate) async fn student_withdrawals_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Vec<WithdrawalRequest>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.student_withdrawals(&student_id).map(Json)
}

/// Responds with `null` while the student has no confirmed placement.
pub(crate) async fn accepted_placement_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Option<Opportunity>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.accepted_placement(&student_id).map(Json)
}

pub(crate) async fn representative_opportunities_handler<R, I, N>(
    State(engine): SharedEngine<R, I, N>,
    Path(representative_id): Path<RepresentativeId>,
) -> Result<Json<Vec<Opportunity>>, PlacementError>
where
    R: PlacementRepository + 'static,
    I: IdGenerator + 'static,
    N: NoticePublisher + 'static,
{
    engine.representative_opportunities(&representative_id).map(Json)
}
