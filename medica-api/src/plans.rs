use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medica_core::session::{authorize_feature, authorize_role, Feature, Role, Session};
use medica_ledger::audit::AuditEntry;
use medica_ledger::models::{PaymentPlan, PlanStatus, PlanType};

use crate::error::AppError;
use crate::state::AppState;
use crate::telemetry;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub plan_type: PlanType,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub description: Option<String>,
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetPlanStatusRequest {
    pub status: PlanStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub plan_type: PlanType,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub description: String,
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub status: PlanStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub settled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<PaymentPlan> for PlanResponse {
    fn from(plan: PaymentPlan) -> Self {
        Self {
            id: plan.id,
            plan_type: plan.plan_type,
            amount: plan.amount,
            due_date: plan.due_date,
            description: plan.description,
            patient_id: plan.patient_id,
            specialist_id: plan.specialist_id,
            status: plan.status,
            created_at: plan.created_at,
            settled_at: plan.settled_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan).get(list_plans))
        .route("/plans/{id}/status", post(set_plan_status))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/plans
/// Create a payment plan (a promised future income or expense)
async fn create_plan(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>), AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    if req.amount <= 0 {
        return Err(AppError::ValidationError(
            "amount must be a positive number".to_string(),
        ));
    }

    // 1. Validate optional references against the acting clinic
    if let Some(patient_id) = req.patient_id {
        state.roster.patient(session.clinic_id, patient_id).await?;
    }
    if let Some(specialist_id) = req.specialist_id {
        state.roster.specialist(session.clinic_id, specialist_id).await?;
    }

    // 2. Persist in PLANNED
    let plan = PaymentPlan::new(
        session.clinic_id,
        req.plan_type,
        req.amount,
        req.due_date,
        req.description.unwrap_or_default(),
        req.patient_id,
        req.specialist_id,
    );
    let plan = state.ledger.create_plan(plan).await?;

    // 3. Audit (best effort)
    state
        .audit
        .append(session.clinic_id, session.user_id, AuditEntry::plan_created(&plan))
        .await;

    Ok((StatusCode::CREATED, Json(plan.into())))
}

/// POST /v1/plans/{id}/status
/// Settle or cancel a plan; PLANNED is accepted as a no-op
async fn set_plan_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(plan_id): Path<Uuid>,
    Json(req): Json<SetPlanStatusRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    // The status check, status write and materialization run inside one
    // store transaction; the audit record for a settlement rides in it too.
    let plan = state
        .ledger
        .set_plan_status(session.clinic_id, plan_id, req.status, session.user_id)
        .await?;

    if plan.status == PlanStatus::Paid {
        telemetry::log_plan_settled(&plan, None);
    }

    Ok(Json(plan.into()))
}

/// GET /v1/plans
/// List the clinic's plans, newest first
async fn list_plans(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListPlansQuery>,
) -> Result<Json<Vec<PlanResponse>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let plans = state.ledger.list_plans(session.clinic_id, query.status).await?;

    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}
