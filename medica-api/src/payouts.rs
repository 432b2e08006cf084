use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medica_core::session::{authorize_feature, authorize_role, Feature, Role, Session};
use medica_ledger::audit::AuditEntry;
use medica_ledger::models::{Payout, PayoutCategory, PayoutKind};
use medica_ledger::repository::PayoutFilter;

use crate::error::AppError;
use crate::state::AppState;
use crate::telemetry;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePayoutRequest {
    pub target_staff_id: Uuid,
    pub target_kind: PayoutKind,
    pub category: Option<PayoutCategory>,
    pub amount: i64,
    pub note: Option<String>,
    pub period_month: Option<u32>,
    pub period_year: Option<i32>,
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListPayoutsQuery {
    pub target_staff_id: Option<Uuid>,
    pub target_kind: Option<PayoutKind>,
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub id: Uuid,
    pub target_staff_id: Uuid,
    pub target_kind: PayoutKind,
    pub category: Option<PayoutCategory>,
    pub amount: i64,
    pub note: Option<String>,
    pub period_month: Option<u32>,
    pub period_year: Option<i32>,
    pub paid_on: NaiveDate,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<Payout> for PayoutResponse {
    fn from(payout: Payout) -> Self {
        Self {
            id: payout.id,
            target_staff_id: payout.target_staff_id,
            target_kind: payout.target_kind,
            category: payout.category,
            amount: payout.amount,
            note: payout.note,
            period_month: payout.period_month,
            period_year: payout.period_year,
            paid_on: payout.paid_on,
            created_at: payout.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/payouts", post(create_payout).get(list_payouts))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/payouts
/// Disburse money to a specialist or staff member.
/// No update or delete exists: corrections are new offsetting payouts.
async fn create_payout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreatePayoutRequest>,
) -> Result<(StatusCode, Json<PayoutResponse>), AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    if req.amount <= 0 {
        return Err(AppError::ValidationError(
            "amount must be a positive number".to_string(),
        ));
    }
    if let Some(month) = req.period_month {
        if !(1..=12).contains(&month) {
            return Err(AppError::ValidationError(
                "period_month must be between 1 and 12".to_string(),
            ));
        }
    }

    // 1. Validate the target against the acting clinic; specialist targets
    //    must carry a specialist profile.
    let target_name = match req.target_kind {
        PayoutKind::Specialist => {
            state
                .roster
                .specialist(session.clinic_id, req.target_staff_id)
                .await?
                .full_name
        }
        PayoutKind::Staff => {
            state
                .roster
                .staff(session.clinic_id, req.target_staff_id)
                .await?
                .full_name
        }
    };

    // 2. Persist; the cash drawer mirror is written best-effort by the store
    let payout = Payout::new(
        session.clinic_id,
        req.target_staff_id,
        req.target_kind,
        req.category,
        req.amount,
        req.note,
        req.period_month,
        req.period_year,
        req.paid_on.unwrap_or_else(|| Utc::now().date_naive()),
    );
    let payout = state.ledger.create_payout(payout).await?;

    // 3. Audit (best effort) and telemetry
    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::payout_created(&payout, &target_name),
        )
        .await;
    telemetry::log_payout_created(&payout);

    Ok((StatusCode::CREATED, Json(payout.into())))
}

/// GET /v1/payouts
/// List the clinic's payouts, newest first
async fn list_payouts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListPayoutsQuery>,
) -> Result<Json<Vec<PayoutResponse>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let filter = PayoutFilter {
        target_staff_id: query.target_staff_id,
        kind: query.target_kind,
    };
    let payouts = state.ledger.list_payouts(session.clinic_id, filter).await?;

    Ok(Json(payouts.into_iter().map(PayoutResponse::from).collect()))
}
