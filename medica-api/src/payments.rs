use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medica_core::session::{authorize_feature, authorize_role, Feature, Role, Session};
use medica_ledger::audit::AuditEntry;
use medica_ledger::models::Payment;
use medica_ledger::repository::PaymentFilter;
use medica_shared::money::format_minor;

use crate::error::AppError;
use crate::state::AppState;
use crate::telemetry;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub patient_id: Uuid,
    /// Defaults to the patient's assigned specialist.
    pub specialist_id: Option<Uuid>,
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmendPaymentRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub specialist_id: Uuid,
    pub amount: i64,
    pub specialist_cut: i64,
    pub clinic_cut: i64,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            patient_id: payment.patient_id,
            specialist_id: payment.specialist_id,
            amount: payment.amount,
            specialist_cut: payment.specialist_cut,
            clinic_cut: payment.clinic_cut,
            note: payment.note,
            created_at: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(record_payment).get(list_payments))
        .route("/payments/{id}", patch(amend_payment).delete(remove_payment))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/payments
/// Record a patient payment, split between specialist and clinic
async fn record_payment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    authorize_role(&session, &[Role::Admin, Role::Reception])?;
    authorize_feature(&session, Feature::Accounting)?;

    // 1. Patient fetched up front for the audit message; tenancy is enforced
    //    again inside the store transaction.
    let patient = state.roster.patient(session.clinic_id, req.patient_id).await?;

    // 2. The store resolves the effective share, splits the gross amount and
    //    applies the aggregate increments in one transaction.
    let payment = state
        .ledger
        .record_payment(
            session.clinic_id,
            req.patient_id,
            req.specialist_id,
            req.amount,
            req.note,
        )
        .await?;

    // 3. Audit (best effort) and telemetry
    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::payment_recorded(&payment, &patient.full_name.0),
        )
        .await;
    telemetry::log_payment_recorded(&payment);

    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// PATCH /v1/payments/{id}
/// Edit a payment's gross amount; cuts and aggregates move in lockstep
async fn amend_payment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(payment_id): Path<Uuid>,
    Json(req): Json<AmendPaymentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let amendment = state
        .ledger
        .amend_payment(session.clinic_id, payment_id, req.amount)
        .await?;

    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::payment_amended(
                amendment.payment_id,
                amendment.old_amount,
                amendment.new_amount,
            ),
        )
        .await;

    Ok(Json(MessageResponse {
        message: format!(
            "Payment amount updated to {}",
            format_minor(amendment.new_amount)
        ),
    }))
}

/// DELETE /v1/payments/{id}
/// Remove a payment, reversing its aggregate contributions
async fn remove_payment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let removed = state.ledger.remove_payment(session.clinic_id, payment_id).await?;

    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::payment_removed(&removed),
        )
        .await;

    Ok(Json(MessageResponse {
        message: format!("Payment of {} removed", format_minor(removed.amount)),
    }))
}

/// GET /v1/payments
/// List the clinic's payments, newest first
async fn list_payments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let filter = PaymentFilter {
        patient_id: query.patient_id,
        specialist_id: query.specialist_id,
    };
    let payments = state.ledger.list_payments(session.clinic_id, filter).await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}
