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
use medica_ledger::models::{FinanceTransaction, TransactionType};
use medica_ledger::repository::TransactionFilter;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub tx_type: TransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub occurred_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub tx_type: Option<TransactionType>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub tx_type: TransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub occurred_on: NaiveDate,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<FinanceTransaction> for TransactionResponse {
    fn from(tx: FinanceTransaction) -> Self {
        Self {
            id: tx.id,
            tx_type: tx.tx_type,
            amount: tx.amount,
            description: tx.description,
            patient_id: tx.patient_id,
            specialist_id: tx.specialist_id,
            account_id: tx.account_id,
            category_id: tx.category_id,
            occurred_on: tx.occurred_on,
            created_at: tx.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/transactions", post(create_transaction).get(list_transactions))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/transactions
/// Record a generic clinic-level income/expense outside the split model
async fn create_transaction(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    if req.amount <= 0 {
        return Err(AppError::ValidationError(
            "amount must be a positive number".to_string(),
        ));
    }

    // 1. Every optional reference must belong to the acting clinic
    if let Some(patient_id) = req.patient_id {
        state.roster.patient(session.clinic_id, patient_id).await?;
    }
    if let Some(specialist_id) = req.specialist_id {
        state.roster.specialist(session.clinic_id, specialist_id).await?;
    }
    if let Some(account_id) = req.account_id {
        state.ledger.get_account(session.clinic_id, account_id).await?;
    }
    if let Some(category_id) = req.category_id {
        state.ledger.get_category(session.clinic_id, category_id).await?;
    }

    // 2. Persist
    let tx = FinanceTransaction::new(
        session.clinic_id,
        req.tx_type,
        req.amount,
        req.description,
        req.patient_id,
        req.specialist_id,
        req.account_id,
        req.category_id,
        req.occurred_on.unwrap_or_else(|| Utc::now().date_naive()),
    );
    let tx = state.ledger.create_transaction(tx).await?;

    // 3. Audit (best effort)
    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::transaction_created(&tx),
        )
        .await;

    Ok((StatusCode::CREATED, Json(tx.into())))
}

/// GET /v1/transactions
/// List the clinic's transactions, newest first
async fn list_transactions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let filter = TransactionFilter {
        patient_id: query.patient_id,
        specialist_id: query.specialist_id,
        tx_type: query.tx_type,
    };
    let transactions = state.ledger.list_transactions(session.clinic_id, filter).await?;

    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}
