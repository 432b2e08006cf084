use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medica_core::session::{authorize_feature, authorize_role, Feature, Role, Session};
use medica_ledger::audit::AuditEntry;
use medica_ledger::models::{AccountKind, FinanceAccount, FinanceCategory, TransactionType};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub kind: AccountKind,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub kind: TransactionType,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub kind: TransactionType,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/categories", post(create_category).get(list_categories))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/accounts
async fn create_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("name must not be empty".to_string()));
    }

    let account = FinanceAccount::new(session.clinic_id, req.name, req.kind);
    let account = state.ledger.create_account(account).await?;

    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::account_created(&account),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            id: account.id,
            name: account.name,
            kind: account.kind,
        }),
    ))
}

/// GET /v1/accounts
async fn list_accounts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let accounts = state.ledger.list_accounts(session.clinic_id).await?;

    Ok(Json(
        accounts
            .into_iter()
            .map(|a| AccountResponse {
                id: a.id,
                name: a.name,
                kind: a.kind,
            })
            .collect(),
    ))
}

/// POST /v1/categories
async fn create_category(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("name must not be empty".to_string()));
    }

    let category = FinanceCategory::new(session.clinic_id, req.name, req.kind);
    let category = state.ledger.create_category(category).await?;

    state
        .audit
        .append(
            session.clinic_id,
            session.user_id,
            AuditEntry::category_created(&category),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            id: category.id,
            name: category.name,
            kind: category.kind,
        }),
    ))
}

/// GET /v1/categories
async fn list_categories(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    let categories = state.ledger.list_categories(session.clinic_id).await?;

    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryResponse {
                id: c.id,
                name: c.name,
                kind: c.kind,
            })
            .collect(),
    ))
}
