use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medica_core::session::{authorize_role, Role, Session};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    pub older_than_days: i64,
    /// Only honored for SUPER_ADMIN; everyone else is scoped to their clinic.
    pub clinic_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/audit/cleanup", post(cleanup_audit_logs))
}

/// POST /v1/admin/audit/cleanup
/// Bulk retention cleanup of the audit trail; the delete and its summary
/// record commit in one transaction
async fn cleanup_audit_logs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, AppError> {
    authorize_role(&session, &[Role::Admin])?;

    let scope = match req.clinic_id {
        Some(requested) if requested != session.clinic_id => {
            if session.role != Role::SuperAdmin {
                return Err(AppError::AuthorizationError(
                    "only a super admin may clean another clinic's audit trail".to_string(),
                ));
            }
            requested
        }
        _ => session.clinic_id,
    };

    let deleted = state
        .audit
        .cleanup(session.user_id, scope, req.older_than_days)
        .await?;

    Ok(Json(CleanupResponse { deleted }))
}
