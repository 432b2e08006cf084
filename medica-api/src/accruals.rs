use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use medica_core::session::{authorize_feature, authorize_role, Feature, Role, Session};
use medica_ledger::accrual::{self, PeriodFilter, SpecialistBalance};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAccrualsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub specialist_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/accruals", get(list_accruals))
}

/// GET /v1/accruals
/// Per-specialist accrued revenue minus paid-out amounts for a period
async fn list_accruals(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ListAccrualsQuery>,
) -> Result<Json<Vec<SpecialistBalance>>, AppError> {
    authorize_role(&session, &[Role::Admin])?;
    authorize_feature(&session, Feature::Accounting)?;

    // 1. Resolve the clinic-local period window once; both grouped sums below
    //    are computed against the same boundary.
    let tz_offset = state.roster.clinic_tz_offset_minutes(session.clinic_id).await?;
    let bounds = PeriodFilter {
        month: query.month,
        year: query.year,
    }
    .bounds(tz_offset)?;

    // 2. The two grouped sums
    let accrued = state
        .ledger
        .accrued_by_specialist(session.clinic_id, bounds, query.specialist_id)
        .await?;
    let paid_out = state
        .ledger
        .specialist_payouts(session.clinic_id, bounds, query.specialist_id)
        .await?;

    // 3. Join over the roster; a filtered query joins over the one specialist
    let roster = match query.specialist_id {
        Some(specialist_id) => {
            let specialist = state.roster.specialist(session.clinic_id, specialist_id).await?;
            vec![(specialist.staff_id, specialist.full_name)]
        }
        None => state.roster.specialist_roster(session.clinic_id).await?,
    };

    Ok(Json(accrual::reconcile(&roster, &accrued, &paid_out)))
}
