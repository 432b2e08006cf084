use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use medica_core::session::{Role, Session, SubscriptionPlan};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StaffClaims {
    pub sub: String,
    pub clinic_id: String,
    pub role: String,
    pub plan: String,
    pub exp: usize,
}

// ============================================================================
// Session Resolution Middleware
// ============================================================================

/// Decode the bearer token once per request and inject the resolved `Session`;
/// every downstream role/feature check is a pure predicate over that value.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract token from Authorization header
    let auth_header = req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Decode and validate JWT
    let token_data = decode::<StaffClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    ).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // 3. Resolve the session value
    let session = session_from_claims(&token_data.claims).ok_or(StatusCode::UNAUTHORIZED)?;

    // 4. Inject session into request extensions
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

pub fn session_from_claims(claims: &StaffClaims) -> Option<Session> {
    Some(Session {
        user_id: Uuid::parse_str(&claims.sub).ok()?,
        role: Role::parse(&claims.role)?,
        clinic_id: Uuid::parse_str(&claims.clinic_id).ok()?,
        plan: SubscriptionPlan::parse(&claims.plan)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn claims(role: &str, plan: &str) -> StaffClaims {
        StaffClaims {
            sub: Uuid::new_v4().to_string(),
            clinic_id: Uuid::new_v4().to_string(),
            role: role.to_string(),
            plan: plan.to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn test_claims_round_trip() {
        let secret = b"test-secret";
        let claims = claims("ADMIN", "PRO");

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        let decoded = decode::<StaffClaims>(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )
        .unwrap();

        let session = session_from_claims(&decoded.claims).unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.plan, SubscriptionPlan::Pro);
        assert_eq!(session.user_id.to_string(), claims.sub);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let claims = claims("JANITOR", "PRO");
        assert!(session_from_claims(&claims).is_none());
    }

    #[test]
    fn test_unknown_plan_is_rejected() {
        let claims = claims("ADMIN", "PLATINUM");
        assert!(session_from_claims(&claims).is_none());
    }
}
