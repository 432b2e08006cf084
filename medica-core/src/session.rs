use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LedgerResult};

/// Staff role in a clinic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Doctor,
    Reception,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Reception => "RECEPTION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "DOCTOR" => Some(Role::Doctor),
            "RECEPTION" => Some(Role::Reception),
            _ => None,
        }
    }
}

/// Subscription plan attached to the acting clinic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionPlan {
    Basic,
    Pro,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BASIC" => Some(SubscriptionPlan::Basic),
            "PRO" => Some(SubscriptionPlan::Pro),
            "ENTERPRISE" => Some(SubscriptionPlan::Enterprise),
            _ => None,
        }
    }
}

/// Feature slugs gated behind the clinic's subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Accounting,
    Scheduling,
    Documents,
}

impl Feature {
    pub fn slug(&self) -> &'static str {
        match self {
            Feature::Accounting => "accounting",
            Feature::Scheduling => "scheduling",
            Feature::Documents => "documents",
        }
    }
}

/// The resolved acting session: who is calling, for which clinic, on which plan.
///
/// Produced once per request by the authentication middleware; every check below
/// is a pure predicate over this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
    pub clinic_id: Uuid,
    pub plan: SubscriptionPlan,
}

/// Check that the session's role is one of the allowed roles.
///
/// SUPER_ADMIN passes every role gate.
pub fn authorize_role(session: &Session, allowed: &[Role]) -> LedgerResult<()> {
    if session.role == Role::SuperAdmin || allowed.contains(&session.role) {
        return Ok(());
    }
    Err(LedgerError::Forbidden(format!(
        "role {} is not permitted for this operation",
        session.role.as_str()
    )))
}

/// Check that the clinic's subscription plan includes a feature.
pub fn authorize_feature(session: &Session, feature: Feature) -> LedgerResult<()> {
    if has_feature(session.plan, feature) {
        return Ok(());
    }
    Err(LedgerError::Forbidden(format!(
        "feature '{}' is not included in the clinic's subscription plan",
        feature.slug()
    )))
}

pub fn has_feature(plan: SubscriptionPlan, feature: Feature) -> bool {
    match plan {
        SubscriptionPlan::Basic => matches!(feature, Feature::Scheduling),
        SubscriptionPlan::Pro => matches!(feature, Feature::Scheduling | Feature::Accounting),
        SubscriptionPlan::Enterprise => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role, plan: SubscriptionPlan) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            role,
            clinic_id: Uuid::new_v4(),
            plan,
        }
    }

    #[test]
    fn test_role_gate() {
        let admin = session(Role::Admin, SubscriptionPlan::Pro);
        assert!(authorize_role(&admin, &[Role::Admin]).is_ok());
        assert!(authorize_role(&admin, &[Role::Reception]).is_err());
    }

    #[test]
    fn test_super_admin_passes_every_gate() {
        let root = session(Role::SuperAdmin, SubscriptionPlan::Enterprise);
        assert!(authorize_role(&root, &[Role::Reception]).is_ok());
        assert!(authorize_role(&root, &[]).is_ok());
    }

    #[test]
    fn test_feature_gate_follows_plan() {
        let basic = session(Role::Admin, SubscriptionPlan::Basic);
        assert!(authorize_feature(&basic, Feature::Scheduling).is_ok());
        assert!(authorize_feature(&basic, Feature::Accounting).is_err());

        let pro = session(Role::Admin, SubscriptionPlan::Pro);
        assert!(authorize_feature(&pro, Feature::Accounting).is_ok());
        assert!(authorize_feature(&pro, Feature::Documents).is_err());

        let enterprise = session(Role::Admin, SubscriptionPlan::Enterprise);
        assert!(authorize_feature(&enterprise, Feature::Documents).is_ok());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Doctor, Role::Reception] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("JANITOR"), None);
    }
}
