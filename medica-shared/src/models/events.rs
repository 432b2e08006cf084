use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentRecordedEvent {
    pub payment_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub specialist_id: Uuid,
    pub amount: i64,
    pub specialist_cut: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PlanSettledEvent {
    pub plan_id: Uuid,
    pub clinic_id: Uuid,
    pub amount: i64,
    pub plan_type: String,
    pub payment_id: Option<Uuid>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PayoutCreatedEvent {
    pub payout_id: Uuid,
    pub clinic_id: Uuid,
    pub target_staff_id: Uuid,
    pub amount: i64,
    pub timestamp: i64,
}
