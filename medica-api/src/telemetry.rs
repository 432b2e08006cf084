//! Structured ledger events emitted for downstream analytics tooling.

use chrono::Utc;
use medica_ledger::models::{Payment, PaymentPlan, Payout};
use medica_shared::models::events::{PaymentRecordedEvent, PayoutCreatedEvent, PlanSettledEvent};

pub fn log_payment_recorded(payment: &Payment) {
    emit(
        "payment_recorded",
        serde_json::to_value(PaymentRecordedEvent {
            payment_id: payment.id,
            clinic_id: payment.clinic_id,
            patient_id: payment.patient_id,
            specialist_id: payment.specialist_id,
            amount: payment.amount,
            specialist_cut: payment.specialist_cut,
            timestamp: Utc::now().timestamp(),
        }),
    );
}

pub fn log_plan_settled(plan: &PaymentPlan, payment_id: Option<uuid::Uuid>) {
    emit(
        "plan_settled",
        serde_json::to_value(PlanSettledEvent {
            plan_id: plan.id,
            clinic_id: plan.clinic_id,
            amount: plan.amount,
            plan_type: plan.plan_type.as_str().to_string(),
            payment_id,
            timestamp: Utc::now().timestamp(),
        }),
    );
}

pub fn log_payout_created(payout: &Payout) {
    emit(
        "payout_created",
        serde_json::to_value(PayoutCreatedEvent {
            payout_id: payout.id,
            clinic_id: payout.clinic_id,
            target_staff_id: payout.target_staff_id,
            amount: payout.amount,
            timestamp: Utc::now().timestamp(),
        }),
    );
}

fn emit(kind: &str, payload: Result<serde_json::Value, serde_json::Error>) {
    match payload {
        Ok(payload) => tracing::info!(target: "medica::events", event = kind, payload = %payload),
        Err(e) => tracing::warn!("failed to serialize {} event: {}", kind, e),
    }
}
