pub mod accrual;
pub mod aggregates;
pub mod audit;
pub mod models;
pub mod repository;
pub mod settlement;
pub mod split;

pub use aggregates::PaymentDelta;
pub use models::{
    CashTransaction, FinanceAccount, FinanceCategory, FinanceTransaction, Payment, PaymentPlan,
    Payout, PlanStatus, PlanType,
};
pub use split::RevenueSplit;
