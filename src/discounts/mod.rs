// Discounts module
// Code evaluation against carts, consumption on checkout and admin management

pub mod consumption;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod service;
pub mod types;
pub mod validation;

pub use consumption::DiscountConsumer;
pub use error::DiscountError;
pub use evaluator::{DiscountEvaluation, DiscountEvaluator, Rejection};
pub use ledger::{PgUsageLedger, UsageLedger};
pub use models::*;
pub use registry::{DiscountRegistry, PgDiscountRegistry};
pub use service::DiscountService;
pub use types::DiscountKind;

#[cfg(test)]
pub use ledger::MockUsageLedger;
#[cfg(test)]
pub use registry::MockDiscountRegistry;
