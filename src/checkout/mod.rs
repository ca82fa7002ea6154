// Checkout module
// Summaries with shipping and discount, and order placement

pub mod error;
pub mod handlers;
pub mod models;
pub mod service;

pub use error::CheckoutError;
pub use models::{CheckoutRequest, CheckoutSummary, OrderConfirmation, QuoteRequest};
pub use service::CheckoutService;
