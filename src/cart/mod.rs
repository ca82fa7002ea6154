// Cart module
// Line items, stock checks and subtotal for guest and authenticated carts

pub mod aggregate;
pub mod error;
pub mod handlers;
pub mod models;
pub mod price_calculator;
pub mod repository;
pub mod service;

pub use aggregate::CartAggregate;
pub use error::CartError;
pub use models::*;
pub use price_calculator::PriceCalculator;
pub use repository::{CartRepository, PgCartRepository};
pub use service::CartService;

#[cfg(test)]
pub use repository::MockCartRepository;
