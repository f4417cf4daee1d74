//! Coupons
//!
//! A storage-agnostic coupon evaluation engine. Given a coupon snapshot, a cart
//! and a point in time, it decides whether the coupon may be used and what
//! discount it is worth.
//!
//! Evaluation is pure: it never mutates the coupon, performs no I/O and holds
//! no shared state, so it can be called from any number of request handlers
//! concurrently.

pub mod cart;
pub mod coupons;
pub mod discounts;
pub mod eligibility;
pub mod evaluation;
pub mod prelude;
