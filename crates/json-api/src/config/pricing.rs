//! Pricing Config

use clap::Args;
use rusty_money::{Findable, iso::Currency};

/// Pricing settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// ISO 4217 currency that discount amounts are rounded to
    #[arg(
        long,
        env = "COUPON_CURRENCY",
        default_value = "USD",
        value_parser = parse_currency
    )]
    pub currency: &'static Currency,
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    Currency::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| format!("unknown ISO 4217 currency code: {code}"))
}
