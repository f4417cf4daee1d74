//! State

use std::sync::Arc;

use coupons_app::context::AppContext;
use rusty_money::iso::Currency;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Currency that discount amounts are rounded to.
    pub(crate) currency: &'static Currency,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, currency: &'static Currency) -> Self {
        Self { app, currency }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, currency: &'static Currency) -> Arc<Self> {
        Arc::new(Self::new(app, currency))
    }
}
