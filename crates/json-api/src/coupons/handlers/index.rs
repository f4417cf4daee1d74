//! Coupon Index Handler

use std::{str::FromStr, sync::Arc};

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use coupons::coupons::CouponKind;
use coupons_app::domain::coupons::data::{CouponFilter, CouponPage, Pagination};

use crate::{
    coupons::{errors::into_status_error, get::CouponResponse},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaginationResponse {
    /// Coupons matching the filters
    pub total: u64,

    pub page: u32,
    pub limit: u32,

    /// Number of pages at this limit
    pub pages: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponsResponse {
    pub message: String,

    /// The coupons on this page, newest first
    pub data: Vec<CouponResponse>,

    pub pagination: PaginationResponse,
}

impl From<CouponPage> for CouponsResponse {
    fn from(page: CouponPage) -> Self {
        CouponsResponse {
            message: "Coupons retrieved successfully".to_string(),
            data: page.coupons.into_iter().map(Into::into).collect(),
            pagination: PaginationResponse {
                total: page.total,
                page: page.page,
                limit: page.limit,
                pages: page.pages,
            },
        }
    }
}

/// Read the list filters and page selection from the query string.
fn list_query(req: &Request) -> Result<(CouponFilter, Pagination), StatusError> {
    let kind = req
        .query::<String>("type")
        .filter(|kind| !kind.is_empty())
        .map(|kind| CouponKind::from_str(&kind))
        .transpose()
        .or_400("unknown coupon type")?;

    let filter = CouponFilter {
        is_active: req
            .query::<String>("isActive")
            .map(|is_active| is_active == "true"),
        kind,
        search: req
            .query::<String>("search")
            .filter(|search| !search.trim().is_empty()),
    };

    let pagination = Pagination::new(req.query::<i64>("page"), req.query::<i64>("limit"));

    Ok((filter, pagination))
}

/// Coupon Index Handler
///
/// Returns a page of coupons. Query parameters: `page`, `limit`,
/// `isActive`, `type` and `search` (case-insensitive code substring).
#[endpoint(
    tags("coupons"),
    summary = "List Coupons",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CouponsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let (filter, pagination) = list_query(req)?;

    let page = state
        .app
        .coupons
        .list_coupons(filter, pagination)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page.into()))
}
