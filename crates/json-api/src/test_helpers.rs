//! Test helpers.

use std::sync::Arc;

use coupons::coupons::{AppliesTo, CouponKind};
use coupons_app::{
    auth::{AuthenticatedUser, MockAuthService},
    context::AppContext,
    domain::coupons::{
        MockCouponsService,
        records::{CouponRecord, CouponUuid},
    },
};
use jiff::Timestamp;
use rust_decimal_macros::dec;
use rusty_money::iso;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_ID: Uuid = Uuid::nil();

pub(crate) fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: TEST_USER_ID,
        email: "admin@example.test".to_string(),
        name: Some("Admin".to_string()),
    }
}

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_current_user(test_user());
    ctrl.call_next(req, depot, res).await;
}

/// A 25% coupon capped at 50, valid for the whole of 2020 to 2099.
pub(crate) fn make_coupon(uuid: CouponUuid, code: &str) -> CouponRecord {
    CouponRecord {
        uuid,
        code: code.to_string(),
        kind: CouponKind::Percentage,
        value: dec!(25),
        min_purchase: Some(dec!(100)),
        max_discount: Some(dec!(50)),
        valid_from: Timestamp::from_second(1_577_836_800).unwrap_or(Timestamp::UNIX_EPOCH),
        valid_until: Timestamp::from_second(4_102_444_800).unwrap_or(Timestamp::MAX),
        usage_limit: Some(100),
        usage_count: 0,
        is_active: true,
        applies_to: AppliesTo::All,
        applicable_ids: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_register().never();
    auth.expect_login().never();
    auth.expect_logout().never();
    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_coupons_mock() -> MockCouponsService {
    let mut coupons = MockCouponsService::new();

    coupons.expect_list_coupons().never();
    coupons.expect_get_coupon().never();
    coupons.expect_get_active_coupon_by_code().never();
    coupons.expect_create_coupon().never();
    coupons.expect_update_coupon().never();
    coupons.expect_delete_coupon().never();
    coupons.expect_set_coupon_active().never();
    coupons.expect_redeem_coupon().never();

    coupons
}

fn state(coupons: MockCouponsService, auth: MockAuthService) -> Arc<State> {
    State::from_app_context(
        AppContext {
            coupons: Arc::new(coupons),
            auth: Arc::new(auth),
        },
        iso::USD,
    )
}

pub(crate) fn state_with_coupons(coupons: MockCouponsService) -> Arc<State> {
    state(coupons, strict_auth_mock())
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state(strict_coupons_mock(), auth)
}

/// Serve `route` as an authenticated user.
pub(crate) fn coupons_service(coupons: MockCouponsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_coupons(coupons)))
            .hoop(inject_user)
            .push(route),
    )
}

/// Serve `route` without an authenticated user.
pub(crate) fn public_coupons_service(coupons: MockCouponsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_coupons(coupons)))
            .push(route),
    )
}

pub(crate) fn auth_service(auth: MockAuthService, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state_with_auth(auth))).push(route))
}
