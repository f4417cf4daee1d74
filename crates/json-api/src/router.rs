//! App Router

use salvo::Router;

use crate::{auth, coupons, healthcheck, observability};

/// Routes open to anonymous callers.
fn public_routes() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("auth")
                .push(Router::with_path("register").post(auth::register::handler))
                .push(Router::with_path("login").post(auth::login::handler)),
        )
        .push(Router::with_path("coupons/validate/{code}").post(coupons::validate::handler))
}

/// Routes that need a bearer token.
fn protected_routes() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("auth")
                .push(Router::with_path("logout").post(auth::logout::handler))
                .push(Router::with_path("me").get(auth::me::handler)),
        )
        .push(
            Router::with_path("coupons")
                .get(coupons::index::handler)
                .post(coupons::create::handler)
                .push(Router::with_path("redeem/{code}").post(coupons::redeem::handler))
                .push(
                    Router::with_path("{coupon}")
                        .get(coupons::get::handler)
                        .put(coupons::update::handler)
                        .delete(coupons::delete::handler)
                        .push(Router::with_path("toggle").patch(coupons::toggle::handler)),
                ),
        )
}

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(public_routes())
        .push(protected_routes())
}
