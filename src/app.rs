use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::Permission;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{authenticate, require_permission, require_super_admin, require_tenant};
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(session_public_routes())
        // Everything below requires a session
        .merge(authenticated_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_public_routes() -> Router<AppState> {
    Router::new()
        .route("/login/api/login", post(public::login_post))
        .route("/login/api/logout", post(public::logout_post))
}

fn authenticated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(protected::me_get))
        .merge(catalog_routes())
        .merge(promotion_routes())
        .merge(order_routes())
        .merge(buyer_routes())
        .merge(mail_routes())
        .merge(platform_routes())
        // Outermost: runs before any family gate
        .route_layer(from_fn_with_state(state, authenticate))
}

/// Gate one route family on a single permission.
fn gated(router: Router<AppState>, permission: Permission) -> Router<AppState> {
    router.route_layer(from_fn_with_state(permission, require_permission))
}

fn catalog_routes() -> Router<AppState> {
    use protected::{attribute_values as values, attributes, categories, products};

    let products = Router::new()
        .route(
            "/admin/api/products",
            get(products::product_list)
                .post(products::product_create)
                .put(products::product_update)
                .delete(products::product_delete),
        )
        .route("/admin/api/products/:id", get(products::product_show));

    let categories = Router::new()
        .route(
            "/admin/api/categories",
            get(categories::category_list)
                .post(categories::category_create)
                .put(categories::category_update)
                .delete(categories::category_delete),
        )
        .route("/admin/api/categories/:id", get(categories::category_show));

    let attributes = Router::new()
        .route(
            "/admin/api/attributes",
            get(attributes::attribute_list)
                .post(attributes::attribute_create)
                .put(attributes::attribute_update)
                .delete(attributes::attribute_delete),
        )
        .route("/admin/api/attributes/:id", get(attributes::attribute_show));

    let values = Router::new()
        .route(
            "/admin/api/attribute-values",
            get(values::attribute_value_list)
                .post(values::attribute_value_create)
                .put(values::attribute_value_update)
                .delete(values::attribute_value_delete),
        )
        .route("/admin/api/attribute-values/:id", get(values::attribute_value_show));

    Router::new()
        .merge(gated(products, Permission::ManageProducts))
        .merge(gated(categories, Permission::ManageCategories))
        .merge(gated(attributes, Permission::ManageAttributes))
        .merge(gated(values, Permission::ManageAttributeValues))
}

fn promotion_routes() -> Router<AppState> {
    use protected::{coupons, discounts};

    let discounts = Router::new()
        .route(
            "/admin/api/global-discounts",
            get(discounts::discount_list)
                .post(discounts::discount_create)
                .put(discounts::discount_update)
                .delete(discounts::discount_delete),
        )
        .route("/admin/api/global-discounts/applicable", post(discounts::discount_applicable))
        .route("/admin/api/global-discounts/:id", get(discounts::discount_show));

    let coupons = Router::new()
        .route(
            "/admin/api/coupons",
            get(coupons::coupon_list)
                .post(coupons::coupon_create)
                .put(coupons::coupon_update)
                .delete(coupons::coupon_delete),
        )
        .route("/admin/api/coupons/validate", post(coupons::coupon_validate))
        .route("/admin/api/coupons/:id", get(coupons::coupon_show));

    Router::new()
        .merge(gated(discounts, Permission::ManageDiscounts))
        .merge(gated(coupons, Permission::ManageCoupons))
}

fn order_routes() -> Router<AppState> {
    use protected::orders;

    let router = Router::new()
        .route(
            "/admin/api/orders",
            get(orders::order_list).put(orders::order_update_status),
        )
        .route(
            "/admin/api/orders/:id",
            get(orders::order_show).put(orders::order_update_items),
        );

    gated(router, Permission::ManageOrders)
}

fn buyer_routes() -> Router<AppState> {
    use protected::buyers;

    let router = Router::new()
        .route("/admin/api/buyers", get(buyers::buyer_list))
        .route("/admin/api/buyers/:id", get(buyers::buyer_show));

    // Tenant check first, then the permission
    gated(router, Permission::ManageBuyers).route_layer(from_fn(require_tenant))
}

fn mail_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/api/send-email", post(protected::send_email))
        .route_layer(from_fn(require_tenant))
}

fn platform_routes() -> Router<AppState> {
    use elevated::{roles, tenants, users};

    Router::new()
        .route(
            "/admin/api/tenants",
            get(tenants::tenant_list)
                .post(tenants::tenant_create)
                .put(tenants::tenant_update)
                .delete(tenants::tenant_delete),
        )
        .route("/admin/api/tenants/:id", get(tenants::tenant_show))
        .route(
            "/admin/api/users",
            get(users::user_list)
                .post(users::user_create)
                .put(users::user_update)
                .delete(users::user_delete),
        )
        .route("/admin/api/users/:id", get(users::user_show))
        .route("/admin/api/users/:id/purge", delete(users::user_purge))
        .route(
            "/admin/api/roles",
            get(roles::role_list)
                .post(roles::role_create)
                .put(roles::role_update)
                .delete(roles::role_delete),
        )
        .route("/admin/api/roles/:id", get(roles::role_show))
        .route_layer(from_fn(require_super_admin))
}

/// Explicit origins allow credentialed (cookie) requests; with none
/// configured every origin is allowed without credentials.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .security
        .cors_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
