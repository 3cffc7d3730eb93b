use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{admin_stats, auth, categories, content, knives, orders, social_proof, stock};

#[derive(OpenApi)]
#[openapi(
    info(title = "Blade Commerce API", description = "Knife shop backend"),
    paths(
        auth::login,
        auth::validate,
        auth::health,
        knives::search_knives,
        knives::get_knife,
        knives::get_knife_by_name,
        knives::knife_types,
        knives::count_knives,
        knives::create_knife,
        knives::update_knife,
        knives::delete_knife,
        categories::list_categories,
        categories::list_active_categories,
        categories::categories_with_counts,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::toggle_category,
        categories::reorder_categories,
        categories::delete_category,
        stock::check_stock,
        stock::check_batch,
        orders::create_order,
        orders::list_orders,
        orders::order_statuses,
        orders::orders_by_status,
        orders::search_orders,
        orders::order_statistics,
        orders::migrate_order_numbers,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        social_proof::recent_purchases,
        content::public_contents,
        content::public_content,
        content::admin_contents,
        content::upsert_content,
        admin_stats::category_product_counts,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin login and token checks"),
        (name = "knives", description = "Knife catalog"),
        (name = "categories", description = "Catalog categories"),
        (name = "stock", description = "Stock availability"),
        (name = "orders", description = "Checkout and order management"),
        (name = "social-proof", description = "Recent purchases for the storefront"),
        (name = "content", description = "Corporate pages"),
        (name = "admin", description = "Admin dashboard statistics"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by admin endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi())
}
