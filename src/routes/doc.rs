use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth,
        cart::{AddToCartRequest, CartItemData, CartList},
        products::{CreatedData, OptionCreateData, ProductCreateRequest, ProductList},
        users,
    },
    models::{
        CartProduct, Category, Image, Keyword, ProductDetail, ProductOption, ProductSummary, Role,
    },
    response::{ApiResponse, Meta},
    routes::{auth as auth_routes, cart, health, params, products, users as user_routes},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
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

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth_routes::login,
        user_routes::create_user,
        user_routes::me,
        user_routes::update_me,
        user_routes::delete_me,
        products::list_products,
        products::get_product,
        products::create_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
    ),
    components(
        schemas(
            Role,
            Category,
            Keyword,
            Image,
            ProductOption,
            ProductSummary,
            ProductDetail,
            CartProduct,
            ProductCreateRequest,
            OptionCreateData,
            ProductList,
            CreatedData,
            auth::LoginRequest,
            auth::LoginResponse,
            users::RegisterRequest,
            users::UserUpdateRequest,
            users::UserResponse,
            AddToCartRequest,
            CartItemData,
            CartList,
            params::Pagination,
            Meta,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<CreatedData>,
            ApiResponse<CartList>,
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Users", description = "User registration and profile endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
