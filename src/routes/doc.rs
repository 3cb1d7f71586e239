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
        auth::{AuthFormView, LoginForm, RegisterForm, SessionResponse},
        categories::CategoryList,
        listings::{
            BidStatus, CreateListingForm, CreateListingView, DetailsForm, HighestBidder,
            ListingDetailView, ListingList, SubmitForm,
        },
    },
    models::{Bid, Category, Comment, Listing, ListingDetail, ListingSummary},
    response::{ApiResponse, Meta},
    routes::{auth, categories, health, listings, params, wishlist},
    validation::FieldErrors,
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
        auth::register_form,
        auth::register,
        auth::login_form,
        auth::login,
        auth::logout,
        listings::index,
        listings::create_listing_form,
        listings::create_listing,
        listings::details,
        listings::submit_details,
        listings::close_auction,
        wishlist::list_wishlist,
        wishlist::update_wishlist,
        categories::list_categories,
        categories::listings_by_category
    ),
    components(
        schemas(
            Category,
            Listing,
            ListingDetail,
            ListingSummary,
            Bid,
            Comment,
            FieldErrors,
            RegisterForm,
            LoginForm,
            SessionResponse,
            AuthFormView,
            CreateListingForm,
            CreateListingView,
            DetailsForm,
            SubmitForm,
            BidStatus,
            HighestBidder,
            ListingDetailView,
            ListingList,
            CategoryList,
            health::HealthData,
            params::Pagination,
            Meta,
            ApiResponse<ListingList>,
            ApiResponse<ListingDetailView>,
            ApiResponse<SessionResponse>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and session endpoints"),
        (name = "Listings", description = "Listings, bidding, comments and auction close"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Categories", description = "Category browsing endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_registers_form_error_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["FieldErrors", "CreateListingView", "ListingDetailView"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
        assert!(doc.paths.paths.contains_key("/{id}/details"));
    }
}
