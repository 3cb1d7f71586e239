use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::listings::{
        ADD_COMMENT, CLOSE_AUCTION, CreateListingForm, CreateListingView, DetailsForm,
        ListingDetailView, ListingList, PLACE_BID, SubmitForm,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeAuthUser},
    response::{ApiResponse, FormResponse, Meta, referer_path},
    routes::params::Pagination,
    services::{
        bid_service::{self, BidOutcome},
        category_service, comment_service, listing_service,
    },
    state::AppState,
    validation::{self, BID_AMOUNT, FieldErrors},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create_listing", get(create_listing_form).post(create_listing))
        .route("/{id}/details", get(details).post(submit_details))
        .route("/{id}/details/close_auction", post(close_auction))
}

#[utoipa::path(
    get,
    path = "/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All listings, newest first", body = ApiResponse<ListingList>)
    ),
    tag = "Listings"
)]
pub async fn index(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ListingList>>> {
    let resp = listing_service::list_listings(&state.pool, viewer.user_id(), pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/create_listing",
    responses(
        (status = 200, description = "Listing form", body = ApiResponse<CreateListingView>),
        (status = 401, description = "Login required")
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn create_listing_form(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CreateListingView>>> {
    let view = CreateListingView {
        categories: category_service::all_categories(&state.pool).await?,
        errors: FieldErrors::new(),
    };
    Ok(Json(ApiResponse::success("Create listing", view, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/create_listing",
    request_body(content = CreateListingForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Listing created; redirect to the index"),
        (status = 200, description = "Invalid input; form re-rendered with field errors", body = ApiResponse<CreateListingView>),
        (status = 401, description = "Login required")
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn create_listing(
    State(state): State<AppState>,
    user: AuthUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<FormResponse<CreateListingView>> {
    let form = CreateListingForm::from_pairs(pairs);

    let new_listing = match form.validate() {
        Ok(new_listing) => {
            let unknown =
                category_service::unknown_categories(&state.pool, &new_listing.category_ids)
                    .await?;
            if unknown.is_empty() {
                Ok(new_listing)
            } else {
                let mut errors = FieldErrors::new();
                for id in unknown {
                    errors.add(
                        "categories",
                        format!("Select a valid choice. {id} is not one of the available choices."),
                    );
                }
                Err(errors)
            }
        }
        Err(errors) => Err(errors),
    };

    match new_listing {
        Ok(new_listing) => {
            listing_service::create_listing(&state, &user, new_listing).await?;
            Ok(FormResponse::redirect("/"))
        }
        Err(errors) => {
            let view = CreateListingView {
                categories: category_service::all_categories(&state.pool).await?,
                errors,
            };
            Ok(FormResponse::rerender("Invalid listing", view))
        }
    }
}

#[utoipa::path(
    get,
    path = "/{id}/details",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    responses(
        (status = 200, description = "Listing with bid status and comments", body = ApiResponse<ListingDetailView>),
        (status = 400, description = "Listing has no detail record"),
        (status = 404, description = "Listing not found")
    ),
    tag = "Listings"
)]
pub async fn details(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ListingDetailView>>> {
    let view = listing_service::listing_detail_view(&state, viewer.0.as_ref(), id).await?;
    Ok(Json(ApiResponse::success("Listing", view, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/{id}/details",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    request_body(content = DetailsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Bid or comment saved; redirect to the detail view"),
        (status = 200, description = "Rejected; detail view re-rendered with errors", body = ApiResponse<ListingDetailView>),
        (status = 400, description = "Seller bidding on own listing, or listing has no detail record"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn submit_details(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<Uuid>,
    Form(form): Form<DetailsForm>,
) -> AppResult<FormResponse<ListingDetailView>> {
    let mut view = listing_service::listing_detail_view(&state, viewer.0.as_ref(), id).await?;
    let detail_path = format!("/{id}/details");

    match form.submit.as_str() {
        PLACE_BID => {
            let user = require_login(viewer)?;
            if view.is_seller {
                return Err(AppError::BadRequest(
                    "Sellers cannot bid on their own listing".into(),
                ));
            }

            let amount = match validation::decimal(&form.bid, BID_AMOUNT) {
                Ok(amount) => amount,
                Err(messages) => {
                    view.bid_errors.extend("bid", messages);
                    return Ok(FormResponse::rerender("Invalid bid", view));
                }
            };

            match bid_service::place_bid(&state, &user, id, amount).await? {
                BidOutcome::Accepted(_) => Ok(FormResponse::redirect(detail_path)),
                BidOutcome::Rejected(rejection) => {
                    view.error_message = Some(rejection.message().to_string());
                    Ok(FormResponse::rerender(rejection.message(), view))
                }
            }
        }
        ADD_COMMENT => {
            let user = require_login(viewer)?;
            match validation::required_text(&form.comment) {
                Ok(body) => {
                    comment_service::add_comment(&state, &user, id, body).await?;
                    Ok(FormResponse::redirect(detail_path))
                }
                Err(messages) => {
                    view.comment_errors.extend("comment", messages);
                    Ok(FormResponse::rerender("Invalid comment", view))
                }
            }
        }
        _ => Ok(FormResponse::rerender("Listing", view)),
    }
}

#[utoipa::path(
    post,
    path = "/{id}/details/close_auction",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    request_body(content = SubmitForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the referring page"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn close_auction(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> AppResult<FormResponse<()>> {
    if form.submit == CLOSE_AUCTION {
        listing_service::close_auction(&state, &user, id).await?;
    } else {
        listing_service::ensure_listing_exists(&state, id).await?;
    }
    Ok(FormResponse::redirect(referer_path(
        &headers,
        &format!("/{id}/details"),
    )))
}

fn require_login(viewer: MaybeAuthUser) -> AppResult<AuthUser> {
    viewer
        .0
        .ok_or_else(|| AppError::Unauthorized("Login required".into()))
}
