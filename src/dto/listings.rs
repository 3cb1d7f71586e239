use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Category, Comment, Listing, ListingDetail, ListingSummary},
    validation::{self, FieldErrors, STARTING_BID},
};

pub const PLACE_BID: &str = "Place Bid";
pub const ADD_COMMENT: &str = "Add comment";
pub const CLOSE_AUCTION: &str = "Close the auction";

const TITLE_MAX_LENGTH: usize = 128;
const PHOTO_MAX_LENGTH: usize = 500;

/// Raw listing form. `categories` may repeat in the encoded body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateListingForm {
    pub title: String,
    pub description: String,
    pub starting_bid: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CreateListingForm {
    /// Build from decoded form pairs, keeping every `categories` value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "title" => form.title = value,
                "description" => form.description = value,
                "starting_bid" => form.starting_bid = value,
                "photo" => form.photo = value,
                "categories" if !value.trim().is_empty() => form.categories.push(value),
                _ => {}
            }
        }
        form
    }

    /// Field-level validation. Category ids are only checked for shape here;
    /// their existence is checked against the store by the caller.
    pub fn validate(&self) -> Result<NewListing, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = errors.check("title", validation::bounded_text(&self.title, TITLE_MAX_LENGTH));
        let description = errors.check("description", validation::required_text(&self.description));
        let starting_bid =
            errors.check("starting_bid", validation::decimal(&self.starting_bid, STARTING_BID));
        let photo = errors.check("photo", validation::optional_url(&self.photo, PHOTO_MAX_LENGTH));

        let mut category_ids = Vec::with_capacity(self.categories.len());
        for raw in &self.categories {
            match Uuid::parse_str(raw.trim()) {
                Ok(id) if !category_ids.contains(&id) => category_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add("categories", format!("\"{raw}\" is not a valid value.")),
            }
        }

        match (title, description, starting_bid, photo) {
            (Some(title), Some(description), Some(starting_bid), Some(photo)) if errors.is_empty() => {
                Ok(NewListing {
                    title,
                    description,
                    starting_bid,
                    photo,
                    category_ids,
                })
            }
            _ => Err(errors),
        }
    }
}

/// A listing that passed form validation.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub starting_bid: Decimal,
    pub photo: Option<String>,
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateListingView {
    pub categories: Vec<Category>,
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ListingList {
    #[schema(value_type = Vec<ListingSummary>)]
    pub items: Vec<ListingSummary>,
}

/// Detail page POST; `submit` selects bidding or commenting.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DetailsForm {
    #[serde(default)]
    pub submit: String,
    #[serde(default)]
    pub bid: String,
    #[serde(default)]
    pub comment: String,
}

/// Button label posted by the close-auction and wishlist forms.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitForm {
    #[serde(default)]
    pub submit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HighestBidder {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BidStatus {
    pub bid_count: i64,
    pub highest_bid: Option<Decimal>,
    pub highest_bidder: Option<HighestBidder>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListingDetailView {
    pub listing: Listing,
    pub detail: ListingDetail,
    pub bid_status: BidStatus,
    pub comments: Vec<Comment>,
    pub non_categories: Vec<Category>,
    pub is_seller: bool,
    pub on_wishlist: bool,
    pub error_message: Option<String>,
    pub bid_errors: FieldErrors,
    pub comment_errors: FieldErrors,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_categories_are_collected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let form = CreateListingForm::from_pairs(pairs(&[
            ("title", "Widget"),
            ("description", "A widget"),
            ("starting_bid", "10.00"),
            ("categories", &a.to_string()),
            ("categories", &b.to_string()),
            ("categories", &a.to_string()),
            ("csrf", "ignored"),
        ]));
        let listing = form.validate().unwrap();
        assert_eq!(listing.title, "Widget");
        assert_eq!(listing.category_ids, vec![a, b]);
        assert_eq!(listing.photo, None);
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let form = CreateListingForm::from_pairs(pairs(&[
            ("title", ""),
            ("description", " "),
            ("starting_bid", "0.001"),
            ("photo", "not a url"),
            ("categories", "seven"),
        ]));
        let errors = form.validate().unwrap_err();
        for field in ["title", "description", "starting_bid", "photo", "categories"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn starting_bid_below_a_cent_is_rejected() {
        let form = CreateListingForm::from_pairs(pairs(&[
            ("title", "Widget"),
            ("description", "A widget"),
            ("starting_bid", "0"),
        ]));
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("starting_bid").unwrap(),
            ["Ensure this value is greater than or equal to 0.01."]
        );
    }
}
