pub mod bids;
pub mod categories;
pub mod comments;
pub mod listing_categories;
pub mod listing_details;
pub mod listings;
pub mod users;
pub mod wishlists;

pub use bids::Entity as Bids;
pub use categories::Entity as Categories;
pub use comments::Entity as Comments;
pub use listing_categories::Entity as ListingCategories;
pub use listing_details::Entity as ListingDetails;
pub use listings::Entity as Listings;
pub use users::Entity as Users;
pub use wishlists::Entity as Wishlists;
