pub mod auth;
pub mod categories;
pub mod listings;
pub mod wishlist;
