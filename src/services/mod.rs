pub mod auth_service;
pub mod bid_service;
pub mod category_service;
pub mod comment_service;
pub mod listing_service;
pub mod wishlist_service;
