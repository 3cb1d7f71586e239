pub const ADD_TO_WISHLIST: &str = "Add to wishlist";
pub const REMOVE_FROM_WISHLIST: &str = "Remove from wishlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistAction {
    Add,
    Remove,
}

impl WishlistAction {
    /// Map the posted button label; anything else is not a wishlist action.
    pub fn from_submit(submit: &str) -> Option<Self> {
        match submit {
            ADD_TO_WISHLIST => Some(WishlistAction::Add),
            REMOVE_FROM_WISHLIST => Some(WishlistAction::Remove),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_labels_map_to_actions() {
        assert_eq!(WishlistAction::from_submit("Add to wishlist"), Some(WishlistAction::Add));
        assert_eq!(
            WishlistAction::from_submit("Remove from wishlist"),
            Some(WishlistAction::Remove)
        );
        assert_eq!(WishlistAction::from_submit("add"), None);
    }
}
