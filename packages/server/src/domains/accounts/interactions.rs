//! List rules for likes, bookmarks and click history.
//!
//! Pure functions over the id lists stored on an account. The model applies
//! them inside a row-locked transaction.

/// Most recent clicks kept per account.
pub const CLICK_HISTORY_CAP: usize = 50;

/// Clicks returned by the recent-clicks endpoint.
pub const RECENT_CLICKS_SHOWN: usize = 10;

/// Which membership list an interaction touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionList {
    Likes,
    Bookmarks,
}

impl InteractionList {
    pub(crate) fn column(self) -> &'static str {
        match self {
            InteractionList::Likes => "liked_products",
            InteractionList::Bookmarks => "bookmarked_products",
        }
    }
}

/// Append `item` unless already present. Returns whether the list changed.
pub fn add_unique<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    if list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}

/// Remove every occurrence of `item`. Returns whether the list changed.
pub fn remove_item<T: PartialEq>(list: &mut Vec<T>, item: &T) -> bool {
    let before = list.len();
    list.retain(|existing| existing != item);
    list.len() != before
}

/// Move `item` to the front of `history` and cap its length.
pub fn record_click<T: PartialEq>(history: &mut Vec<T>, item: T, cap: usize) {
    history.retain(|existing| *existing != item);
    history.insert(0, item);
    history.truncate(cap);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_unique_is_idempotent() {
        let mut list = vec![1, 2];
        assert!(add_unique(&mut list, 3));
        assert!(!add_unique(&mut list, 3));
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_item_reports_change() {
        let mut list = vec![1, 2, 3];
        assert!(remove_item(&mut list, &2));
        assert!(!remove_item(&mut list, &2));
        assert_eq!(list, vec![1, 3]);
    }

    #[test]
    fn test_click_moves_to_front_without_duplicates() {
        let mut history = vec![1, 2, 3];
        record_click(&mut history, 3, CLICK_HISTORY_CAP);
        assert_eq!(history, vec![3, 1, 2]);

        record_click(&mut history, 4, CLICK_HISTORY_CAP);
        assert_eq!(history, vec![4, 3, 1, 2]);
    }

    #[test]
    fn test_click_history_capped() {
        let mut history: Vec<usize> = (0..CLICK_HISTORY_CAP).collect();
        record_click(&mut history, 1000, CLICK_HISTORY_CAP);

        assert_eq!(history.len(), CLICK_HISTORY_CAP);
        assert_eq!(history[0], 1000);
        assert!(!history.contains(&(CLICK_HISTORY_CAP - 1)));
    }

    #[test]
    fn test_list_columns() {
        assert_eq!(InteractionList::Likes.column(), "liked_products");
        assert_eq!(InteractionList::Bookmarks.column(), "bookmarked_products");
    }
}
