use super::order::{compare_numeric_ids, parse_loose_timestamp};
use crate::model::WishItem;
use std::cmp::Ordering;

/// Filters and ranks the wishlist.
///
/// Every tag in `tag_filters` must be present on a wish (AND). The query is
/// matched case-insensitively against content or the raw tag string. Open
/// wishes always precede done ones; within each group the most recently
/// updated come first, then the highest numeric id.
pub fn compute_wish_view(
    wishes: &[WishItem],
    tag_filters: &[String],
    search_query: &str,
) -> Vec<WishItem> {
    let required: Vec<&str> = tag_filters
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let query = search_query.trim().to_lowercase();

    let mut results: Vec<WishItem> = wishes
        .iter()
        .filter(|wish| {
            let tags = wish.tags();
            required.iter().all(|tag| tags.iter().any(|t| t == tag))
        })
        .filter(|wish| {
            query.is_empty()
                || wish.content.to_lowercase().contains(&query)
                || wish.tag.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();

    results.sort_by(compare_wishes);
    results
}

fn compare_wishes(a: &WishItem, b: &WishItem) -> Ordering {
    a.is_done
        .cmp(&b.is_done)
        .then_with(|| {
            parse_loose_timestamp(&b.update_time).cmp(&parse_loose_timestamp(&a.update_time))
        })
        .then_with(|| {
            compare_numeric_ids(
                b.id.as_deref().unwrap_or_default(),
                a.id.as_deref().unwrap_or_default(),
            )
        })
}
