//! Order-preserving deduplication.

use std::collections::HashSet;
use std::hash::Hash;

/// Returns each distinct value of `items` exactly once, in order of first
/// occurrence.
///
/// ```
/// use relay_core::dedup;
///
/// assert_eq!(dedup([3_i64, 1, 3, 2, 1]), vec![3, 1, 2]);
/// ```
pub fn dedup<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let items = items.into_iter();
    let mut seen = HashSet::with_capacity(items.size_hint().0);
    items.filter(|item| seen.insert(item.clone())).collect()
}
