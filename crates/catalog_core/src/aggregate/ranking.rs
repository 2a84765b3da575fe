//! Pure grouping and ranking helpers.
//!
//! # Invariants
//! - Count rankings order by count descending, then key ascending.
//! - Variant counts report every variant, in the given order, with `0` for
//!   variants that never occur.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ranked entry: an item plus the number of rows grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranked<T> {
    pub item: T,
    pub count: u64,
}

impl<T> Ranked<T> {
    /// Replaces the ranked item while keeping its count.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Ranked<U> {
        Ranked {
            item: f(self.item),
            count: self.count,
        }
    }
}

/// Count of rows for one enum variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCount<V> {
    pub variant: V,
    pub count: u64,
}

/// Groups `keys` and ranks the groups by size.
///
/// `top = None` keeps every group; `Some(n)` keeps the first `n`.
pub fn rank_by_count<K, I>(keys: I, top: Option<u32>) -> Vec<Ranked<K>>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut groups: BTreeMap<K, u64> = BTreeMap::new();
    for key in keys {
        *groups.entry(key).or_insert(0) += 1;
    }

    // BTreeMap iteration is key-ascending and the sort is stable, so equal
    // counts stay in ascending key order.
    let mut ranked = groups
        .into_iter()
        .map(|(item, count)| Ranked { item, count })
        .collect::<Vec<_>>();
    ranked.sort_by(|left, right| right.count.cmp(&left.count));

    if let Some(top) = top {
        ranked.truncate(top as usize);
    }
    ranked
}

/// Expands grouped counts to one entry per variant, zero-filling gaps.
pub fn counts_for_all<V, I>(variants: &[V], counted: I) -> Vec<VariantCount<V>>
where
    V: Copy + Ord,
    I: IntoIterator<Item = (V, u64)>,
{
    let mut by_variant: BTreeMap<V, u64> = BTreeMap::new();
    for (variant, count) in counted {
        *by_variant.entry(variant).or_insert(0) += count;
    }

    variants
        .iter()
        .map(|variant| VariantCount {
            variant: *variant,
            count: by_variant.get(variant).copied().unwrap_or(0),
        })
        .collect()
}
