//! Linear merges over pre-sorted slices.
//!
//! Both merges expect ascending input. Unsorted input is a caller bug and is only caught by
//! debug assertions.

/// Merges two ascending slices, keeping every element of both.
///
/// The result has `a.len() + b.len()` elements. On ties the element from `a` comes first.
pub fn merge_sorted<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    debug_assert!(is_ascending(a), "merge input `a` is not sorted");
    debug_assert!(is_ascending(b), "merge input `b` is not sorted");

    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);

    out
}

/// Merges two strictly ascending slices into their strictly ascending union.
///
/// An element present in both inputs is emitted once.
pub fn merge_sorted_unique<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    debug_assert!(is_strictly_ascending(a), "merge input `a` is not strictly sorted");
    debug_assert!(is_strictly_ascending(b), "merge input `b` is not strictly sorted");

    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);

    out
}

pub(crate) fn is_ascending<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0] <= w[1])
}

pub(crate) fn is_strictly_ascending<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use opset_primitives::Address;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_merge_sorted_keeps_duplicates() {
        let merged = merge_sorted(&[1u32, 3, 3, 7], &[0, 3, 8]);
        assert_eq!(merged, vec![0, 1, 3, 3, 3, 7, 8]);
    }

    #[test]
    fn test_merge_sorted_empty_sides() {
        assert_eq!(merge_sorted::<u32>(&[], &[]), Vec::<u32>::new());
        assert_eq!(merge_sorted(&[2u32, 4], &[]), vec![2, 4]);
        assert_eq!(merge_sorted(&[], &[2u32, 4]), vec![2, 4]);
    }

    #[test]
    fn test_merge_unique_collapses_shared_heads() {
        let x = Address::with_last_byte(1);
        let y = Address::with_last_byte(2);
        let z = Address::with_last_byte(3);

        assert_eq!(merge_sorted_unique(&[x, y], &[y, z]), vec![x, y, z]);
        assert_eq!(merge_sorted_unique(&[x, y], &[x, y]), vec![x, y]);
        assert_eq!(merge_sorted_unique(&[x, y], &[]), vec![x, y]);
        assert_eq!(merge_sorted_unique(&[], &[z]), vec![z]);
    }

    #[test]
    #[should_panic(expected = "not strictly sorted")]
    #[cfg(debug_assertions)]
    fn test_merge_unique_rejects_unsorted_input_in_debug() {
        let _ = merge_sorted_unique(&[3u8, 1], &[2]);
    }

    fn sorted_vec() -> impl Strategy<Value = Vec<u16>> {
        prop::collection::vec(any::<u16>(), 0..64).prop_map(|mut v| {
            v.sort_unstable();
            v
        })
    }

    fn sorted_set() -> impl Strategy<Value = Vec<u16>> {
        prop::collection::btree_set(any::<u16>(), 0..64).prop_map(|s| s.into_iter().collect())
    }

    proptest! {
        #[test]
        fn merge_sorted_is_sorted_multiset_union(a in sorted_vec(), b in sorted_vec()) {
            let merged = merge_sorted(&a, &b);

            let mut expected = a.clone();
            expected.extend_from_slice(&b);
            expected.sort_unstable();

            prop_assert_eq!(merged.len(), a.len() + b.len());
            prop_assert_eq!(merged, expected);
        }

        #[test]
        fn merge_unique_is_sorted_set_union(a in sorted_set(), b in sorted_set()) {
            let merged = merge_sorted_unique(&a, &b);

            let expected: Vec<u16> = a
                .iter()
                .chain(b.iter())
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();

            prop_assert!(is_strictly_ascending(&merged));
            prop_assert_eq!(merged, expected);
        }

        #[test]
        fn merge_unique_is_idempotent(a in sorted_set()) {
            prop_assert_eq!(merge_sorted_unique(&a, &a), a);
        }
    }
}
