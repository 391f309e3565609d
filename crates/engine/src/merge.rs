//! Natural-key merge planning, shared by all three template child
//! collections (header fields, sections, fields).
//!
//! The plan pairs existing and incoming children by business key
//! instead of array position, so identity survives reordering and
//! relabeling. Matched and added steps come out in incoming order;
//! removed steps follow in existing order.

use std::collections::BTreeMap;

/// One step of a child merge, indexing into the caller's slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeStep {
    /// Same key on both sides: carry the existing identity, take the
    /// incoming attributes.
    Matched { existing: usize, incoming: usize },
    /// Key only on the incoming side: create fresh.
    Added { incoming: usize },
    /// Key only on the existing side: deactivate, keep in place.
    Removed { existing: usize },
}

/// Plan a merge of two keyed collections.
///
/// Duplicate keys are the caller's problem; definitions are validated
/// before they get here, and for existing children the last occurrence
/// wins.
pub(crate) fn merge_plan<K: Ord>(existing: &[K], incoming: &[K]) -> Vec<MergeStep> {
    let index: BTreeMap<&K, usize> = existing.iter().enumerate().map(|(i, k)| (k, i)).collect();

    let mut matched = vec![false; existing.len()];
    let mut plan = Vec::with_capacity(existing.len().max(incoming.len()));

    for (ii, key) in incoming.iter().enumerate() {
        match index.get(key) {
            Some(&ei) => {
                matched[ei] = true;
                plan.push(MergeStep::Matched {
                    existing: ei,
                    incoming: ii,
                });
            }
            None => plan.push(MergeStep::Added { incoming: ii }),
        }
    }

    for (ei, hit) in matched.iter().enumerate() {
        if !hit {
            plan.push(MergeStep::Removed { existing: ei });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_keys_all_match() {
        let plan = merge_plan(&["a", "b"], &["a", "b"]);
        assert_eq!(
            plan,
            vec![
                MergeStep::Matched {
                    existing: 0,
                    incoming: 0
                },
                MergeStep::Matched {
                    existing: 1,
                    incoming: 1
                },
            ]
        );
    }

    #[test]
    fn reordering_preserves_matches() {
        let plan = merge_plan(&["a", "b", "c"], &["c", "a", "b"]);
        assert_eq!(
            plan,
            vec![
                MergeStep::Matched {
                    existing: 2,
                    incoming: 0
                },
                MergeStep::Matched {
                    existing: 0,
                    incoming: 1
                },
                MergeStep::Matched {
                    existing: 1,
                    incoming: 2
                },
            ]
        );
    }

    #[test]
    fn added_and_removed_keys() {
        let plan = merge_plan(&["a", "b"], &["b", "c"]);
        assert_eq!(
            plan,
            vec![
                MergeStep::Matched {
                    existing: 1,
                    incoming: 0
                },
                MergeStep::Added { incoming: 1 },
                MergeStep::Removed { existing: 0 },
            ]
        );
    }

    #[test]
    fn empty_sides() {
        assert_eq!(
            merge_plan::<&str>(&[], &["a"]),
            vec![MergeStep::Added { incoming: 0 }]
        );
        assert_eq!(
            merge_plan(&["a"], &[]),
            vec![MergeStep::Removed { existing: 0 }]
        );
        assert!(merge_plan::<&str>(&[], &[]).is_empty());
    }
}
