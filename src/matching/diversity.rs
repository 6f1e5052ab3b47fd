//! Diversity-aware top-N selection.
//!
//! Given candidates in rank order, the first pass walks the ranking and takes
//! a candidate while its group has fewer than `cap` members selected. The
//! second pass fills any remaining slots with the best unselected candidates
//! regardless of group. The output keeps the original rank order.

use std::collections::HashMap;

/// Select up to `top_n` items from `ranked` with at most `cap` per group in
/// the first pass.
///
/// Lists no longer than `top_n` are returned unchanged. A `cap` of zero
/// disables grouping.
pub fn select_diverse<T, F>(ranked: Vec<T>, top_n: usize, cap: usize, group_key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if ranked.len() <= top_n {
        return ranked;
    }
    if cap == 0 {
        let mut ranked = ranked;
        ranked.truncate(top_n);
        return ranked;
    }

    let mut taken = vec![false; ranked.len()];
    let mut selected = 0usize;
    let mut per_group: HashMap<&str, usize> = HashMap::new();

    for (i, item) in ranked.iter().enumerate() {
        if selected == top_n {
            break;
        }
        let count = per_group.entry(group_key(item)).or_insert(0);
        if *count < cap {
            *count += 1;
            taken[i] = true;
            selected += 1;
        }
    }

    for flag in &mut taken {
        if selected == top_n {
            break;
        }
        if !*flag {
            *flag = true;
            selected += 1;
        }
    }

    ranked
        .into_iter()
        .zip(taken)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(groups: &[&'static str]) -> Vec<(usize, &'static str)> {
        groups.iter().copied().enumerate().collect()
    }

    fn ranks(selected: &[(usize, &str)]) -> Vec<usize> {
        selected.iter().map(|(rank, _)| *rank).collect()
    }

    #[test]
    fn test_short_list_unchanged() {
        let items = ranked(&["a", "a", "a"]);
        let out = select_diverse(items.clone(), 5, 1, |item| item.1);
        assert_eq!(out, items);
    }

    #[test]
    fn test_cap_applies_in_first_pass() {
        let items = ranked(&["a", "a", "a", "b", "c", "a"]);
        let out = select_diverse(items, 4, 2, |item| item.1);
        assert_eq!(ranks(&out), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_fill_pass_uses_rank_order() {
        let items = ranked(&["a", "a", "a", "a", "b"]);
        let out = select_diverse(items, 4, 2, |item| item.1);
        // a0, a1, b4 from the first pass, then a2 fills
        assert_eq!(ranks(&out), vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_zero_cap_truncates() {
        let items = ranked(&["a", "a", "b"]);
        let out = select_diverse(items, 2, 0, |item| item.1);
        assert_eq!(ranks(&out), vec![0, 1]);
    }

    #[test]
    fn test_group_count_never_exceeds_cap_when_others_suffice() {
        let mut groups = vec!["big"; 20];
        groups.extend(["u1", "u2", "u3", "u4", "u5", "u6", "u7", "u8", "u9", "u10"]);
        let out = select_diverse(ranked(&groups), 10, 4, |item| item.1);
        assert_eq!(out.len(), 10);
        assert_eq!(out.iter().filter(|(_, g)| *g == "big").count(), 4);
    }
}
