//! Cost-ranked short-name allocation.
//!
//! Identifiers are ranked per kind by estimated byte cost —
//! `occurrences * length` — and the i-th ranked identifier gets the i-th
//! shortest available name. Greedy highest-cost-first is not globally
//! optimal, but it is monotonic, deterministic, and good enough: the
//! identifiers that dominate output size always get the shortest names.
//!
//! Classnames and ids allocate from independent namespaces; `.a` and `#a`
//! cannot collide in CSS, so both kinds may use the same literal names.

use indexmap::IndexMap;

use super::RipError;
use super::usage::OccurrenceTable;

/// Per-kind mapping from original identifier to allocated short name.
///
/// Covers every ranked identifier of the unit, so the renamer can rewrite
/// HTML and CSS from the same map and stay consistent.
#[derive(Debug, Default)]
pub struct RenameMap {
    pub classnames: IndexMap<String, String>,
    pub ids: IndexMap<String, String>,
}

const ALPHABET_LEN: usize = 26;

pub fn allocate(table: &OccurrenceTable) -> Result<RenameMap, RipError> {
    Ok(RenameMap {
        classnames: allocate_kind(&table.classnames)?,
        ids: allocate_kind(&table.ids)?,
    })
}

fn allocate_kind(counts: &IndexMap<String, usize>) -> Result<IndexMap<String, String>, RipError> {
    let mut ranked: Vec<(&String, usize)> = counts
        .iter()
        .map(|(name, count)| (name, name.len() * count))
        .collect();
    // Stable sort: cost ties keep encounter order, so output is
    // deterministic for a given input.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (name, _))| Ok((name.clone(), shortest_name(rank)?)))
        .collect()
}

/// The `rank`-th shortest name: `a`–`z`, then `a0`–`z0`, `a1`–`z1`, …
///
/// The overflow counter is encoded as `u32`; a rank past that encoding is
/// an allocation error rather than a silent wrap.
pub fn shortest_name(rank: usize) -> Result<String, RipError> {
    let letter = (b'a' + (rank % ALPHABET_LEN) as u8) as char;
    match rank / ALPHABET_LEN {
        0 => Ok(letter.to_string()),
        over => {
            let counter = u32::try_from(over - 1)
                .map_err(|_| RipError::AllocationExhausted { rank })?;
            Ok(format!("{letter}{counter}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_classes(entries: &[(&str, usize)]) -> OccurrenceTable {
        let mut table = OccurrenceTable::default();
        for (name, count) in entries {
            table.classnames.insert(name.to_string(), *count);
        }
        table
    }

    #[test]
    fn single_letter_names() {
        assert_eq!(shortest_name(0).unwrap(), "a");
        assert_eq!(shortest_name(1).unwrap(), "b");
        assert_eq!(shortest_name(25).unwrap(), "z");
    }

    #[test]
    fn overflow_names_carry_a_counter() {
        assert_eq!(shortest_name(26).unwrap(), "a0");
        assert_eq!(shortest_name(27).unwrap(), "b0");
        assert_eq!(shortest_name(51).unwrap(), "z0");
        assert_eq!(shortest_name(52).unwrap(), "a1");
        assert_eq!(shortest_name(103).unwrap(), "z1");
    }

    #[test]
    fn highest_cost_gets_shortest_name() {
        let table = table_with_classes(&[("btn", 2), ("col-lg-6", 50)]);
        let map = allocate(&table).unwrap();
        assert_eq!(map.classnames.get("col-lg-6").map(String::as_str), Some("a"));
        assert_eq!(map.classnames.get("btn").map(String::as_str), Some("b"));
    }

    #[test]
    fn cost_is_count_times_length() {
        // "wide" = 4 * 3 = 12, "x" = 1 * 20 = 20: the short frequent name wins.
        let table = table_with_classes(&[("wide", 3), ("x", 20)]);
        let map = allocate(&table).unwrap();
        assert_eq!(map.classnames.get("x").map(String::as_str), Some("a"));
        assert_eq!(map.classnames.get("wide").map(String::as_str), Some("b"));
    }

    #[test]
    fn ties_break_by_encounter_order() {
        let table = table_with_classes(&[("zz", 2), ("ab", 2), ("mm", 2)]);
        let map = allocate(&table).unwrap();
        assert_eq!(map.classnames.get("zz").map(String::as_str), Some("a"));
        assert_eq!(map.classnames.get("ab").map(String::as_str), Some("b"));
        assert_eq!(map.classnames.get("mm").map(String::as_str), Some("c"));
    }

    #[test]
    fn no_two_identifiers_share_a_name() {
        let entries: Vec<(String, usize)> = (0..60).map(|i| (format!("class-{i}"), i + 1)).collect();
        let mut table = OccurrenceTable::default();
        for (name, count) in &entries {
            table.classnames.insert(name.clone(), *count);
        }
        let map = allocate(&table).unwrap();
        let mut seen: Vec<&String> = map.classnames.values().collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), entries.len());
    }

    #[test]
    fn higher_cost_never_gets_longer_name() {
        let table = table_with_classes(&[("low", 1), ("high-cost-name", 100), ("mid", 10)]);
        let map = allocate(&table).unwrap();
        let cost = |name: &str, count: usize| name.len() * count;
        let pairs = [("low", 1), ("high-cost-name", 100), ("mid", 10)];
        for (a, ca) in pairs {
            for (b, cb) in pairs {
                if cost(a, ca) > cost(b, cb) {
                    assert!(map.classnames[a].len() <= map.classnames[b].len());
                }
            }
        }
    }

    #[test]
    fn kinds_allocate_independently() {
        let mut table = OccurrenceTable::default();
        table.classnames.insert("menu".to_string(), 3);
        table.ids.insert("header".to_string(), 2);
        let map = allocate(&table).unwrap();
        assert_eq!(map.classnames.get("menu").map(String::as_str), Some("a"));
        assert_eq!(map.ids.get("header").map(String::as_str), Some("a"));
    }
}
