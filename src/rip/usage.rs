//! Identifier usage counting.
//!
//! Two writers feed the [`OccurrenceTable`], in strict phase order: the
//! collector counts class tokens, ids, and tag names while walking a page's
//! HTML tree, then — after dead rules are gone — the recounter adds one per
//! surviving class/id selector component in the CSS. The combined counts
//! drive both pruning (presence) and renaming (cost ranking).
//!
//! Maps are insertion-ordered so that downstream cost ties break by first
//! encounter, keeping builds deterministic.

use indexmap::IndexMap;

use super::RipError;
use crate::css::{AtRuleBody, CssNode, Selector, SelectorComponent, StyleSheet};
use crate::html::{self, Document};

/// Per-unit occurrence counts, keyed by identifier kind.
///
/// Built fresh for every renaming unit (one page, or all pages sharing a
/// bundle) and discarded once that unit's output is serialized.
#[derive(Debug, Default)]
pub struct OccurrenceTable {
    pub classnames: IndexMap<String, usize>,
    pub ids: IndexMap<String, usize>,
    pub typenames: IndexMap<String, usize>,
}

/// Count every class token, id value, and tag name in the document.
///
/// Read-only over the HTML; no node is skipped regardless of depth.
pub fn collect_document(table: &mut OccurrenceTable, doc: &Document) {
    html::walk_elements(&doc.nodes, &mut |el| {
        for class in el.classes() {
            bump(&mut table.classnames, class);
        }
        if let Some(id) = el.id() {
            bump(&mut table.ids, id);
        }
        bump(&mut table.typenames, &el.tag.to_ascii_lowercase());
    });
}

fn bump(map: &mut IndexMap<String, usize>, name: &str) {
    *map.entry(name.to_string()).or_insert(0) += 1;
}

/// Add CSS-side counts for surviving class/id selector components.
///
/// In strict mode (elimination ran) a class or id absent from the table is
/// an internal-consistency failure: pruning should have removed it, so its
/// presence signals a bug in the elimination pass, not bad input. With
/// elimination disabled the premise does not hold and unknown identifiers
/// are simply not counted.
///
/// Type components are not recounted; type names never participate in
/// renaming.
pub fn recount_stylesheet(
    table: &mut OccurrenceTable,
    sheet: &StyleSheet,
    strict: bool,
) -> Result<(), RipError> {
    recount_nodes(table, &sheet.nodes, strict)
}

fn recount_nodes(
    table: &mut OccurrenceTable,
    nodes: &[CssNode],
    strict: bool,
) -> Result<(), RipError> {
    for node in nodes {
        match node {
            CssNode::Rule(rule) => {
                for selector in &rule.selectors {
                    let Selector::Components(comps) = selector else {
                        continue;
                    };
                    for comp in comps {
                        match comp {
                            SelectorComponent::Class(name) => {
                                recount_entry(&mut table.classnames, name, "class", strict)?;
                            }
                            SelectorComponent::Id(name) => {
                                recount_entry(&mut table.ids, name, "id", strict)?;
                            }
                            _ => {}
                        }
                    }
                }
            }
            CssNode::AtRule(at) => {
                if let AtRuleBody::Rules(children) = &at.body {
                    recount_nodes(table, children, strict)?;
                }
            }
            CssNode::Comment(_) => {}
        }
    }
    Ok(())
}

fn recount_entry(
    map: &mut IndexMap<String, usize>,
    name: &str,
    kind: &'static str,
    strict: bool,
) -> Result<(), RipError> {
    match map.get_mut(name) {
        Some(count) => {
            *count += 1;
            Ok(())
        }
        None if strict => Err(RipError::InternalConsistency {
            kind,
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{css, html};

    fn collect(html_text: &str) -> OccurrenceTable {
        let doc = html::parse(html_text).unwrap();
        let mut table = OccurrenceTable::default();
        collect_document(&mut table, &doc);
        table
    }

    #[test]
    fn counts_each_class_token_independently() {
        let table = collect("<div class=\"a b\"><span class=\"a\"></span></div>");
        assert_eq!(table.classnames.get("a"), Some(&2));
        assert_eq!(table.classnames.get("b"), Some(&1));
    }

    #[test]
    fn counts_ids_and_tag_names() {
        let table = collect("<div id=\"top\"><p></p><p></p></div>");
        assert_eq!(table.ids.get("top"), Some(&1));
        assert_eq!(table.typenames.get("div"), Some(&1));
        assert_eq!(table.typenames.get("p"), Some(&2));
    }

    #[test]
    fn tag_names_are_lowercased() {
        let table = collect("<DIV></DIV>");
        assert_eq!(table.typenames.get("div"), Some(&1));
    }

    #[test]
    fn deeply_nested_nodes_are_counted() {
        let table = collect("<a><b><c><d class=\"deep\"></d></c></b></a>");
        assert_eq!(table.classnames.get("deep"), Some(&1));
    }

    #[test]
    fn encounter_order_is_preserved() {
        let table = collect("<i class=\"z\"></i><i class=\"a\"></i><i class=\"m\"></i>");
        let order: Vec<&str> = table.classnames.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn recount_adds_css_occurrences() {
        let mut table = collect("<a class=\"used\" id=\"top\"></a>");
        let sheet = css::parse(".used { color: red; } #top .used { color: blue; }").unwrap();
        recount_stylesheet(&mut table, &sheet, true).unwrap();
        assert_eq!(table.classnames.get("used"), Some(&3));
        assert_eq!(table.ids.get("top"), Some(&2));
    }

    #[test]
    fn recount_descends_into_media_blocks() {
        let mut table = collect("<a class=\"used\"></a>");
        let sheet = css::parse("@media (min-width: 640px) { .used { color: red; } }").unwrap();
        recount_stylesheet(&mut table, &sheet, true).unwrap();
        assert_eq!(table.classnames.get("used"), Some(&2));
    }

    #[test]
    fn recount_ignores_type_components() {
        let mut table = collect("<a></a>");
        let sheet = css::parse("a { color: red; }").unwrap();
        recount_stylesheet(&mut table, &sheet, true).unwrap();
        assert_eq!(table.typenames.get("a"), Some(&1));
    }

    #[test]
    fn strict_recount_rejects_unknown_identifier() {
        let mut table = collect("<a></a>");
        let sheet = css::parse(".ghost { color: red; }").unwrap();
        let err = recount_stylesheet(&mut table, &sheet, true).unwrap_err();
        assert!(matches!(
            err,
            RipError::InternalConsistency { kind: "class", .. }
        ));
    }

    #[test]
    fn tolerant_recount_skips_unknown_identifier() {
        let mut table = collect("<a></a>");
        let sheet = css::parse(".ghost { color: red; }").unwrap();
        recount_stylesheet(&mut table, &sheet, false).unwrap();
        assert!(!table.classnames.contains_key("ghost"));
    }
}
