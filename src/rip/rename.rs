//! Applies a rename map to both sides of a unit.
//!
//! CSS side: every class/id selector component whose identifier is in the
//! map is rewritten in place, including inside nested at-rule blocks. HTML
//! side: `class` attributes are rewritten token by token, preserving order,
//! and only re-serialized when at least one token changed; `id` attributes
//! are swapped whole. Identifiers absent from the map pass through
//! unchanged, as do raw selectors.

use super::names::RenameMap;
use crate::css::{AtRuleBody, CssNode, Selector, SelectorComponent, StyleSheet};
use crate::html::{self, Document};

pub fn rename_stylesheet(sheet: &mut StyleSheet, map: &RenameMap) {
    rename_nodes(&mut sheet.nodes, map);
}

fn rename_nodes(nodes: &mut [CssNode], map: &RenameMap) {
    for node in nodes {
        match node {
            CssNode::Rule(rule) => {
                for selector in &mut rule.selectors {
                    let Selector::Components(comps) = selector else {
                        continue;
                    };
                    for comp in comps {
                        match comp {
                            SelectorComponent::Class(name) => {
                                if let Some(new) = map.classnames.get(name.as_str()) {
                                    *name = new.clone();
                                }
                            }
                            SelectorComponent::Id(name) => {
                                if let Some(new) = map.ids.get(name.as_str()) {
                                    *name = new.clone();
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            CssNode::AtRule(at) => {
                if let AtRuleBody::Rules(children) = &mut at.body {
                    rename_nodes(children, map);
                }
            }
            CssNode::Comment(_) => {}
        }
    }
}

pub fn rename_document(doc: &mut Document, map: &RenameMap) {
    html::walk_elements_mut(&mut doc.nodes, &mut |el| {
        let rewritten = el.attr("class").map(|attr| {
            let mut changed = false;
            let tokens: Vec<String> = attr
                .split_whitespace()
                .map(|token| match map.classnames.get(token) {
                    Some(new) => {
                        changed = true;
                        new.clone()
                    }
                    None => token.to_string(),
                })
                .collect();
            (changed, tokens)
        });
        if let Some((true, tokens)) = rewritten {
            el.set_attr("class", tokens.join(" "));
        }

        let new_id = el.id().and_then(|id| map.ids.get(id)).cloned();
        if let Some(new_id) = new_id {
            el.set_attr("id", new_id);
        }
    });
}
