//! Dead-code elimination over a parsed stylesheet.
//!
//! Removes class, id, and type selector components with no usage entry,
//! then drops selectors left without components and rules left without
//! selectors. Comments are stripped unconditionally in the same pass.
//!
//! Everything else is conservative pass-through: attribute selectors carry
//! no reliable usage signal and are never pruned; universal and pseudo
//! components are structural; raw (unclassifiable) selectors are never
//! touched. Known gap, kept deliberately: an at-rule whose nested rules
//! were all pruned remains in the output as an empty wrapper.

use super::usage::OccurrenceTable;
use crate::css::{AtRuleBody, CssNode, Rule, Selector, SelectorComponent, StyleSheet};

/// Type selectors kept regardless of usage.
const TYPE_WHITELIST: &[&str] = &["*", "html", "body"];

pub fn eliminate(sheet: &mut StyleSheet, table: &OccurrenceTable) {
    eliminate_nodes(&mut sheet.nodes, table);
}

fn eliminate_nodes(nodes: &mut Vec<CssNode>, table: &OccurrenceTable) {
    // retain_mut visits every node exactly once, so removing a rule never
    // skips the one after it.
    nodes.retain_mut(|node| match node {
        CssNode::Comment(_) => false,
        CssNode::Rule(rule) => {
            prune_rule(rule, table);
            !rule.selectors.is_empty()
        }
        CssNode::AtRule(at) => {
            if let AtRuleBody::Rules(children) = &mut at.body {
                eliminate_nodes(children, table);
            }
            true
        }
    });
}

fn prune_rule(rule: &mut Rule, table: &OccurrenceTable) {
    rule.selectors.retain_mut(|selector| match selector {
        Selector::Raw(_) => true,
        Selector::Components(comps) => {
            comps.retain(|comp| keep_component(comp, table));
            normalize_combinators(comps);
            !comps.is_empty()
        }
    });
}

fn keep_component(comp: &SelectorComponent, table: &OccurrenceTable) -> bool {
    match comp {
        SelectorComponent::Class(name) => table.classnames.contains_key(name),
        SelectorComponent::Id(name) => table.ids.contains_key(name),
        SelectorComponent::Type(name) => {
            let name = name.to_ascii_lowercase();
            TYPE_WHITELIST.contains(&name.as_str()) || table.typenames.contains_key(&name)
        }
        SelectorComponent::Attribute(_)
        | SelectorComponent::Universal
        | SelectorComponent::Pseudo(_)
        | SelectorComponent::Combinator(_) => true,
    }
}

/// Component removal can strand combinators with nothing to join. Collapse
/// runs to one and drop any left dangling at either end; a sequence that
/// was only combinators becomes empty and the selector is removed.
fn normalize_combinators(comps: &mut Vec<SelectorComponent>) {
    let mut i = 0;
    while i + 1 < comps.len() {
        if matches!(comps[i], SelectorComponent::Combinator(_))
            && matches!(comps[i + 1], SelectorComponent::Combinator(_))
        {
            comps.remove(i + 1);
        } else {
            i += 1;
        }
    }
    while matches!(comps.first(), Some(SelectorComponent::Combinator(_))) {
        comps.remove(0);
    }
    while matches!(comps.last(), Some(SelectorComponent::Combinator(_))) {
        comps.pop();
    }
}
