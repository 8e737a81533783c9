//! HTML minification.
//!
//! Runs after style ripping, on the serialized page: parse, reshape the
//! tree, re-serialize with bare attributes where the value allows it.
//!
//! Passes over the tree:
//! 1. Strip comment nodes.
//! 2. Collapse whitespace runs in text to a single space. Rendering treats
//!    all whitespace alike, so this is safe everywhere except `pre` and
//!    `textarea` (left untouched), `script` (trimmed only), and `style`
//!    (trimmed only — its content is already minified CSS).
//! 3. Drop whitespace-only text directly under `html`/`head` and at the
//!    document root, and trim the leading/trailing text edges of `body`.
//!
//! Full trimming anywhere else is unsafe: CSS can make any element
//! whitespace-significant, so interior text keeps its single boundary
//! space.

use crate::html::{self, Document, HtmlError, Node, SerializeOptions};

pub fn minify_html(input: &str) -> Result<String, HtmlError> {
    let mut doc = html::parse(input)?;
    minify_document(&mut doc);
    Ok(doc.serialize(SerializeOptions { bare_attributes: true }))
}

pub fn minify_document(doc: &mut Document) {
    minify_nodes(&mut doc.nodes, None);
}

fn minify_nodes(nodes: &mut Vec<Node>, parent_tag: Option<&str>) {
    nodes.retain_mut(|node| match node {
        Node::Comment(_) => false,
        Node::Doctype(_) => true,
        Node::Text(text) => minify_text(text, parent_tag),
        Node::Element(el) => {
            let tag = el.tag.to_ascii_lowercase();
            if !matches!(tag.as_str(), "pre" | "textarea") {
                minify_nodes(&mut el.children, Some(tag.as_str()));
            }
            true
        }
    });

    if parent_tag == Some("body") {
        if let Some(Node::Text(text)) = nodes.first_mut() {
            *text = text.trim_start().to_string();
        }
        if let Some(Node::Text(text)) = nodes.last_mut() {
            *text = text.trim_end().to_string();
        }
        nodes.retain(|node| !matches!(node, Node::Text(text) if text.is_empty()));
    }
}

/// Rewrite a text node for its parent context; returns false to drop it.
fn minify_text(text: &mut String, parent_tag: Option<&str>) -> bool {
    match parent_tag {
        Some("script") | Some("style") => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return false;
            }
            *text = trimmed.to_string();
            true
        }
        Some("html") | Some("head") | None => {
            if text.trim().is_empty() {
                return false;
            }
            *text = collapse_text(text);
            true
        }
        _ => {
            *text = collapse_text(text);
            !text.is_empty()
        }
    }
}

/// Collapse whitespace runs to single spaces without trimming the ends.
fn collapse_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_ws = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_ws {
                out.push(' ');
            }
            last_ws = true;
        } else {
            out.push(ch);
            last_ws = false;
        }
    }
    out
}
