//! CSS stylesheet model, parser, and serializer.
//!
//! The style-ripping engine prunes and renames *selectors*; declaration
//! blocks are opaque text it never inspects. The model mirrors that split:
//! a [`Rule`] owns a parsed selector list and an unparsed declaration
//! string, and serialization re-emits declarations with collapsed
//! whitespace only.
//!
//! Selectors parse into a closed set of tagged components
//! ([`SelectorComponent`]) so that pruning and renaming dispatch
//! exhaustively — type, class, id, attribute, universal, pseudo, and
//! combinator forms each get their own policy. A selector the parser cannot
//! classify is kept as [`Selector::Raw`] and passes through every later
//! stage untouched.
//!
//! At-rules come in three shapes: statement at-rules (`@import …;`),
//! nested-rule at-rules (`@media`, `@supports`) whose bodies are parsed
//! recursively, and everything else (`@font-face`, `@keyframes`, …) whose
//! bodies are preserved verbatim. Grammar coverage beyond this is out of
//! scope; unknown constructs favor pass-through over errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CssError {
    #[error("unterminated comment at byte {0}")]
    UnterminatedComment(usize),
    #[error("unterminated string at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated block starting at byte {0}")]
    UnterminatedBlock(usize),
    #[error("at-rule without terminator at byte {0}")]
    UnterminatedAtRule(usize),
    #[error("selector without declaration block at byte {0}")]
    MissingDeclarationBlock(usize),
}

/// A parsed stylesheet: the ordered list of top-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub nodes: Vec<CssNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssNode {
    Rule(Rule),
    AtRule(AtRule),
    Comment(String),
}

/// A style rule: comma-separated selector list plus an opaque declaration
/// block. A rule whose selector list empties during pruning is removed
/// from its parent list rather than serialized selector-less.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub prelude: String,
    pub body: AtRuleBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleBody {
    /// Statement at-rule, e.g. `@import url(x.css);`
    None,
    /// Opaque block body, preserved verbatim (`@font-face`, `@keyframes`, …).
    Raw(String),
    /// Nested rules (`@media`, `@supports`).
    Rules(Vec<CssNode>),
}

/// One selector of a rule's comma-separated selector list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Components(Vec<SelectorComponent>),
    /// A selector the parser could not classify. Never pruned, never
    /// renamed, serialized as written (whitespace collapsed).
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    Type(String),
    Class(String),
    Id(String),
    /// Raw text between `[` and `]`.
    Attribute(String),
    Universal,
    /// Raw pseudo-class or pseudo-element text, including leading colons
    /// and any functional arguments: `:hover`, `::before`, `:not(.x)`.
    Pseudo(String),
    Combinator(Combinator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// At-rules whose block contains nested rules rather than declarations.
const NESTED_RULE_AT_RULES: &[&str] = &["media", "supports"];

// ============================================================================
// Parsing
// ============================================================================

pub fn parse(input: &str) -> Result<StyleSheet, CssError> {
    let mut pos = 0;
    let nodes = parse_nodes(input, &mut pos, None)?;
    Ok(StyleSheet { nodes })
}

/// Parse nodes until end of input, or — when `block_start` marks an
/// enclosing at-rule block — until its closing brace.
fn parse_nodes(
    input: &str,
    pos: &mut usize,
    block_start: Option<usize>,
) -> Result<Vec<CssNode>, CssError> {
    let bytes = input.as_bytes();
    let mut nodes = Vec::new();
    loop {
        while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos >= bytes.len() {
            return match block_start {
                Some(start) => Err(CssError::UnterminatedBlock(start)),
                None => Ok(nodes),
            };
        }
        if bytes[*pos] == b'}' {
            *pos += 1;
            if block_start.is_some() {
                return Ok(nodes);
            }
            // Stray closing brace at the top level: skip it.
            continue;
        }
        if input[*pos..].starts_with("/*") {
            let start = *pos + 2;
            let end = input[start..]
                .find("*/")
                .ok_or(CssError::UnterminatedComment(*pos))?
                + start;
            nodes.push(CssNode::Comment(input[start..end].to_string()));
            *pos = end + 2;
        } else if bytes[*pos] == b'@' {
            nodes.push(parse_at_rule(input, pos)?);
        } else {
            nodes.push(parse_rule(input, pos)?);
        }
    }
}

fn parse_at_rule(input: &str, pos: &mut usize) -> Result<CssNode, CssError> {
    let bytes = input.as_bytes();
    let start = *pos;
    *pos += 1;
    let name_start = *pos;
    while *pos < bytes.len() && (bytes[*pos].is_ascii_alphanumeric() || bytes[*pos] == b'-') {
        *pos += 1;
    }
    let name = input[name_start..*pos].to_string();

    let prelude_start = *pos;
    let mut depth = 0usize;
    loop {
        if *pos >= bytes.len() {
            return Err(CssError::UnterminatedAtRule(start));
        }
        match bytes[*pos] {
            b'"' | b'\'' => {
                skip_string(input, pos)?;
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => {
                let prelude = input[prelude_start..*pos].trim().to_string();
                *pos += 1;
                return Ok(CssNode::AtRule(AtRule {
                    name,
                    prelude,
                    body: AtRuleBody::None,
                }));
            }
            b'{' if depth == 0 => break,
            _ => {}
        }
        *pos += 1;
    }
    let prelude = input[prelude_start..*pos].trim().to_string();
    *pos += 1;

    let body = if NESTED_RULE_AT_RULES.contains(&name.to_ascii_lowercase().as_str()) {
        AtRuleBody::Rules(parse_nodes(input, pos, Some(start))?)
    } else {
        AtRuleBody::Raw(read_balanced_block(input, pos, start)?)
    };
    Ok(CssNode::AtRule(AtRule { name, prelude, body }))
}

fn parse_rule(input: &str, pos: &mut usize) -> Result<CssNode, CssError> {
    let bytes = input.as_bytes();
    let start = *pos;
    loop {
        if *pos >= bytes.len() {
            return Err(CssError::MissingDeclarationBlock(start));
        }
        match bytes[*pos] {
            b'"' | b'\'' => {
                skip_string(input, pos)?;
                continue;
            }
            b'{' => break,
            b'}' => return Err(CssError::MissingDeclarationBlock(start)),
            _ => {}
        }
        *pos += 1;
    }
    let selector_text = &input[start..*pos];
    *pos += 1;
    let declarations = read_balanced_block(input, pos, start)?;
    Ok(CssNode::Rule(Rule {
        selectors: parse_selector_list(selector_text),
        declarations,
    }))
}

/// Advance past a quoted string; `pos` is on the opening quote on entry and
/// one past the closing quote on success.
fn skip_string(input: &str, pos: &mut usize) -> Result<(), CssError> {
    let bytes = input.as_bytes();
    let quote = bytes[*pos];
    let start = *pos;
    *pos += 1;
    while *pos < bytes.len() {
        if bytes[*pos] == b'\\' {
            *pos += 2;
            continue;
        }
        if bytes[*pos] == quote {
            *pos += 1;
            return Ok(());
        }
        *pos += 1;
    }
    Err(CssError::UnterminatedString(start))
}

/// Read the remainder of a block opened before `pos`, consuming the closing
/// brace. Nested braces and quoted strings are respected.
fn read_balanced_block(input: &str, pos: &mut usize, start: usize) -> Result<String, CssError> {
    let bytes = input.as_bytes();
    let body_start = *pos;
    let mut depth = 1usize;
    while *pos < bytes.len() {
        match bytes[*pos] {
            b'"' | b'\'' => {
                skip_string(input, pos)?;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let body = input[body_start..*pos].trim().to_string();
                    *pos += 1;
                    return Ok(body);
                }
            }
            _ => {}
        }
        *pos += 1;
    }
    Err(CssError::UnterminatedBlock(start))
}

fn parse_selector_list(text: &str) -> Vec<Selector> {
    split_top_level(text, b',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Selector::parse)
        .collect()
}

impl Selector {
    fn parse(text: &str) -> Selector {
        match parse_components(text) {
            Some(components) if !components.is_empty() => Selector::Components(components),
            _ => Selector::Raw(collapse_ws(text)),
        }
    }
}

fn parse_components(text: &str) -> Option<Vec<SelectorComponent>> {
    let bytes = text.as_bytes();
    let mut comps: Vec<SelectorComponent> = Vec::new();
    let mut pending_ws = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            pending_ws = true;
            i += 1;
            continue;
        }
        if let Some(combinator) = match b {
            b'>' => Some(Combinator::Child),
            b'+' => Some(Combinator::NextSibling),
            b'~' => Some(Combinator::SubsequentSibling),
            _ => None,
        } {
            comps.push(SelectorComponent::Combinator(combinator));
            pending_ws = false;
            i += 1;
            continue;
        }
        // A simple component follows; whitespace before it was a
        // descendant combinator unless an explicit one intervened.
        if pending_ws
            && !comps.is_empty()
            && !matches!(comps.last(), Some(SelectorComponent::Combinator(_)))
        {
            comps.push(SelectorComponent::Combinator(Combinator::Descendant));
        }
        pending_ws = false;
        match b {
            b'*' => {
                comps.push(SelectorComponent::Universal);
                i += 1;
            }
            b'.' => {
                i += 1;
                let name = read_identifier(text, &mut i);
                if name.is_empty() {
                    return None;
                }
                comps.push(SelectorComponent::Class(name));
            }
            b'#' => {
                i += 1;
                let name = read_identifier(text, &mut i);
                if name.is_empty() {
                    return None;
                }
                comps.push(SelectorComponent::Id(name));
            }
            b'[' => {
                let end = find_matching(text, i, b'[', b']')?;
                comps.push(SelectorComponent::Attribute(
                    text[i + 1..end].trim().to_string(),
                ));
                i = end + 1;
            }
            b':' => {
                let start = i;
                i += 1;
                if i < bytes.len() && bytes[i] == b':' {
                    i += 1;
                }
                let name = read_identifier(text, &mut i);
                if name.is_empty() {
                    return None;
                }
                if i < bytes.len() && bytes[i] == b'(' {
                    let end = find_matching(text, i, b'(', b')')?;
                    i = end + 1;
                }
                comps.push(SelectorComponent::Pseudo(text[start..i].to_string()));
            }
            _ if is_ident_start(b) => {
                let name = read_identifier(text, &mut i);
                comps.push(SelectorComponent::Type(name));
            }
            _ => return None,
        }
    }
    Some(comps)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'\\' || b >= 0x80
}

/// Read an identifier starting at `*i`, dropping backslash escapes so that
/// `.a\.b` and `.a.b` compare the same way usage counting sees them.
fn read_identifier(text: &str, i: &mut usize) -> String {
    let bytes = text.as_bytes();
    let mut out = String::new();
    while *i < bytes.len() {
        let b = bytes[*i];
        if b == b'\\' {
            match text[*i + 1..].chars().next() {
                Some(ch) => {
                    out.push(ch);
                    *i += 1 + ch.len_utf8();
                }
                None => {
                    *i += 1;
                }
            }
            continue;
        }
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80 {
            match text[*i..].chars().next() {
                Some(ch) => {
                    out.push(ch);
                    *i += ch.len_utf8();
                }
                None => break,
            }
        } else {
            break;
        }
    }
    out
}

/// Index of the bracket matching the opener at `from`, skipping quoted
/// strings. `None` when unbalanced.
fn find_matching(text: &str, from: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            let quote = b;
            i += 1;
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Split on `delim` outside parens, brackets, and quoted strings.
fn split_top_level(text: &str, delim: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            let quote = b;
            i += 1;
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
        } else if b == b'(' || b == b'[' {
            depth += 1;
        } else if b == b')' || b == b']' {
            depth = depth.saturating_sub(1);
        } else if b == delim && depth == 0 {
            parts.push(&text[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

// ============================================================================
// Serialization
// ============================================================================

impl StyleSheet {
    /// Minified serialization: `a,.b{padding:4px}`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node);
        }
        out
    }
}

impl Selector {
    pub fn to_css(&self) -> String {
        match self {
            Selector::Raw(text) => text.clone(),
            Selector::Components(comps) => {
                let mut out = String::new();
                for comp in comps {
                    match comp {
                        SelectorComponent::Type(name) => out.push_str(name),
                        SelectorComponent::Class(name) => {
                            out.push('.');
                            out.push_str(name);
                        }
                        SelectorComponent::Id(name) => {
                            out.push('#');
                            out.push_str(name);
                        }
                        SelectorComponent::Attribute(raw) => {
                            out.push('[');
                            out.push_str(raw);
                            out.push(']');
                        }
                        SelectorComponent::Universal => out.push('*'),
                        SelectorComponent::Pseudo(raw) => out.push_str(raw),
                        SelectorComponent::Combinator(c) => out.push_str(match c {
                            Combinator::Descendant => " ",
                            Combinator::Child => ">",
                            Combinator::NextSibling => "+",
                            Combinator::SubsequentSibling => "~",
                        }),
                    }
                }
                out
            }
        }
    }
}

fn write_node(out: &mut String, node: &CssNode) {
    match node {
        CssNode::Comment(text) => {
            out.push_str("/*");
            out.push_str(text);
            out.push_str("*/");
        }
        CssNode::Rule(rule) => {
            let selectors: Vec<String> = rule.selectors.iter().map(Selector::to_css).collect();
            out.push_str(&selectors.join(","));
            out.push('{');
            out.push_str(&minify_declarations(&rule.declarations));
            out.push('}');
        }
        CssNode::AtRule(at) => {
            out.push('@');
            out.push_str(&at.name);
            let prelude = minify_prelude(&at.prelude);
            if !prelude.is_empty() {
                out.push(' ');
                out.push_str(&prelude);
            }
            match &at.body {
                AtRuleBody::None => out.push(';'),
                AtRuleBody::Raw(body) => {
                    out.push('{');
                    out.push_str(body);
                    out.push('}');
                }
                AtRuleBody::Rules(children) => {
                    out.push('{');
                    for child in children {
                        write_node(out, child);
                    }
                    out.push('}');
                }
            }
        }
    }
}

/// Re-emit an opaque declaration block with collapsed whitespace:
/// `padding: 4px; color : red ;` becomes `padding:4px;color:red`.
fn minify_declarations(declarations: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for piece in split_top_level(declarations, b';') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        match piece.split_once(':') {
            Some((prop, value)) => parts.push(format!("{}:{}", prop.trim(), collapse_ws(value))),
            None => parts.push(collapse_ws(piece)),
        }
    }
    parts.join(";")
}

fn minify_prelude(prelude: &str) -> String {
    collapse_ws(prelude).replace(": ", ":").replace(", ", ",")
}

/// Trim and collapse interior whitespace runs to single spaces.
fn collapse_ws(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_ws = false;
    for ch in text.trim().chars() {
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
