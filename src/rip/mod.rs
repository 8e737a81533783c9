//! The style-ripping engine.
//!
//! Cross-references each HTML page against the CSS sources, eliminates
//! rules whose selectors can never match, and renames surviving class/id
//! identifiers to the shortest possible strings, shortest-first by how much
//! of the output they account for.
//!
//! One unit — a page in inline mode, or the whole site in external mode —
//! flows through a fixed sequence of stages over in-memory trees:
//!
//! ```text
//! parse HTML ─→ collect usage ─→ prune CSS ─→ recount ─→ allocate names
//!                                                             │
//!          serialize ←─ inject styles ←─ rename both trees ←──┘
//! ```
//!
//! | Module | Role |
//! |--------|------|
//! | [`usage`] | Occurrence table; HTML-side collector, CSS-side recounter |
//! | [`eliminate`] | Dead rule and selector-component removal |
//! | [`names`] | Cost ranking and shortest-name allocation |
//! | [`rename`] | Applies the rename map to CSS and HTML trees |
//!
//! The two operating modes are separate pipelines because their data flow
//! genuinely differs. Inline mode recomputes usage, pruning, and names per
//! page against a clone of the parsed CSS, so pages are independent and run
//! in parallel, and each page's inlined `<style>` holds only rules it uses.
//! External mode observes every page before allocating once, producing a
//! single rename map and one shared `bundle.css` — anything less global
//! would corrupt pages sharing the bundle.
//!
//! The whole pass is pure: no filesystem, no retries (the transformation is
//! deterministic, so a retry would fail identically), and a failure in any
//! unit aborts that unit with no partial output.

pub mod eliminate;
pub mod names;
pub mod rename;
pub mod usage;

use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;

use crate::css::{self, StyleSheet};
use crate::html::{self, Document, Element, Node};
use crate::types::SourceFile;

/// Output path of the shared stylesheet in external mode, relative to the
/// output root.
pub const SHARED_BUNDLE_PATH: &str = "bundle.css";

/// How pages reference the shared stylesheet.
pub const SHARED_BUNDLE_HREF: &str = "/bundle.css";

/// Scope of one rename map: per page, or one map for the whole site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssMode {
    /// Per-page `<style>` blocks; usage and names recomputed per page.
    Inline,
    /// One shared `bundle.css` linked from every page; usage accumulated
    /// across all pages, names allocated once.
    External,
}

#[derive(Debug, Clone, Copy)]
pub struct RipOptions {
    pub rename_identifiers: bool,
    pub eliminate_dead_rules: bool,
    pub mode: CssMode,
}

#[derive(Debug)]
pub struct RipOutput {
    pub pages: Vec<SourceFile>,
    /// The shared stylesheet artifact; present only in external mode.
    pub shared_css: Option<SourceFile>,
}

#[derive(Error, Debug)]
pub enum RipError {
    #[error("{}: {source}", .path.display())]
    Html {
        path: PathBuf,
        #[source]
        source: html::HtmlError,
    },
    #[error("{}: {source}", .path.display())]
    Css {
        path: PathBuf,
        #[source]
        source: css::CssError,
    },
    /// A class/id selector survived elimination without a usage entry.
    /// Signals a bug in the elimination pass, never bad input.
    #[error("{kind} selector '{name}' survived elimination without a usage entry")]
    InternalConsistency { kind: &'static str, name: String },
    #[error("short-name space exhausted at rank {rank}")]
    AllocationExhausted { rank: usize },
}

/// Process every page against the style sources.
pub fn rip(
    pages: &[SourceFile],
    styles: &[SourceFile],
    options: &RipOptions,
) -> Result<RipOutput, RipError> {
    match options.mode {
        CssMode::Inline => rip_inline(pages, styles, options),
        CssMode::External => rip_external(pages, styles, options),
    }
}

fn rip_inline(
    pages: &[SourceFile],
    styles: &[SourceFile],
    options: &RipOptions,
) -> Result<RipOutput, RipError> {
    // Styles are parsed once; every page prunes its own clone.
    let parsed = parse_styles(styles)?;
    let pages = pages
        .par_iter()
        .map(|page| rip_page(page, &parsed, options))
        .collect::<Result<Vec<_>, RipError>>()?;
    Ok(RipOutput {
        pages,
        shared_css: None,
    })
}

fn rip_external(
    pages: &[SourceFile],
    styles: &[SourceFile],
    options: &RipOptions,
) -> Result<RipOutput, RipError> {
    // Every page must be observed before pruning or allocating anything.
    let mut table = usage::OccurrenceTable::default();
    let mut docs = Vec::with_capacity(pages.len());
    for page in pages {
        let doc = html::parse(&page.data).map_err(|source| RipError::Html {
            path: page.path.clone(),
            source,
        })?;
        usage::collect_document(&mut table, &doc);
        docs.push((page.path.clone(), doc));
    }

    let mut sheets = parse_styles(styles)?;
    for sheet in &mut sheets {
        if options.eliminate_dead_rules {
            eliminate::eliminate(sheet, &table);
        }
        usage::recount_stylesheet(&mut table, sheet, options.eliminate_dead_rules)?;
    }

    let map = if options.rename_identifiers {
        let map = names::allocate(&table)?;
        for sheet in &mut sheets {
            rename::rename_stylesheet(sheet, &map);
        }
        Some(map)
    } else {
        None
    };

    let bundle = concat_sheets(&sheets);
    let pages = docs
        .into_iter()
        .map(|(path, mut doc)| {
            if let Some(map) = &map {
                rename::rename_document(&mut doc, map);
            }
            inject_link(&mut doc);
            SourceFile {
                path,
                data: doc.to_html(),
            }
        })
        .collect();

    Ok(RipOutput {
        pages,
        shared_css: Some(SourceFile::new(SHARED_BUNDLE_PATH, bundle)),
    })
}

/// One page's unit in inline mode: collect, prune, recount, allocate,
/// rename, inject, serialize.
fn rip_page(
    page: &SourceFile,
    styles: &[StyleSheet],
    options: &RipOptions,
) -> Result<SourceFile, RipError> {
    let mut doc = html::parse(&page.data).map_err(|source| RipError::Html {
        path: page.path.clone(),
        source,
    })?;
    let mut table = usage::OccurrenceTable::default();
    usage::collect_document(&mut table, &doc);

    let mut sheets: Vec<StyleSheet> = styles.to_vec();
    for sheet in &mut sheets {
        if options.eliminate_dead_rules {
            eliminate::eliminate(sheet, &table);
        }
        usage::recount_stylesheet(&mut table, sheet, options.eliminate_dead_rules)?;
    }

    if options.rename_identifiers {
        let map = names::allocate(&table)?;
        for sheet in &mut sheets {
            rename::rename_stylesheet(sheet, &map);
        }
        rename::rename_document(&mut doc, &map);
    }

    inject_style(&mut doc, concat_sheets(&sheets));
    Ok(SourceFile {
        path: page.path.clone(),
        data: doc.to_html(),
    })
}

fn parse_styles(styles: &[SourceFile]) -> Result<Vec<StyleSheet>, RipError> {
    styles
        .iter()
        .map(|style| {
            css::parse(&style.data).map_err(|source| RipError::Css {
                path: style.path.clone(),
                source,
            })
        })
        .collect()
}

/// Concatenate serialized sheets, later sources first — the fold order the
/// build tool has always used.
fn concat_sheets(sheets: &[StyleSheet]) -> String {
    sheets.iter().rev().map(StyleSheet::to_css).collect()
}

/// Wrap the unit's CSS in one `<style>` block immediately inside the
/// opening `<body>` tag. A page without a `body` gets the block prepended
/// to the document instead.
fn inject_style(doc: &mut Document, css_text: String) {
    let mut style = Element::new("style");
    if !css_text.is_empty() {
        style.children.push(Node::Text(css_text));
    }
    let style = Node::Element(style);
    if let Some(body) = find_element_mut(&mut doc.nodes, "body") {
        body.children.insert(0, style);
        return;
    }
    doc.nodes.insert(0, style);
}

/// Reference the shared bundle from the page, preferring the end of
/// `<head>`.
fn inject_link(doc: &mut Document) {
    let mut link = Element::new("link");
    link.attrs.push(("rel".to_string(), "stylesheet".to_string()));
    link.attrs.push(("href".to_string(), SHARED_BUNDLE_HREF.to_string()));
    let link = Node::Element(link);
    if let Some(head) = find_element_mut(&mut doc.nodes, "head") {
        head.children.push(link);
        return;
    }
    if let Some(body) = find_element_mut(&mut doc.nodes, "body") {
        body.children.insert(0, link);
        return;
    }
    doc.nodes.insert(0, link);
}

fn find_element_mut<'a>(nodes: &'a mut [Node], tag: &str) -> Option<&'a mut Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.tag.eq_ignore_ascii_case(tag) {
                return Some(el);
            }
            if let Some(found) = find_element_mut(&mut el.children, tag) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELIMINATE_ONLY: RipOptions = RipOptions {
        rename_identifiers: false,
        eliminate_dead_rules: true,
        mode: CssMode::Inline,
    };

    const FULL: RipOptions = RipOptions {
        rename_identifiers: true,
        eliminate_dead_rules: true,
        mode: CssMode::Inline,
    };

    const PASSTHROUGH: RipOptions = RipOptions {
        rename_identifiers: false,
        eliminate_dead_rules: false,
        mode: CssMode::Inline,
    };

    /// Wrap bare markup in a body, rip it against one stylesheet, and
    /// return the final page text.
    fn rip_one(html_text: &str, css_text: &str, options: RipOptions) -> String {
        let pages = [SourceFile::new(
            "pages/index.html",
            format!("<body>{html_text}</body>"),
        )];
        let styles = [SourceFile::new("styles/main.css", css_text)];
        let mut out = rip(&pages, &styles, &options).unwrap();
        out.pages.remove(0).data
    }

    #[test]
    fn retains_rule_with_used_type_selector() {
        assert_eq!(
            rip_one("<a> hi </a>", "a { padding: 4px; }", ELIMINATE_ONLY),
            "<body><style>a{padding:4px}</style><a> hi </a></body>"
        );
    }

    #[test]
    fn drops_rule_with_unused_class_selector() {
        assert_eq!(
            rip_one("<a> hi </a>", ".unused { padding: 4px; }", ELIMINATE_ONLY),
            "<body><style></style><a> hi </a></body>"
        );
    }

    #[test]
    fn elimination_can_be_disabled() {
        assert_eq!(
            rip_one(
                "<a> hi </a>",
                "h1 { padding: 4px; } .unused { padding: 4px; }",
                PASSTHROUGH
            ),
            "<body><style>h1{padding:4px}.unused{padding:4px}</style><a> hi </a></body>"
        );
    }

    #[test]
    fn used_rule_survives_inside_media_block() {
        assert_eq!(
            rip_one(
                "<a class=\"used\"></a>",
                "@media (min-width: 640px) { .used{} }",
                ELIMINATE_ONLY
            ),
            "<body><style>@media (min-width:640px){.used{}}</style><a class=\"used\"></a></body>"
        );
    }

    #[test]
    fn emptied_media_wrapper_stays_in_output() {
        assert_eq!(
            rip_one(
                "<a class=\"used\"></a>",
                "@media (min-width: 640px) { .unused{} }",
                ELIMINATE_ONLY
            ),
            "<body><style>@media (min-width:640px){}</style><a class=\"used\"></a></body>"
        );
    }

    #[test]
    fn dominant_identifier_gets_shorter_name() {
        let many = "<i class=\"col-lg-6\"></i>".repeat(50);
        let few = "<i class=\"btn\"></i>".repeat(2);
        let out = rip_one(
            &format!("{many}{few}"),
            ".col-lg-6 { width: 50%; } .btn { color: red; }",
            FULL,
        );
        assert!(out.contains(".a{width:50%}"), "col-lg-6 should become .a: {out}");
        assert!(out.contains(".b{color:red}"), "btn should become .b: {out}");
        assert!(out.contains("<i class=\"a\">"));
        assert!(out.contains("<i class=\"b\">"));
        assert!(!out.contains("col-lg-6"));
    }

    #[test]
    fn renaming_is_consistent_across_html_and_css() {
        let out = rip_one(
            "<div class=\"menu\" id=\"top\"><a class=\"menu\"></a></div>",
            ".menu { color: red; } #top { margin: 0; }",
            FULL,
        );
        assert!(out.contains("<style>.a{color:red}#a{margin:0}</style>"), "{out}");
        assert!(out.contains("<div class=\"a\" id=\"a\">"), "{out}");
        assert!(out.contains("<a class=\"a\">"), "{out}");
    }

    #[test]
    fn class_and_id_namespaces_are_disjoint() {
        let out = rip_one(
            "<div class=\"menu\" id=\"menu\"></div>",
            ".menu { color: red; } #menu { margin: 0; }",
            FULL,
        );
        // Both kinds rank first in their own namespace and share the
        // literal name without colliding.
        assert!(out.contains(".a{color:red}#a{margin:0}"), "{out}");
        assert!(out.contains("<div class=\"a\" id=\"a\">"), "{out}");
    }

    #[test]
    fn renaming_disabled_keeps_identifiers() {
        let out = rip_one(
            "<a class=\"keep-me\"></a>",
            ".keep-me { color: red; }",
            ELIMINATE_ONLY,
        );
        assert!(out.contains(".keep-me{color:red}"));
        assert!(out.contains("class=\"keep-me\""));
    }

    #[test]
    fn malformed_selector_passes_through_unpruned_and_unrenamed() {
        let out = rip_one("<a class=\"menu\"></a>", "..menu { color: red; }", FULL);
        assert!(out.contains("..menu{color:red}"), "{out}");
    }

    #[test]
    fn page_without_body_still_gets_styles() {
        let pages = [SourceFile::new("pages/raw.html", "<p>bare</p>")];
        let styles = [SourceFile::new("styles/main.css", "p { margin: 0; }")];
        let out = rip(&pages, &styles, &ELIMINATE_ONLY).unwrap();
        assert_eq!(out.pages[0].data, "<style>p{margin:0}</style><p>bare</p>");
    }

    #[test]
    fn later_style_sources_come_first_in_the_blob() {
        let pages = [SourceFile::new("pages/index.html", "<body><a></a></body>")];
        let styles = [
            SourceFile::new("styles/one.css", "a { color: red; }"),
            SourceFile::new("styles/two.css", "a { color: blue; }"),
        ];
        let out = rip(&pages, &styles, &ELIMINATE_ONLY).unwrap();
        assert!(out.pages[0]
            .data
            .contains("<style>a{color:blue}a{color:red}</style>"));
    }

    #[test]
    fn each_page_prunes_against_its_own_usage() {
        let pages = [
            SourceFile::new("pages/one.html", "<body><i class=\"alpha\"></i></body>"),
            SourceFile::new("pages/two.html", "<body><i class=\"beta\"></i></body>"),
        ];
        let styles = [SourceFile::new(
            "styles/main.css",
            ".alpha { color: red; } .beta { color: blue; }",
        )];
        let out = rip(&pages, &styles, &ELIMINATE_ONLY).unwrap();
        assert!(out.pages[0].data.contains(".alpha{color:red}"));
        assert!(!out.pages[0].data.contains("beta"));
        assert!(out.pages[1].data.contains(".beta{color:blue}"));
        assert!(!out.pages[1].data.contains("alpha"));
    }

    #[test]
    fn shared_mode_keeps_rules_used_by_any_page() {
        let pages = [
            SourceFile::new("pages/one.html", "<body><i class=\"alpha\"></i></body>"),
            SourceFile::new("pages/two.html", "<body><i class=\"beta\"></i></body>"),
        ];
        let styles = [SourceFile::new(
            "styles/main.css",
            ".alpha { color: red; } .beta { color: blue; } .dead { color: green; }",
        )];
        let options = RipOptions {
            mode: CssMode::External,
            ..FULL
        };
        let out = rip(&pages, &styles, &options).unwrap();
        let bundle = out.shared_css.as_ref().unwrap();
        assert_eq!(bundle.path.to_str(), Some("bundle.css"));
        // Ranking is global across both pages; the dead rule is gone.
        assert_eq!(bundle.data, ".a{color:red}.b{color:blue}");
        assert!(out.pages[0].data.contains("<i class=\"a\">"));
        assert!(out.pages[1].data.contains("<i class=\"b\">"));
    }

    #[test]
    fn shared_mode_links_the_bundle_from_every_page() {
        let pages = [
            SourceFile::new(
                "pages/one.html",
                "<html><head><title>x</title></head><body></body></html>",
            ),
            SourceFile::new("pages/two.html", "<body></body>"),
        ];
        let styles = [SourceFile::new("styles/main.css", "body { margin: 0; }")];
        let options = RipOptions {
            mode: CssMode::External,
            ..FULL
        };
        let out = rip(&pages, &styles, &options).unwrap();
        assert!(out.pages[0].data.contains(
            "<title>x</title><link rel=\"stylesheet\" href=\"/bundle.css\"></head>"
        ));
        assert!(out.pages[1]
            .data
            .starts_with("<body><link rel=\"stylesheet\" href=\"/bundle.css\">"));
    }

    #[test]
    fn inline_mode_emits_no_shared_artifact() {
        let pages = [SourceFile::new("pages/index.html", "<body></body>")];
        let styles = [SourceFile::new("styles/main.css", "body { margin: 0; }")];
        let out = rip(&pages, &styles, &FULL).unwrap();
        assert!(out.shared_css.is_none());
    }

    #[test]
    fn css_parse_errors_carry_the_source_path() {
        let pages = [SourceFile::new("pages/index.html", "<body></body>")];
        let styles = [SourceFile::new("styles/broken.css", "a { color: red;")];
        let err = rip(&pages, &styles, &FULL).unwrap_err();
        assert!(err.to_string().contains("broken.css"), "{err}");
    }

    #[test]
    fn html_parse_errors_carry_the_source_path() {
        let pages = [SourceFile::new("pages/bad.html", "<body><!-- oops</body>")];
        let styles: [SourceFile; 0] = [];
        let err = rip(&pages, &styles, &FULL).unwrap_err();
        assert!(err.to_string().contains("bad.html"), "{err}");
    }
}
