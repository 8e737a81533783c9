//! # til
//!
//! A tiny static site builder. Pages, components, and styles go in;
//! minified HTML with exactly the CSS each page needs comes out.
//!
//! # Architecture: One Pass, Pure Stages
//!
//! A build collects every source file into memory once, then runs a chain
//! of pure transformations before anything touches the output directory:
//!
//! ```text
//! pages/ components/ styles/          (collect)
//!   → component substitution          (<%name%> markers)
//!   → style ripping                   (prune + mangle CSS per page)
//!   → HTML minification               (prod only)
//!   → navigation scaffolding          (routes.json + client script)
//!   → compressed writes               (dist/, optionally .gz/.br)
//! ```
//!
//! The interesting part is the style ripper: it cross-references each
//! page's parsed HTML against the parsed CSS, drops rules whose selectors
//! can never match, and renames the surviving class/id identifiers to the
//! shortest possible strings — identifiers that account for the most
//! output bytes get the shortest names. Inline mode redoes this per page,
//! so every page carries a private `<style>` block with only the rules it
//! uses; external mode computes one global rename map and one shared
//! `bundle.css` for sites that prefer a cacheable stylesheet.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collect`] | Reads source files into memory, sorted, by extension |
//! | [`components`] | `<%name%>` fragment substitution |
//! | [`html`] | HTML document model, permissive parser, serializer |
//! | [`css`] | CSS model with tagged selector components, parser, serializer |
//! | [`rip`] | The style-ripping engine: usage, elimination, naming, renaming |
//! | [`minify`] | Whitespace/comment minification over parsed HTML |
//! | [`navigation`] | Per-page route payloads + embedded client navigation |
//! | [`config`] | `til.toml` with prod/dev-dependent defaults |
//! | [`site`] | Build orchestration and the build summary |
//! | [`write`] | Output writes with `none`/`gzip`/`brotli` compression |
//! | [`types`] | The `SourceFile` record the stages pass around |
//!
//! # Design Decisions
//!
//! ## Conservative by Construction
//!
//! The ripper only ever acts on signals it can trust. Attribute selectors
//! (`[type="radio"]`) have no usage signal in markup and are never pruned;
//! `*`, `html`, and `body` survive unconditionally; selectors the parser
//! cannot classify pass through verbatim. Declarations are opaque text —
//! the engine prunes and renames selectors, it does not validate CSS.
//!
//! ## Per-Page Cost Ranking
//!
//! Rename priority is `occurrences × length`, the estimated byte share of
//! each identifier in the final output. Ranking is recomputed per renaming
//! unit, so `a` always goes to whatever dominates *that* unit.
//!
//! ## Parallel Pages, Cloned Styles
//!
//! In inline mode pages are independent units: each prunes a clone of the
//! parsed stylesheets against its own usage, so units run in parallel with
//! no shared mutable state. External mode is inherently a single global
//! pass — every page must be observed before names are allocated once.

pub mod collect;
pub mod components;
pub mod config;
pub mod css;
pub mod html;
pub mod minify;
pub mod navigation;
pub mod rip;
pub mod site;
pub mod types;
pub mod write;
