//! Client-side navigation scaffolding.
//!
//! Every built page gets a small embedded script that fetches the other
//! pages' final HTML and swaps `document.documentElement` on link clicks,
//! so navigation after the first load needs no full page fetch.
//!
//! The data side is one `routes.json` per page under
//! `_til/nav/<route>/routes.json`, mapping route paths to final page HTML.
//! Each page's file excludes its own route — the script seeds that entry
//! from the live document after load.
//!
//! Runs after minification so the routes carry exactly the bytes a full
//! page load would produce; the script itself is injected afterwards and
//! is therefore not part of any route payload.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::SourceFile;

/// Embedded client script, appended to every page just before `</body>`.
pub const NAV_JS: &str = include_str!("../static/nav.js");

/// Derive a page's route from its source path: the leading source
/// directory goes, a trailing `index.html` collapses to the directory.
///
/// `pages/index.html` → `/`, `pages/notes/index.html` → `/notes/`,
/// `pages/about.html` → `/about.html`.
pub fn route_for(path: &Path) -> String {
    let mut components = path.components();
    components.next();
    let rest = components.as_path().to_string_lossy().replace('\\', "/");
    let rest = rest.strip_suffix("index.html").unwrap_or(&rest);
    format!("/{rest}")
}

/// Build per-page `routes.json` artifacts and inject the navigation script
/// into every page. Returns the artifacts with output-relative paths.
pub fn prepare(pages: &mut [SourceFile]) -> Result<Vec<SourceFile>, serde_json::Error> {
    let routes: BTreeMap<String, &str> = pages
        .iter()
        .map(|page| (route_for(&page.path), page.data.as_str()))
        .collect();

    let mut artifacts = Vec::with_capacity(pages.len());
    for page in pages.iter() {
        let own_route = route_for(&page.path);
        let page_routes: BTreeMap<&str, &str> = routes
            .iter()
            .filter(|(route, _)| **route != own_route)
            .map(|(route, data)| (route.as_str(), *data))
            .collect();
        artifacts.push(SourceFile {
            path: artifact_path(&own_route),
            data: serde_json::to_string(&page_routes)?,
        });
    }

    let script = format!("<script>{NAV_JS}</script></body>");
    for page in pages.iter_mut() {
        page.data = page.data.replacen("</body>", &script, 1);
    }
    Ok(artifacts)
}

fn artifact_path(route: &str) -> PathBuf {
    Path::new("_til/nav")
        .join(route.trim_start_matches('/'))
        .join("routes.json")
}
