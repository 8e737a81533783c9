//! Build orchestration.
//!
//! Glues the pipeline stages together for one build:
//!
//! ```text
//! collect sources → substitute components → rip styles → minify HTML
//!        → navigation scaffolding → write pages + artifacts
//! ```
//!
//! Everything between collection and the final writes operates on
//! in-memory files; a failure anywhere aborts the build with no partial
//! output directory shuffling beyond the initial reset.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::SiteConfig;
use crate::html::HtmlError;
use crate::rip::{self, RipError};
use crate::{collect, components, minify, navigation, write};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rip(#[from] RipError),
    #[error("{}: {source}", .path.display())]
    Minify {
        path: PathBuf,
        #[source]
        source: HtmlError,
    },
    #[error("routes serialization error: {0}")]
    Routes(#[from] serde_json::Error),
}

/// Counters for the build report.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub pages: usize,
    pub styles: usize,
    pub components: usize,
    pub scripts: usize,
    pub shared_css: bool,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages, {} style sources, {} components, {} scripts",
            self.pages, self.styles, self.components, self.scripts
        )?;
        if self.shared_css {
            write!(f, ", shared bundle.css")?;
        }
        Ok(())
    }
}

/// Run a full build of the project at `root` into `output`.
pub fn build(root: &Path, output: &Path, config: &SiteConfig) -> Result<BuildSummary, BuildError> {
    if config.verbose {
        println!("config: {config:?}");
    }

    write::reset_dir(output)?;

    let mut pages = collect::collect_files(root, &["pages"], &["html"])?;
    let styles = collect::collect_files(root, &["pages", "styles"], &["css"])?;
    let scripts = collect::collect_files(root, &["pages"], &["js"])?;
    let fragments = collect::collect_files(root, &["components"], &["html"])?;

    components::substitute(&mut pages, &fragments);

    let ripped = rip::rip(&pages, &styles, &config.rip_options())?;
    let mut pages = ripped.pages;

    if config.minify {
        for page in &mut pages {
            page.data = minify::minify_html(&page.data).map_err(|source| BuildError::Minify {
                path: page.path.clone(),
                source,
            })?;
        }
    }

    let nav_artifacts = navigation::prepare(&mut pages)?;

    for page in &pages {
        let out_path = output.join(strip_source_dir(&page.path));
        write::write_file(&out_path, page.data.as_bytes(), config.compress)?;
    }
    for artifact in &nav_artifacts {
        write::write_file(&output.join(&artifact.path), artifact.data.as_bytes(), config.compress)?;
    }
    if let Some(bundle) = &ripped.shared_css {
        write::write_file(&output.join(&bundle.path), bundle.data.as_bytes(), config.compress)?;
    }

    // Scripts concatenate into one bundle, later sources first, no
    // rewriting. Nothing is emitted when the project has no scripts.
    let js_bundle: String = scripts.iter().rev().map(|s| s.data.as_str()).collect();
    if !js_bundle.is_empty() {
        write::write_file(&output.join("bundle.js"), js_bundle.as_bytes(), config.compress)?;
    }

    Ok(BuildSummary {
        pages: pages.len(),
        styles: styles.len(),
        components: fragments.len(),
        scripts: scripts.len(),
        shared_css: ripped.shared_css.is_some(),
    })
}

/// `pages/notes/index.html` → `notes/index.html`: output mirrors the tree
/// under the source directory.
fn strip_source_dir(path: &Path) -> PathBuf {
    let mut components = path.components();
    components.next();
    let rest = components.as_path();
    if rest.components().next().is_none() {
        // A path with a single component has nothing to strip.
        return path.to_path_buf();
    }
    rest.to_path_buf()
}
