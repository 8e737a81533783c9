//! Component substitution.
//!
//! Each `components/<name>.html` fragment replaces every `<%name%>` marker
//! in every page, before any parsing happens. Markers with no matching
//! component are left in place, where they are easy to spot in the output.

use crate::types::SourceFile;

pub fn substitute(pages: &mut [SourceFile], components: &[SourceFile]) {
    for component in components {
        let Some(name) = component.path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let marker = format!("<%{name}%>");
        for page in pages.iter_mut() {
            if page.data.contains(&marker) {
                page.data = page.data.replace(&marker, &component.data);
            }
        }
    }
}
