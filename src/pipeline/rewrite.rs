//! Link rewriting: point Markdown image references at local files.
//!
//! The service embeds images as `![alt](http://host/api/images/fig1.png)`.
//! Once the images are saved next to the Markdown file those links must read
//! `![alt](fig1.png)`. Anything that does not go through the image endpoint
//! is left exactly as written, so the rewrite is idempotent.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Path segment under which the service serves extracted images.
pub const IMAGE_PATH_MARKER: &str = "/api/images/";

static RE_IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid image-reference regex"));

/// Rewrite every service image link in `markdown` to its bare filename.
pub fn rewrite(markdown: &str) -> String {
    RE_IMAGE_REF
        .replace_all(markdown, |caps: &Captures<'_>| {
            let alt = &caps[1];
            let target = &caps[2];
            if target.contains(IMAGE_PATH_MARKER) {
                let filename = target.rsplit('/').next().unwrap_or(target);
                format!("![{}]({})", alt, filename)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Count the image references in `markdown`, rewritten or not.
pub fn count_image_refs(markdown: &str) -> usize {
    RE_IMAGE_REF.find_iter(markdown).count()
}
