//! core::naming
//!
//! Path and file-name rules for pages and assets.
//!
//! # Features
//!
//! - Slugify upload file names into filesystem-safe asset names
//! - Normalize operator-entered page names into repository paths

/// Extension every page document carries.
pub const PAGE_EXT: &str = ".html";

/// The root page, always listed first in the manifest.
pub const INDEX_PAGE: &str = "index.html";

/// Slugify a suggested asset name.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9.-]`
/// into a single hyphen, and trims leading/trailing hyphens. An input
/// with nothing usable left becomes `"asset"`.
///
/// # Example
///
/// ```
/// use pagewright::core::naming::slugify_asset;
///
/// assert_eq!(slugify_asset("Photo!!.PNG"), "photo-.png");
/// assert_eq!(slugify_asset("Hero Shot (final).webp"), "hero-shot-final-.webp");
/// assert_eq!(slugify_asset("???"), "asset");
/// ```
pub fn slugify_asset(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "asset".to_string()
    } else {
        slug
    }
}

/// Normalize an operator-entered page name into a repository path.
///
/// `index.html` and anything already containing a `/` pass through.
/// A bare name is slugged, given the page extension if missing, and
/// placed under `pages_dir`.
///
/// # Example
///
/// ```
/// use pagewright::core::naming::normalize_page_path;
///
/// assert_eq!(normalize_page_path("index.html", "pages"), "index.html");
/// assert_eq!(normalize_page_path("about", "pages"), "pages/about.html");
/// assert_eq!(normalize_page_path("About Me", "pages"), "pages/about-me.html");
/// assert_eq!(
///     normalize_page_path("pages/contact.html", "pages"),
///     "pages/contact.html"
/// );
/// ```
pub fn normalize_page_path(input: &str, pages_dir: &str) -> String {
    if input == INDEX_PAGE || input.contains('/') {
        return input.to_string();
    }

    let stem = input.strip_suffix(PAGE_EXT).unwrap_or(input);
    let slug = slugify_page_stem(stem);
    format!("{}/{}{}", pages_dir, slug, PAGE_EXT)
}

/// Slug for a page file stem: like assets but without dots.
fn slugify_page_stem(stem: &str) -> String {
    let slug: String = slugify_asset(stem)
        .chars()
        .map(|c| if c == '.' { '-' } else { c })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases() {
        assert_eq!(slugify_asset("Hero.PNG"), "hero.png");
    }

    #[test]
    fn slugify_collapses_runs_to_one_hyphen() {
        assert_eq!(slugify_asset("a  b!!c.png"), "a-b-c.png");
    }

    #[test]
    fn slugify_trims_hyphens() {
        assert_eq!(slugify_asset("!!photo.png!!"), "photo.png");
        assert_eq!(slugify_asset("--x--"), "x");
    }

    #[test]
    fn slugify_keeps_dots_and_dashes() {
        assert_eq!(slugify_asset("model-v2.final.glb"), "model-v2.final.glb");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify_asset(""), "asset");
        assert_eq!(slugify_asset("!!!"), "asset");
    }

    #[test]
    fn normalize_index_passes_through() {
        assert_eq!(normalize_page_path("index.html", "pages"), "index.html");
    }

    #[test]
    fn normalize_explicit_path_passes_through() {
        assert_eq!(
            normalize_page_path("pages/team.html", "pages"),
            "pages/team.html"
        );
    }

    #[test]
    fn normalize_bare_name_gets_dir_and_ext() {
        assert_eq!(normalize_page_path("about", "pages"), "pages/about.html");
        assert_eq!(
            normalize_page_path("about.html", "pages"),
            "pages/about.html"
        );
    }

    #[test]
    fn normalize_slugs_spaces_and_case() {
        assert_eq!(
            normalize_page_path("My Projects", "pages"),
            "pages/my-projects.html"
        );
    }
}
