//! surface
//!
//! The seam to the visual composition surface.
//!
//! # Design
//!
//! The editor that produces markup and styles is an external collaborator;
//! this crate only needs three things from it: the current serialized
//! document body on demand, acceptance of a replacement body when a page
//! is opened, and edit-occurred notifications (which the application
//! routes to the dirty tracker). The [`CompositionSurface`] trait captures
//! the first two; notifications arrive by the embedding application
//! calling [`crate::workspace::Workspace::note_edit`].
//!
//! [`BufferSurface`] is the in-memory implementation used by the CLI and
//! by tests.

use crate::core::naming::PAGE_EXT;

/// URL of the module script rendered into every saved page so
/// `<model-viewer>` elements work on the published site.
const MODEL_VIEWER_SRC: &str =
    "https://unpkg.com/@google/model-viewer/dist/model-viewer.min.js";

/// A serialized document body: markup plus its style sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentBody {
    /// Body markup (no enclosing html/head/body shell).
    pub markup: String,
    /// Style sheet, inlined into the rendered page head.
    pub styles: String,
}

impl DocumentBody {
    /// Create a body from markup and styles.
    pub fn new(markup: impl Into<String>, styles: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            styles: styles.into(),
        }
    }

    /// Render the body into a full standalone page document, the shape
    /// the published site serves.
    pub fn render(&self, title: &str) -> String {
        format!(
            "<!doctype html>\n<html><head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n<title>{}</title>\n<script type=\"module\" src=\"{}\"></script>\n<style>{}</style>\n</head><body>\n{}\n</body></html>",
            title, MODEL_VIEWER_SRC, self.styles, self.markup
        )
    }
}

/// The composition surface seam.
pub trait CompositionSurface: Send {
    /// The current serialized document body.
    fn document(&self) -> DocumentBody;

    /// Replace the current editing state with `body` (page load).
    fn load_document(&mut self, body: DocumentBody);
}

/// In-memory composition surface for the CLI and tests.
#[derive(Debug, Default)]
pub struct BufferSurface {
    body: DocumentBody,
}

impl BufferSurface {
    /// Create a surface holding `body`.
    pub fn new(body: DocumentBody) -> Self {
        Self { body }
    }
}

impl CompositionSurface for BufferSurface {
    fn document(&self) -> DocumentBody {
        self.body.clone()
    }

    fn load_document(&mut self, body: DocumentBody) {
        self.body = body;
    }
}

/// Check whether a path names a page document.
pub fn is_page_path(path: &str) -> bool {
    path.ends_with(PAGE_EXT)
}

/// Split a stored page document back into a body for the surface.
///
/// Recovers what [`DocumentBody::render`] produced: the first `<style>`
/// block and the `<body>` inner markup. A document without that shape
/// loads whole as markup with empty styles.
pub fn parse_page(document: &str) -> DocumentBody {
    let styles = slice_between(document, "<style>", "</style>")
        .unwrap_or("")
        .to_string();
    let markup = slice_between(document, "<body>", "</body>")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| document.to_string());
    DocumentBody { markup, styles }
}

/// The slice strictly between the first `open` and the next `close`.
fn slice_between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let end = haystack[start..].find(close)? + start;
    Some(&haystack[start..end])
}
