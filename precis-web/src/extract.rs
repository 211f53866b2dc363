//! Turn raw HTML into a [`PageContent`].
//!
//! Parsing goes through html5ever (via `scraper`), which never rejects
//! input: malformed markup produces a best-effort tree instead of an error.
//! Scripting is off while parsing, so `<noscript>` children are real
//! elements and get stripped like any other.

use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use precis_common::PageContent;
use scraper::{ElementRef, Html, HtmlTreeSink, Node};

/// Elements that carry no readable text and are dropped before extraction.
/// html5ever already rewrites `<image>` to `img`.
pub const STRIPPED_ELEMENTS: [&str; 4] = ["script", "style", "img", "input"];

/// Extract the title and readable body text from `raw_html`.
///
/// ```
/// use precis_web::extract::extract;
///
/// let page = extract(
///     "<html><title>Test</title><body><p>Hello</p><script>evil()</script></body></html>",
///     "https://example.com",
/// );
/// assert_eq!(page.title(), "Test");
/// assert_eq!(page.body(), "Hello");
/// ```
pub fn extract(raw_html: &str, source_url: &str) -> PageContent {
    let mut document = parse_without_scripting(raw_html);
    let title = extract_title(&document);
    strip_elements(&mut document, &STRIPPED_ELEMENTS);
    let body = body_text(&document);

    tracing::debug!(
        target: "extract",
        source_url,
        html_len = raw_html.len(),
        body_len = body.len(),
        has_title = title.is_some(),
        "page extracted"
    );

    PageContent::new(source_url, title, body)
}

fn parse_without_scripting(raw_html: &str) -> Html {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    driver::parse_document(HtmlTreeSink::new(Html::new_document()), opts).one(raw_html)
}

/// Text of the first `<title>` element, if any.
fn extract_title(document: &Html) -> Option<String> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "title")
        .map(|el| el.text().collect::<String>())
}

/// Detach every element named in `tags` (and its subtree) from the document.
fn strip_elements(document: &mut Html, tags: &[&str]) {
    let doomed: Vec<_> = document
        .tree
        .root()
        .descendants()
        .filter(|node| match node.value() {
            Node::Element(el) => tags.contains(&el.name()),
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Remaining text under `<body>` (or the whole document when there is no
/// body), one trimmed fragment per line, blanks dropped.
fn body_text(document: &Html) -> String {
    let root = document.root_element();
    let scope = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or(root);

    scope
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
