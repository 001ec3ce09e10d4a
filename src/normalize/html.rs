use scraper::{ElementRef, Html, Selector};

use crate::normalize::text;

/// Extract a markdown-flavored text rendering from an HTML document.
///
/// The document title becomes a top-level heading, headings keep their
/// level, list items become `-` bullets, and paragraph-level elements are
/// emitted as blocks separated by blank lines. Pages with no recognizable
/// block structure fall back to the collapsed body text.
pub fn extract(raw: &str) -> String {
    let doc = Html::parse_document(raw);
    let mut blocks: Vec<String> = Vec::new();

    let title_selector = Selector::parse("title").unwrap();
    if let Some(title) = doc.select(&title_selector).next() {
        let title_text = text::collapse_ws(&element_text(&title));
        if !title_text.is_empty() {
            blocks.push(format!("# {}", title_text));
        }
    }

    let block_selector = Selector::parse("h1, h2, h3, h4, h5, h6, p, li, blockquote, pre").unwrap();
    let title_count = blocks.len();

    for element in doc.select(&block_selector) {
        // A paragraph nested in a list item already surfaces through the item
        if element.value().name() == "p" && has_list_ancestor(&element) {
            continue;
        }

        if let Some(block) = render_block(&element) {
            blocks.push(block);
        }
    }

    // No block structure found - fall back to whatever text the body carries
    if blocks.len() == title_count {
        let body_selector = Selector::parse("body").unwrap();
        let body_text = doc
            .select(&body_selector)
            .flat_map(|n| n.text())
            .collect::<Vec<_>>()
            .join(" ");
        let collapsed = text::collapse_ws(&body_text);
        if !collapsed.is_empty() {
            blocks.push(collapsed);
        }
    }

    ::log::debug!("HTML extraction produced {} blocks", blocks.len());

    blocks.join("\n\n")
}

/// Render one block-level element as markdown-flavored text, or None when
/// the element carries no visible text.
fn render_block(element: &ElementRef) -> Option<String> {
    let name = element.value().name();

    // Preformatted blocks keep their internal line structure
    if name == "pre" {
        let raw = element_text(element);
        let trimmed = raw.trim_matches('\n');
        if trimmed.trim().is_empty() {
            return None;
        }
        return Some(trimmed.to_string());
    }

    let content = text::collapse_ws(&element_text(element));
    if content.is_empty() {
        return None;
    }

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            Some(format!("{} {}", "#".repeat(level), content))
        }
        "li" => Some(format!("- {}", content)),
        _ => Some(content),
    }
}

/// Concatenated text of an element's descendant text nodes.
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join("")
}

/// Whether the element sits inside a list item.
fn has_list_ancestor(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "li")
}
