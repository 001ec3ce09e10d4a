use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{00a0}]+").unwrap());

/// Configuration options for text cleanup
#[derive(Debug, Clone, Copy)]
pub struct CleanupOptions {
    /// Whether to collapse runs of horizontal whitespace within each line
    pub normalize_whitespace: bool,
    /// Whether to join the lines of a paragraph into a single line
    pub join_lines: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            normalize_whitespace: true,
            join_lines: false,
        }
    }
}

/// Clean up extracted text into its final readable form.
///
/// Paragraphs are delimited by blank lines; each paragraph's lines are
/// trimmed, optionally whitespace-normalized, and paragraphs are re-joined
/// with exactly one blank line between them.
pub fn clean(text: &str, options: &CleanupOptions) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    split_paragraphs(text)
        .iter()
        .map(|paragraph| render_paragraph(paragraph, options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split text into paragraphs on blank lines, dropping empty lines and
/// trimming the rest.
pub fn split_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current);
                current = Vec::new();
            }
        } else {
            current.push(trimmed);
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

/// Render one paragraph's lines according to the cleanup options.
pub fn render_paragraph(lines: &[&str], options: &CleanupOptions) -> String {
    let cleaned: Vec<String> = lines
        .iter()
        .map(|line| {
            if options.normalize_whitespace {
                collapse_ws(line)
            } else {
                line.to_string()
            }
        })
        .collect();

    if options.join_lines {
        cleaned.join(" ")
    } else {
        cleaned.join("\n")
    }
}

/// Collapse runs of horizontal whitespace into single spaces and trim.
pub fn collapse_ws(line: &str) -> String {
    HORIZONTAL_WS.replace_all(line, " ").trim().to_string()
}
