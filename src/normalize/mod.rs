pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

pub use text::CleanupOptions;

/// Convert raw fetched page markup into a clean, readable text rendering.
///
/// This is a deterministic, pure transformation: well-formed markup yields a
/// markdown-flavored document (title heading, paragraphs, list items), and
/// unparseable input degrades to near-empty text rather than an error.
pub fn normalize(raw: &str) -> String {
    let extracted = html::extract(raw);
    text::clean(&extracted, &CleanupOptions::default())
}
