use crate::normalize::{self, html};

#[test]
fn test_extract_title_and_paragraphs() {
    let raw = r#"<html>
        <head><title>Widget   Listing</title></head>
        <body>
            <h2>Featured</h2>
            <p>First   paragraph.</p>
            <p>Second paragraph.</p>
        </body>
    </html>"#;

    let text = html::extract(raw);
    assert_eq!(
        text,
        "# Widget Listing\n\n## Featured\n\nFirst paragraph.\n\nSecond paragraph."
    );
}

#[test]
fn test_extract_list_items_as_bullets() {
    let raw = "<html><body><ul><li>Alpha</li><li>Beta</li></ul></body></html>";

    let text = html::extract(raw);
    assert_eq!(text, "- Alpha\n\n- Beta");
}

#[test]
fn test_paragraph_inside_list_item_is_not_duplicated() {
    let raw = "<html><body><ul><li><p>Only once</p></li></ul></body></html>";

    let text = html::extract(raw);
    assert_eq!(text, "- Only once");
}

#[test]
fn test_body_text_fallback_without_block_structure() {
    let raw = "<html><body><div>Bare   div text</div></body></html>";

    let text = html::extract(raw);
    assert_eq!(text, "Bare div text");
}

#[test]
fn test_script_text_is_not_extracted() {
    let raw = r#"<html><body>
        <p>Visible</p>
        <script>var hidden = "nope";</script>
    </body></html>"#;

    let text = html::extract(raw);
    assert_eq!(text, "Visible");
}

#[test]
fn test_unparseable_input_degrades_to_near_empty_text() {
    // The contract allows near-empty output, never a failure
    let text = normalize::normalize("<<<<>>>>");
    assert!(text.len() < 20);
}

#[test]
fn test_normalize_is_deterministic() {
    let raw = "<html><head><title>T</title></head><body><p>Same in, same out.</p></body></html>";
    assert_eq!(normalize::normalize(raw), normalize::normalize(raw));
}
