//! HTML tag stripping

use std::collections::HashSet;

/// Remove every HTML tag from `input` and return plain text.
///
/// Text inside `script` and `style` elements is dropped entirely; the text
/// of every other element is kept. Entities produced by the sanitizer are
/// decoded again, so the result is raw text meant to be escaped on output.
pub fn strip_tags(input: &str) -> String {
    let cleaned = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();
    decode_basic_entities(&cleaned)
}

/// Undo the escaping the sanitizer applies to text nodes
fn decode_basic_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
