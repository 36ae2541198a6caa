//! Docstring fragments: the method summary and per-parameter docs.

const PARAM_MARK: &str = ":param";
const RETURN_MARK: &str = ":return";

// first position of any marker at or after `from`
fn next_marker(doc: &str, from: usize, markers: &[&str]) -> usize {
    markers
        .iter()
        .filter_map(|m| doc[from..].find(m).map(|i| i + from))
        .min()
        .unwrap_or(doc.len())
}

/// Text ahead of the first `:param` or `:return:` marker.
#[must_use]
pub fn method_description(doc: &str) -> String {
    let end = next_marker(doc, 0, &[PARAM_MARK, ":return:"]);

    doc[..end].trim().to_string()
}

/// Text following `:param NAME:` up to the next marker.
#[must_use]
pub fn param_doc(doc: &str, name: &str) -> Option<String> {
    let tag = format!("{PARAM_MARK} {name}:");
    let start = doc.find(&tag)? + tag.len();
    let end = next_marker(doc, start, &[PARAM_MARK, RETURN_MARK]);

    let text = doc[start..end].trim();
    (!text.is_empty()).then(|| text.to_string())
}

///
/// TESTS
///
