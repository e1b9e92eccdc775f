// Topic annotation parsing.
//
// LLM categorization writes topics as `topic:subtopic;topic:subtopic`. Only
// the top-level topic name matters for evaluation, so subtopics are
// discarded and repeated names collapse. Some exports store the column as a
// list literal instead; both shapes are accepted.

use std::collections::BTreeSet;

/// Parse a raw `name:subtopic;name:subtopic` string into top-level names.
///
/// Segments without a colon pass through whole. Blank segments are dropped
/// so a trailing `;` never produces an empty topic.
pub fn parse_topics(raw: &str) -> BTreeSet<String> {
    raw.split(';')
        .filter_map(|segment| {
            let name = segment.split(':').next().unwrap_or(segment).trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Parse a `topics` CSV field that may be raw annotation text or a list
/// literal (`["a", "b"]` or `['a', 'b']`).
///
/// Never fails: anything that doesn't look like a list is treated as raw
/// annotation text.
pub fn parse_topics_field(raw: &str) -> BTreeSet<String> {
    let trimmed = raw.trim();
    match list_items(trimmed) {
        Some(items) => items.iter().flat_map(|item| parse_topics(item)).collect(),
        None => parse_topics(trimmed),
    }
}

/// Split a list literal into its string items, or None if `text` isn't one.
fn list_items(text: &str) -> Option<Vec<String>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;

    if let Ok(items) = serde_json::from_str::<Vec<String>>(text) {
        return Some(items);
    }

    Some(python_list_items(inner))
}

/// Items of a Python list repr body (`'a', "b, c", 'd\'s'`).
///
/// Commas split items only outside quotes. A backslash inside quotes takes
/// the next character literally. Unquoted text is kept as-is and trimmed.
fn python_list_items(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(open) => match c {
                '\\' => current.extend(chars.next()),
                _ if c == open => quote = None,
                _ => current.push(c),
            },
            None => match c {
                '\'' | '"' => quote = Some(c),
                ',' => items.push(std::mem::take(&mut current)),
                _ => current.push(c),
            },
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
