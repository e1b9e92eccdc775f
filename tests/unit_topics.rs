// Unit tests for topic parsing and dataset vocabulary.
//
// Covers parse_topics / parse_topics_field edge cases and the
// Dataset topic helpers that every evaluation builds on.

use std::collections::BTreeSet;

use topiceval::data::models::{Dataset, Record};
use topiceval::data::topics::{parse_topics, parse_topics_field};

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// parse_topics
// ============================================================

#[test]
fn parse_rows_of_two_topics() {
    let rows = [
        ("topic1:subtopic1;topic2:subtopic2", set(&["topic1", "topic2"])),
        ("topic3:subtopic3;topic4:subtopic4", set(&["topic3", "topic4"])),
        ("topic5:subtopic5;topic6:subtopic6", set(&["topic5", "topic6"])),
    ];
    for (raw, expected) in rows {
        assert_eq!(parse_topics(raw), expected, "input: {raw}");
    }
}

#[test]
fn parse_rows_with_duplicate_topics() {
    assert_eq!(parse_topics("topic1:subtopic1;topic1:subtopic2"), set(&["topic1"]));
    assert_eq!(parse_topics("topic2:subtopic3;topic2:subtopic4"), set(&["topic2"]));
    assert_eq!(
        parse_topics("topic3:subtopic5;topic4:subtopic6"),
        set(&["topic3", "topic4"])
    );
}

#[test]
fn parse_keeps_text_before_first_colon_only() {
    assert_eq!(parse_topics("Safety:Policing:Budget"), set(&["Safety"]));
}

#[test]
fn parse_names_with_spaces() {
    assert_eq!(
        parse_topics("Public Transit: Bus frequency; Housing Costs: Rent"),
        set(&["Public Transit", "Housing Costs"])
    );
}

#[test]
fn parse_never_yields_empty_names() {
    for raw in ["", ";", ":x", " ; : ;", ";;a:b;;"] {
        assert!(
            parse_topics(raw).iter().all(|t| !t.is_empty()),
            "empty topic name from {raw:?}"
        );
    }
}

// ============================================================
// parse_topics_field
// ============================================================

#[test]
fn field_accepts_list_literals() {
    assert_eq!(parse_topics_field(r#"["a", "b", "a"]"#), set(&["a", "b"]));
    assert_eq!(parse_topics_field("['a', \"b\"]"), set(&["a", "b"]));
}

#[test]
fn field_list_items_keep_commas_inside_quotes() {
    assert_eq!(
        parse_topics_field("['Transit:Buses, trains and bikes', 'Housing:Rent']"),
        set(&["Transit", "Housing"])
    );
    // The same field written as JSON by a different exporter.
    assert_eq!(
        parse_topics_field(r#"["Transit:Buses, trains and bikes", "Housing:Rent"]"#),
        set(&["Transit", "Housing"])
    );
}

#[test]
fn field_unbalanced_bracket_is_raw_text() {
    assert_eq!(parse_topics_field("[Misc:Other"), set(&["[Misc"]));
}

// ============================================================
// Dataset vocabulary
// ============================================================

#[test]
fn vocabulary_is_first_appearance_order() {
    let ds = Dataset::new(
        "vocab",
        vec![
            Record::new(1, "x", parse_topics("b:1;a:2")),
            Record::new(2, "y", parse_topics("c:3")),
            Record::new(3, "z", parse_topics("a:4")),
        ],
    )
    .unwrap();
    // Within a record topics are sorted; across records order of appearance holds.
    assert_eq!(ds.topics(), vec!["a", "b", "c"]);
}

#[test]
fn comment_without_topics_contributes_nothing() {
    let ds = Dataset::new(
        "empty-topics",
        vec![
            Record::new(1, "x", parse_topics("")),
            Record::new(2, "y", parse_topics("a:1")),
        ],
    )
    .unwrap();
    assert_eq!(ds.topics(), vec!["a"]);
    assert_eq!(ds.topic_records("a").count(), 1);
}
