//! Comma-separated tag input.
//!
//! Blank segments are dropped, so an empty input means "no tags" (`[]`) rather than
//! a single empty tag. Order and duplicates are kept as typed.

pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}
