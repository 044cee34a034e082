/// Trigger detection: locate patterns in raw input and extract what follows.
///
/// All functions are pure. Indices are byte offsets; the identifier class is
/// ASCII, so spans always fall on char boundaries of the original input.
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{MultiTriggerParseResult, ParsedTrigger, TriggerMode, TriggerOccurrence};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub const SCORE_EXACT: u32 = 100;
pub const SCORE_PREFIX: u32 = 80;
pub const SCORE_SUBSTRING: u32 = 60;
pub const SCORE_SUBSEQUENCE: u32 = 40;

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// True iff `input` starts with `pattern` (positional triggers).
pub fn is_trigger_pattern(input: &str, pattern: &str) -> bool {
    !input.is_empty() && !pattern.is_empty() && input.starts_with(pattern)
}

/// True iff `pattern` appears anywhere in `input` (inline triggers).
pub fn contains_trigger_pattern(input: &str, pattern: &str) -> bool {
    !input.is_empty() && !pattern.is_empty() && input.contains(pattern)
}

pub fn matches_trigger_pattern(input: &str, pattern: &str, mode: TriggerMode) -> bool {
    match mode {
        TriggerMode::Positional => is_trigger_pattern(input, pattern),
        TriggerMode::Inline => contains_trigger_pattern(input, pattern),
    }
}

/// Split `"/hello big world"` into command `hello` and args `big world`.
pub fn parse_input(input: &str, pattern: &str) -> ParsedTrigger {
    let without_trigger = input.get(pattern.len()..).unwrap_or("");
    let (command, args) = without_trigger.split_once(' ').unwrap_or((without_trigger, ""));

    ParsedTrigger {
        trigger_char: pattern.to_string(),
        command: command.to_string(),
        args: args.to_string(),
        query: command.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Occurrences
// ---------------------------------------------------------------------------

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}

/// Find every occurrence of `pattern`, reading only the identifier after it.
///
/// `"Check @file1 and @file2"` yields `@file1` and `@file2` with no args; the
/// surrounding prose stays in the text. Scanning resumes one character after
/// each hit, so a pattern inside an earlier identifier (`/a/b` with `/`) is
/// reported again as its own occurrence.
pub fn find_trigger_occurrences(input: &str, pattern: &str) -> Vec<TriggerOccurrence> {
    scan_occurrences(input, pattern, false)
}

/// Like [`find_trigger_occurrences`], but each occurrence also claims the
/// text after its identifier, up to the next occurrence of `pattern` or a
/// newline. When that text trims to nothing the span ends right after the
/// identifier.
pub fn find_trigger_occurrences_with_args(input: &str, pattern: &str) -> Vec<TriggerOccurrence> {
    scan_occurrences(input, pattern, true)
}

fn scan_occurrences(input: &str, pattern: &str, capture_args: bool) -> Vec<TriggerOccurrence> {
    if input.is_empty() || pattern.is_empty() {
        return Vec::new();
    }

    let step = pattern.chars().next().map_or(1, char::len_utf8);
    let mut occurrences = Vec::new();
    let mut search_from = 0;

    while let Some(offset) = input[search_from..].find(pattern) {
        let start = search_from + offset;
        let after = start + pattern.len();
        let tail = &input[after..];
        let identifier_end = after + tail.find(|c: char| !is_identifier_char(c)).unwrap_or(tail.len());

        let mut end = identifier_end;
        let mut args = None;
        if capture_args {
            let rest = &input[identifier_end..];
            let args_from = identifier_end + (rest.len() - rest.trim_start_matches(' ').len());
            let rest = &input[args_from..];
            let args_len = rest
                .char_indices()
                .find(|&(i, c)| c == '\n' || rest[i..].starts_with(pattern))
                .map_or(rest.len(), |(i, _)| i);
            let trimmed = rest[..args_len].trim();
            if !trimmed.is_empty() {
                end = args_from + args_len;
                args = Some(trimmed.to_string());
            }
        }

        occurrences.push(TriggerOccurrence {
            pattern: pattern.to_string(),
            start_index: start,
            end_index: end,
            content: input[start..end].trim().to_string(),
            identifier: input[after..identifier_end].to_string(),
            args,
        });

        search_from = start + step;
    }

    occurrences
}

/// Identifier-only scan plus a cleaned copy of the input with every span removed.
pub fn parse_multi_trigger_input(input: &str, pattern: &str) -> MultiTriggerParseResult {
    build_parse_result(input, find_trigger_occurrences(input, pattern))
}

/// Argument-capturing variant of [`parse_multi_trigger_input`].
pub fn parse_multi_trigger_input_with_args(input: &str, pattern: &str) -> MultiTriggerParseResult {
    build_parse_result(input, find_trigger_occurrences_with_args(input, pattern))
}

fn build_parse_result(input: &str, occurrences: Vec<TriggerOccurrence>) -> MultiTriggerParseResult {
    // Last to first, so earlier spans keep their indices.
    let mut cleaned = input.to_string();
    for occurrence in occurrences.iter().rev() {
        cleaned = remove_span(&cleaned, occurrence.start_index, occurrence.end_index);
    }
    let cleaned_input = WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string();

    MultiTriggerParseResult {
        original_input: input.to_string(),
        has_triggers: !occurrences.is_empty(),
        occurrences,
        cleaned_input,
    }
}

/// Remove `[start, end)`, clamping to the current text. Nested spans can point
/// past the end once a later span has already been cut.
fn remove_span(text: &str, start: usize, end: usize) -> String {
    let start = floor_char_boundary(text, start.min(text.len()));
    let end = floor_char_boundary(text, end.min(text.len())).max(start);
    format!("{}{}", &text[..start], &text[end..])
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

// ---------------------------------------------------------------------------
// Fuzzy score
// ---------------------------------------------------------------------------

/// Case-insensitive match score: 100 exact, 80 prefix, 60 substring,
/// 40 in-order subsequence, else 0. An empty query scores 0.
pub fn fuzzy_score(candidate: &str, query: &str) -> u32 {
    if query.is_empty() {
        return 0;
    }

    let text = candidate.to_lowercase();
    let query = query.to_lowercase();

    if text == query {
        return SCORE_EXACT;
    }
    if text.starts_with(&query) {
        return SCORE_PREFIX;
    }
    if text.contains(&query) {
        return SCORE_SUBSTRING;
    }

    let mut wanted = query.chars().peekable();
    for c in text.chars() {
        if wanted.peek() == Some(&c) {
            wanted.next();
        }
    }
    if wanted.peek().is_none() { SCORE_SUBSEQUENCE } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_match_requires_prefix() {
        assert!(is_trigger_pattern("/help", "/"));
        assert!(is_trigger_pattern("//", "/"));
        assert!(!is_trigger_pattern(" /help", "/"));
        assert!(!is_trigger_pattern("help", "/"));
        assert!(!is_trigger_pattern("", "/"));
        assert!(!is_trigger_pattern("/help", ""));
    }

    #[test]
    fn mode_switches_between_prefix_and_contains() {
        assert!(!matches_trigger_pattern("hi @bob", "@", TriggerMode::Positional));
        assert!(matches_trigger_pattern("hi @bob", "@", TriggerMode::Inline));
        assert!(matches_trigger_pattern("@bob", "@", TriggerMode::Positional));
    }

    #[test]
    fn parse_input_splits_command_and_args() {
        let parsed = parse_input("/hello big  world", "/");
        assert_eq!(parsed.trigger_char, "/");
        assert_eq!(parsed.command, "hello");
        assert_eq!(parsed.args, "big  world");
        assert_eq!(parsed.query, "hello");

        let bare = parse_input("/", "/");
        assert_eq!(bare.command, "");
        assert_eq!(bare.args, "");
    }

    #[test]
    fn mentions_in_prose() {
        let input = "Check @file1 and @file2 for issues";
        let found = find_trigger_occurrences(input, "@");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].identifier, "file1");
        assert_eq!(found[0].content, "@file1");
        assert_eq!((found[0].start_index, found[0].end_index), (6, 12));
        assert_eq!(found[0].args, None);
        assert_eq!(found[1].identifier, "file2");
        assert_eq!((found[1].start_index, found[1].end_index), (17, 23));
        assert_eq!(found[1].args, None);

        let parsed = parse_multi_trigger_input(input, "@");
        assert!(parsed.has_triggers);
        assert_eq!(parsed.cleaned_input, "Check and for issues");
        assert_eq!(parsed.original_input, input);
    }

    #[test]
    fn args_run_until_next_pattern_or_newline() {
        let input = "@read src/main.rs  fully @grep todo\nthanks";
        let found = find_trigger_occurrences_with_args(input, "@");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].identifier, "read");
        assert_eq!(found[0].args.as_deref(), Some("src/main.rs  fully"));
        assert_eq!(&input[found[0].start_index..found[0].end_index], "@read src/main.rs  fully ");
        assert_eq!(found[1].identifier, "grep");
        assert_eq!(found[1].args.as_deref(), Some("todo"));

        let parsed = parse_multi_trigger_input_with_args(input, "@");
        assert_eq!(parsed.cleaned_input, "thanks");
    }

    #[test]
    fn blank_args_do_not_extend_span() {
        let found = find_trigger_occurrences_with_args("@a   @b", "@");
        assert_eq!(found[0].identifier, "a");
        assert_eq!(found[0].args, None);
        assert_eq!(found[0].end_index, 2);
        assert_eq!(found[1].identifier, "b");
    }

    #[test]
    fn identifier_stops_at_foreign_character() {
        let found = find_trigger_occurrences("ping @dev-ops.team_1/x, ok", "@");
        assert_eq!(found[0].identifier, "dev-ops.team_1/x");
        let found = find_trigger_occurrences("@!", "@");
        assert_eq!(found[0].identifier, "");
        assert_eq!(found[0].content, "@");
    }

    #[test]
    fn nested_occurrence_is_reported_again() {
        let found = find_trigger_occurrences("/foo/bar", "/");
        let identifiers: Vec<_> = found.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["foo/bar", "bar"]);
        assert_eq!(found[1].start_index, 4);
    }

    #[test]
    fn nested_spans_are_removed_with_clamping() {
        let parsed = parse_multi_trigger_input("/foo/bar baz", "/");
        assert_eq!(parsed.occurrences.len(), 2);
        assert_eq!(parsed.cleaned_input, "");
    }

    #[test]
    fn multi_char_pattern_and_unicode_text() {
        let found = find_trigger_occurrences("héllo ::ctx wörld ::db", "::");
        let identifiers: Vec<_> = found.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["ctx", "db"]);
        assert_eq!(parse_multi_trigger_input("héllo ::ctx wörld", "::").cleaned_input, "héllo wörld");
    }

    #[test]
    fn no_pattern_means_no_triggers() {
        let parsed = parse_multi_trigger_input("  plain   text ", "@");
        assert!(!parsed.has_triggers);
        assert_eq!(parsed.cleaned_input, "plain text");
        assert!(find_trigger_occurrences("", "@").is_empty());
    }

    #[test]
    fn fuzzy_score_tiers() {
        assert_eq!(fuzzy_score("help", "help"), 100);
        assert_eq!(fuzzy_score("HELP", "help"), 100);
        assert_eq!(fuzzy_score("helper", "help"), 80);
        assert_eq!(fuzzy_score("theHelper", "help"), 60);
        assert_eq!(fuzzy_score("hxexlxpx", "help"), 40);
        assert_eq!(fuzzy_score("hlep", "help"), 0);
        assert_eq!(fuzzy_score("help", ""), 0);
    }
}
