// file: src/query/keywords.rs
// description: keyword extraction from page titles and issue summaries

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("NON_WORD regex is valid");
}

/// Tokens of this many characters or fewer are dropped.
pub const SHORT_TOKEN_CHARS: usize = 3;

/// Split on whitespace, drop short tokens, strip punctuation.
///
/// Order and duplicates are preserved and no case folding is applied, so the
/// tokens go into the query verbatim. A token that punctuation stripping
/// shortens to `SHORT_TOKEN_CHARS` or fewer is dropped as well.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.chars().count() > SHORT_TOKEN_CHARS)
        .map(|token| NON_WORD.replace_all(token, "").into_owned())
        .filter(|token| token.chars().count() > SHORT_TOKEN_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_and_strips_punctuation() {
        let keywords = extract_keywords("Oncall tips for on-call engineers");
        assert_eq!(keywords, vec!["Oncall", "tips", "oncall", "engineers"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("  \t\n ").is_empty());
    }

    #[test]
    fn test_keeps_duplicates_and_case() {
        let keywords = extract_keywords("Deploy deploy DEPLOY");
        assert_eq!(keywords, vec!["Deploy", "deploy", "DEPLOY"]);
    }

    #[test]
    fn test_every_keyword_is_longer_than_three_chars() {
        let titles = [
            "Q3 roadmap: what's next?",
            "a.b! c-d... ---- (wip)",
            "Release notes v1.2.3 for the API",
            "Größe und Maße",
        ];
        for title in titles {
            for keyword in extract_keywords(title) {
                assert!(keyword.chars().count() > SHORT_TOKEN_CHARS, "{keyword:?} from {title:?}");
                assert!(!keyword.contains(|c: char| c.is_ascii_punctuation() && c != '_'));
            }
        }
    }

    #[test]
    fn test_unicode_letters_survive() {
        assert_eq!(extract_keywords("Größe und Maße"), vec!["Größe", "Maße"]);
    }
}
