//! Text tokenization and stemming for the search index.

use rust_stemmers::Stemmer;
use xxhash_rust::xxh3::xxh3_64;

/// Common English stop words. Sidebar summaries are one sentence, so these
/// would otherwise dominate term frequencies.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "if", "in", "is", "it",
    "its", "of", "on", "or", "that", "the", "this", "to", "was", "will", "with",
];

/// Split text into stemmed, lower-cased search terms.
///
/// A word is a run of alphanumerics, `_` and `-`. Each word yields its parts
/// (split at `_`, `-` and lower→upper case changes) plus, when it has more
/// than one part, the joined compound: `FromRow` → `from`, `row`, `fromrow`.
/// Purely numeric parts are dropped.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = Vec::new();

    let words = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .filter(|w| !w.is_empty());

    for word in words {
        let parts = split_word(word);
        for part in &parts {
            push_term(part, &mut tokens, stemmer);
        }
        if parts.len() > 1 {
            push_term(&parts.concat(), &mut tokens, stemmer);
        }
    }

    tokens
}

/// Break a word at separators and camelCase boundaries.
fn split_word(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();

    for piece in word.split(['_', '-']).filter(|p| !p.is_empty()) {
        let mut start = 0;
        let mut prev_lower = false;
        for (i, c) in piece.char_indices() {
            if prev_lower && c.is_uppercase() {
                parts.push(&piece[start..i]);
                start = i;
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
        parts.push(&piece[start..]);
    }

    parts
}

fn push_term(raw: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    if raw.chars().all(|c| c.is_ascii_digit()) {
        return;
    }

    let lowercase = raw.to_lowercase();
    if STOP_WORDS.contains(&lowercase.as_str()) {
        return;
    }

    tokens.push(stemmer.stem(&lowercase).into_owned());
}

/// Hashes a term for lookup (case-insensitive). Seed-free, so hashes stay
/// valid in indices cached by another process.
pub(crate) fn hash_term(term: &str) -> u64 {
    xxh3_64(term.to_lowercase().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;
    use rust_stemmers::Algorithm;

    fn tokens(text: &str) -> Vec<String> {
        tokenize_and_stem(text, &Stemmer::create(Algorithm::English))
    }

    #[rstest]
    #[case("FromRow", &["from", "row", "fromrow"])]
    #[case("from_row_opt", &["from", "row", "opt"])]
    #[case("NopConnectionCustomizer", &["nop", "connect"])]
    #[case("pool-configuration", &["pool"])]
    fn test_tokens_contain(#[case] input: &str, #[case] expected: &[&str]) {
        let tokens = tokens(input);
        for term in expected {
            check!(tokens.contains(&term.to_string()), "{:?} missing from {:?}", term, tokens);
        }
    }

    #[rstest]
    #[case("converting", vec!["convert"])]
    #[case("Pool", vec!["pool"])]
    #[case("the pool", vec!["pool"])]
    #[case("mysql 12", vec!["mysql"])]
    fn test_tokens_exact(#[case] input: &str, #[case] expected: Vec<&str>) {
        let expected: Vec<String> = expected.into_iter().map(String::from).collect();
        check!(tokens(input) == expected);
    }

    #[test]
    fn test_markdown_punctuation_is_split() {
        let tokens = tokens("Will return `Err(row)` if could not convert `row` to `T`.");
        check!(tokens.contains(&"err".to_string()));
        check!(tokens.contains(&"row".to_string()));
        check!(!tokens.iter().any(|t| t.contains('`')));
    }

    #[rstest]
    #[case("HTTPServer", vec!["HTTPServer"])]
    #[case("u8", vec!["u8"])]
    #[case("parseJson", vec!["parse", "Json"])]
    #[case("IntoValue", vec!["Into", "Value"])]
    fn test_split_word(#[case] input: &str, #[case] expected: Vec<&str>) {
        check!(split_word(input) == expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("`` ()")]
    #[case("🦀")]
    fn test_nothing_to_index(#[case] input: &str) {
        check!(tokens(input).is_empty());
    }

    #[test]
    fn test_case_insensitive_hashing() {
        check!(hash_term("FromRow") == hash_term("fromrow"));
    }
}
