//! Free-text normalization
//!
//! Turns a raw catalog field into a lowercase, stop-word free token string.
//! Only the English letters `a-z` survive: characters from any other script
//! are treated like punctuation and stripped, so non-English text degrades
//! to an empty or near-empty string. That is a known property of the
//! normalizer, not something to paper over with language-aware stemming.

/// English stop-words removed by [`normalize`].
///
/// Contractions are listed in their apostrophe-free parts, since apostrophes
/// become token separators before the lookup happens.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she",
    "her", "hers", "herself", "it", "its", "itself", "they", "them", "their",
    "theirs", "themselves", "what", "which", "who", "whom", "this", "that",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of",
    "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "s", "t", "can", "will", "just", "don", "should", "now", "d",
    "ll", "m", "o", "re", "ve", "y", "ain", "aren", "couldn", "didn",
    "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Tokens of this length or shorter are dropped.
pub const MIN_TOKEN_LEN: usize = 3;

/// Check whether a lowercase token is in [`STOP_WORDS`]
#[inline]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Normalize a free-text field.
///
/// Missing input yields an empty string. Otherwise the text is lowercased,
/// everything except ASCII letters and whitespace becomes a space, and the
/// remaining tokens are filtered against [`STOP_WORDS`] and
/// [`MIN_TOKEN_LEN`] before being joined by single spaces.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let cleaned: String = text
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TOKEN_LEN && !is_stop_word(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_text_is_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
    }

    #[test]
    fn test_strips_punctuation_and_stop_words() {
        assert_eq!(
            normalize(Some("A teacher turns to crime.")),
            "teacher turns crime"
        );
        assert_eq!(normalize(Some("A lawyer's descent.")), "lawyer descent");
    }

    #[test]
    fn test_drops_short_tokens_and_digits() {
        assert_eq!(normalize(Some("Ep 12 of the TV show")), "show");
        assert_eq!(normalize(Some("R2-D2 and C-3PO")), "");
    }

    #[test]
    fn test_non_latin_script_degrades_to_empty() {
        assert_eq!(normalize(Some("오징어 게임")), "");
        // Accented letters split words: "Álvaro" loses its first letter
        assert_eq!(normalize(Some("Álvaro Morte")), "lvaro morte");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            normalize(Some("  Crime,\tDrama,\n Thriller ")),
            "crime drama thriller"
        );
    }

    #[test]
    fn test_deterministic() {
        let input = Some("Two FBI agents examine the psychology of serial killers.");
        assert_eq!(normalize(input), normalize(input));
    }
}
