use std::collections::HashMap;

pub const DEFAULT_KEYWORD_COUNT: usize = 5;

/// A summary token with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub token: String,
    pub count: usize,
}

// Classic English stopword list. Matched case-insensitively; the tokens
// themselves are counted exactly as written.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
    "will", "just", "don", "should", "now",
];

fn is_stopword(token: &str) -> bool {
    let lowered = token.to_lowercase();
    STOPWORDS.contains(&lowered.as_str())
}

/// Whitespace-delimited tokens with surrounding punctuation stripped.
/// Tokens that are nothing but punctuation disappear entirely.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
}

/// The `n` most frequent non-stopword tokens of `text`, descending by count.
/// Ties are broken by first occurrence so the ranking is deterministic.
pub fn top_keywords(text: &str, n: usize) -> Vec<Keyword> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (position, token) in tokens(text).enumerate() {
        if is_stopword(token) {
            continue;
        }
        let entry = counts.entry(token).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first_seen))| (token, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(n)
        .map(|(token, count, _)| Keyword {
            token: token.to_string(),
            count,
        })
        .collect()
}
