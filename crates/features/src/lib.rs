//! Text features used by the scorers.
//!
//! Provides pure functions over free text:
//! - Keyword extraction (CJK / Latin runs, stop-words removed)
//! - Keyword-overlap similarity between two texts
//! - Token-overlap similarity between two item names
//! - Levenshtein edit distance

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Maximum number of keywords kept per text.
pub const MAX_KEYWORDS: usize = 10;

/// Runs of CJK ideographs or Latin letters.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{4e00}-\u{9fa5}]+|[a-zA-Z]+").expect("valid token pattern"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上",
        "也", "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这",
        "那", "些", "个", "为", "之", "于", "及", "而", "后", "与", "对", "或", "但", "如果",
        "因为", "所以", "虽然", "然而",
    ]
    .into_iter()
    .collect()
});

/// Extract up to `MAX_KEYWORDS` keywords, in encounter order.
///
/// Single-character tokens and stop-words are dropped. Case is preserved;
/// the stop-word check is case-insensitive. Duplicates are kept.
pub fn extract_keywords<'a>(text: impl Into<Option<&'a str>>) -> Vec<String> {
    let Some(text) = text.into() else {
        return Vec::new();
    };

    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() > 1)
        .filter(|word| !STOP_WORDS.contains(word.to_lowercase().as_str()))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Keyword-overlap similarity in [0, 1].
///
/// `|k1 ∩ k2| / max(|k1|, |k2|)` over the lower-cased keyword lists.
/// Repeated keywords in the first text each count toward the intersection.
pub fn calculate_similarity(text1: &str, text2: &str) -> f64 {
    let keywords1 = extract_keywords(text1.to_lowercase().as_str());
    let keywords2 = extract_keywords(text2.to_lowercase().as_str());

    if keywords1.is_empty() || keywords2.is_empty() {
        return 0.0;
    }

    let intersection = keywords1.iter().filter(|k| keywords2.contains(k)).count();
    let score = intersection as f64 / keywords1.len().max(keywords2.len()) as f64;
    score.min(1.0)
}

/// Case-insensitive containment in either direction.
///
/// This is how a token is matched against a taxonomy keyword: "笔记本电脑"
/// matches "电脑", and "iphone" matches "iPhone".
pub fn fuzzy_contains(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Token-overlap similarity between two item names, in [0, 1].
///
/// Names are lower-cased and split on whitespace. A token of the first name
/// counts toward the intersection when it contains, or is contained in, any
/// token of the second. The denominator is the number of distinct tokens
/// across both names.
pub fn item_name_similarity(name1: &str, name2: &str) -> f64 {
    let name1 = name1.to_lowercase();
    let name2 = name2.to_lowercase();
    let tokens1: Vec<&str> = name1.split_whitespace().collect();
    let tokens2: Vec<&str> = name2.split_whitespace().collect();

    if tokens1.is_empty() || tokens2.is_empty() {
        return 0.0;
    }

    let intersection = tokens1
        .iter()
        .filter(|t1| tokens2.iter().any(|t2| t1.contains(t2) || t2.contains(*t1)))
        .count();

    let union: HashSet<&str> = tokens1.iter().chain(tokens2.iter()).copied().collect();

    (intersection as f64 / union.len() as f64).min(1.0)
}

/// Compute Levenshtein edit distance between two strings.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1: Vec<char> = s1.chars().collect();
    let s2: Vec<char> = s2.chars().collect();
    let len1 = s1.len();
    let len2 = s2.len();

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1[i - 1] == s2[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_empty() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords(None).is_empty());
    }

    #[test]
    fn test_extract_keywords_mixed_script() {
        assert_eq!(extract_keywords("iPhone 15 手机"), vec!["iPhone", "手机"]);
    }

    #[test]
    fn test_extract_keywords_drops_stop_words_and_single_chars() {
        // "的" is a stop-word run on its own; "a" is too short
        assert_eq!(extract_keywords("a 的 因为 coffee"), vec!["coffee"]);
        assert_eq!(extract_keywords("AND 没有 book"), vec!["AND", "book"]);
    }

    #[test]
    fn test_extract_keywords_cap() {
        let text = (0..15).map(|i| format!("word{}x", i)).collect::<Vec<_>>().join(" ");
        let keywords = extract_keywords(text.as_str());
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "word");
    }

    #[test]
    fn test_similarity_identical_text() {
        assert_eq!(calculate_similarity("降噪 耳机", "降噪 耳机"), 1.0);
        assert_eq!(calculate_similarity("Kindle Paperwhite", "kindle paperwhite"), 1.0);
    }

    #[test]
    fn test_similarity_empty_side() {
        assert_eq!(calculate_similarity("", "耳机"), 0.0);
        assert_eq!(calculate_similarity("12345", "耳机"), 0.0);
    }

    #[test]
    fn test_similarity_partial_overlap() {
        // {sony, headphones} vs {sony, camera, lens}
        let score = calculate_similarity("Sony headphones", "Sony camera lens");
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_contains() {
        assert!(fuzzy_contains("笔记本电脑", "电脑"));
        assert!(fuzzy_contains("MacBook", "macbook pro"));
        assert!(!fuzzy_contains("咖啡", "茶叶"));
        assert!(!fuzzy_contains("", "茶叶"));
    }

    #[test]
    fn test_item_name_similarity() {
        assert_eq!(item_name_similarity("Sony WH-1000XM5", "sony wh-1000xm5"), 1.0);
        // "sony" matches, "camera" does not; union {sony, camera, headphones}
        let score = item_name_similarity("Sony camera", "Sony headphones");
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(item_name_similarity("", "sony"), 0.0);
    }

    #[test]
    fn test_item_name_similarity_clamped() {
        assert_eq!(item_name_similarity("cup cup", "cup"), 1.0);
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "kitten"), 0);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("耳机", "手机"), 1);
    }
}
