//! # Category Classifier
//!
//! Maps short source-specific text to one [`Category`] using ordered
//! keyword tables:
//!
//! - Case-insensitive substring matching (no word boundaries, so `ai` hits "said").
//! - Rules are checked in table order; first match wins.
//! - No match falls back to [`DEFAULT_CATEGORY`].
//!
//! Pure and total: no I/O, never fails.

use crate::trend::Category;

pub const DEFAULT_CATEGORY: Category = Category::Entertainment;

/// One table entry: a category and the terms that select it.
pub type Rule = (Category, &'static [&'static str]);

/// Rules for community/topic names (e.g. a subreddit).
pub const COMMUNITY_RULES: &[Rule] = &[
    (Category::Tech, &["tech", "programming", "gaming"]),
    (Category::Crypto, &["crypto", "bitcoin", "ethereum"]),
    (Category::Fashion, &["fashion", "style"]),
    (Category::Entertainment, &["movies", "music", "television"]),
    (Category::Sports, &["sports", "nba", "nfl", "soccer"]),
];

/// Rules for free text (headline title + description).
pub const HEADLINE_RULES: &[Rule] = &[
    (
        Category::Tech,
        &["tech", "ai", "software", "app", "digital", "cyber"],
    ),
    (
        Category::Crypto,
        &["crypto", "bitcoin", "blockchain", "ethereum"],
    ),
    (Category::Fashion, &["fashion", "style", "runway", "designer"]),
    (
        Category::Entertainment,
        &["movie", "music", "celebrity", "entertainment", "actor", "singer"],
    ),
    (
        Category::Sports,
        &["sport", "game", "player", "team", "championship", "league"],
    ),
];

/// Classify `text` against `rules`.
pub fn classify_with(rules: &[Rule], text: &str) -> Category {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| lower.contains(t)))
        .map(|(c, _)| *c)
        .unwrap_or(DEFAULT_CATEGORY)
}

pub fn classify_community(name: &str) -> Category {
    classify_with(COMMUNITY_RULES, name)
}

/// Headline signal is title and description joined by a space.
pub fn classify_headline(title: &str, description: &str) -> Category {
    classify_with(HEADLINE_RULES, &format!("{title} {description}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn community_names_match_case_insensitively() {
        assert_eq!(classify_community("Technology"), Category::Tech);
        assert_eq!(classify_community("CryptoCurrency"), Category::Crypto);
        assert_eq!(classify_community("malefashionadvice"), Category::Fashion);
        assert_eq!(classify_community("NBA"), Category::Sports);
        assert_eq!(classify_community("Music"), Category::Entertainment);
    }

    #[test]
    fn first_matching_rule_wins() {
        // "pcgaming" is Tech even though "gaming" could read as entertainment
        assert_eq!(classify_community("pcgaming"), Category::Tech);
        // tech beats crypto when both terms appear
        assert_eq!(
            classify_headline("Bitcoin tech stocks", ""),
            Category::Tech
        );
    }

    #[test]
    fn no_match_defaults_to_entertainment() {
        assert_eq!(classify_community("pics"), DEFAULT_CATEGORY);
        assert_eq!(classify_headline("", ""), DEFAULT_CATEGORY);
        assert_eq!(
            classify_headline("Local bridge reopens", "Crews finished work on Monday"),
            DEFAULT_CATEGORY
        );
    }

    #[test]
    fn headline_uses_plain_substrings() {
        // "said" contains "ai"
        assert_eq!(
            classify_headline("Mayor said nothing", "Quiet week"),
            Category::Tech
        );
        assert_eq!(
            classify_headline("Finals tonight", "The league title is at stake"),
            Category::Sports
        );
    }

    #[test]
    fn classification_is_deterministic() {
        for input in ["r/worldnews", "Ethereum upgrade", "", "STYLE"] {
            let a = classify_headline(input, input);
            let b = classify_headline(input, input);
            assert_eq!(a, b);
            assert_eq!(classify_community(input), classify_community(input));
        }
    }
}
