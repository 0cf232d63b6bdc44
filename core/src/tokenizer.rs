use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[A-Za-z0-9]+").expect("valid regex");
}

/// Split text into maximal runs of ASCII letters and digits, lowercased.
/// Everything else is a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    RE.find_iter(text).map(|m| m.as_str().to_ascii_lowercase()).collect()
}

/// Distinct tokens of `text`, for document-frequency counting.
pub fn token_set(text: &str) -> HashSet<String> {
    RE.find_iter(text).map(|m| m.as_str().to_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Craft 4 Oak_Planks, then RUN!");
        assert_eq!(t, vec!["craft", "4", "oak", "planks", "then", "run"]);
    }

    #[test]
    fn empty_and_separator_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  --- ?! \n\t").is_empty());
    }

    #[test]
    fn set_dedups() {
        let s = token_set("oak OAK oak log");
        assert_eq!(s.len(), 2);
        assert!(s.contains("oak"));
        assert!(s.contains("log"));
    }
}
