use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Base block-list applied by every scanner unless a custom list is supplied.
/// Terms are lowercase; matching against input text is case-insensitive.
pub const DEFAULT_FLAGGED_TERMS: &[&str] = &[
    "stupid", "idiot", "dumb", "moron", "loser", "hate", "ugly", "trash",
    "jerk", "kill", "die", "damn", "hell", "crap", "ass", "bitch", "bastard",
    "piss", "dick", "scam", "spam", "fraud", "fake", "cheat", "abuse",
    "racist", "nazi", "drugs", "porn",
];

const HIGHLIGHT_OPEN: &str = "<mark class=\"flagged-term\">";
const HIGHLIGHT_CLOSE: &str = "</mark>";

/// How `extract_flagged` decides that a term occurs in the text.
///
/// `Substring` matches a term anywhere inside a whitespace-delimited token
/// and is deliberately looser than the whole-word check used by
/// `contains_flagged` and `highlight`. It is the default for parity with the
/// original client behavior; integrators that want extraction and detection
/// to agree should pick `WholeWord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    WholeWord,
    Substring,
}

/// Aggregate result of running all three scan primitives over one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub matched: bool,
    pub matched_terms: Vec<String>,
    pub highlighted: String,
}

/// Word-list based content scanner for pre-submit warnings and moderation
/// views. Pure and synchronous; every operation maps any input to a defined
/// output and never panics. Whole-word patterns for the block-list are
/// compiled once at construction; per-call extras are compiled on the fly.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    terms: Vec<(String, Option<Regex>)>,
    extraction_mode: MatchMode,
}

impl Default for ContentScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentScanner {
    pub fn new() -> Self {
        Self::with_block_list(DEFAULT_FLAGGED_TERMS.iter().map(|t| t.to_string()).collect())
    }

    /// Builds a scanner around a caller-supplied block-list instead of the
    /// built-in one. Terms are normalized to lowercase and empty terms
    /// dropped; the whole-word pattern for each term is compiled here.
    pub fn with_block_list(terms: Vec<String>) -> Self {
        Self {
            terms: compile_terms(terms.into_iter()),
            extraction_mode: MatchMode::Substring,
        }
    }

    pub fn extraction_mode(mut self, mode: MatchMode) -> Self {
        self.extraction_mode = mode;
        self
    }

    // Instance terms first, then the per-call extras, preserving order.
    fn active_terms<'a>(
        &'a self,
        extras: &'a [(String, Option<Regex>)],
    ) -> impl Iterator<Item = &'a (String, Option<Regex>)> {
        self.terms.iter().chain(extras.iter())
    }

    /// Whether any term from the unioned block-list occurs in `text` as a
    /// whole word, case-insensitive. Short-circuits on the first hit.
    pub fn contains_flagged(&self, text: &str, extra_terms: &[String]) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let extras = compile_extras(extra_terms);
        let matched = self
            .active_terms(&extras)
            .any(|(_, re)| re.as_ref().is_some_and(|re| re.is_match(text)));
        matched
    }

    /// Every unioned term that occurs in `text`, in block-list order, each at
    /// most once. With the default `Substring` mode a term only needs to
    /// appear inside some whitespace-delimited token, so this can flag text
    /// that `contains_flagged` considers clean.
    pub fn extract_flagged(&self, text: &str, extra_terms: &[String]) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        let extras = compile_extras(extra_terms);
        let mut found: Vec<String> = Vec::new();
        for (term, re) in self.active_terms(&extras) {
            if found.iter().any(|f| f == term) {
                continue;
            }
            let hit = match self.extraction_mode {
                MatchMode::Substring => tokens.iter().any(|token| token.contains(term.as_str())),
                MatchMode::WholeWord => re.as_ref().is_some_and(|re| re.is_match(text)),
            };
            if hit {
                found.push(term.clone());
            }
        }
        found
    }

    /// Wraps every whole-word occurrence of every unioned term in the
    /// emphasis markup, preserving the original casing of each match. Terms
    /// are applied sequentially in block-list order; the surrounding text is
    /// not HTML-escaped, that is the caller's job.
    pub fn highlight(&self, text: &str, extra_terms: &[String]) -> String {
        let mut out = text.to_string();
        let extras = compile_extras(extra_terms);
        for (_, re) in self.active_terms(&extras) {
            if let Some(re) = re {
                out = re
                    .replace_all(&out, |caps: &regex::Captures| {
                        format!("{HIGHLIGHT_OPEN}{}{HIGHLIGHT_CLOSE}", &caps[0])
                    })
                    .into_owned();
            }
        }
        out
    }

    /// Masks every whole-word occurrence of every unioned term with `*`
    /// repeated to the match length.
    pub fn censor(&self, text: &str, extra_terms: &[String]) -> String {
        let mut out = text.to_string();
        let extras = compile_extras(extra_terms);
        for (_, re) in self.active_terms(&extras) {
            if let Some(re) = re {
                out = re
                    .replace_all(&out, |caps: &regex::Captures| {
                        "*".repeat(caps[0].chars().count())
                    })
                    .into_owned();
            }
        }
        out
    }

    pub fn scan(&self, text: &str, extra_terms: &[String]) -> ScanOutcome {
        ScanOutcome {
            matched: self.contains_flagged(text, extra_terms),
            matched_terms: self.extract_flagged(text, extra_terms),
            highlighted: self.highlight(text, extra_terms),
        }
    }
}

// Lowercases, drops empty terms, and compiles the whole-word pattern for
// each survivor. Used for the instance block-list and the per-call extras
// alike so both go through the same normalization.
fn compile_terms(terms: impl Iterator<Item = String>) -> Vec<(String, Option<Regex>)> {
    terms
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(|t| {
            let re = word_pattern(&t);
            (t, re)
        })
        .collect()
}

fn compile_extras(extra_terms: &[String]) -> Vec<(String, Option<Regex>)> {
    compile_terms(extra_terms.iter().cloned())
}

// Terms are escaped before compilation, so a literal "." or "*" in the
// block-list matches itself instead of acting as a metacharacter.
fn word_pattern(term: &str) -> Option<Regex> {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("skipping unbuildable block-list pattern {:?}: {}", term, err);
            None
        }
    }
}

static DEFAULT_SCANNER: Lazy<ContentScanner> = Lazy::new(ContentScanner::new);

pub fn contains_flagged(text: &str, extra_terms: &[String]) -> bool {
    DEFAULT_SCANNER.contains_flagged(text, extra_terms)
}

pub fn extract_flagged(text: &str, extra_terms: &[String]) -> Vec<String> {
    DEFAULT_SCANNER.extract_flagged(text, extra_terms)
}

pub fn highlight(text: &str, extra_terms: &[String]) -> String {
    DEFAULT_SCANNER.highlight(text, extra_terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extras(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_contains_flagged_whole_word() {
        let scanner = ContentScanner::new();
        assert!(scanner.contains_flagged("you are so stupid", &[]));
        assert!(scanner.contains_flagged("STUPID move", &[]));
        assert!(!scanner.contains_flagged("have a nice day", &[]));
    }

    #[test]
    fn test_contains_flagged_does_not_match_inside_words() {
        let scanner = ContentScanner::new();
        // "classic" contains "ass" but not as a whole word
        assert!(!scanner.contains_flagged("a classic example", &[]));
    }

    #[test]
    fn test_contains_flagged_empty_and_whitespace() {
        let scanner = ContentScanner::new();
        assert!(!scanner.contains_flagged("", &[]));
        assert!(!scanner.contains_flagged("   \t\n", &[]));
    }

    #[test]
    fn test_contains_flagged_extra_terms() {
        let scanner = ContentScanner::new();
        assert!(!scanner.contains_flagged("the gizmo broke", &[]));
        assert!(scanner.contains_flagged("the gizmo broke", &extras(&["gizmo"])));
        // extras are per call, not persisted
        assert!(!scanner.contains_flagged("the gizmo broke", &[]));
    }

    #[test]
    fn test_extract_is_looser_than_contains() {
        let scanner = ContentScanner::new();
        let text = "a classic example";
        assert!(!scanner.contains_flagged(text, &[]));
        assert_eq!(scanner.extract_flagged(text, &[]), vec!["ass".to_string()]);
    }

    #[test]
    fn test_extract_follows_block_list_order() {
        let scanner = ContentScanner::with_block_list(extras(&["beta", "alpha"]));
        let found = scanner.extract_flagged("alpha then beta", &[]);
        assert_eq!(found, vec!["beta".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn test_extract_deduplicates() {
        let scanner = ContentScanner::with_block_list(extras(&["alpha", "alpha"]));
        let found = scanner.extract_flagged("alpha alpha alpha", &[]);
        assert_eq!(found, vec!["alpha".to_string()]);
    }

    #[test]
    fn test_extract_empty_text() {
        let scanner = ContentScanner::new();
        assert!(scanner.extract_flagged("", &[]).is_empty());
    }

    #[test]
    fn test_extract_whole_word_mode_matches_contains() {
        let scanner = ContentScanner::new().extraction_mode(MatchMode::WholeWord);
        assert!(scanner.extract_flagged("a classic example", &[]).is_empty());
        assert_eq!(
            scanner.extract_flagged("what an ass", &[]),
            vec!["ass".to_string()]
        );
    }

    #[test]
    fn test_highlight_clean_text_unchanged() {
        let scanner = ContentScanner::new();
        let text = "have a nice day";
        assert_eq!(scanner.highlight(text, &[]), text);
    }

    #[test]
    fn test_highlight_wraps_and_preserves_casing() {
        let scanner = ContentScanner::new();
        let out = scanner.highlight("Stupid idea, just stupid", &[]);
        assert_eq!(
            out,
            "<mark class=\"flagged-term\">Stupid</mark> idea, just <mark class=\"flagged-term\">stupid</mark>"
        );
    }

    #[test]
    fn test_highlight_each_occurrence_wrapped_once() {
        let scanner = ContentScanner::with_block_list(extras(&["alpha"]));
        let out = scanner.highlight("alpha beta alpha", &[]);
        assert_eq!(out.matches(HIGHLIGHT_OPEN).count(), 2);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let scanner = ContentScanner::with_block_list(extras(&["a.b"]));
        assert!(!scanner.contains_flagged("the acb pattern", &[]));
        assert!(scanner.contains_flagged("the a.b pattern", &[]));
    }

    #[test]
    fn test_compiled_block_list_serves_all_operations() {
        let scanner = ContentScanner::with_block_list(extras(&["a.b"]));
        assert!(scanner.contains_flagged("the a.b pattern", &[]));
        assert_eq!(
            scanner.extract_flagged("the a.b pattern", &[]),
            vec!["a.b".to_string()]
        );
        assert!(scanner.highlight("the a.b pattern", &[]).contains(HIGHLIGHT_OPEN));
        assert_eq!(scanner.censor("an a.b mark", &[]), "an *** mark");
    }

    #[test]
    fn test_extra_terms_are_case_normalized() {
        let scanner = ContentScanner::new();
        let terms = extras(&["Gizmo"]);
        assert!(scanner.contains_flagged("broken GIZMO here", &terms));
        // substring extraction compares against lowercased tokens, so an
        // uppercase extra must flag (and be reported) in lowercase too
        assert_eq!(
            scanner.extract_flagged("gizmos everywhere", &terms),
            vec!["gizmo".to_string()]
        );
        assert_eq!(
            scanner.censor("a GIZMO appears", &terms),
            "a ***** appears"
        );
    }

    #[test]
    fn test_censor_masks_with_match_length() {
        let scanner = ContentScanner::new();
        assert_eq!(scanner.censor("you stupid goose", &[]), "you ****** goose");
        assert_eq!(scanner.censor("clean text", &[]), "clean text");
    }

    #[test]
    fn test_scan_aggregates_primitives() {
        let scanner = ContentScanner::new();
        let outcome = scanner.scan("what a scam", &[]);
        assert!(outcome.matched);
        assert_eq!(outcome.matched_terms, vec!["scam".to_string()]);
        assert!(outcome.highlighted.contains(HIGHLIGHT_OPEN));
    }

    #[test]
    fn test_default_scanner_free_functions() {
        assert!(contains_flagged("what the hell", &[]));
        assert!(!contains_flagged("hello world", &[]));
        assert_eq!(extract_flagged("what the hell", &[]), vec!["hell".to_string()]);
        assert_eq!(highlight("fine by me", &[]), "fine by me");
    }

    #[test]
    fn test_scan_outcome_serde_round_trip() {
        let outcome = ContentScanner::new().scan("pure spam", &[]);
        let json = serde_json::to_string(&outcome).unwrap();
        let back: ScanOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
