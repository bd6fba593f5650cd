use std::fmt::Debug;

use crate::error::LexiconError;
use crate::matcher::{RegexMatcher, SkipMatcher};

/// The literal-match, regex-match, skip-rule and end-of-input knowledge a
/// [`crate::LexicalAnalyzer`] needs to carve tokens out of raw text.
///
/// Literal patterns (e.g. keywords, punctuation) take priority over regex
/// patterns of the same length, matching how `alap_gen_ng`'s lexical
/// analyzer distinguishes `Token::Literal` from `Token::Regex`.
#[derive(Debug)]
pub struct Lexicon<H: Copy + Ord + Debug> {
    literal_matcher: RegexMatcher<H>,
    regex_matcher: RegexMatcher<H>,
    skip_matcher: SkipMatcher,
    end_marker: H,
}

impl<H: Copy + Ord + Debug> Lexicon<H> {
    pub fn new<'a>(
        literal_lexemes: &[(H, &'a str)],
        regex_lexemes: &[(H, &'a str)],
        skip_rule_patterns: &[&'a str],
        end_marker: H,
    ) -> Result<Self, LexiconError<'a, H>> {
        let literal_matcher = RegexMatcher::new(literal_lexemes)?;
        let regex_matcher = RegexMatcher::new(regex_lexemes)?;
        let skip_matcher = SkipMatcher::new(skip_rule_patterns)?;
        Ok(Self {
            literal_matcher,
            regex_matcher,
            skip_matcher,
            end_marker,
        })
    }

    pub fn end_marker(&self) -> H {
        self.end_marker
    }

    pub fn skippable_count(&self, text: &str) -> usize {
        self.skip_matcher.skippable_count(text)
    }

    pub fn longest_literal_match(&self, text: &str) -> Option<(H, usize)> {
        let (matches, length) = self.literal_matcher.longest_matches(text);
        matches.first().map(|h| (*h, length))
    }

    pub fn longest_regex_matches(&self, text: &str) -> (Vec<H>, usize) {
        self.regex_matcher.longest_matches(text)
    }

    /// Number of bytes to skip before another literal/regex/skip match
    /// becomes possible, used to step past unrecognized input.
    pub fn distance_to_next_valid_byte(&self, text: &str) -> usize {
        let mut chars = text.char_indices();
        chars.next();
        for (index, _) in chars {
            let rest = &text[index..];
            if self.skippable_count(rest) > 0
                || self.longest_literal_match(rest).is_some()
                || !self.longest_regex_matches(rest).0.is_empty()
            {
                return index;
            }
        }
        text.len()
    }
}
