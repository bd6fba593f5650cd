use std::fmt::{self, Debug, Display};

/// Errors raised while building a [`crate::Lexicon`].
#[derive(Debug)]
pub enum LexiconError<'a, H> {
    AmbiguousMatch(&'a str, Vec<H>),
    DuplicateHandle(H),
    DuplicatePattern(&'a str),
    EmptyPattern(H),
    RegexError(regex::Error),
    UnanchoredRegex(&'a str),
}

impl<'a, H> From<regex::Error> for LexiconError<'a, H> {
    fn from(error: regex::Error) -> Self {
        LexiconError::RegexError(error)
    }
}

impl<'a, H: Debug> Display for LexiconError<'a, H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexiconError::AmbiguousMatch(text, handles) => {
                write!(f, "\"{}\" matches more than one of {:?}", text, handles)
            }
            LexiconError::DuplicateHandle(handle) => write!(f, "duplicate handle {:?}", handle),
            LexiconError::DuplicatePattern(pattern) => {
                write!(f, "duplicate pattern \"{}\"", pattern)
            }
            LexiconError::EmptyPattern(handle) => write!(f, "empty pattern for {:?}", handle),
            LexiconError::RegexError(err) => write!(f, "regex error: {}", err),
            LexiconError::UnanchoredRegex(pattern) => {
                write!(f, "pattern \"{}\" is not anchored with \\A", pattern)
            }
        }
    }
}

/// Errors raised while pulling tokens out of a [`crate::TokenStream`].
#[derive(Debug, Clone)]
pub enum Error<T: Display + Copy> {
    UnexpectedText(String, crate::Location),
    AmbiguousMatches(Vec<T>, String, crate::Location),
    AdvancedWhenEmpty(crate::Location),
}

impl<T: Display + Copy> Error<T> {
    pub fn is_unexpected_text(&self) -> bool {
        matches!(self, Error::UnexpectedText(_, _))
    }

    pub fn is_ambiguous_match(&self) -> bool {
        matches!(self, Error::AmbiguousMatches(_, _, _))
    }

    pub fn is_advance_when_empty(&self) -> bool {
        matches!(self, Error::AdvancedWhenEmpty(_))
    }

    pub fn location(&self) -> &crate::Location {
        match self {
            Error::UnexpectedText(_, location) => location,
            Error::AmbiguousMatches(_, _, location) => location,
            Error::AdvancedWhenEmpty(location) => location,
        }
    }
}

impl<T: Debug + Display + Copy> Display for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnexpectedText(text, location) => {
                write!(f, "unexpected text \"{}\" at: {}", text, location)
            }
            Error::AmbiguousMatches(tags, text, location) => write!(
                f,
                "ambiguous matches {:?} for \"{}\" at: {}",
                tags, text, location
            ),
            Error::AdvancedWhenEmpty(location) => {
                write!(f, "advanced past end of text at: {}", location)
            }
        }
    }
}

impl<T: Debug + Display + Copy> std::error::Error for Error<T> {}
