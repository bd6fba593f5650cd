use std::fmt;

/// Wraps a lexical failure surfaced while the driver was asking the token
/// stream for its next token (§4.F). Kept as its own type, rather than a
/// bare string, so a caller can match on it the same way it would on
/// `lexan::Error` without depending on `lexan` directly.
#[derive(Debug, Clone)]
pub struct UnknownTokenError {
    message: String,
    location: String,
}

impl UnknownTokenError {
    pub fn new(message: String, location: String) -> Self {
        Self { message, location }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for UnknownTokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UnknownTokenError {}

/// Everything that can go wrong while driving a parse (§4.F).
#[derive(Debug)]
pub enum ParseError<T> {
    /// No ACTION entry for `found` in `state`, and no negated entry covers
    /// it either.
    UnexpectedToken {
        found: T,
        location: String,
        state: usize,
    },
    /// The token stream produced a lexical error before a parse decision
    /// could be made.
    UnknownToken(UnknownTokenError),
    /// The table has no GOTO entry for a non-terminal the driver just
    /// reduced to; only possible if the table was built or loaded
    /// inconsistently with the grammar driving this parse.
    MissingGoto { state: usize, non_terminal: String },
}

impl<T: fmt::Display> fmt::Display for ParseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken {
                found,
                location,
                state,
            } => write!(
                f,
                "unexpected token {} at {} (parser state {})",
                found, location, state
            ),
            ParseError::UnknownToken(err) => write!(f, "{}", err),
            ParseError::MissingGoto {
                state,
                non_terminal,
            } => write!(
                f,
                "no GOTO entry for `{}` from state {}",
                non_terminal, state
            ),
        }
    }
}

impl<T: fmt::Display + fmt::Debug> std::error::Error for ParseError<T> {}
