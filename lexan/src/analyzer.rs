use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::error::Error;
use crate::lexicon::Lexicon;
use crate::location::Location;
use crate::token::Token;

struct BasicTokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    lexicon: Arc<Lexicon<T>>,
    text: String,
    index: usize,
    location: Location,
    front: Option<Result<Token<T>, Error<T>>>,
}

impl<T> BasicTokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    fn new(lexicon: &Arc<Lexicon<T>>, text: String, label: String) -> Self {
        let location = Location::new(label);
        let mut stream = Self {
            lexicon: Arc::clone(lexicon),
            text,
            location,
            index: 0,
            front: None,
        };
        stream.advance();
        stream
    }

    fn front(&self) -> Option<Result<Token<T>, Error<T>>> {
        self.front.clone()
    }

    fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    fn advance(&mut self) {
        self.front = self.next_token();
    }

    fn location(&self) -> Location {
        self.location.clone()
    }

    fn incr_index_and_location(&mut self, length: usize) {
        let next_index = self.index + length;
        let slice = &self.text[self.index..next_index];
        let mut i = 0;
        while i < length {
            if let Some(eol_i) = slice[i..].find("\r\n") {
                self.location.new_line();
                i += eol_i + 2;
            } else if let Some(eol_i) = slice[i..].find('\n') {
                self.location.new_line();
                i += eol_i + 1;
            } else {
                self.location.advance_column(length - i);
                i = length;
            };
        }
        self.index = next_index;
    }

    fn next_token(&mut self) -> Option<Result<Token<T>, Error<T>>> {
        self.incr_index_and_location(self.lexicon.skippable_count(&self.text[self.index..]));
        if self.index >= self.text.len() {
            return None;
        }

        let current_location = self.location();
        let start = self.index;
        let o_llm = self.lexicon.longest_literal_match(&self.text[self.index..]);
        let lrems = self
            .lexicon
            .longest_regex_matches(&self.text[self.index..]);

        if let Some(llm) = o_llm {
            if lrems.0.len() > 1 && lrems.1 > llm.1 {
                self.incr_index_and_location(lrems.1);
                Some(Err(Error::AmbiguousMatches(
                    lrems.0,
                    self.text[start..self.index].to_string(),
                    current_location,
                )))
            } else if lrems.0.len() == 1 && lrems.1 > llm.1 {
                self.incr_index_and_location(lrems.1);
                Some(Ok(Token::new(
                    lrems.0[0],
                    self.text[start..self.index].to_string(),
                    current_location,
                )))
            } else {
                self.incr_index_and_location(llm.1);
                Some(Ok(Token::new(
                    llm.0,
                    self.text[start..self.index].to_string(),
                    current_location,
                )))
            }
        } else if lrems.0.len() == 1 {
            self.incr_index_and_location(lrems.1);
            Some(Ok(Token::new(
                lrems.0[0],
                self.text[start..self.index].to_string(),
                current_location,
            )))
        } else if lrems.0.len() > 1 {
            self.incr_index_and_location(lrems.1);
            Some(Err(Error::AmbiguousMatches(
                lrems.0,
                self.text[start..self.index].to_string(),
                current_location,
            )))
        } else {
            let distance = self
                .lexicon
                .distance_to_next_valid_byte(&self.text[self.index..]);
            let distance = distance.max(1);
            self.incr_index_and_location(distance);
            Some(Err(Error::UnexpectedText(
                self.text[start..self.index].to_string(),
                current_location,
            )))
        }
    }
}

/// A stream of tokens over one or more injected pieces of text, terminated
/// by the lexicon's end-of-input handle once every injected source is
/// exhausted. Injection lets a caller splice in e.g. a macro expansion
/// without losing its place in the outer text.
pub struct TokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    lexicon: Arc<Lexicon<T>>,
    stack: Vec<BasicTokenStream<T>>,
    front: Result<Token<T>, Error<T>>,
}

impl<T> TokenStream<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    pub fn new(lexicon: &Arc<Lexicon<T>>, text: String, label: String) -> Self {
        let mut stream = Self {
            lexicon: Arc::clone(lexicon),
            stack: vec![],
            front: Err(Error::AdvancedWhenEmpty(Location::default())),
        };
        stream.inject(text, label);
        stream
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn front(&self) -> Result<Token<T>, Error<T>> {
        self.front.clone()
    }

    pub fn inject(&mut self, text: String, label: String) {
        let token_stream = BasicTokenStream::new(&self.lexicon, text, label);
        if !token_stream.is_empty() {
            self.front = token_stream.front().unwrap();
            self.stack.push(token_stream);
        }
    }

    pub fn advance(&mut self) {
        let mut i = self.stack.len();
        if i > 0 {
            self.stack[i - 1].advance();
            let mut popped = None;
            while i > 0 && self.stack[i - 1].is_empty() {
                popped = self.stack.pop();
                i -= 1;
            }
            self.front = if i > 0 {
                self.stack[i - 1].front().unwrap()
            } else {
                let end_location = popped.unwrap().location();
                Ok(Token::new(
                    self.lexicon.end_marker(),
                    String::new(),
                    end_location,
                ))
            }
        } else {
            let location = match &self.front {
                Ok(token) => token.location().clone(),
                Err(err) => err.location().clone(),
            };
            self.front = Err(Error::AdvancedWhenEmpty(location));
        }
    }
}

/// The top-level lexer type the parser-table driver consumes: pairs a
/// `Lexicon<T>` with the ability to spin up fresh `TokenStream`s over new
/// input, matching the §6 "Lexer interface (consumed)" contract.
pub struct LexicalAnalyzer<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    lexicon: Arc<Lexicon<T>>,
}

impl<T> LexicalAnalyzer<T>
where
    T: Debug + Display + Copy + Eq + Ord,
{
    pub fn new<'a>(
        literal_lexemes: &[(T, &'a str)],
        regex_lexemes: &[(T, &'a str)],
        skip_rule_patterns: &[&'a str],
        end_marker: T,
    ) -> Result<Self, crate::error::LexiconError<'a, T>> {
        let lexicon = Lexicon::new(literal_lexemes, regex_lexemes, skip_rule_patterns, end_marker)?;
        Ok(Self {
            lexicon: Arc::new(lexicon),
        })
    }

    pub fn token_stream(&self, text: String, label: String) -> TokenStream<T> {
        TokenStream::new(&self.lexicon, text, label)
    }
}
