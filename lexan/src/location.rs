use std::fmt;

/// Human friendly location of a lexeme within a labelled piece of source text.
///
/// Tracks line/column for error messages; the parser core only ever asks for
/// [`Location::offset`]-style byte positions via [`crate::Token::location`],
/// per the core's Non-goal of not tracking source location beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    line_number: usize,
    offset: usize,
    label: String,
}

impl Location {
    pub fn new(label: String) -> Self {
        Self {
            line_number: 1,
            offset: 1,
            label,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn new_line(&mut self) {
        self.line_number += 1;
        self.offset = 1;
    }

    pub(crate) fn advance_column(&mut self, columns: usize) {
        self.offset += columns;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.label.is_empty() {
            if self.label.contains(' ') || self.label.contains('\t') {
                write!(f, "\"{}\":{}:{}", self.label, self.line_number, self.offset)
            } else {
                write!(f, "{}:{}:{}", self.label, self.line_number, self.offset)
            }
        } else {
            write!(f, "{}:{}", self.line_number, self.offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_location() {
        let location = Location {
            line_number: 10,
            offset: 15,
            label: "whatever".to_string(),
        };
        assert_eq!(format!("{}", location), "whatever:10:15");
        let location = Location {
            line_number: 9,
            offset: 23,
            label: "".to_string(),
        };
        assert_eq!(format!("{}", location), "9:23");
    }
}
