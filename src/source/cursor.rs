//! Character cursor over the program lines
//!
//! The cursor exposes exactly one lookahead character ([`Cursor::look`]) plus
//! its line/column. Blank lines are skipped transparently and the line break
//! itself is never produced as a character: callers that care about line
//! boundaries compare [`Cursor::line`] before and after reading.
//!
//! Teleportation is the only non-sequential movement: [`Cursor::bookmark`]
//! captures the current position and [`Cursor::seek`] restores it verbatim,
//! so previously seen text can be read again.

use super::SourceLocation;
use crate::interpreter::errors::RuntimeError;

/// Lookahead value once the cursor has moved past the last line.
pub const EOF: char = '\0';

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    line: usize,
    column: usize,
}

impl Bookmark {
    /// 0-based line index of the bookmarked position
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Blank characters skipped between tokens
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Characters allowed after the first letter of a name
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

const RETURN_SUFFIX: &str = ".returnValue";

#[derive(Debug, Clone)]
pub struct Cursor {
    lines: Vec<Vec<char>>,
    line: usize,
    column: usize,
    look: char,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        let lines = source.lines().map(|l| l.chars().collect()).collect();
        let mut cursor = Cursor {
            lines,
            line: 0,
            column: 0,
            look: EOF,
        };
        cursor.settle();
        cursor
    }

    /// Moves forward over exhausted and empty lines and reloads the lookahead.
    fn settle(&mut self) {
        while self.line < self.lines.len() && self.column >= self.lines[self.line].len() {
            self.line += 1;
            self.column = 0;
        }
        self.look = match self.lines.get(self.line) {
            Some(line) => line[self.column],
            None => EOF,
        };
    }

    pub fn look(&self) -> char {
        self.look
    }

    /// 0-based index of the line holding the lookahead (one past the last line at EOF)
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_at_end(&self) -> bool {
        self.line >= self.lines.len()
    }

    /// 1-based location of the lookahead, clamped to the last line at EOF
    pub fn location(&self) -> SourceLocation {
        if self.is_at_end() {
            let last = self.lines.len().saturating_sub(1);
            let column = self.lines.get(last).map_or(0, Vec::len);
            SourceLocation::new(last + 1, column + 1)
        } else {
            SourceLocation::new(self.line + 1, self.column + 1)
        }
    }

    /// Human-readable form of the lookahead for error messages
    pub fn describe_look(&self) -> String {
        if self.look == EOF {
            "end of input".to_string()
        } else {
            self.look.to_string()
        }
    }

    pub fn advance(&mut self) -> Result<(), RuntimeError> {
        if self.is_at_end() {
            return Err(RuntimeError::UnterminatedProgram {
                location: self.location(),
            });
        }
        self.column += 1;
        self.settle();
        Ok(())
    }

    pub fn skip_white(&mut self) -> Result<(), RuntimeError> {
        while is_blank(self.look) {
            self.advance()?;
        }
        Ok(())
    }

    /// Consumes `expected`, optionally skipping the blanks that follow it.
    pub fn match_char(&mut self, expected: char, skip_white: bool) -> Result<(), RuntimeError> {
        if self.look != expected {
            return Err(RuntimeError::unexpected(
                expected.to_string(),
                self.describe_look(),
                self.location(),
            ));
        }
        self.advance()?;
        if skip_white {
            self.skip_white()?;
        }
        Ok(())
    }

    /// Consumes a literal keyword character by character, then trailing blanks.
    pub fn match_keyword(&mut self, keyword: &str) -> Result<(), RuntimeError> {
        for c in keyword.chars() {
            if self.look != c {
                return Err(RuntimeError::unexpected(
                    keyword,
                    self.peek_word_or_look(),
                    self.location(),
                ));
            }
            self.advance()?;
        }
        self.skip_white()
    }

    /// Whether the upcoming text on the current line starts with `text`.
    pub fn is_matching(&self, text: &str) -> bool {
        let Some(line) = self.lines.get(self.line) else {
            return false;
        };
        text.chars()
            .enumerate()
            .all(|(i, c)| line.get(self.column + i) == Some(&c))
    }

    /// Character `offset` places after the lookahead on the current line.
    pub fn peek_char(&self, offset: usize) -> char {
        self.lines
            .get(self.line)
            .and_then(|line| line.get(self.column + offset))
            .copied()
            .unwrap_or(EOF)
    }

    /// Remaining characters of the current line, lookahead included.
    pub fn rest_of_line(&self) -> &[char] {
        match self.lines.get(self.line) {
            Some(line) => &line[self.column..],
            None => &[],
        }
    }

    /// The name starting at the lookahead, without consuming it.
    ///
    /// Returns an empty string when the lookahead is not a letter.
    pub fn peek_name(&self) -> String {
        if !self.look.is_ascii_alphabetic() {
            return String::new();
        }
        let rest = self.rest_of_line();
        let mut name: String = rest.iter().take_while(|c| is_name_char(**c)).collect();
        if self.suffix_at(name.len()) {
            name.push_str(RETURN_SUFFIX);
        }
        name
    }

    fn suffix_at(&self, offset: usize) -> bool {
        let rest = self.rest_of_line();
        let suffix: Vec<char> = RETURN_SUFFIX.chars().collect();
        rest.len() >= offset + suffix.len()
            && rest[offset..offset + suffix.len()] == suffix[..]
            && !rest
                .get(offset + suffix.len())
                .is_some_and(|c| is_name_char(*c))
    }

    fn peek_word_or_look(&self) -> String {
        let word = self.peek_name();
        if word.is_empty() {
            self.describe_look()
        } else {
            word
        }
    }

    /// Consumes a name and the blanks after it.
    pub fn read_name(&mut self) -> Result<String, RuntimeError> {
        if !self.look.is_ascii_alphabetic() {
            return Err(RuntimeError::unexpected(
                "name",
                self.describe_look(),
                self.location(),
            ));
        }
        let name = self.peek_name();
        for _ in 0..name.chars().count() {
            self.advance()?;
        }
        self.skip_white()?;
        Ok(name)
    }

    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            line: self.line,
            column: self.column,
        }
    }

    pub fn seek(&mut self, mark: Bookmark) {
        self.line = mark.line;
        self.column = mark.column;
        self.settle();
    }

    /// Teleports to the first character of a 0-based line.
    pub fn seek_line(&mut self, line: usize) {
        self.line = line;
        self.column = 0;
        self.settle();
    }

    /// Drops the rest of the current line (used for `//` comments).
    pub fn skip_line(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.line += 1;
        self.column = 0;
        self.settle();
    }

    /// Skips a quoted literal starting at the lookahead.
    fn skip_quoted(&mut self) -> Result<(), RuntimeError> {
        let quote = self.look;
        let start_line = self.line;
        let location = self.location();
        self.advance()?;
        while self.look != quote {
            if self.line != start_line || self.is_at_end() {
                return Err(RuntimeError::UnterminatedLiteral { quote, location });
            }
            if quote == '\'' && self.look == '\\' {
                self.advance()?;
            }
            self.advance()?;
        }
        self.advance()
    }

    /// Scans forward until `depth` unmatched `close` characters have been seen
    /// and consumes the last one (plus trailing blanks).
    ///
    /// The lookahead itself is the first character examined, so a cursor
    /// sitting on a closer counts it. Brackets inside quoted literals and `//`
    /// comments are ignored.
    pub fn skip_past_close(
        &mut self,
        open: char,
        close: char,
        mut depth: usize,
    ) -> Result<(), RuntimeError> {
        if depth == 0 {
            return Ok(());
        }
        loop {
            let c = self.look;
            if c == EOF {
                return Err(RuntimeError::UnterminatedProgram {
                    location: self.location(),
                });
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else if c == open {
                depth += 1;
            } else if c == '"' || c == '\'' {
                self.skip_quoted()?;
                continue;
            } else if c == '/' && self.peek_char(1) == '/' {
                self.skip_line();
                continue;
            }
            self.advance()?;
        }
        self.match_char(close, true)
    }

    /// Skips forward to the next `target` on the current or following lines.
    pub fn skip_until(&mut self, target: char) -> Result<(), RuntimeError> {
        while self.look != target {
            if self.look == '"' || self.look == '\'' {
                self.skip_quoted()?;
            } else {
                self.advance()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_lines() {
        let mut cursor = Cursor::new("a\n\n\nb");
        assert_eq!(cursor.look(), 'a');
        cursor.advance().unwrap();
        assert_eq!(cursor.look(), 'b');
        assert_eq!(cursor.location().line, 4);
    }

    #[test]
    fn test_advance_past_end_fails() {
        let mut cursor = Cursor::new("x");
        cursor.advance().unwrap();
        assert_eq!(cursor.look(), EOF);
        assert!(matches!(
            cursor.advance(),
            Err(RuntimeError::UnterminatedProgram { .. })
        ));
    }

    #[test]
    fn test_read_name_skips_trailing_blanks() {
        let mut cursor = Cursor::new("count1   = 4");
        assert_eq!(cursor.read_name().unwrap(), "count1");
        assert_eq!(cursor.look(), '=');
    }

    #[test]
    fn test_read_name_with_return_suffix() {
        let mut cursor = Cursor::new("square.returnValue + 1");
        assert_eq!(cursor.peek_name(), "square.returnValue");
        assert_eq!(cursor.read_name().unwrap(), "square.returnValue");
        assert_eq!(cursor.look(), '+');
    }

    #[test]
    fn test_match_keyword_mismatch() {
        let mut cursor = Cursor::new("whole");
        let err = cursor.match_keyword("while").unwrap_err();
        assert!(matches!(err, RuntimeError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_bookmark_round_trip() {
        let mut cursor = Cursor::new("abc\ndef");
        cursor.advance().unwrap();
        let mark = cursor.bookmark();
        cursor.advance().unwrap();
        cursor.advance().unwrap();
        assert_eq!(cursor.look(), 'd');
        cursor.seek(mark);
        assert_eq!(cursor.look(), 'b');
        assert_eq!(cursor.location(), SourceLocation::new(1, 2));
    }

    #[test]
    fn test_skip_past_close_counts_nesting() {
        let mut cursor = Cursor::new("a [b] c]  next");
        cursor.skip_past_close('[', ']', 1).unwrap();
        assert_eq!(cursor.look(), 'n');
    }

    #[test]
    fn test_skip_past_close_ignores_quoted_brackets() {
        let mut cursor = Cursor::new("output \"]\" x ']' ] done");
        cursor.skip_past_close('[', ']', 1).unwrap();
        assert_eq!(cursor.read_name().unwrap(), "done");
    }

    #[test]
    fn test_skip_past_close_on_closer() {
        let mut cursor = Cursor::new("]] after");
        cursor.skip_past_close('[', ']', 2).unwrap();
        assert_eq!(cursor.look(), 'a');
    }

    #[test]
    fn test_is_matching_does_not_consume() {
        let cursor = Cursor::new("outputNL x");
        assert!(cursor.is_matching("output"));
        assert!(!cursor.is_matching("outputs"));
        assert_eq!(cursor.look(), 'o');
    }
}
