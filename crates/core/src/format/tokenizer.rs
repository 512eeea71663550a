//! Line-aware tokenizer shared by the text palette formats.

use crate::colour::Colour;
use crate::error::PaletteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub text: &'a str,
    /// 1-based source line.
    pub line: usize,
}

impl Token<'_> {
    /// True if the token starts like an integer.
    pub fn is_numeric(&self) -> bool {
        self.text.starts_with(|c: char| c.is_ascii_digit())
    }
}

/// Splits text into whitespace/separator-delimited tokens, dropping
/// everything after a comment character on each line.
pub(crate) struct Tokenizer<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    last_line: usize,
}

impl<'a> Tokenizer<'a> {
    /// Tokenizes `text` up front. A leading byte-order mark is skipped.
    pub fn new(text: &'a str, separators: &[char], comment: Option<char>) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(move |(i, line)| {
                let content = match comment {
                    Some(c) => line.split_once(c).map_or(line, |(before, _)| before),
                    None => line,
                };
                content
                    .split(move |ch: char| ch.is_whitespace() || separators.contains(&ch))
                    .filter(|t| !t.is_empty())
                    .map(move |text| Token { text, line: i + 1 })
            })
            .collect();
        Self {
            tokens,
            pos: 0,
            last_line: 1,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    /// Consumes the next token and records its line for error reporting.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        self.last_line = token.line;
        Some(token)
    }

    /// Line of the most recently consumed token.
    pub fn line(&self) -> usize {
        self.last_line
    }

    /// Skips any remaining tokens on `line`.
    pub fn skip_line(&mut self, line: usize) {
        while self.peek().is_some_and(|t| t.line == line) {
            self.pos += 1;
        }
    }

    /// Reads one "R G B" triplet and skips the rest of the line it ends on.
    ///
    /// Returns `Ok(None)` if there are no tokens left before the red
    /// component; running out after that is a `MissingComponent` error.
    pub fn read_rgb(&mut self) -> Result<Option<Colour>, PaletteError> {
        if self.peek().is_none() {
            return Ok(None);
        }
        let r = self.read_component("red")?;
        let g = self.read_component("green")?;
        let b = self.read_component("blue")?;
        self.skip_line(self.last_line);
        Ok(Some(Colour::rgb(r, g, b)))
    }

    fn read_component(&mut self, component: &'static str) -> Result<u8, PaletteError> {
        let token = self.next_token().ok_or(PaletteError::MissingComponent {
            component,
            line: self.last_line,
        })?;
        token
            .text
            .parse::<u8>()
            .map_err(|_| PaletteError::InvalidComponent {
                component,
                token: token.text.to_string(),
                line: token.line,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tz: &mut Tokenizer<'a>) -> Vec<&'a str> {
        let next = || tz.next_token().map(|t| t.text);
        std::iter::from_fn(next).collect()
    }

    #[test]
    fn splits_on_whitespace_and_separators() {
        let mut tz = Tokenizer::new("1, 2:3\n  4\t5", &[',', ':'], None);
        assert_eq!(texts(&mut tz), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn drops_comments_to_end_of_line() {
        let mut tz = Tokenizer::new("1 2 # three\n#4\n5", &[], Some('#'));
        assert_eq!(texts(&mut tz), ["1", "2", "5"]);
    }

    #[test]
    fn tracks_line_numbers() {
        let mut tz = Tokenizer::new("a\n\nb", &[], None);
        assert_eq!(tz.next_token().unwrap().line, 1);
        assert_eq!(tz.next_token().unwrap().line, 3);
    }

    #[test]
    fn read_rgb_skips_rest_of_line() {
        let mut tz = Tokenizer::new("1 2 3 Index 0\n4 5 6", &[], None);
        assert_eq!(tz.read_rgb().unwrap(), Some(Colour::rgb(1, 2, 3)));
        assert_eq!(tz.read_rgb().unwrap(), Some(Colour::rgb(4, 5, 6)));
        assert_eq!(tz.read_rgb().unwrap(), None);
    }

    #[test]
    fn read_rgb_reports_missing_component() {
        let mut tz = Tokenizer::new("1 2", &[], None);
        let err = tz.read_rgb().unwrap_err();
        assert!(matches!(
            err,
            PaletteError::MissingComponent {
                component: "blue",
                line: 1
            }
        ));
    }

    #[test]
    fn read_rgb_reports_bad_token_and_line() {
        let mut tz = Tokenizer::new("1 2 3\n4 x 6", &[], None);
        tz.read_rgb().unwrap();
        match tz.read_rgb().unwrap_err() {
            PaletteError::InvalidComponent {
                component,
                token,
                line,
            } => {
                assert_eq!(component, "green");
                assert_eq!(token, "x");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_rgb_rejects_out_of_range() {
        let mut tz = Tokenizer::new("256 0 0", &[], None);
        assert!(matches!(
            tz.read_rgb().unwrap_err(),
            PaletteError::InvalidComponent { component: "red", .. }
        ));
    }

    #[test]
    fn leading_bom_is_ignored() {
        let mut tz = Tokenizer::new("\u{feff}JASC-PAL", &[], None);
        assert_eq!(tz.next_token().unwrap().text, "JASC-PAL");
    }
}
