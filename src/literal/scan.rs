//! Pull-based character scanner shared by the splitter and the field extractor.
//!
//! Tracks quote state and bracket/brace nesting. Inside a quoted region a
//! backslash escapes the next character, so `\"` never closes the string.

use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Character belongs to the current item (verbatim).
    Char(char),
    /// A `,` at nesting depth 0, outside quotes.
    Separator,
}

pub struct Scanner<'a> {
    chars: Chars<'a>,
    depth: i32,
    in_quote: bool,
    escaped: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { chars: text.chars(), depth: 0, in_quote: false, escaped: false }
    }

    /// Outside quotes and every `{}`/`[]` group.
    pub fn at_top_level(&self) -> bool {
        self.depth == 0 && !self.in_quote
    }
}

impl Iterator for Scanner<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let c = self.chars.next()?;
        if self.in_quote {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_quote = false;
            }
            return Some(Event::Char(c));
        }
        match c {
            '"' => self.in_quote = true,
            '{' | '[' => self.depth += 1,
            '}' | ']' => self.depth -= 1,
            ',' if self.depth == 0 => return Some(Event::Separator),
            _ => {}
        }
        Some(Event::Char(c))
    }
}

/// Drop the first and last character (the outer delimiters).
pub fn interior(text: &str) -> &str {
    let Some(first) = text.chars().next() else { return "" };
    let start = first.len_utf8();
    let end = text.char_indices().next_back().map(|(i, _)| i).unwrap_or(0);
    if end <= start { "" } else { &text[start..end] }
}

/// Split `text` (which must start with `"`) after its closing quote.
/// Returns `(quoted_literal_with_quotes, rest)`; `None` if unterminated.
pub fn split_quoted(text: &str) -> Option<(&str, &str)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return None,
    }
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some((&text[..=i], &text[i + 1..]));
        }
    }
    None
}

/// Decode a quoted literal (quotes included) with JSON escape rules.
/// `None` when an escape is not valid JSON.
pub fn unquote(literal: &str) -> Option<String> {
    serde_json::from_str::<String>(literal).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_is_utf8_safe() {
        assert_eq!(interior("[é,ü]"), "é,ü");
        assert_eq!(interior("«x»"), "x");
        assert_eq!(interior("[]"), "");
        assert_eq!(interior("["), "");
        assert_eq!(interior(""), "");
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let events: Vec<Event> = Scanner::new(r#""a\",b",c"#).collect();
        let separators = events.iter().filter(|e| **e == Event::Separator).count();
        assert_eq!(separators, 1);
    }

    #[test]
    fn top_level_state_follows_quotes_and_groups() {
        let mut scanner = Scanner::new(r#"{"a\n"}x"#);
        let mut states = Vec::new();
        while scanner.next().is_some() {
            states.push(scanner.at_top_level());
        }
        // { " a \ n " } x
        assert_eq!(states, vec![false, false, false, false, false, false, true, true]);
    }

    #[test]
    fn split_quoted_finds_closing_quote() {
        assert_eq!(split_quoted(r#""City": "x""#), Some((r#""City""#, r#": "x""#)));
        assert_eq!(split_quoted(r#""a\"b" rest"#), Some((r#""a\"b""#, " rest")));
        assert_eq!(split_quoted(r#""open"#), None);
        assert_eq!(split_quoted("no quote"), None);
    }

    #[test]
    fn unquote_decodes_json_escapes() {
        assert_eq!(unquote(r#""156TH, AVE""#).as_deref(), Some("156TH, AVE"));
        assert_eq!(unquote(r#""say \"hi\"""#).as_deref(), Some("say \"hi\""));
        assert_eq!(unquote(r#""bad \q escape""#), None);
    }
}
