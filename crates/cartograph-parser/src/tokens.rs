//! The token sequence of one logical line.

use std::{borrow::Cow, fmt};

use crate::span::Span;

/// Reserved token joining the two ends of a relationship.
pub(crate) const RELATIONSHIP_TOKEN: &str = "->";
pub(crate) const BLOCK_START_TOKEN: &str = "{";
pub(crate) const BLOCK_END_TOKEN: &str = "}";
/// Separates an optional identifier from the statement it names: `id = ...`.
pub(crate) const ASSIGNMENT_TOKEN: &str = "=";

/// A lexed token: its text with quotes stripped and escapes resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    span: Span,
    quoted: bool,
}

impl Token {
    pub(crate) fn new(text: impl Into<String>, span: Span, quoted: bool) -> Self {
        Self {
            text: text.into(),
            span,
            quoted,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Whether the token was written in quotes.
    ///
    /// A quoted `{` or `->` is plain text, never punctuation.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Whether this is the unquoted punctuation `symbol`.
    pub(crate) fn is(&self, symbol: &str) -> bool {
        !self.quoted && self.text == symbol
    }
}

/// An ordered token list with the bounds-safe queries the grammars use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    tokens: Vec<Token>,
}

impl Tokens {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Text of the token at `index`, if there is one.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(Token::text)
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Text at `index`, or the empty string when the line is shorter.
    pub fn get_or_empty(&self, index: usize) -> &str {
        self.get(index).unwrap_or_default()
    }

    /// Whether there are tokens beyond `index`, i.e. more than `index + 1`.
    pub fn has_more_than(&self, index: usize) -> bool {
        self.tokens.len() > index + 1
    }

    /// Whether a token exists at `index`.
    pub fn includes(&self, index: usize) -> bool {
        index < self.tokens.len()
    }

    /// Whether the token at `index` is the unquoted punctuation `symbol`.
    pub(crate) fn is_at(&self, index: usize, symbol: &str) -> bool {
        self.tokens.get(index).is_some_and(|t| t.is(symbol))
    }

    /// Span of the token at `index`; past the end, an empty span after the
    /// last token.
    pub fn span(&self, index: usize) -> Span {
        match self.tokens.get(index) {
            Some(token) => token.span,
            None => {
                let end = self.tokens.last().map_or(0, |t| t.span.end());
                Span::new(end..end)
            }
        }
    }

    /// Span from the token at `index` to the end of the line.
    pub fn span_from(&self, index: usize) -> Span {
        let start = self.span(index);
        self.tokens
            .last()
            .map_or(start, |last| start.union(last.span))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::text).collect()
    }

    /// The tokens after the first `count`.
    pub(crate) fn skip(&self, count: usize) -> Tokens {
        Tokens::new(self.tokens.iter().skip(count).cloned().collect())
    }

    /// Removes a trailing unquoted `{`, returning whether there was one.
    pub(crate) fn strip_block_start(&mut self) -> bool {
        if self.tokens.last().is_some_and(|t| t.is(BLOCK_START_TOKEN)) {
            self.tokens.pop();
            true
        } else {
            false
        }
    }

    /// Rebuild source text that lexes back to these tokens.
    pub fn to_source(&self) -> String {
        self.tokens
            .iter()
            .map(|t| quote(&t.text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// Quote `text` if lexing it bare would not give it back unchanged.
pub fn quote(text: &str) -> Cow<'_, str> {
    let needs_quotes = text.is_empty()
        || text.starts_with("//")
        || text.starts_with('#')
        || text.starts_with("/*")
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if !needs_quotes {
        return Cow::Borrowed(text);
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(texts: &[&str]) -> Tokens {
        let mut offset = 0;
        Tokens::new(
            texts
                .iter()
                .map(|t| {
                    let token = Token::new(*t, Span::new(offset..offset + t.len()), false);
                    offset += t.len() + 1;
                    token
                })
                .collect(),
        )
    }

    #[test]
    fn test_bounds_queries() {
        let t = tokens(&["a", "->", "b", "Uses"]);

        assert!(t.has_more_than(2));
        assert!(!t.has_more_than(3));
        assert!(t.includes(3));
        assert!(!t.includes(4));
        assert_eq!(t.get(4), None);
        assert_eq!(t.get_or_empty(4), "");
        assert!(t.is_at(1, RELATIONSHIP_TOKEN));
    }

    #[test]
    fn test_span_past_end_points_after_last_token() {
        let t = tokens(&["a", "->"]);

        assert_eq!(t.span(5), Span::new(4..4));
        assert_eq!(t.span_from(0), Span::new(0..4));
    }

    #[test]
    fn test_strip_block_start() {
        let mut t = tokens(&["model", "{"]);
        assert!(t.strip_block_start());
        assert_eq!(t.texts(), vec!["model"]);

        let mut quoted = Tokens::new(vec![Token::new("{", Span::default(), true)]);
        assert!(!quoted.strip_block_start());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote(""), "\"\"");
        assert_eq!(quote("Uses API"), "\"Uses API\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("//not-a-comment"), "\"//not-a-comment\"");
        assert_eq!(quote("https://example.com"), "https://example.com");
    }
}
