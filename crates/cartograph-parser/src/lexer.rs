//! Lexical analyzer for logical lines.
//!
//! Whitespace outside quotes separates tokens. `"..."` and `'...'` spans are
//! single tokens with the quotes stripped; inside them `\"`, `\'` and `\\`
//! are resolved and any other backslash sequence is kept verbatim. An
//! unquoted token starting with `//` discards the rest of the line, and so
//! does a first token starting with `#`.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{none_of, one_of, rest, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
    tokens::{Token, Tokens},
};

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// What a single step of the lexer produced.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme<'a> {
    Bare(&'a str),
    Quoted(String),
    Comment,
    Whitespace,
}

/// Parse one character of quoted content, resolving the escapes the DSL
/// knows and keeping other backslashes as written.
fn quoted_char<'a>(quote: char) -> impl FnMut(&mut Input<'a>) -> IResult<char> {
    move |input: &mut Input<'a>| {
        alt((
            preceded('\\', one_of(['"', '\'', '\\'])),
            terminated('\\', peek(none_of(['"', '\'', '\\']))),
            none_of([quote, '\\']),
        ))
        .parse_next(input)
    }
}

/// Parse a `"..."` or `'...'` token.
fn quoted<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    let start = input.current_token_start();
    let quote = one_of(['"', '\'']).parse_next(input)?;

    let content = repeat(0.., quoted_char(quote)).fold(String::new, |mut acc, c| {
        acc.push(c);
        acc
    });

    cut_err(terminated(content, quote))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string",
            help: Some("add the closing quote"),
            start,
        })
        .map(Lexeme::Quoted)
        .parse_next(input)
}

/// Parse a `//` comment running to the end of the line.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    preceded("//", rest).value(Lexeme::Comment).parse_next(input)
}

fn bare<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    take_while(1.., |c: char| !c.is_whitespace())
        .map(Lexeme::Bare)
        .parse_next(input)
}

fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    take_while(1.., char::is_whitespace)
        .value(Lexeme::Whitespace)
        .parse_next(input)
}

fn lexeme<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    alt((
        whitespace,
        line_comment, // Must come before bare tokens
        quoted,       // Must come before bare tokens
        bare,
    ))
    .parse_next(input)
}

/// Lexer that accumulates the tokens of one logical line.
struct Lexer {
    tokens: Vec<Token>,
    /// Byte offset of the line in its source file.
    offset: usize,
}

impl Lexer {
    fn new(offset: usize) -> Self {
        Self {
            tokens: Vec::new(),
            offset,
        }
    }

    fn tokenize(&mut self, mut input: Input<'_>) -> Result<()> {
        while !input.is_empty() {
            if self.tokens.is_empty() && input.starts_with('#') {
                break;
            }

            let start = input.current_token_start();
            let lexeme = lexeme(&mut input).map_err(|err| {
                let error_pos = input.current_token_start();
                self.convert_err_mode(err, error_pos)
            })?;
            let span = Span::new(start..input.current_token_start()).shifted(self.offset);

            match lexeme {
                Lexeme::Bare(text) => self.tokens.push(Token::new(text, span, false)),
                Lexeme::Quoted(text) => self.tokens.push(Token::new(text, span, true)),
                Lexeme::Comment => break,
                Lexeme::Whitespace => {}
            }
        }
        Ok(())
    }

    fn finish(self) -> Tokens {
        Tokens::new(self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context. Falls back to a
    /// generic E001 covering the rest of the line, since a quote is the only
    /// thing that can fail to lex.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        let (code, message, help, start) = match context_error.context().next() {
            Some(LexerDiagnostic {
                code,
                message,
                help,
                start,
            }) => (*code, *message, *help, *start),
            None => (ErrorCode::E001, "unterminated string", None, error_pos),
        };

        let span = Span::new(start..error_pos.max(start + 1)).shifted(self.offset);
        let mut diag = Diagnostic::error(message)
            .with_code(code)
            .with_label(span, code.description());
        if let Some(h) = help {
            diag = diag.with_help(h);
        }
        diag
    }
}

/// Split one logical line into tokens.
///
/// `offset` is the byte offset of the line in its source; token spans are
/// relative to the source, not the line.
pub(crate) fn tokenize(line: &str, offset: usize) -> Result<Tokens> {
    let mut lexer = Lexer::new(offset);
    lexer.tokenize(LocatingSlice::new(line))?;
    Ok(lexer.finish())
}
