//! Splits source text into logical lines.
//!
//! A physical line ending in an unquoted ` \` continues onto the next one.
//! The continuation marker and line break are replaced by spaces of the same
//! width, so a byte offset into a logical line plus the line's `offset` is a
//! byte offset into the source. Lines inside `/* ... */` block comments are
//! dropped here, before the lexer sees them.

use crate::{
    error::{Diagnostic, ErrorCode, Result, SourceLine},
    span::Span,
};

/// One statement's worth of source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// Byte offset of the line in the source.
    pub offset: usize,
    pub text: String,
}

/// Physical lines with their byte offsets and terminator widths.
fn physical_lines(source: &str) -> impl Iterator<Item = (usize, &str, usize)> {
    let mut offset = 0;
    source.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let content = raw.trim_end_matches(['\n', '\r']);
        (start, content, raw.len() - content.len())
    })
}

/// Whether `line` ends with a continuation marker outside of quotes.
fn continues(line: &str) -> bool {
    let trimmed = line.trim_end();
    let Some(before) = trimmed.strip_suffix('\\') else {
        return false;
    };
    if !(before.is_empty() || before.ends_with(char::is_whitespace)) {
        return false;
    }

    let mut quote = None;
    let mut chars = before.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            _ => {}
        }
    }
    quote.is_none()
}

/// Splits `source` into logical lines.
///
/// `file` names an included source in the diagnostic for an unterminated
/// block comment.
pub(crate) fn logical_lines(source: &str, file: Option<&str>) -> Result<Vec<LogicalLine>> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;
    let mut comment_start: Option<(usize, usize, usize)> = None;

    for (number, (offset, content, terminator)) in physical_lines(source).enumerate() {
        let number = number + 1;
        let trimmed = content.trim();

        if pending.is_none() {
            if comment_start.is_some() {
                if trimmed.ends_with("*/") {
                    comment_start = None;
                }
                continue;
            }
            if trimmed.starts_with("/*") {
                let closed = trimmed.len() >= 4 && trimmed.ends_with("*/");
                if !closed {
                    comment_start = Some((number, offset, content.len()));
                }
                continue;
            }
        }

        let mut line = pending.take().unwrap_or_else(|| LogicalLine {
            number,
            offset,
            text: String::new(),
        });

        if continues(content) {
            let marker = content.trim_end().len() - 1;
            line.text.push_str(&content[..marker]);
            line.text.push_str(&" ".repeat(content.len() - marker + terminator));
            pending = Some(line);
        } else {
            line.text.push_str(content);
            lines.push(line);
        }
    }

    if let Some(line) = pending {
        lines.push(line);
    }
    if let Some((number, offset, len)) = comment_start {
        return Err(Diagnostic::error("unterminated block comment")
            .with_code(ErrorCode::E002)
            .with_label(Span::new(offset..offset + len), "comment opened here")
            .with_help("close the comment with `*/` at the end of a line")
            .with_line(SourceLine::new(
                file.map(str::to_string),
                number,
                offset,
                &source[offset..offset + len],
            )));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        logical_lines(source, None)
            .unwrap()
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn test_lines_keep_numbers_and_offsets() {
        let lines = logical_lines("workspace {\n  model {\r\n  }\n}", None).unwrap();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].number, 2);
        assert_eq!(lines[1].offset, 12);
        assert_eq!(lines[1].text, "  model {");
        assert_eq!(lines[2].offset, 23);
    }

    #[test]
    fn test_continuation_preserves_offsets() {
        let source = "a -> b \\\n  \"Uses\"\nnext";
        let lines = logical_lines(source, None).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text.len(), source.find("\nnext").unwrap());
        let quote = lines[0].text.find("\"Uses\"").unwrap();
        assert_eq!(&source[quote..quote + 6], "\"Uses\"");
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_backslash_inside_quotes_does_not_continue() {
        assert_eq!(texts("a \"b \\\nc"), vec!["a \"b \\", "c"]);
        assert_eq!(texts("path\\\nnext"), vec!["path\\", "next"]);
    }

    #[test]
    fn test_block_comments_are_dropped() {
        let source = "a\n/* one\n two */\n/* single */\nb";
        assert_eq!(texts(source), vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = logical_lines("a\n/* never closed\nb", Some("model.dsl")).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E002));
        assert_eq!(err.labels()[0].span().start(), 2);
        assert_eq!(err.line().and_then(SourceLine::file), Some("model.dsl"));
        assert_eq!(err.line().map(SourceLine::number), Some(2));
    }
}
