//! Reads architecture decision records written by adr-tools.
//!
//! A record lives in a file named `NNNN-slug.md` and looks like:
//!
//! ```text
//! # 2. Use Postgres
//!
//! Date: 2024-03-01
//!
//! ## Status
//!
//! Accepted
//!
//! Supersedes [1. Use MySQL](0001-use-mysql.md)
//! ```
//!
//! The number in the file name is the decision id. The first word of the
//! status section is the status, and every link in that section to another
//! record becomes a decision link described by the text before it.

use cartograph_core::documentation::Decision;

/// Extension of the files `!adrs` reads.
pub(crate) const DECISION_EXTENSION: &str = "md";

/// Builds a decision from the record named `name`.
pub(crate) fn read_decision(name: &str, content: &str) -> Result<Decision, String> {
    let file = file_name(name);
    let id = record_number(file).ok_or_else(|| {
        format!("`{file}` is not named like a decision record, expected e.g. `0001-title.md`")
    })?;

    let title = content
        .lines()
        .find_map(|line| line.trim().strip_prefix("# "))
        .map(strip_numbering)
        .ok_or_else(|| format!("`{file}` has no `# N. Title` heading"))?;

    let mut decision = Decision::new(&id, title).with_content(content);

    if let Some(date) = content
        .lines()
        .find_map(|line| line.trim().strip_prefix("Date:"))
        .map(str::trim)
    {
        if !is_date(date) {
            return Err(format!("`{date}` in `{file}` is not a date, expected yyyy-mm-dd"));
        }
        decision = decision.with_date(date);
    }

    let mut status_lines = status_section(content);
    if let Some(first) = status_lines.next() {
        let status = first
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(|c: char| c.is_ascii_punctuation());
        decision = decision.with_status(status);
        for line in std::iter::once(first).chain(status_lines) {
            for (target, description) in links(line) {
                decision = decision.with_link(&target, description);
            }
        }
    }

    Ok(decision)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The leading number of a record file name, without leading zeros.
fn record_number(file: &str) -> Option<String> {
    let digits: &str = &file[..file.find(|c: char| !c.is_ascii_digit()).unwrap_or(file.len())];
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

/// `2. Use Postgres` becomes `Use Postgres`.
fn strip_numbering(title: &str) -> &str {
    let title = title.trim();
    let rest = title.trim_start_matches(|c: char| c.is_ascii_digit());
    match rest.strip_prefix(". ") {
        Some(stripped) if rest.len() < title.len() => stripped.trim(),
        _ => title,
    }
}

fn is_date(s: &str) -> bool {
    s.len() == 10
        && s.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        })
}

/// Non-blank lines under the `## Status` heading.
fn status_section(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .skip_while(|line| !line.eq_ignore_ascii_case("## status"))
        .skip(1)
        .take_while(|line| !line.starts_with('#'))
        .filter(|line| !line.is_empty())
}

/// Links to other records in `line`, as (target id, description) pairs.
fn links(line: &str) -> Vec<(String, &str)> {
    let mut found = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find("](").map(|i| open + i) else {
            break;
        };
        let Some(end) = rest[close..].find(')').map(|i| close + i) else {
            break;
        };
        if let Some(id) = record_number(file_name(&rest[close + 2..end])) {
            found.push((id, rest[..open].trim()));
        }
        rest = &rest[end + 1..];
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPERSEDING: &str = "# 3. Use Postgres

Date: 2024-03-01

## Status

Accepted

Supersedes [1. Use MySQL](0001-use-mysql.md)

Amends [2. Use an ORM](0002-use-an-orm.md)

## Context

MySQL licensing changed.
";

    #[test]
    fn test_reads_adr_tools_record() {
        let decision = read_decision("docs/adr/0003-use-postgres.md", SUPERSEDING).unwrap();

        assert_eq!(decision.id(), "3");
        assert_eq!(decision.title(), "Use Postgres");
        assert_eq!(decision.date(), "2024-03-01");
        assert_eq!(decision.status(), "Accepted");
        assert_eq!(decision.content(), SUPERSEDING);
        let links: Vec<_> = decision
            .links()
            .map(|l| (l.id(), l.description()))
            .collect();
        assert_eq!(links, vec![("1", "Supersedes"), ("2", "Amends")]);
    }

    #[test]
    fn test_status_line_with_link_uses_first_word() {
        let content = "# 1. Use MySQL\n\nDate: 2023-01-10\n\n## Status\n\n\
                       Superseded by [3. Use Postgres](0003-use-postgres.md)\n";

        let decision = read_decision("0001-use-mysql.md", content).unwrap();

        assert_eq!(decision.status(), "Superseded");
        let links: Vec<_> = decision
            .links()
            .map(|l| (l.id(), l.description()))
            .collect();
        assert_eq!(links, vec![("3", "Superseded by")]);
    }

    #[test]
    fn test_external_links_are_not_decision_links() {
        let content = "# 4. Use Kafka\n\n## Status\n\nProposed, see [the RFC](https://example.com/rfc)\n";

        let decision = read_decision("0004-use-kafka.md", content).unwrap();

        assert_eq!(decision.status(), "Proposed");
        assert_eq!(decision.links().count(), 0);
        assert_eq!(decision.date(), "");
    }

    #[test]
    fn test_file_must_be_numbered() {
        let err = read_decision("docs/adr/README.md", "# Decisions").unwrap_err();
        assert!(err.contains("README.md"));
    }

    #[test]
    fn test_heading_is_required() {
        assert!(read_decision("0001-x.md", "Date: 2024-01-01").is_err());
    }

    #[test]
    fn test_date_must_be_iso() {
        let err = read_decision("0001-x.md", "# 1. X\n\nDate: 1st March\n").unwrap_err();
        assert!(err.contains("1st March"));
    }

    #[test]
    fn test_record_numbers_drop_leading_zeros() {
        assert_eq!(record_number("0010-x.md").as_deref(), Some("10"));
        assert_eq!(record_number("0000-x.md").as_deref(), Some("0"));
        assert_eq!(record_number("x.md"), None);
    }
}
