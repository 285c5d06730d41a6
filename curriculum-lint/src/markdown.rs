//! Line-oriented markdown heuristics.
//!
//! No markdown parser: tables, lists, emphasis and headings are checked by
//! counting delimiters line by line. Fenced code blocks are skipped. Line
//! numbers are 1-indexed within the checked string.

use std::sync::LazyLock;

use regex::Regex;

static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^(\s*)([-*+])\s+\S") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid bullet regex: {err}"),
});

static ATX_HEADING: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^\s{0,3}(#{1,6})\s+\S") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid heading regex: {err}"),
});

static SEPARATOR_CELL: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^:?-+:?$") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid table separator regex: {err}"),
});

const BOX_DRAWING: std::ops::RangeInclusive<char> = '\u{2500}'..='\u{257f}';

/// A problem found at one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub message: String,
}

impl Finding {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn is_thematic_break(line: &str) -> bool {
    let marks: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    marks.len() >= 3 && marks.iter().all(|c| *c == marks[0]) && matches!(marks[0], '*' | '-' | '_')
}

/// Lines outside fenced code, right-trimmed, with their line numbers.
#[must_use]
pub fn prose_lines(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for (i, line) in text.split('\n').enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            out.push((i + 1, line.trim_end()));
        }
    }
    out
}

/// Length in characters, ignoring whitespace at line ends.
///
/// Used for every length comparison so whitespace fixes never change a verdict.
#[must_use]
pub fn prose_len(text: &str) -> usize {
    text.split('\n')
        .map(|line| line.trim_end().chars().count())
        .sum::<usize>()
        .saturating_add(text.trim_end().matches('\n').count())
}

/// Group consecutive lines satisfying `pred` into blocks.
fn blocks<'a>(
    lines: &[(usize, &'a str)],
    pred: impl Fn(&str) -> bool,
) -> Vec<Vec<(usize, &'a str)>> {
    let mut out: Vec<Vec<(usize, &str)>> = Vec::new();
    let mut prev_line = 0;
    for &(no, line) in lines {
        if !pred(line) {
            prev_line = 0;
            continue;
        }
        match out.last_mut() {
            Some(block) if prev_line != 0 && no == prev_line + 1 => block.push((no, line)),
            _ => out.push(vec![(no, line)]),
        }
        prev_line = no;
    }
    out
}

fn table_cells(line: &str) -> Vec<String> {
    let unescaped = line.trim().replace("\\|", "\u{0}");
    let inner = unescaped.strip_prefix('|').unwrap_or(&unescaped);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner
        .split('|')
        .map(|cell| cell.trim().replace('\u{0}', "|"))
        .collect()
}

fn is_separator_row(row: &str) -> bool {
    table_cells(row)
        .iter()
        .all(|cell| SEPARATOR_CELL.is_match(cell))
}

fn unescaped_pipes(line: &str) -> usize {
    line.replace("\\|", "").matches('|').count()
}

/// Tables need a header separator row and the same column count on every row.
///
/// A run of `|`-led lines is only a table if its first line has at least two
/// pipes or a separator row follows it; a lone `| Dolor` is bilingual prose.
#[must_use]
pub fn check_tables(text: &str) -> Vec<Finding> {
    let lines = prose_lines(text);
    let mut findings = Vec::new();

    for table in blocks(&lines, |l| l.trim_start().starts_with('|')) {
        let (header_no, header) = table[0];
        let has_separator = table.get(1).is_some_and(|(_, row)| is_separator_row(row));
        if !has_separator && unescaped_pipes(header) < 2 {
            continue;
        }
        let columns = table_cells(header).len();

        if !has_separator {
            findings.push(Finding::new(
                header_no,
                "table has no header separator row (e.g. `| --- | --- |`)",
            ));
        }

        for &(no, row) in table.iter().skip(1) {
            let count = table_cells(row).len();
            if count != columns {
                findings.push(Finding::new(
                    no,
                    format!("table row has {count} columns, header has {columns}"),
                ));
            }
        }
    }
    findings
}

/// Bullet markers (`-`, `*`, `+`) must agree within a list at each indent.
#[must_use]
pub fn check_list_markers(text: &str) -> Vec<Finding> {
    let lines = prose_lines(text);
    let mut findings = Vec::new();
    let mut seen: Vec<(usize, char)> = Vec::new();

    for (no, line) in lines {
        if line.is_empty() {
            continue;
        }
        let item = BULLET_ITEM
            .captures(line)
            .filter(|_| !is_thematic_break(line));
        let Some(caps) = item else {
            // A non-indented non-list line ends the list.
            if !line.starts_with(char::is_whitespace) {
                seen.clear();
            }
            continue;
        };
        let indent = caps.get(1).map_or(0, |m| m.as_str().len());
        let marker = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or('-');

        match seen.iter().find(|(i, _)| *i == indent) {
            Some(&(_, first)) if first != marker => findings.push(Finding::new(
                no,
                format!("bullet marker '{marker}' differs from '{first}' used earlier in this list"),
            )),
            Some(_) => {}
            None => seen.push((indent, marker)),
        }
    }
    findings
}

/// Drop inline code spans and escaped characters; `None` if backticks are unbalanced.
fn strip_code(paragraph: &str) -> Option<String> {
    let mut out = String::with_capacity(paragraph.len());
    let mut in_code = false;
    let mut chars = paragraph.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '`' => in_code = !in_code,
            _ if !in_code => out.push(c),
            _ => {}
        }
    }
    (!in_code).then_some(out)
}

fn count_single_stars(line: &str) -> usize {
    let chars: Vec<char> = line.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, c)| {
            if *c != '*' {
                return false;
            }
            let before = i.checked_sub(1).and_then(|j| chars.get(j));
            let after = chars.get(i + 1);
            let spaced = |c: Option<&char>| c.is_none_or(|c| c.is_whitespace());
            // `a * b` is arithmetic and `* item` a bullet, not emphasis.
            !(spaced(before) && spaced(after))
        })
        .count()
}

/// Emphasis and code markers must balance within each paragraph.
#[must_use]
pub fn check_emphasis(text: &str) -> Vec<Finding> {
    let lines = prose_lines(text);
    let mut findings = Vec::new();

    for paragraph in blocks(&lines, |l| !l.is_empty()) {
        let start = paragraph[0].0;
        let joined = paragraph
            .iter()
            .map(|(_, line)| *line)
            .collect::<Vec<_>>()
            .join("\n");

        let Some(plain) = strip_code(&joined) else {
            findings.push(Finding::new(start, "unbalanced '`' code marker in paragraph"));
            continue;
        };
        if plain.matches("**").count() % 2 == 1 {
            findings.push(Finding::new(start, "unbalanced '**' emphasis in paragraph"));
        }
        let singles: usize = plain
            .replace("**", "")
            .split('\n')
            .map(count_single_stars)
            .sum();
        if singles % 2 == 1 {
            findings.push(Finding::new(start, "unbalanced '*' emphasis in paragraph"));
        }
    }
    findings
}

/// Heading levels must not skip (`#` then `###`).
#[must_use]
pub fn check_headings(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut previous: Option<usize> = None;
    for (no, line) in prose_lines(text) {
        let Some(caps) = ATX_HEADING.captures(line) else {
            continue;
        };
        let level = caps.get(1).map_or(1, |m| m.as_str().len());
        if let Some(prev) = previous
            && level > prev + 1
        {
            findings.push(Finding::new(
                no,
                format!("heading jumps from h{prev} to h{level}"),
            ));
        }
        previous = Some(level);
    }
    findings
}

/// Lines containing Unicode box-drawing characters.
#[must_use]
pub fn box_drawing_lines(text: &str) -> Vec<usize> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| line.chars().any(|c| BOX_DRAWING.contains(&c)))
        .map(|(i, _)| i + 1)
        .collect()
}

/// Lines ending in spaces, tabs or a carriage return.
#[must_use]
pub fn trailing_whitespace_lines(text: &str) -> Vec<usize> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| line.len() != line.trim_end().len())
        .map(|(i, _)| i + 1)
        .collect()
}

#[must_use]
pub fn trim_trailing_whitespace(text: &str) -> String {
    text.split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_bullet(line: &str) -> bool {
    BULLET_ITEM.is_match(line) && !is_thematic_break(line)
}

/// Rewrite `*` and `+` bullets to `-`, leaving fenced code alone.
///
/// Only lists of two or more items are touched, so a lone prose line such as
/// `+ 2 points for fever` keeps its marker. Lists are delimited the same way
/// [`check_list_markers`] delimits them.
#[must_use]
pub fn normalize_bullets(text: &str) -> String {
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    let mut lists: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut in_fence = false;

    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            lists.push(std::mem::take(&mut current));
            continue;
        }
        if in_fence || line.trim().is_empty() {
            continue;
        }
        if is_bullet(line) {
            current.push(i);
        } else if !line.starts_with(char::is_whitespace) {
            lists.push(std::mem::take(&mut current));
        }
    }
    lists.push(current);

    for i in lists.into_iter().filter(|list| list.len() >= 2).flatten() {
        let marker = BULLET_ITEM
            .captures(&lines[i])
            .and_then(|caps| caps.get(2))
            .filter(|m| m.as_str() != "-")
            .map(|m| m.range());
        if let Some(range) = marker {
            lines[i].replace_range(range, "-");
        }
    }
    lines.join("\n")
}
