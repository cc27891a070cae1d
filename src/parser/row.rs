//! Row-to-post extraction.
//!
//! One listing row is six `<td>` cells in fixed order: institution,
//! program, decision block, status, post date, comment block. Each field
//! goes through its own extractor from [`super::field`]; only a missing
//! post id rejects the row, since without it the post cannot be
//! deduplicated or stored.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Node, Selector};

use crate::models::Post;
use crate::parser::field::{self, Extracted, FieldError};
use crate::parser::stats;

/// Cells a structurally valid row must have.
pub const CELLS_PER_ROW: usize = 6;

fn decision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.*)\s*via\s*(.*)\s*on\s*(.*)").unwrap())
}

fn gre_general_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.*)/(.*)/(.*)").unwrap())
}

fn reply_link_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse(r#"a[href^="/result/"]"#).unwrap())
}

fn stats_span_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("span").unwrap())
}

/// Parse one 6-cell row into a post.
///
/// Returns `None` only when no usable reply-link id can be found; every
/// other field failure is logged and degrades to an absent field.
pub fn parse_row(cells: &[ElementRef<'_>]) -> Option<Post> {
    debug_assert_eq!(cells.len(), CELLS_PER_ROW);

    let id = post_id(cells[5]).into_option("id")?;
    let mut post = Post::new(id);

    post.school = whole_text(cells[0]).into_option("school");
    post.program = whole_text(cells[1]).into_option("program");

    if let Some((decision, medium, date)) =
        decision_triple(cells[2]).into_option("decision_medium_and_date")
    {
        post.decision = field::non_empty(&decision).into_option("decision");
        post.medium = field::non_empty(&medium).into_option("medium");
        post.decision_date = field::date(&date).into_option("decision_date");
    }

    if let Some(block) = cells[2].select(stats_span_selector()).next() {
        let groups = stats::stat_groups(block);
        if groups.len() != stats::EXPECTED_GROUPS {
            log::warn!(
                "Unexpected stats layout with {} groups: {groups:?}",
                groups.len()
            );
        }

        post.gpa = gpa(&groups).into_option("gpa");
        post.gre_subject = gre_subject(&groups).into_option("gre_subject");

        if let Some((verbal, quant, writing)) =
            gre_general(&groups).into_option("gre_general")
        {
            post.gre_verbal = gre_score(&verbal).into_option("gre_verbal");
            post.gre_quant = gre_score(&quant).into_option("gre_quant");
            post.gre_writing = gre_score(&writing).into_option("gre_writing");
        }
    }

    post.status = whole_text(cells[3]).into_option("status");
    post.post_date = field::date(&cell_text(cells[4])).into_option("post_date");
    post.comment = comment(cells[5]).into_option("comment");

    Some(post)
}

/// All text under a cell, concatenated.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect()
}

fn whole_text(cell: ElementRef<'_>) -> Extracted<String> {
    field::non_empty(&cell_text(cell))
}

/// First direct non-blank text child of a cell, nested markup ignored.
fn leading_text(cell: ElementRef<'_>) -> Option<String> {
    cell.children().find_map(|child| match child.value() {
        Node::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    })
}

/// First direct child element with the given tag name.
fn direct_child(cell: ElementRef<'_>, name: &str) -> Option<ElementRef<'_>> {
    cell.children()
        .find_map(|child| ElementRef::wrap(child).filter(|e| e.value().name() == name))
}

/// The decision cell's leading line, matched as `<A> via <B> on <C>`.
///
/// Some rows wrap the decision word in a direct `<strong>`; its text is
/// prepended to the first direct text node before matching.
fn decision_triple(cell: ElementRef<'_>) -> Extracted<(String, String, String)> {
    let mut tokens: Vec<String> = Vec::new();
    if let Some(strong) = direct_child(cell, "strong") {
        tokens.push(strong.text().collect());
    }
    if let Some(text) = leading_text(cell) {
        tokens.push(text);
    }

    let line = tokens.join(" ").trim().to_string();
    if line.is_empty() {
        return Extracted::Absent;
    }

    match decision_re().captures(&line) {
        Some(caps) => Extracted::Value((
            caps[1].trim().to_string(),
            caps[2].trim().to_string(),
            caps[3].trim().to_string(),
        )),
        None => Extracted::Failed(FieldError::Pattern(line)),
    }
}

fn gpa(groups: &[Vec<String>]) -> Extracted<f64> {
    match stats::group_value(groups, stats::GROUP_GPA) {
        Some(value) => field::numeric(value),
        None => Extracted::Absent,
    }
}

/// The GRE General "V/Q/W" line split into its three components.
fn gre_general(groups: &[Vec<String>]) -> Extracted<(String, String, String)> {
    let Some(value) = stats::group_value(groups, stats::GROUP_GRE_GENERAL) else {
        return Extracted::Absent;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Extracted::Absent;
    }
    match gre_general_re().captures(trimmed) {
        Some(caps) => Extracted::Value((
            caps[1].trim().to_string(),
            caps[2].trim().to_string(),
            caps[3].trim().to_string(),
        )),
        None => Extracted::Failed(FieldError::Pattern(trimmed.to_string())),
    }
}

/// One GRE General component; a score of zero means "not reported".
fn gre_score(text: &str) -> Extracted<f64> {
    field::numeric(text).and_then(|value| {
        if value.abs() < f64::EPSILON {
            Extracted::Absent
        } else {
            Extracted::Value(value)
        }
    })
}

fn gre_subject(groups: &[Vec<String>]) -> Extracted<String> {
    match stats::group_value(groups, stats::GROUP_GRE_SUBJECT) {
        Some(value) if value.trim() == field::NOT_APPLICABLE => Extracted::Absent,
        Some(value) => field::non_empty(value),
        None => Extracted::Absent,
    }
}

/// The comment cell's leading text, line-break runs collapsed to spaces.
///
/// The HTML parser already folds CRLF to LF, so any remaining run of
/// `\r`/`\n` characters stands for one embedded line break.
fn comment(cell: ElementRef<'_>) -> Extracted<String> {
    match leading_text(cell) {
        Some(text) => field::non_empty(&collapse_breaks(&text)),
        None => Extracted::Absent,
    }
}

fn collapse_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// The post id carried by the comment cell's reply link.
fn post_id(cell: ElementRef<'_>) -> Extracted<i64> {
    let Some(link) = cell.select(reply_link_selector()).next() else {
        return Extracted::Absent;
    };
    let href = link.value().attr("href").unwrap_or("");
    let digits = href.strip_prefix("/result/").unwrap_or("");
    match digits.parse::<i64>() {
        Ok(id) => Extracted::Value(id),
        Err(_) => Extracted::Failed(FieldError::Number(digits.to_string())),
    }
}
