//! HTML document parsing.
//!
//! Turns one fetched listing page into structured posts. A page is a
//! table classed `submission-table`; its data rows carry a class name
//! starting with `row` and exactly six cells. Structurally broken rows
//! are logged and skipped; field-level breakage is handled inside the
//! row parser and never loses the rest of the page.

pub mod counts;
pub mod field;
pub mod row;
pub mod stats;

pub use counts::parse_counts;

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::Post;

fn table_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse(".submission-table").unwrap())
}

fn tr_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").unwrap())
}

fn td_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("td").unwrap())
}

/// Data rows are marked with a class name prefixed `row` (`row0`, `row1`, ...).
fn is_post_row(tr: &ElementRef<'_>) -> bool {
    tr.value().classes().any(|class| class.starts_with("row"))
}

/// Parse one listing page into posts.
///
/// Fails only when the document carries no submission table at all;
/// individual broken rows are skipped with a log entry.
pub fn parse_page(html: &str) -> Result<Vec<Post>> {
    let document = Html::parse_document(html);
    let table = document
        .select(table_selector())
        .next()
        .ok_or_else(|| AppError::page("no submission table in document"))?;

    let mut posts = Vec::new();
    for (index, tr) in table.select(tr_selector()).filter(is_post_row).enumerate() {
        let row_num = index + 1;
        let cells: Vec<ElementRef<'_>> = tr.select(td_selector()).collect();

        if cells.len() != row::CELLS_PER_ROW {
            log::warn!(
                "Skipping row #{row_num} with {} cells (expected {})",
                cells.len(),
                row::CELLS_PER_ROW
            );
            continue;
        }

        match row::parse_row(&cells) {
            Some(post) => posts.push(post),
            None => log::error!("Skipping row #{row_num}: no usable reply-link id"),
        }
    }

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><table class="submission-table">{rows}</table></body></html>"#
        )
    }

    fn data_row(id: &str) -> String {
        format!(
            r#"<tr class="row1">
              <td>School</td><td>Program</td>
              <td>Accepted via E-mail on 12 Feb 2021</td>
              <td>A</td><td>26 Feb 2021</td>
              <td>ok <a href="/result/{id}">reply</a></td>
            </tr>"#
        )
    }

    #[test]
    fn test_page_without_table_is_an_error() {
        assert!(parse_page("<html><body><p>maintenance</p></body></html>").is_err());
    }

    #[test]
    fn test_rows_without_marker_class_are_ignored() {
        let html = page(&format!(
            r#"<tr class="header"><td>Institution</td></tr>{}"#,
            data_row("789986")
        ));
        let posts = parse_page(&html).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 789986);
        assert_eq!(posts[0].decision.as_deref(), Some("Accepted"));
    }

    #[test]
    fn test_wrong_cell_count_skips_row_only() {
        let short_row = r#"<tr class="row0"><td>one</td><td>two</td></tr>"#;
        let html = page(&format!("{short_row}{}", data_row("42")));
        let posts = parse_page(&html).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 42);
    }

    #[test]
    fn test_bad_id_skips_row_only() {
        let html = page(&format!("{}{}", data_row("abc"), data_row("7")));
        let posts = parse_page(&html).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 7);
    }

    #[test]
    fn test_empty_table_yields_no_posts() {
        let posts = parse_page(&page("")).unwrap();
        assert!(posts.is_empty());
    }
}
