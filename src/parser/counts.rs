//! Result-count banner extraction.
//!
//! Listing pages announce their totals as
//! "Showing **497** results over **20** pages"; the numbers may carry
//! digit-group commas.

use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;

use crate::models::PageCounts;

fn counts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Showing\s*([\d,]+)\s*results\s*over\s*([\d,]+)\s*pages").unwrap()
    })
}

/// Read the result totals from a listing document, if the banner exists.
pub fn parse_counts(html: &str) -> Option<PageCounts> {
    let document = Html::parse_document(html);
    let text: String = document.root_element().text().collect();
    let caps = counts_re().captures(&text)?;

    let results = caps[1].replace(',', "").parse().ok()?;
    let pages = caps[2].replace(',', "").parse().ok()?;
    Some(PageCounts { results, pages })
}
