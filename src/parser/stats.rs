//! Stats block extraction.
//!
//! The decision cell may carry a nested `<span>` with GPA/GRE figures,
//! one `label: value` line per `<br>`:
//!
//! ```text
//! <span>
//!   <strong>Undergrad GPA</strong>: 3.06<br>
//!   <strong>GRE General (V/Q/W)</strong>: 153/169/3.00<br>
//!   <strong>GRE Subject</strong>: n/a<br>
//! </span>
//! ```

use scraper::{ElementRef, Node};

/// Group index holding the GPA line.
pub const GROUP_GPA: usize = 0;
/// Group index holding the GRE General "V/Q/W" line.
pub const GROUP_GRE_GENERAL: usize = 1;
/// Group index holding the GRE Subject line.
pub const GROUP_GRE_SUBJECT: usize = 2;

/// Number of groups a well-formed stats block carries.
pub const EXPECTED_GROUPS: usize = 3;

/// Walk the block's children in order, accumulating strings into the
/// current group and closing it at each `<br>`. Element children
/// contribute their full text (the `<strong>` label); text children are
/// stored with the `label: ` prefix stripped; blank text is skipped.
/// A trailing group without a closing `<br>` is discarded, matching the
/// markup which terminates every line.
pub fn stat_groups(block: ElementRef<'_>) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();

    for child in block.children() {
        match child.value() {
            Node::Element(element) if element.name() == "br" => {
                groups.push(std::mem::take(&mut current));
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    let text: String = element.text().collect();
                    current.push(text.trim().to_string());
                }
            }
            Node::Text(text) => {
                let raw = text.trim();
                if raw.is_empty() {
                    continue;
                }
                let value = raw.split_once(": ").map_or("", |(_, tail)| tail);
                current.push(value.trim().to_string());
            }
            _ => {}
        }
    }

    groups
}

/// The value entry of one group (position 1, after the label).
pub fn group_value(groups: &[Vec<String>], index: usize) -> Option<&str> {
    groups
        .get(index)
        .and_then(|group| group.get(1))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn groups_of(fragment: &str) -> Vec<Vec<String>> {
        let html = Html::parse_fragment(fragment);
        let selector = Selector::parse("span").unwrap();
        let span = html.select(&selector).next().unwrap();
        stat_groups(span)
    }

    #[test]
    fn test_three_line_block_yields_three_groups() {
        let groups = groups_of(
            "<span><strong>Undergrad GPA</strong>: 3.06<br>\
             <strong>GRE General (V/Q/W)</strong>: 153/169/3.00<br>\
             <strong>GRE Subject</strong>: n/a<br></span>",
        );

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[GROUP_GPA], vec!["Undergrad GPA", "3.06"]);
        assert_eq!(
            groups[GROUP_GRE_GENERAL],
            vec!["GRE General (V/Q/W)", "153/169/3.00"]
        );
        assert_eq!(group_value(&groups, GROUP_GRE_SUBJECT), Some("n/a"));
    }

    #[test]
    fn test_empty_block_yields_no_groups() {
        assert!(groups_of("<span></span>").is_empty());
    }

    #[test]
    fn test_unterminated_tail_is_discarded() {
        let groups = groups_of("<span><strong>Undergrad GPA</strong>: 3.9</span>");
        assert!(groups.is_empty());
    }

    #[test]
    fn test_group_value_out_of_range_is_none() {
        let groups = groups_of("<span><strong>Undergrad GPA</strong>: 3.9<br></span>");
        assert_eq!(group_value(&groups, GROUP_GPA), Some("3.9"));
        assert_eq!(group_value(&groups, GROUP_GRE_GENERAL), None);
    }
}
