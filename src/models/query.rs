//! Survey query parameters.
//!
//! One immutable [`SurveyQuery`] value is constructed per request; unset
//! fields are simply omitted from the serialized query string.

use std::fmt;
use std::str::FromStr;

/// Column the listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Institution name
    Institution,
    /// Program name
    Program,
    /// Date the decision letter went out
    NotificationDate,
}

impl SortColumn {
    /// Wire value of the `o` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            SortColumn::Institution => "i",
            SortColumn::Program => "p",
            SortColumn::NotificationDate => "d",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortColumn::Institution => "institution",
            SortColumn::Program => "program",
            SortColumn::NotificationDate => "date",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "institution" => Ok(SortColumn::Institution),
            "program" => Ok(SortColumn::Program),
            "date" | "notification-date" => Ok(SortColumn::NotificationDate),
            other => Err(format!(
                "unknown sort column {other:?} (expected institution, program or date)"
            )),
        }
    }
}

/// Query parameters for one listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyQuery {
    /// Search text (the seed)
    pub text: Option<String>,

    /// Rows per page (`pp`)
    pub page_size: Option<u32>,

    /// Page number, 1-indexed (`p`)
    pub page: Option<u32>,

    /// Sort column (`o`)
    pub sort: Option<SortColumn>,
}

impl SurveyQuery {
    /// Query for one page of a seed's listing.
    pub fn for_page(seed: &str, page_size: u32, page: u32, sort: Option<SortColumn>) -> Self {
        Self {
            text: Some(seed.to_string()),
            page_size: Some(page_size),
            page: Some(page),
            sort,
        }
    }

    /// Serialize to query pairs, skipping unset fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(text) = &self.text {
            pairs.push(("q", text.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("o", sort.as_param().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("p", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pp", page_size.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_query_pairs() {
        let query = SurveyQuery::for_page("cmu", 250, 3, Some(SortColumn::NotificationDate));
        assert_eq!(
            query.query_pairs(),
            vec![
                ("q", "cmu".to_string()),
                ("o", "d".to_string()),
                ("p", "3".to_string()),
                ("pp", "250".to_string()),
            ]
        );
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let query = SurveyQuery {
            text: Some("mit".to_string()),
            ..SurveyQuery::default()
        };
        assert_eq!(query.query_pairs(), vec![("q", "mit".to_string())]);
    }

    #[test]
    fn test_sort_column_round_trip() {
        for column in [
            SortColumn::Institution,
            SortColumn::Program,
            SortColumn::NotificationDate,
        ] {
            assert_eq!(column.to_string().parse::<SortColumn>(), Ok(column));
        }
        assert!("gpa".parse::<SortColumn>().is_err());
    }
}
