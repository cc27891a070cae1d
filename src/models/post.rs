//! Admissions post record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One admissions-result post extracted from a listing row.
///
/// `id` is assigned by the remote site and is globally unique; it is the
/// sole deduplication key. Every other field is best-effort: a field the
/// row does not carry, or that fails to parse, stays `None`. A `Post` is
/// built once from one row and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Externally assigned unique identifier (from the reply link)
    pub id: i64,

    /// Institution name
    pub school: Option<String>,

    /// Program and degree, e.g. "Computer Science, PhD (F21)"
    pub program: Option<String>,

    /// Decision outcome, e.g. "Accepted", "Interview", "Wait listed"
    pub decision: Option<String>,

    /// How the decision was communicated, e.g. "E-mail"
    pub medium: Option<String>,

    /// Date the decision was communicated
    pub decision_date: Option<NaiveDate>,

    /// Applicant status code, e.g. "A", "I", "U"
    pub status: Option<String>,

    /// Date the post was submitted
    pub post_date: Option<NaiveDate>,

    /// Free-text comment
    pub comment: Option<String>,

    /// Undergraduate GPA
    pub gpa: Option<f64>,

    /// GRE General verbal score
    pub gre_verbal: Option<f64>,

    /// GRE General quantitative score
    pub gre_quant: Option<f64>,

    /// GRE General writing score
    pub gre_writing: Option<f64>,

    /// GRE Subject score
    pub gre_subject: Option<String>,
}

impl Post {
    /// Create a post with the given id and every other field absent.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            school: None,
            program: None,
            decision: None,
            medium: None,
            decision_date: None,
            status: None,
            post_date: None,
            comment: None,
            gpa: None,
            gre_verbal: None,
            gre_quant: None,
            gre_writing: None,
            gre_subject: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_has_only_id() {
        let post = Post::new(789986);
        assert_eq!(post.id, 789986);
        assert_eq!(post.school, None);
        assert_eq!(post.gpa, None);
        assert_eq!(post.decision_date, None);
    }
}
