use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::{DbResult, Document};

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Predicate over the top-level fields of a document.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// Numeric field within `[gte, lt)`; an absent bound is unbounded.
    Range {
        field: String,
        gte: Option<f64>,
        lt: Option<f64>,
    },
    /// String field matches the pattern.
    Matches { field: String, pattern: Regex },
    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, gte: Option<f64>, lt: Option<f64>) -> Self {
        Self::Range {
            field: field.into(),
            gte,
            lt,
        }
    }

    /// Case-insensitive substring match. `text` is taken literally.
    pub fn contains_ignore_case(field: impl Into<String>, text: &str) -> DbResult<Self> {
        let pattern = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()?;
        Ok(Self::Matches {
            field: field.into(),
            pattern,
        })
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => document.get(field) == Some(value),
            Filter::Range { field, gte, lt } => {
                let Some(number) = document.get(field).and_then(Value::as_f64) else {
                    return false;
                };
                gte.map_or(true, |low| number >= low) && lt.map_or(true, |high| number < high)
            }
            Filter::Matches { field, pattern } => document
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| pattern.is_match(text)),
            Filter::And(filters) => filters.iter().all(|filter| filter.matches(document)),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::All
    }
}

/// Filter plus optional single-field sort.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<(String, SortOrder)>,
}

impl Query {
    /// Every document, in store order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(filter: Filter) -> Self {
        Self { filter, sort: None }
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Applies the sort in place. Stable, so ties keep store order.
    pub fn sort_documents(&self, documents: &mut [Document]) {
        let Some((field, order)) = &self.sort else {
            return;
        };
        documents.sort_by(|left, right| {
            let ordering = compare_values(left.get(field), right.get(field));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }
}

/// Orders missing/null values first, then booleans, numbers and strings.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Object(_)) => 5,
        }
    }

    match (left, right) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.total_cmp(&b)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn contains_ignore_case_matches_anywhere() {
        let filter = Filter::contains_ignore_case("author", "tolk").unwrap();
        assert!(filter.matches(&doc(json!({"author": "J.R.R. Tolkien"}))));
        assert!(filter.matches(&doc(json!({"author": "TOLKIEN"}))));
        assert!(!filter.matches(&doc(json!({"author": "Ursula Le Guin"}))));
        assert!(!filter.matches(&doc(json!({"title": "Tolkien"}))));
    }

    #[test]
    fn contains_ignore_case_treats_text_literally() {
        let filter = Filter::contains_ignore_case("author", "J.R.R.").unwrap();
        assert!(filter.matches(&doc(json!({"author": "J.R.R. Tolkien"}))));
        assert!(!filter.matches(&doc(json!({"author": "JxRxRx Tolkien"}))));

        let filter = Filter::contains_ignore_case("author", "(").unwrap();
        assert!(!filter.matches(&doc(json!({"author": "Tolkien"}))));
    }

    #[test]
    fn range_is_half_open() {
        let filter = Filter::range("cost", Some(500.0), Some(1000.0));
        assert!(filter.matches(&doc(json!({"cost": 500}))));
        assert!(filter.matches(&doc(json!({"cost": 999.99}))));
        assert!(!filter.matches(&doc(json!({"cost": 1000}))));
        assert!(!filter.matches(&doc(json!({"cost": 499}))));
        assert!(!filter.matches(&doc(json!({"cost": "700"}))));
        assert!(!filter.matches(&doc(json!({}))));
    }

    #[test]
    fn and_requires_every_filter() {
        let filter = Filter::And(vec![
            Filter::eq("author", "Tolkien"),
            Filter::range("cost", Some(10.0), None),
        ]);
        assert!(filter.matches(&doc(json!({"author": "Tolkien", "cost": 12}))));
        assert!(!filter.matches(&doc(json!({"author": "Tolkien", "cost": 2}))));
    }

    #[test]
    fn sort_orders_numbers_and_puts_missing_first() {
        let query = Query::all().sort_by("cost", SortOrder::Ascending);
        let mut documents = vec![
            doc(json!({"n": 1, "cost": 900})),
            doc(json!({"n": 2})),
            doc(json!({"n": 3, "cost": 20.5})),
        ];
        query.sort_documents(&mut documents);
        let order: Vec<_> = documents.iter().map(|d| d["n"].clone()).collect();
        assert_eq!(order, vec![json!(2), json!(3), json!(1)]);

        Query::all()
            .sort_by("cost", SortOrder::Descending)
            .sort_documents(&mut documents);
        assert_eq!(documents[0]["n"], json!(1));
    }
}
