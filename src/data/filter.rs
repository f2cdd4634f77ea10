//! Multi-field hike filter and the `WHERE` clause builder behind it.
//!
//! Only the criteria that were supplied become predicates; everything else is
//! left out of the query. All values are bound as parameters.

use rusqlite::types::Value;

use super::models::ANY_DIFFICULTY;

/// Hike columns that can appear in a filter predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Location,
    Date,
    Difficulty,
    Length,
}

impl Column {
    fn as_sql(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Location => "location",
            Column::Date => "date",
            Column::Difficulty => "difficulty",
            Column::Length => "length",
        }
    }
}

/// A single typed condition on a hike column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Substring match
    Contains(Column, String),
    Equals(Column, String),
    /// Inclusive lower bound
    AtLeast(Column, f64),
    /// Inclusive upper bound
    AtMost(Column, f64),
}

impl Predicate {
    fn push_to(&self, clause: &mut WhereClause) {
        match self {
            Predicate::Contains(column, text) => {
                clause
                    .conditions
                    .push(format!("{} LIKE ? ESCAPE '\\'", column.as_sql()));
                clause
                    .params
                    .push(Value::Text(format!("%{}%", escape_like(text))));
            }
            Predicate::Equals(column, text) => {
                clause.conditions.push(format!("{} = ?", column.as_sql()));
                clause.params.push(Value::Text(text.clone()));
            }
            Predicate::AtLeast(column, bound) => {
                clause.conditions.push(format!("{} >= ?", column.as_sql()));
                clause.params.push(Value::Real(*bound));
            }
            Predicate::AtMost(column, bound) => {
                clause.conditions.push(format!("{} <= ?", column.as_sql()));
                clause.params.push(Value::Real(*bound));
            }
        }
    }
}

/// Escape LIKE wildcards so user text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Conjunction of predicates with their bound parameters
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    pub fn from_predicates(predicates: &[Predicate]) -> Self {
        let mut clause = WhereClause::default();
        for predicate in predicates {
            predicate.push_to(&mut clause);
        }
        clause
    }

    /// ` WHERE a AND b ...`, or an empty string when there are no conditions
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Criteria for narrowing the hike list. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HikeFilter {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub difficulty: Option<String>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
}

impl HikeFilter {
    /// Filter used for search-as-you-type on the hike name
    pub fn name_search(text: impl Into<String>) -> Self {
        HikeFilter::default().name(text)
    }

    pub fn name(mut self, text: impl Into<String>) -> Self {
        self.name = Some(text.into());
        self
    }

    #[allow(dead_code)] // Used in tests
    pub fn location(mut self, text: impl Into<String>) -> Self {
        self.location = Some(text.into());
        self
    }

    #[allow(dead_code)] // Used in tests
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[allow(dead_code)] // Used in tests
    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    #[allow(dead_code)] // Used in tests
    pub fn min_length(mut self, km: f64) -> Self {
        self.min_length = Some(km);
        self
    }

    #[allow(dead_code)] // Used in tests
    pub fn max_length(mut self, km: f64) -> Self {
        self.max_length = Some(km);
        self
    }

    /// Predicates for the supplied criteria, in column order
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(name) = non_empty(&self.name) {
            predicates.push(Predicate::Contains(Column::Name, name.to_string()));
        }
        if let Some(location) = non_empty(&self.location) {
            predicates.push(Predicate::Contains(Column::Location, location.to_string()));
        }
        if let Some(date) = non_empty(&self.date) {
            predicates.push(Predicate::Equals(Column::Date, date.to_string()));
        }
        if let Some(difficulty) = non_empty(&self.difficulty) {
            if !difficulty.trim().eq_ignore_ascii_case(ANY_DIFFICULTY) {
                predicates.push(Predicate::Equals(Column::Difficulty, difficulty.to_string()));
            }
        }
        if let Some(min) = self.min_length {
            predicates.push(Predicate::AtLeast(Column::Length, min));
        }
        if let Some(max) = self.max_length {
            predicates.push(Predicate::AtMost(Column::Length, max));
        }

        predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    pub fn where_clause(&self) -> WhereClause {
        WhereClause::from_predicates(&self.predicates())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
