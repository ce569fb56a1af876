//! Builds SQL `WHERE` conditions from the search form.
//!
//! Every user-supplied string goes through [`quote_literal`] before it is
//! placed in the condition, and the free-text term additionally through
//! [`escape_like`], so the term always matches as a literal substring.
//!
//! ```text
//! FilterRequest { text: "Иванов", region: "Тверская область", years: 1900..=1925 }
//!
//! (fio ILIKE '%Иванов%' OR story ILIKE '%Иванов%')
//!   AND region = 'Тверская область'
//!   AND TRY_CAST(array_element(regexp_match(CAST(birthday AS VARCHAR), '[0-9]{4}'), 1) AS INT) BETWEEN 1900 AND 1925
//! ```

use crate::config::{MAX_BIRTH_YEAR, MIN_BIRTH_YEAR};
use crate::error::QueryError;

/// Value of the region/rank selectors meaning "no restriction".
pub const ALL: &str = "all";

/// The search form as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub text: Option<String>,
    pub region: Option<String>,
    pub rank: Option<String>,
    pub birth_year_from: i32,
    pub birth_year_to: i32,
}

impl Default for FilterRequest {
    fn default() -> Self {
        FilterRequest {
            text: None,
            region: None,
            rank: None,
            birth_year_from: MIN_BIRTH_YEAR,
            birth_year_to: MAX_BIRTH_YEAR,
        }
    }
}

impl FilterRequest {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_rank(mut self, rank: impl Into<String>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    pub fn with_birth_years(mut self, from: i32, to: i32) -> Self {
        self.birth_year_from = from;
        self.birth_year_to = to;
        self
    }

    /// The trimmed free-text term, if it is not blank.
    pub fn term(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Checks `1850 <= from <= to <= 1940`.
    pub fn validate(&self) -> Result<(), QueryError> {
        let (from, to) = (self.birth_year_from, self.birth_year_to);
        if from < MIN_BIRTH_YEAR || to > MAX_BIRTH_YEAR || from > to {
            return Err(QueryError::InvalidFilter(format!(
                "birth year range {}..={} must lie within {}..={} with from <= to",
                from, to, MIN_BIRTH_YEAR, MAX_BIRTH_YEAR
            )));
        }
        Ok(())
    }
}

/// What an empty filter set matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeutralPredicate {
    /// Every card.
    #[default]
    MatchAll,
    /// Only cards with a non-empty story.
    HasStory,
}

impl NeutralPredicate {
    fn sql(&self) -> &'static str {
        match self {
            NeutralPredicate::MatchAll => "TRUE",
            NeutralPredicate::HasStory => "(story IS NOT NULL AND story <> '')",
        }
    }
}

/// A boolean SQL expression over the card table. Only [`QueryBuilder`] creates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate(String);

impl Predicate {
    pub fn as_sql(&self) -> &str {
        &self.0
    }

    /// The predicate that matches every card.
    pub fn match_all() -> Self {
        Predicate(NeutralPredicate::MatchAll.sql().to_string())
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quotes a string as a SQL literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escapes `\`, `%` and `_` so the value is taken literally inside a LIKE pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty() && *v != ALL)
}

/// Turns a [`FilterRequest`] into a [`Predicate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    neutral: NeutralPredicate,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    pub fn with_neutral(neutral: NeutralPredicate) -> Self {
        QueryBuilder { neutral }
    }

    /// Builds the AND of all active conditions, or the neutral predicate if none are.
    ///
    /// # Errors
    ///
    /// `QueryError::InvalidFilter` if the year range is out of bounds.
    pub fn build(&self, request: &FilterRequest) -> Result<Predicate, QueryError> {
        request.validate()?;
        let mut conditions: Vec<String> = Vec::new();

        if let Some(term) = request.term() {
            let pattern = quote_literal(&format!("%{}%", escape_like(term)));
            conditions.push(format!("(fio ILIKE {pattern} OR story ILIKE {pattern})"));
        }

        if let Some(region) = is_selected(&request.region) {
            conditions.push(format!("region = {}", quote_literal(region)));
        }

        if let Some(rank) = is_selected(&request.rank) {
            conditions.push(format!("\"rank\" = {}", quote_literal(rank)));
        }

        // The full span is always true for parseable years; skip it
        if request.birth_year_from > MIN_BIRTH_YEAR || request.birth_year_to < MAX_BIRTH_YEAR {
            conditions.push(format!(
                "TRY_CAST(array_element(regexp_match(CAST(birthday AS VARCHAR), '[0-9]{{4}}'), 1) AS INT) BETWEEN {} AND {}",
                request.birth_year_from, request.birth_year_to
            ));
        }

        if conditions.is_empty() {
            Ok(Predicate(self.neutral.sql().to_string()))
        } else {
            Ok(Predicate(conditions.join(" AND ")))
        }
    }
}
