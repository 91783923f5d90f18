use std::fmt;

use tracing::debug;

use crate::error::{AgentError, Result};
use crate::preferences::{Decade, Genre, Mood, PreferenceSet};

/// Instruction header every built query starts with
pub const QUERY_HEADER: &str = "Recommend movies based on these preferences: ";

const CLAUSE_SEPARATOR: &str = ". ";

/// A flattened natural-language request handed to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryString(String);

impl QueryString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for QueryString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QueryString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the query for a preference set.
///
/// Clauses appear in a fixed order (favorites, genres, mood, decade, notes)
/// and fields left empty or at "Any" produce nothing. Callers are expected to
/// reject empty sets first; an empty set here is `InvalidInput`.
pub fn build_query(prefs: &PreferenceSet) -> Result<QueryString> {
    let mut clauses: Vec<String> = Vec::with_capacity(5);

    let favorites = prefs.favorites.trim();
    if !favorites.is_empty() {
        clauses.push(format!("I like movies such as {}", favorites));
    }

    if !prefs.genres.is_empty() {
        clauses.push(format!("I prefer {} genres", genre_list(&prefs.genres)));
    }

    if prefs.mood != Mood::Any {
        clauses.push(format!("I'm in a {} mood", prefs.mood.label().to_lowercase()));
    }

    if let Decade::Of(_) = prefs.decade {
        clauses.push(format!("I prefer movies from the {}", prefs.decade));
    }

    let notes = prefs.notes.trim();
    if !notes.is_empty() {
        clauses.push(notes.to_string());
    }

    if clauses.is_empty() {
        return Err(AgentError::InvalidInput(
            "cannot build a query from empty preferences".to_string(),
        ));
    }

    let mut query = String::from(QUERY_HEADER);
    query.push_str(&clauses.join(CLAUSE_SEPARATOR));
    if !query.ends_with(['.', '!', '?']) {
        query.push('.');
    }

    debug!(clauses = clauses.len(), "built recommendation query");
    Ok(QueryString(query))
}

fn genre_list(genres: &[Genre]) -> String {
    let mut seen: Vec<Genre> = Vec::with_capacity(genres.len());
    for genre in genres {
        if !seen.contains(genre) {
            seen.push(*genre);
        }
    }
    seen.iter()
        .map(Genre::label)
        .collect::<Vec<_>>()
        .join(", ")
}
