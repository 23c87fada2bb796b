use thiserror::Error;

/// Convenient result alias for the HeatENE estimation engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level engine error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A lookup key is missing from the effective parameter tables.
    #[error("unknown {table} key: {key}{}", format_suggestions(.suggestions))]
    UnknownKey {
        table: String,
        key: String,
        suggestions: Vec<String>,
    },

    /// Raised when request geometry, counts or amounts are out of range.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Raised when a calculation would divide by a zero or near-zero quantity.
    #[error("degenerate arithmetic computing {quantity}: {message}")]
    Degenerate { quantity: String, message: String },

    /// Raised when merged parameters deserialize but fail numeric sanity checks.
    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// Raised when the merged parameter document does not match the typed schema.
    #[error("parameter document does not match schema: {0}")]
    ParameterSchema(#[from] serde_json::Error),

    /// Raised when a product catalog fails validation.
    #[error("invalid product catalog: {message}")]
    Catalog { message: String },

    /// Raised when duplicate SKU names are encountered during catalog load.
    #[error("duplicate product name encountered: {name}")]
    DuplicateSku { name: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an [`Error::UnknownKey`] with suggestions drawn from the keys that do exist.
    pub fn unknown_key<S: AsRef<str>>(
        table: &str,
        key: &str,
        known: impl IntoIterator<Item = S>,
    ) -> Self {
        Error::UnknownKey {
            table: table.to_string(),
            key: key.to_string(),
            suggestions: suggest(key, known),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }
}

/// Rank known keys by Jaro-Winkler similarity and keep the close ones.
fn suggest<S: AsRef<str>>(key: &str, known: impl IntoIterator<Item = S>) -> Vec<String> {
    let needle = key.to_lowercase();
    let mut scored: Vec<(f64, String)> = known
        .into_iter()
        .map(|candidate| {
            let candidate = candidate.as_ref();
            (
                strsim::jaro_winkler(&needle, &candidate.to_lowercase()),
                candidate.to_string(),
            )
        })
        .filter(|(score, _)| *score >= 0.8)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().take(3).map(|(_, name)| name).collect()
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_suggests_close_matches() {
        let known = vec!["london".to_string(), "wales".to_string()];
        let err = Error::unknown_key("climate region", "londn", &known);
        assert_eq!(
            err.to_string(),
            "unknown climate region key: londn. Did you mean 'london'?"
        );
    }

    #[test]
    fn unknown_key_without_matches_has_no_hint() {
        let known = vec!["poor".to_string()];
        let err = Error::unknown_key("insulation tier", "zzz", &known);
        assert_eq!(err.to_string(), "unknown insulation tier key: zzz");
    }
}
