//! Free-text search to filter translation

use crate::config::SearchConfig;
use crate::core::filter::{Clause, Filter};

/// Builds a [`Filter`] from what the operator typed in the search box
///
/// Lenient: it never fails. Blank input means [`Filter::NoFilter`];
/// otherwise every text field gets a case-insensitive substring clause and,
/// when the whole input is a finite number, every numeric field gets an
/// equality clause.
#[derive(Debug, Clone)]
pub struct FilterTranslator {
    text_fields: Vec<String>,
    numeric_fields: Vec<String>,
}

impl FilterTranslator {
    pub fn new(
        text_fields: impl IntoIterator<Item = impl Into<String>>,
        numeric_fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            text_fields: text_fields.into_iter().map(Into::into).collect(),
            numeric_fields: numeric_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.text_fields.clone(), config.numeric_fields.clone())
    }

    pub fn translate(&self, text: &str) -> Filter {
        let needle = text.trim();
        if needle.is_empty() {
            return Filter::NoFilter;
        }

        let mut clauses: Vec<Clause> = self
            .text_fields
            .iter()
            .map(|field| Clause::contains(field.as_str(), needle))
            .collect();

        if let Some(number) = parse_number(needle) {
            clauses.extend(
                self.numeric_fields
                    .iter()
                    .map(|field| Clause::equals(field.as_str(), number)),
            );
        }

        Filter::any_of(clauses)
    }
}

impl Default for FilterTranslator {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// `Some` only for finite numbers; "inf" and "NaN" are text
fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
