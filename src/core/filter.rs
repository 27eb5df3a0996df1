//! Filter predicates over catalog rows
//!
//! A [`Filter`] is either "no filter" or a disjunction of per-field clauses:
//! case-insensitive substring tests on text fields and exact equality on
//! numeric fields.
//!
//! # Escaping
//!
//! Substring needles are stored as the raw text the operator typed. They are
//! regex-escaped only when lowered to a regex-based matcher
//! ([`Filter::compile`], [`Filter::to_query_value`]) and JSON-escaped only by
//! the serializer, so repeated serialization never escapes twice.
//!
//! # Legacy query strings
//!
//! Older clients sent the predicate as a pre-serialized Mongo-style string:
//!
//! ```text
//! {"$or":[{"title":{"$regex":"portal","$options":"i"}},{"price":{"$eq":42}}]}
//! ```
//!
//! [`Filter::parse_query_string`] accepts that shape as long as every
//! `$regex` is a literal (escaped) pattern.

use crate::core::error::FilterError;
use crate::core::row::Product;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Structured filter carried by pagination requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "predicate", rename_all = "camelCase")]
pub enum Filter {
    /// Match every row
    #[default]
    NoFilter,

    /// Match rows satisfying the predicate
    Predicate(FilterPredicate),
}

/// A disjunction of clauses. An empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    #[serde(rename = "anyOf")]
    pub any_of: Vec<Clause>,
}

/// A single field test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Clause {
    /// Case-insensitive substring match on a text field
    Contains { field: String, needle: String },

    /// Exact equality on a numeric field
    Equals { field: String, value: f64 },
}

impl Clause {
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Clause::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: f64) -> Self {
        Clause::Equals {
            field: field.into(),
            value,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Clause::Contains { field, .. } | Clause::Equals { field, .. } => field,
        }
    }

    fn validate(&self) -> Result<(), FilterError> {
        validate_field_name(self.field())?;
        match self {
            Clause::Equals { field, value } if !value.is_finite() => {
                Err(FilterError::NonFiniteValue {
                    field: field.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Mongo-style condition object for this clause
    fn to_query_value(&self) -> Value {
        let condition = match self {
            Clause::Contains { needle, .. } => {
                json!({ "$regex": regex::escape(needle), "$options": "i" })
            }
            Clause::Equals { value, .. } => json!({ "$eq": value }),
        };

        let mut object = Map::new();
        object.insert(self.field().to_string(), condition);
        Value::Object(object)
    }
}

impl FilterPredicate {
    pub fn new(any_of: Vec<Clause>) -> Self {
        Self { any_of }
    }

    pub fn is_empty(&self) -> bool {
        self.any_of.is_empty()
    }
}

impl Filter {
    /// Filter from a list of clauses
    pub fn any_of(clauses: Vec<Clause>) -> Self {
        Filter::Predicate(FilterPredicate::new(clauses))
    }

    /// True when the filter can exclude rows
    pub fn is_active(&self) -> bool {
        match self {
            Filter::NoFilter => false,
            Filter::Predicate(predicate) => !predicate.is_empty(),
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        match self {
            Filter::NoFilter => &[],
            Filter::Predicate(predicate) => &predicate.any_of,
        }
    }

    /// Check that a store could apply this filter
    pub fn validate(&self) -> Result<(), FilterError> {
        self.clauses().iter().try_for_each(Clause::validate)
    }

    /// Compile into a matcher for in-process evaluation
    pub fn compile(&self) -> Result<FilterMatcher, FilterError> {
        self.validate()?;

        let clauses = self
            .clauses()
            .iter()
            .map(|clause| match clause {
                Clause::Contains { field, needle } => {
                    let pattern = RegexBuilder::new(&regex::escape(needle))
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| FilterError::Malformed {
                            message: e.to_string(),
                        })?;
                    Ok(CompiledClause::Contains {
                        field: field.clone(),
                        pattern,
                    })
                }
                Clause::Equals { field, value } => Ok(CompiledClause::Equals {
                    field: field.clone(),
                    value: *value,
                }),
            })
            .collect::<Result<Vec<_>, FilterError>>()?;

        Ok(FilterMatcher { clauses })
    }

    /// Mongo-style query document (`{}` for no filter)
    pub fn to_query_value(&self) -> Value {
        if !self.is_active() {
            return Value::Object(Map::new());
        }
        let clauses: Vec<Value> = self.clauses().iter().map(Clause::to_query_value).collect();
        json!({ "$or": clauses })
    }

    /// Legacy pre-serialized form of [`to_query_value`](Self::to_query_value)
    pub fn to_query_string(&self) -> String {
        self.to_query_value().to_string()
    }

    /// Parse a legacy query string
    pub fn parse_query_string(query: &str) -> Result<Filter, FilterError> {
        let value: Value = serde_json::from_str(query).map_err(|e| FilterError::Malformed {
            message: e.to_string(),
        })?;

        let Value::Object(map) = value else {
            return Err(FilterError::Malformed {
                message: "query must be a JSON object".to_string(),
            });
        };

        if map.is_empty() {
            return Ok(Filter::NoFilter);
        }
        if map.len() > 1 {
            return Err(FilterError::UnsupportedOperator {
                operator: "$and".to_string(),
            });
        }

        let mut clauses = Vec::new();
        for (key, condition) in map {
            if key == "$or" {
                let Value::Array(items) = condition else {
                    return Err(FilterError::Malformed {
                        message: "$or must be an array".to_string(),
                    });
                };
                if items.is_empty() {
                    return Err(FilterError::Malformed {
                        message: "$or must not be empty".to_string(),
                    });
                }
                for item in items {
                    parse_clause_object(item, &mut clauses)?;
                }
            } else if key.starts_with('$') {
                return Err(FilterError::UnsupportedOperator { operator: key });
            } else {
                parse_condition(key, condition, &mut clauses)?;
            }
        }

        let filter = Filter::any_of(clauses);
        filter.validate()?;
        Ok(filter)
    }
}

/// A compiled [`Filter`] ready to test rows
#[derive(Debug, Clone)]
pub struct FilterMatcher {
    clauses: Vec<CompiledClause>,
}

#[derive(Debug, Clone)]
enum CompiledClause {
    Contains { field: String, pattern: Regex },
    Equals { field: String, value: f64 },
}

impl FilterMatcher {
    /// Test a row. Clauses on unknown or mistyped fields do not match.
    pub fn matches(&self, product: &Product) -> bool {
        if self.clauses.is_empty() {
            return true;
        }

        self.clauses.iter().any(|clause| match clause {
            CompiledClause::Contains { field, pattern } => product
                .field(field)
                .and_then(|v| v.as_string().map(|s| pattern.is_match(s)))
                .unwrap_or(false),
            CompiledClause::Equals { field, value } => product
                .field(field)
                .and_then(|v| v.as_number())
                .is_some_and(|n| n == *value),
        })
    }
}

fn validate_field_name(field: &str) -> Result<(), FilterError> {
    if field.trim().is_empty() {
        return Err(FilterError::InvalidField {
            field: field.to_string(),
            message: "field name is empty".to_string(),
        });
    }
    if field.starts_with('$') {
        return Err(FilterError::InvalidField {
            field: field.to_string(),
            message: "field names may not start with '$'".to_string(),
        });
    }
    Ok(())
}

fn parse_clause_object(item: Value, clauses: &mut Vec<Clause>) -> Result<(), FilterError> {
    let Value::Object(map) = item else {
        return Err(FilterError::Malformed {
            message: "$or entries must be objects".to_string(),
        });
    };
    if map.len() != 1 {
        return Err(FilterError::Malformed {
            message: "$or entries must test exactly one field".to_string(),
        });
    }
    for (field, condition) in map {
        parse_condition(field, condition, clauses)?;
    }
    Ok(())
}

fn parse_condition(field: String, condition: Value, clauses: &mut Vec<Clause>) -> Result<(), FilterError> {
    match condition {
        Value::Number(n) => {
            clauses.push(Clause::equals(field, number_value(&n)?));
            Ok(())
        }
        Value::Object(ops) => {
            if let Some(eq) = ops.get("$eq") {
                if ops.len() != 1 {
                    return Err(FilterError::Malformed {
                        message: format!("'{}' mixes $eq with other operators", field),
                    });
                }
                return match eq {
                    Value::Number(n) => {
                        clauses.push(Clause::equals(field, number_value(n)?));
                        Ok(())
                    }
                    // A search term that was not a number serializes as null; skip it
                    Value::Null => Ok(()),
                    _ => Err(FilterError::UnsupportedOperator {
                        operator: "$eq on non-numeric values".to_string(),
                    }),
                };
            }

            let Some(Value::String(pattern)) = ops.get("$regex") else {
                let operator = ops.keys().next().cloned().unwrap_or_default();
                return Err(FilterError::UnsupportedOperator { operator });
            };
            match ops.get("$options") {
                Some(Value::String(options)) if options == "i" => {}
                Some(other) => {
                    return Err(FilterError::UnsupportedOperator {
                        operator: format!("$options {}", other),
                    });
                }
                None => {
                    return Err(FilterError::UnsupportedOperator {
                        operator: "case-sensitive $regex".to_string(),
                    });
                }
            }
            if let Some(extra) = ops.keys().find(|k| *k != "$regex" && *k != "$options") {
                return Err(FilterError::UnsupportedOperator {
                    operator: extra.clone(),
                });
            }

            clauses.push(Clause::contains(field, unescape_literal(pattern)?));
            Ok(())
        }
        _ => Err(FilterError::Malformed {
            message: format!("unsupported condition for field '{}'", field),
        }),
    }
}

fn number_value(n: &serde_json::Number) -> Result<f64, FilterError> {
    n.as_f64().ok_or_else(|| FilterError::Malformed {
        message: format!("'{}' is not a representable number", n),
    })
}

/// Undo `regex::escape`. Unescaped metacharacters mean a real regex, which
/// is not supported.
fn unescape_literal(pattern: &str) -> Result<String, FilterError> {
    let mut literal = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) if !escaped.is_ascii_alphanumeric() => literal.push(escaped),
                Some(class) => {
                    return Err(FilterError::UnsupportedOperator {
                        operator: format!("regex class \\{}", class),
                    });
                }
                None => {
                    return Err(FilterError::Malformed {
                        message: "pattern ends with a dangling escape".to_string(),
                    });
                }
            },
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' => {
                return Err(FilterError::UnsupportedOperator {
                    operator: format!("regex metacharacter '{}'", c),
                });
            }
            _ => literal.push(c),
        }
    }

    Ok(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "Portal 2", "game", 9.99, 0),
            Product::new(2, "The Answer 42", "game", 15.0, 10),
            Product::new(3, "Soundtrack", "DLC", 42.0, 0),
            Product::new(4, "Bundle", "bundle", 30.0, 42),
        ]
    }

    fn matching_ids(filter: &Filter) -> Vec<i64> {
        let matcher = filter.compile().unwrap();
        catalog()
            .into_iter()
            .filter(|p| matcher.matches(p))
            .map(|p| p.product_id)
            .collect()
    }

    #[test]
    fn test_no_filter_matches_all() {
        assert_eq!(matching_ids(&Filter::NoFilter), vec![1, 2, 3, 4]);
        assert_eq!(matching_ids(&Filter::any_of(vec![])), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let filter = Filter::any_of(vec![Clause::contains("type", "dlc")]);
        assert_eq!(matching_ids(&filter), vec![3]);
    }

    #[test]
    fn test_contains_treats_needle_literally() {
        let filter = Filter::any_of(vec![Clause::contains("title", "portal.2")]);
        assert!(matching_ids(&filter).is_empty());
    }

    #[test]
    fn test_disjunction_of_text_and_numbers() {
        let filter = Filter::any_of(vec![
            Clause::contains("title", "42"),
            Clause::equals("price", 42.0),
            Clause::equals("discount", 42.0),
        ]);
        assert_eq!(matching_ids(&filter), vec![2, 3, 4]);
    }

    #[test]
    fn test_unknown_field_does_not_match() {
        let filter = Filter::any_of(vec![Clause::contains("publisher", "valve")]);
        assert!(matching_ids(&filter).is_empty());
    }

    #[test]
    fn test_non_finite_equality_is_invalid() {
        let filter = Filter::any_of(vec![Clause::equals("price", f64::NAN)]);
        assert_eq!(
            filter.validate(),
            Err(FilterError::NonFiniteValue {
                field: "price".to_string()
            })
        );
    }

    #[test]
    fn test_operator_field_name_is_invalid() {
        let filter = Filter::any_of(vec![Clause::contains("$where", "1")]);
        assert!(matches!(filter.validate(), Err(FilterError::InvalidField { .. })));
    }

    #[test]
    fn test_query_string_shape() {
        let filter = Filter::any_of(vec![
            Clause::contains("title", "c++"),
            Clause::equals("price", 42.0),
        ]);
        let value: Value = serde_json::from_str(&filter.to_query_string()).unwrap();
        assert_eq!(
            value,
            json!({
                "$or": [
                    { "title": { "$regex": "c\\+\\+", "$options": "i" } },
                    { "price": { "$eq": 42.0 } }
                ]
            })
        );
        assert_eq!(Filter::NoFilter.to_query_string(), "{}");
    }

    #[test]
    fn test_query_string_escapes_exactly_once() {
        let needle = r#"He said "hi" 1/2 \ c++"#;
        let filter = Filter::any_of(vec![Clause::contains("title", needle)]);

        let first = filter.to_query_string();
        let second = filter.to_query_string();
        assert_eq!(first, second);

        let parsed = Filter::parse_query_string(&first).unwrap();
        assert_eq!(parsed, filter);
        assert_eq!(parsed.to_query_string(), first);
    }

    #[test]
    fn test_parse_legacy_query_with_null_equality() {
        let parsed = Filter::parse_query_string(
            r#"{"$or":[{"title":{"$regex":"portal","$options":"i"}},{"price":{"$eq":null}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed, Filter::any_of(vec![Clause::contains("title", "portal")]));
    }

    #[test]
    fn test_parse_single_field_condition() {
        let parsed = Filter::parse_query_string(r#"{"price": 9.99}"#).unwrap();
        assert_eq!(parsed, Filter::any_of(vec![Clause::equals("price", 9.99)]));
    }

    #[test]
    fn test_parse_empty_object_is_no_filter() {
        assert_eq!(Filter::parse_query_string("{}"), Ok(Filter::NoFilter));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!(
            Filter::parse_query_string("not json"),
            Err(FilterError::Malformed { .. })
        ));
        assert!(matches!(
            Filter::parse_query_string("[1, 2]"),
            Err(FilterError::Malformed { .. })
        ));
        assert!(matches!(
            Filter::parse_query_string(r#"{"$or": []}"#),
            Err(FilterError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unsupported_operators() {
        assert!(matches!(
            Filter::parse_query_string(r#"{"$where": "1"}"#),
            Err(FilterError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            Filter::parse_query_string(r#"{"price": {"$gt": 3}}"#),
            Err(FilterError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            Filter::parse_query_string(r#"{"title": {"$regex": "a.*b", "$options": "i"}}"#),
            Err(FilterError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            Filter::parse_query_string(r#"{"title": "x", "price": 3}"#),
            Err(FilterError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_typed_filter_serialization() {
        let filter = Filter::any_of(vec![Clause::equals("price", 42.0)]);
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "predicate",
                "predicate": { "anyOf": [ { "op": "equals", "field": "price", "value": 42.0 } ] }
            })
        );
        assert_eq!(
            serde_json::to_value(Filter::NoFilter).unwrap(),
            json!({ "kind": "noFilter" })
        );
    }
}
