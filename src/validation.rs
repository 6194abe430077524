//! Declarative field rules for course input.
//!
//! A [`Schema`] maps each field to an ordered list of checks. Checks run in
//! order and the first failing one supplies the field's only message.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::config::parse_or;
use crate::error::ConfigError;
use crate::models::{CourseField, CourseFields};

/// Default course-name pattern: letters, digits, apostrophes, hyphens or
/// whitespace in any position, with at least one letter somewhere.
pub const DEFAULT_NAME_PATTERN: &str = r"^[A-Za-z0-9'\s-]*[A-Za-z][A-Za-z0-9'\s-]*$";

/// Letters, apostrophes, hyphens and whitespace only.
pub const STRICT_NAME_PATTERN: &str = r"^[A-Za-z'\s-]*$";

pub const DEFAULT_DESCRIPTION_MIN_LEN: usize = 10;

#[derive(Debug, Clone)]
pub enum Rule {
    /// Non-empty after trimming.
    Required,
    Matches(Regex),
    /// At least this many characters.
    MinLength(usize),
}

impl Rule {
    pub fn passes(&self, value: &str) -> bool {
        match self {
            Rule::Required => !value.trim().is_empty(),
            Rule::Matches(re) => re.is_match(value),
            Rule::MinLength(min) => value.chars().count() >= *min,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Check {
    rule: Rule,
    message: String,
}

#[derive(Debug, Clone)]
pub struct FieldRules {
    field: CourseField,
    checks: Vec<Check>,
}

impl FieldRules {
    pub fn new(field: CourseField) -> Self {
        Self {
            field,
            checks: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.checks.push(Check {
            rule,
            message: message.into(),
        });
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Required, message)
    }

    pub fn matches(self, pattern: Regex, message: impl Into<String>) -> Self {
        self.rule(Rule::Matches(pattern), message)
    }

    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MinLength(min), message)
    }

    fn first_failure(&self, value: &str) -> Option<&str> {
        self.checks
            .iter()
            .find(|check| !check.rule.passes(value))
            .map(|check| check.message.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub name_pattern: String,
    pub description_min_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            description_min_len: DEFAULT_DESCRIPTION_MIN_LEN,
        }
    }
}

impl ValidationConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(crate::config::env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            name_pattern: lookup("COURSE_NAME_PATTERN").unwrap_or(defaults.name_pattern),
            description_min_len: parse_or(
                &lookup,
                "COURSE_DESCRIPTION_MIN_LEN",
                defaults.description_min_len,
            )?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new(fields: Vec<FieldRules>) -> Self {
        Self { fields }
    }

    /// The course form rules.
    pub fn course(config: &ValidationConfig) -> Result<Self, ConfigError> {
        let name_pattern = Regex::new(&config.name_pattern)
            .map_err(|e| ConfigError::invalid("COURSE_NAME_PATTERN", e))?;
        let min = config.description_min_len;

        Ok(Self::new(vec![
            FieldRules::new(CourseField::Name)
                .required("Course name is required")
                .matches(name_pattern, "Invalid name"),
            FieldRules::new(CourseField::Description)
                .required("Description is required")
                .min_length(min, format!("Must be at least {} characters", min)),
        ]))
    }

    pub fn validate(&self, values: &CourseFields) -> ValidationResult {
        let errors = self
            .fields
            .iter()
            .filter_map(|rules| {
                rules
                    .first_failure(values.get(rules.field))
                    .map(|message| (rules.field, message.to_string()))
            })
            .collect();
        ValidationResult { errors }
    }

    /// True exactly when `validate` finds nothing.
    pub fn can_submit(&self, values: &CourseFields) -> bool {
        self.validate(values).is_empty()
    }
}

/// Field name to error message; empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<CourseField, String>,
}

impl ValidationResult {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: CourseField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    fn iter(&self) -> impl Iterator<Item = (CourseField, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}
