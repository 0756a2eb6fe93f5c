//! Field validation for request payloads.
//!
//! Each payload type has an ordered list of rules. A rule pairs the name of
//! the field it guards with a predicate and the message reported when the
//! predicate fails. All rules are evaluated, so callers receive every
//! violation at once.

use chrono::Utc;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{FilmInput, UserInput};

/// Maximum length of a film description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Name of the offending field, as it appears in JSON.
    pub field_name: String,
    /// Human-readable reason.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

/// A validation rule over `T`.
pub struct Rule<T> {
    /// JSON field name.
    pub field: &'static str,
    /// Returns true when the value is acceptable.
    pub check: fn(&T) -> bool,
    /// Message reported on failure.
    pub message: &'static str,
}

/// Types with an ordered rule list.
pub trait Validate: Sized + 'static {
    /// Rules, in evaluation order.
    fn rules() -> &'static [Rule<Self>];

    /// Returns every violated rule.
    fn violations(&self) -> Vec<Violation> {
        Self::rules()
            .iter()
            .filter(|rule| !(rule.check)(self))
            .map(|rule| Violation::new(rule.field, rule.message))
            .collect()
    }

    /// Returns `Err` with all violations if any rule fails.
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

static FILM_RULES: [Rule<FilmInput>; 5] = [
    Rule {
        field: "name",
        check: |film| !film.name.trim().is_empty(),
        message: "must not be empty",
    },
    Rule {
        field: "description",
        check: |film| {
            film.description
                .as_ref()
                .is_none_or(|d| d.chars().count() <= MAX_DESCRIPTION_LEN)
        },
        message: "size must be between 0 and 200",
    },
    Rule {
        field: "description",
        check: |film| film.description.as_ref().is_none_or(|d| !d.trim().is_empty()),
        message: "must not be blank",
    },
    Rule {
        field: "releaseDate",
        check: |film| film.release_date.is_none_or(|d| d < Utc::now().date_naive()),
        message: "must be a past date",
    },
    Rule {
        field: "duration",
        check: |film| film.duration >= 0,
        message: "must be greater than or equal to 0",
    },
];

impl Validate for FilmInput {
    fn rules() -> &'static [Rule<Self>] {
        &FILM_RULES
    }
}

static USER_RULES: [Rule<UserInput>; 5] = [
    Rule {
        field: "email",
        check: |user| !user.email.trim().is_empty(),
        message: "must not be empty",
    },
    Rule {
        field: "email",
        check: |user| user.email.trim().is_empty() || EmailAddress::is_valid(&user.email),
        message: "must be a well-formed email address",
    },
    Rule {
        field: "login",
        check: |user| !user.login.trim().is_empty(),
        message: "must not be blank",
    },
    Rule {
        field: "login",
        check: |user| !user.login.chars().any(char::is_whitespace),
        message: "must not contain whitespace",
    },
    Rule {
        field: "birthday",
        check: |user| user.birthday.is_none_or(|b| b <= Utc::now().date_naive()),
        message: "must not be in the future",
    },
];

impl Validate for UserInput {
    fn rules() -> &'static [Rule<Self>] {
        &USER_RULES
    }
}
