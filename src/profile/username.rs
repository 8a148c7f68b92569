use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::profile::error::{ProfileError, validation_error};

pub const MAX_USERNAME_LEN: usize = 39;

/// A GitHub login that has passed validation. Only these reach storage or the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, ProfileError> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Err(validation_error("username cannot be empty"));
        }
        if candidate.chars().count() > MAX_USERNAME_LEN {
            return Err(validation_error(format!(
                "username '{candidate}' exceeds {MAX_USERNAME_LEN} characters"
            )));
        }
        if !username_pattern().is_match(candidate) {
            return Err(validation_error(format!(
                "username '{candidate}' may only contain alphanumerics and single hyphens, \
                 and cannot begin or end with a hyphen"
            )));
        }

        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

fn username_pattern() -> &'static Regex {
    static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9]+(-[A-Za-z0-9]+)*$").expect("username pattern must compile")
    });
    &PATTERN
}
