//! Postal-code record

use serde::{Deserialize, Serialize};
use std::fmt;

/// One postal-code entry. `code` is the primary key.
///
/// Bulk data may use the older `zipcode`/`state` field names; they map
/// onto `code`/`region`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    #[serde(alias = "zipcode")]
    pub code: String,
    pub city: String,
    #[serde(alias = "state")]
    pub region: String,
}

impl Record {
    pub fn new(
        code: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            city: city.into(),
            region: region.into(),
        }
    }

    /// `"City, ST"`
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.region)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}, {}", self.code, self.city, self.region)
    }
}
