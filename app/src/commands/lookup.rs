//! Lookup commands
use serde::Serialize;

use super::{CommandResult, RecordInfo};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CityInfo {
    pub code: String,
    pub found: bool,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ZipcodeMatches {
    pub city: String,
    pub matches: Vec<RecordInfo>,
}

pub async fn lookup_city(state: &AppState, code: String) -> CommandResult<CityInfo> {
    state
        .directory()
        .city_for(&code)
        .await
        .map(|city| CityInfo {
            found: city.is_some(),
            label: city.unwrap_or_else(|| zipdb_core::UNKNOWN_ZIP_CODE.to_string()),
            code,
        })
        .into()
}

pub async fn lookup_zipcodes(state: &AppState, city: String) -> CommandResult<ZipcodeMatches> {
    state
        .directory()
        .zipcodes_for(&city)
        .await
        .map(|records| ZipcodeMatches {
            city,
            matches: records.into_iter().map(RecordInfo::from).collect(),
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{sample_state, state_with};
    use zipdb_core::RecordSource;

    #[tokio::test]
    async fn test_lookup_city() {
        let state = sample_state();

        let found = lookup_city(&state, "02134".to_string()).await;
        assert!(found.success);
        let info = found.data.unwrap();
        assert!(info.found);
        assert_eq!(info.label, "Allston, MA");

        let missing = lookup_city(&state, "99999".to_string()).await;
        assert!(missing.success);
        let info = missing.data.unwrap();
        assert!(!info.found);
        assert_eq!(info.label, "Unknown zip code");
    }

    #[tokio::test]
    async fn test_lookup_zipcodes() {
        let state = sample_state();

        let result = lookup_zipcodes(&state, "Allston".to_string()).await;
        let matches = result.data.unwrap().matches;
        let lines: Vec<&str> = matches.iter().map(|m| m.display.as_str()).collect();
        assert_eq!(lines, vec!["02134: Allston, MA", "02135: Allston, MA"]);

        let none = lookup_zipcodes(&state, "allston".to_string()).await;
        assert!(none.success);
        assert!(none.data.unwrap().matches.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_reported_in_envelope() {
        let state = state_with(RecordSource::File("/nonexistent/zipdb/zipcodes.json".into()));

        let result = lookup_city(&state, "02134".to_string()).await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.error.unwrap().contains("Initialization error"));
    }
}
