//! Bulk record sources

use std::path::PathBuf;

use url::Url;

use crate::error::SourceError;
use crate::record::Record;

/// Where the initial record set comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSource {
    /// JSON array fetched with HTTP GET
    Http(Url),
    /// JSON array on the local filesystem
    File(PathBuf),
    /// Records handed over directly by the caller
    Inline(Vec<Record>),
}

impl RecordSource {
    /// Parse a location string.
    ///
    /// Absolute `http(s)` URLs fetch over the network, `file://` URLs and
    /// plain paths read from disk. With a `base`, relative locations are
    /// resolved against it first, so `../data/zipcodes.json` behaves the
    /// way it would from a page served at `base`.
    pub fn parse(location: &str, base: Option<&Url>) -> Result<Self, SourceError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(SourceError::InvalidLocation(
                "empty source location".to_string(),
            ));
        }

        match Url::parse(location) {
            Ok(url) => Self::from_url(url, location),
            Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => {
                    let joined = base
                        .join(location)
                        .map_err(|e| SourceError::InvalidLocation(format!("{location}: {e}")))?;
                    Self::from_url(joined, location)
                }
                None => Ok(RecordSource::File(PathBuf::from(location))),
            },
            Err(e) => Err(SourceError::InvalidLocation(format!("{location}: {e}"))),
        }
    }

    fn from_url(url: Url, location: &str) -> Result<Self, SourceError> {
        match url.scheme() {
            "http" | "https" => Ok(RecordSource::Http(url)),
            "file" => url
                .to_file_path()
                .map(RecordSource::File)
                .map_err(|_| SourceError::InvalidLocation(location.to_string())),
            // Windows drive letters parse as one-letter schemes
            scheme if scheme.len() == 1 => Ok(RecordSource::File(PathBuf::from(location))),
            scheme => Err(SourceError::InvalidLocation(format!(
                "unsupported scheme '{scheme}' in {location}"
            ))),
        }
    }

    /// Human-readable origin, stored next to the loaded data.
    pub fn describe(&self) -> String {
        match self {
            RecordSource::Http(url) => url.to_string(),
            RecordSource::File(path) => path.display().to_string(),
            RecordSource::Inline(records) => format!("inline ({} records)", records.len()),
        }
    }

    pub async fn fetch(&self, client: &reqwest::Client) -> Result<Vec<Record>, SourceError> {
        match self {
            RecordSource::Http(url) => {
                let response = client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SourceError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                let body = response.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
            RecordSource::File(path) => {
                let body = tokio::fs::read(path).await.map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(serde_json::from_slice(&body)?)
            }
            RecordSource::Inline(records) => Ok(records.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{allston, http_client, serve_once};

    #[test]
    fn test_parse_absolute_urls_and_paths() {
        assert_eq!(
            RecordSource::parse("https://example.com/data/zipcodes.json", None).unwrap(),
            RecordSource::Http(Url::parse("https://example.com/data/zipcodes.json").unwrap())
        );
        assert_eq!(
            RecordSource::parse("data/zipcodes.json", None).unwrap(),
            RecordSource::File(PathBuf::from("data/zipcodes.json"))
        );
        assert!(matches!(
            RecordSource::parse("ftp://example.com/zipcodes.json", None),
            Err(SourceError::InvalidLocation(_))
        ));
        assert!(matches!(
            RecordSource::parse("   ", None),
            Err(SourceError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_parse_relative_to_base() {
        let base = Url::parse("https://example.com/app/javascripts/index.html").unwrap();
        let source = RecordSource::parse("../data/zipcodes.json", Some(&base)).unwrap();

        assert_eq!(
            source,
            RecordSource::Http(Url::parse("https://example.com/app/data/zipcodes.json").unwrap())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_file_url() {
        assert_eq!(
            RecordSource::parse("file:///var/lib/zipdb/zipcodes.json", None).unwrap(),
            RecordSource::File(PathBuf::from("/var/lib/zipdb/zipcodes.json"))
        );
    }

    #[tokio::test]
    async fn test_fetch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zipcodes.json");
        std::fs::write(
            &path,
            r#"[{"zipcode":"02134","city":"Allston","state":"MA"},
                {"zipcode":"02135","city":"Allston","state":"MA"}]"#,
        )
        .unwrap();

        let records = RecordSource::File(path)
            .fetch(&http_client())
            .await
            .unwrap();
        assert_eq!(records, allston());
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = RecordSource::File(dir.path().join("absent.json"));

        let err = source.fetch(&http_client()).await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_fetch_http() {
        let body = serde_json::to_string(&allston()).unwrap();
        let url = serve_once("200 OK", body).await;

        let records = RecordSource::Http(url)
            .fetch(&http_client())
            .await
            .unwrap();
        assert_eq!(records, allston());
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let url = serve_once("404 Not Found", "{}".to_string()).await;

        let err = RecordSource::Http(url)
            .fetch(&http_client())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let url = serve_once("200 OK", r#"{"not": "an array"}"#.to_string()).await;

        let err = RecordSource::Http(url)
            .fetch(&http_client())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
