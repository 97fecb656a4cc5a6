//! Accession lookups against the ENA portal file report.
//!
//! `GET {endpoint}/filereport?result=read_run&fields=fastq_ftp&format=JSON&accession=…`
//! answers with a JSON array of run records. Only the first record is used;
//! its `fastq_ftp` field holds `;`-separated `server/path` locations.

use super::LinkResolver;
use crate::download::RemoteLocation;
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::debug;

/// Public ENA portal API.
pub const DEFAULT_ENDPOINT: &str = "https://www.ebi.ac.uk/ena/portal/api";

/// One record of the file report.
#[derive(Debug, Clone, Deserialize)]
pub struct FileReportRecord {
    #[serde(default)]
    pub run_accession: Option<String>,
    #[serde(default)]
    pub fastq_ftp: Option<String>,
}

/// Resolves accessions through the ENA file report endpoint.
#[derive(Clone)]
pub struct EnaResolver {
    endpoint: String,
    client: ClientWithMiddleware,
}

impl EnaResolver {
    /// Resolver for the public ENA endpoint with default HTTP settings.
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, HttpClientConfig::default())
    }

    /// Resolver for a custom endpoint, e.g. a mirror or a test server.
    pub fn with_endpoint(endpoint: &str, config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: create_http_client(config)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LinkResolver for EnaResolver {
    async fn resolve(&self, accession: &str) -> Result<Vec<RemoteLocation>> {
        let url = format!("{}/filereport", self.endpoint);
        debug!("Resolving {} via {}", accession, url);

        let res = self
            .client
            .get(&url)
            .query(&[
                ("result", "read_run"),
                ("fields", "fastq_ftp"),
                ("format", "JSON"),
                ("accession", accession),
            ])
            .send()
            .await
            .map_err(|e| Error::resolution(accession, format!("metadata service unreachable: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::resolution(
                accession,
                format!("metadata service answered {}", status),
            ));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| Error::resolution(accession, format!("cannot read response: {}", e)))?;
        let records: Vec<FileReportRecord> = serde_json::from_slice(&body)
            .map_err(|e| Error::resolution(accession, format!("malformed response: {}", e)))?;

        let record = records
            .first()
            .ok_or_else(|| Error::resolution(accession, "no run record found"))?;
        let field = record.fastq_ftp.as_deref().unwrap_or_default();

        let locations = parse_locations(field).map_err(|e| Error::resolution(accession, e))?;
        if locations.is_empty() {
            return Err(Error::resolution(accession, "run record lists no files"));
        }

        debug!("{} resolved to {} location(s)", accession, locations.len());
        Ok(locations)
    }
}

/// Split a `;`-separated location field, skipping empty entries.
pub fn parse_locations(field: &str) -> Result<Vec<RemoteLocation>> {
    field
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        let locations = parse_locations(
            "ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001_1.fastq.gz;ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/SRR000001_2.fastq.gz",
        )
        .unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].filename(), "SRR000001_1.fastq.gz");
        assert_eq!(locations[1].filename(), "SRR000001_2.fastq.gz");
        assert!(locations.iter().all(|l| l.server() == "ftp.sra.ebi.ac.uk"));
    }

    #[test]
    fn test_parse_locations_skips_blanks() {
        assert!(parse_locations("").unwrap().is_empty());
        assert_eq!(parse_locations("h/a.gz;;").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_locations_rejects_bad_entry() {
        assert!(matches!(
            parse_locations("h/a.gz;nopath"),
            Err(Error::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let records: Vec<FileReportRecord> =
            serde_json::from_str(r#"[{"run_accession":"SRR1"}]"#).unwrap();
        assert_eq!(records[0].run_accession.as_deref(), Some("SRR1"));
        assert!(records[0].fastq_ftp.is_none());
    }
}
