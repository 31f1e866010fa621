use crate::models::{MatchQuery, RateRecord, ScoredMatch};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while rendering CSV exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("CSV write failed: {0}")]
    WriteError(String),
}

/// Flat CSV row for a scored reconciliation result
///
/// The subject columns repeat per row so the file stands alone in a
/// spreadsheet without the originating query.
#[derive(Debug, Serialize)]
struct MatchExportRow<'a> {
    subject_store_name: &'a str,
    subject_street: &'a str,
    crm_record_id: &'a str,
    brand_name: &'a str,
    extracted_street: &'a str,
    name_score: f64,
    address_score: f64,
    combined_score: f64,
    year_built: Option<i32>,
    square_footage: Option<f64>,
}

/// Flat CSV row for a competitive rate observation
#[derive(Debug, Serialize)]
struct RateExportRow<'a> {
    store_name: &'a str,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    postal_code: &'a str,
    unit_size: &'a str,
    climate_controlled: bool,
    street_rate: f64,
    web_rate: Option<f64>,
    promo: &'a str,
}

/// Render ranked matches as CSV
pub fn matches_to_csv(query: &MatchQuery, matches: &[ScoredMatch]) -> Result<String, ExportError> {
    let subject_name = query.target_store_name.as_deref().unwrap_or("");
    let mut writer = csv::Writer::from_writer(Vec::new());

    for m in matches {
        writer.serialize(MatchExportRow {
            subject_store_name: subject_name,
            subject_street: &query.target_street,
            crm_record_id: m.crm_record_id.as_deref().unwrap_or(""),
            brand_name: &m.brand_name,
            extracted_street: &m.extracted_street,
            name_score: m.name_score,
            address_score: m.address_score,
            combined_score: m.combined_score,
            year_built: m.year_built,
            square_footage: m.square_footage,
        })?;
    }

    finish(writer)
}

/// Render competitive rates as CSV
pub fn rates_to_csv(rates: &[RateRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for rate in rates {
        writer.serialize(RateExportRow {
            store_name: &rate.store_name,
            address: rate.address.as_deref().unwrap_or(""),
            city: rate.city.as_deref().unwrap_or(""),
            state: rate.state.as_deref().unwrap_or(""),
            postal_code: rate.postal_code.as_deref().unwrap_or(""),
            unit_size: &rate.unit_size,
            climate_controlled: rate.climate_controlled,
            street_rate: rate.street_rate,
            web_rate: rate.web_rate,
            promo: rate.promo.as_deref().unwrap_or(""),
        })?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::WriteError(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_query() -> MatchQuery {
        MatchQuery {
            target_store_name: Some("Acme Storage".to_string()),
            target_street: "456 Oak Avenue".to_string(),
            city: Some("Metro".to_string()),
            state: None,
            postal_code: None,
        }
    }

    fn sample_match() -> ScoredMatch {
        ScoredMatch {
            crm_record_id: Some("a1".to_string()),
            brand_name: "Acme Storage".to_string(),
            extracted_street: "456 Oak Ave".to_string(),
            name_score: 1.0,
            address_score: 1.0,
            combined_score: 1.0,
            year_built: Some(2005),
            square_footage: None,
        }
    }

    #[test]
    fn test_matches_to_csv_has_header_and_rows() {
        let csv = matches_to_csv(&sample_query(), &[sample_match()]).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("subject_store_name,subject_street,crm_record_id"));

        let row = lines.next().unwrap();
        assert!(row.contains("Acme Storage"));
        assert!(row.contains("456 Oak Ave"));
        assert!(row.contains("2005"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_matches_to_csv_empty_matches() {
        let csv = matches_to_csv(&sample_query(), &[]).unwrap();
        assert!(csv.is_empty());
    }

    #[test]
    fn test_rates_to_csv() {
        let rate = RateRecord {
            store_name: "Acme Storage".to_string(),
            address: Some("456 Oak Ave".to_string()),
            city: Some("Metro".to_string()),
            state: Some("CA".to_string()),
            postal_code: Some("90210".to_string()),
            unit_size: "10x10".to_string(),
            climate_controlled: true,
            street_rate: 129.0,
            web_rate: Some(119.0),
            promo: None,
        };

        let csv = rates_to_csv(&[rate]).unwrap();
        assert!(csv.lines().next().unwrap().starts_with("store_name,address,city"));
        assert!(csv.contains("129.0"));
    }
}
