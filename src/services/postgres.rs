use crate::models::StoreLink;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Historical rate observation from the SQL-backed data service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[serde(rename = "unitSize")]
    pub unit_size: String,
    #[serde(rename = "streetRate")]
    pub street_rate: f64,
    #[serde(rename = "webRate")]
    pub web_rate: Option<f64>,
    #[serde(rename = "recordedAt")]
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// Aggregate link statistics for a subject store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStats {
    pub subject_store_id: String,
    pub total_links: i64,
    pub best_score: Option<f64>,
    pub last_linked_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// PostgreSQL client for rate history and confirmed store links
///
/// The rate history tables are populated by a separate ingestion job; this
/// service reads them and records which CRM record a subject store was
/// reconciled to, so accepted matches survive restarts.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Record a confirmed link between a subject store and a CRM record
    ///
    /// Uses INSERT ... ON CONFLICT so re-confirming an existing link just
    /// refreshes the score and timestamp.
    pub async fn record_link(
        &self,
        subject_store_id: &str,
        crm_record_id: &str,
        brand_name: &str,
        extracted_street: &str,
        combined_score: f64,
    ) -> Result<(), PostgresError> {
        if !(0.0..=1.0).contains(&combined_score) {
            return Err(PostgresError::InvalidInput(format!(
                "combined_score {} outside [0, 1]",
                combined_score
            )));
        }

        let query = r#"
            INSERT INTO store_links (subject_store_id, crm_record_id, brand_name, extracted_street, combined_score, linked_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (subject_store_id, crm_record_id)
            DO UPDATE SET
                brand_name = EXCLUDED.brand_name,
                extracted_street = EXCLUDED.extracted_street,
                combined_score = EXCLUDED.combined_score,
                linked_at = EXCLUDED.linked_at
        "#;

        sqlx::query(query)
            .bind(subject_store_id)
            .bind(crm_record_id)
            .bind(brand_name)
            .bind(extracted_street)
            .bind(combined_score)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded store link: {} -> {} ({:.3})",
            subject_store_id,
            crm_record_id,
            combined_score
        );

        Ok(())
    }

    /// Get all confirmed links for a subject store, newest first
    pub async fn get_links(&self, subject_store_id: &str) -> Result<Vec<StoreLink>, PostgresError> {
        let query = r#"
            SELECT subject_store_id, crm_record_id, brand_name, extracted_street, combined_score, linked_at
            FROM store_links
            WHERE subject_store_id = $1
            ORDER BY linked_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(subject_store_id)
            .fetch_all(&self.pool)
            .await?;

        let links: Vec<StoreLink> = rows
            .iter()
            .map(|row| StoreLink {
                subject_store_id: row.get("subject_store_id"),
                crm_record_id: row.get("crm_record_id"),
                brand_name: row.get("brand_name"),
                extracted_street: row.get("extracted_street"),
                combined_score: row.get("combined_score"),
                linked_at: row.get("linked_at"),
            })
            .collect();

        tracing::debug!("Subject {} has {} links", subject_store_id, links.len());

        Ok(links)
    }

    /// Remove one link (e.g. when a reconciliation was accepted in error)
    pub async fn remove_link(
        &self,
        subject_store_id: &str,
        crm_record_id: &str,
    ) -> Result<bool, PostgresError> {
        let query = r#"
            DELETE FROM store_links
            WHERE subject_store_id = $1 AND crm_record_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(subject_store_id)
            .bind(crm_record_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch historical rate observations for a postal code
    ///
    /// `unit_size` narrows to one unit type when present.
    pub async fn get_rate_history(
        &self,
        postal_code: &str,
        unit_size: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RateSnapshot>, PostgresError> {
        let query = r#"
            SELECT postal_code, unit_size, street_rate, web_rate, recorded_at
            FROM rate_history
            WHERE postal_code = $1
              AND ($2::text IS NULL OR unit_size = $2)
            ORDER BY recorded_at DESC
            LIMIT $3
        "#;

        let rows = sqlx::query(query)
            .bind(postal_code)
            .bind(unit_size)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let snapshots: Vec<RateSnapshot> = rows
            .iter()
            .map(|row| RateSnapshot {
                postal_code: row.get("postal_code"),
                unit_size: row.get("unit_size"),
                street_rate: row.get("street_rate"),
                web_rate: row.get("web_rate"),
                recorded_at: row.get("recorded_at"),
            })
            .collect();

        tracing::debug!(
            "Fetched {} rate snapshots for {}",
            snapshots.len(),
            postal_code
        );

        Ok(snapshots)
    }

    /// Aggregate link statistics for a subject store
    pub async fn get_link_stats(&self, subject_store_id: &str) -> Result<LinkStats, PostgresError> {
        let query = r#"
            SELECT
                COUNT(*) as total_links,
                MAX(combined_score) as best_score,
                MAX(linked_at) as last_linked_at
            FROM store_links
            WHERE subject_store_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(subject_store_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(LinkStats {
            subject_store_id: subject_store_id.to_string(),
            total_links: row.get("total_links"),
            best_score: row.get("best_score"),
            last_linked_at: row.get("last_linked_at"),
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_snapshot_serializes_camel_case() {
        let snapshot = RateSnapshot {
            postal_code: "90210".to_string(),
            unit_size: "10x10".to_string(),
            street_rate: 129.0,
            web_rate: None,
            recorded_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("postalCode").is_some());
        assert!(json.get("streetRate").is_some());
    }
}
