use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, NewLead, ENRICHMENT_FIELDS};
use sqlx::SqlitePool;
use std::sync::OnceLock;

/// `INSERT` over `input_data` followed by every enrichment column in field-table order.
fn insert_sql() -> &'static str {
    static SQL: OnceLock<String> = OnceLock::new();
    SQL.get_or_init(|| {
        let columns: Vec<&str> = std::iter::once("input_data")
            .chain(ENRICHMENT_FIELDS.iter().map(|f| f.column))
            .collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO leads ({}) VALUES ({})",
            columns.join(", "),
            placeholders
        )
    })
}

/// Persistent collection of enriched leads.
///
/// Rows are only ever inserted or deleted; there is no update path.
#[derive(Clone)]
pub struct LeadStore {
    pool: SqlitePool,
}

impl LeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All leads, newest first.
    pub async fn list(&self) -> Result<Vec<Lead>, AppError> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .context("listing leads")
    }

    pub async fn get(&self, id: i64) -> Result<Option<Lead>, AppError> {
        sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("loading lead {}", id))
    }

    /// Stores a lead and returns its id. Absent fields are already empty strings.
    pub async fn insert(&self, lead: &NewLead) -> Result<i64, AppError> {
        let mut query = sqlx::query(insert_sql()).bind(lead.input_data.as_str());
        for value in lead.enrichment.values() {
            query = query.bind(value);
        }

        let result = query
            .execute(&self.pool)
            .await
            .context("inserting lead")?;

        let id = result.last_insert_rowid();
        tracing::debug!("Stored lead {}", id);
        Ok(id)
    }

    /// Deletes a lead by id. Returns whether a row was removed; a missing id is not an error.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("deleting lead {}", id))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await
            .context("counting leads")
    }

    /// Removes every lead and restarts id numbering at 1.
    pub async fn reset(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.context("starting reset")?;

        sqlx::query("DELETE FROM leads")
            .execute(&mut *tx)
            .await
            .context("clearing leads")?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'leads'")
            .execute(&mut *tx)
            .await
            .context("resetting lead ids")?;

        tx.commit().await.context("committing reset")?;
        tracing::warn!("Lead store reset: all leads removed");
        Ok(())
    }
}
