use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use common::prelude::PipelineDefinition;

use crate::database::Database;

/// A pipeline definition as persisted, keyed by its name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredPipeline {
    pub name: String,
    /// JSON form of the [`PipelineDefinition`]
    pub definition: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum StoredPipelineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored definition is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoredPipeline {
    /// Decode the stored JSON definition
    pub fn parse_definition(&self) -> Result<PipelineDefinition, serde_json::Error> {
        serde_json::from_str(&self.definition)
    }

    /// Insert a new definition. Returns `None` if the name is already taken.
    pub async fn create(
        definition: &PipelineDefinition,
        db: &Database,
    ) -> Result<Option<StoredPipeline>, StoredPipelineError> {
        let json = serde_json::to_string(definition)?;

        let result = sqlx::query(
            r#"
            INSERT INTO pipelines (name, definition)
            VALUES (?1, ?2)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(&definition.name)
        .bind(json)
        .execute(&**db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Self::get(&definition.name, db).await?)
    }

    /// Get a definition by name
    pub async fn get(name: &str, db: &Database) -> Result<Option<StoredPipeline>, sqlx::Error> {
        sqlx::query_as::<_, StoredPipeline>(
            r#"
            SELECT name, definition, created_at, updated_at
            FROM pipelines
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&**db)
        .await
    }

    /// List all definitions, by name
    pub async fn list(db: &Database) -> Result<Vec<StoredPipeline>, sqlx::Error> {
        sqlx::query_as::<_, StoredPipeline>(
            r#"
            SELECT name, definition, created_at, updated_at
            FROM pipelines
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&**db)
        .await
    }

    /// Overwrite the definition stored under `definition.name`.
    /// Returns `None` if there is nothing stored under that name.
    pub async fn update(
        definition: &PipelineDefinition,
        db: &Database,
    ) -> Result<Option<StoredPipeline>, StoredPipelineError> {
        let json = serde_json::to_string(definition)?;

        let result = sqlx::query(
            r#"
            UPDATE pipelines
            SET definition = ?1, updated_at = CURRENT_TIMESTAMP
            WHERE name = ?2
            "#,
        )
        .bind(json)
        .bind(&definition.name)
        .execute(&**db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Self::get(&definition.name, db).await?)
    }

    /// Delete a definition
    pub async fn delete(name: &str, db: &Database) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pipelines WHERE name = ?1")
            .bind(name)
            .execute(&**db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::ComponentDefinition;

    fn definition(name: &str, sink: &str) -> PipelineDefinition {
        PipelineDefinition::new(
            name,
            vec![
                ComponentDefinition::new("rot", vec![]),
                ComponentDefinition::new(sink, vec![]),
            ],
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::in_memory().await.unwrap();
        let stored = StoredPipeline::create(&definition("a", "mem"), &db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "a");
        assert_eq!(stored.parse_definition().unwrap(), definition("a", "mem"));

        let fetched = StoredPipeline::get("a", &db).await.unwrap().unwrap();
        assert_eq!(fetched.definition, stored.definition);
        assert!(StoredPipeline::get("b", &db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = Database::in_memory().await.unwrap();
        assert!(StoredPipeline::create(&definition("a", "mem"), &db)
            .await
            .unwrap()
            .is_some());
        assert!(StoredPipeline::create(&definition("a", "pastebin"), &db)
            .await
            .unwrap()
            .is_none());

        // the original survives
        let stored = StoredPipeline::get("a", &db).await.unwrap().unwrap();
        assert_eq!(stored.parse_definition().unwrap(), definition("a", "mem"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        assert!(StoredPipeline::update(&definition("a", "mem"), &db)
            .await
            .unwrap()
            .is_none());

        StoredPipeline::create(&definition("a", "mem"), &db)
            .await
            .unwrap();
        let updated = StoredPipeline::update(&definition("a", "dropbox"), &db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.parse_definition().unwrap(), definition("a", "dropbox"));

        assert!(StoredPipeline::delete("a", &db).await.unwrap());
        assert!(!StoredPipeline::delete("a", &db).await.unwrap());
        assert!(StoredPipeline::list(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let db = Database::in_memory().await.unwrap();
        for name in ["zeta", "alpha", "mid"] {
            StoredPipeline::create(&definition(name, "mem"), &db)
                .await
                .unwrap();
        }
        let names: Vec<String> = StoredPipeline::list(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
