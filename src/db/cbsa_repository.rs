use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::db::DbError;
use crate::models::CoreBasedStatisticalArea;

const DROP_TABLE: &str = "DROP TABLE IF EXISTS core_based_statistical_areas";

const CREATE_TABLE: &str = r#"
    CREATE TABLE core_based_statistical_areas (
        position INTEGER PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        area_type TEXT NOT NULL,
        document JSONB NOT NULL
    )
"#;

/// Document store for assembled statistical areas.
///
/// Each area is kept whole as a JSONB document; the table is rebuilt on every
/// load.
#[derive(Clone)]
pub struct CbsaRepository {
    pool: PgPool,
}

impl CbsaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop and recreate the table, then insert `areas` in order, in one transaction
    #[instrument(skip(self, areas), fields(count = areas.len()))]
    pub async fn replace_all(&self, areas: &[CoreBasedStatisticalArea]) -> Result<usize, DbError> {
        debug!("Beginning transaction to replace statistical areas");
        let mut tx = self.pool.begin().await?;

        sqlx::query(DROP_TABLE).execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;

        let mut inserted = 0;
        for (position, area) in areas.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT INTO core_based_statistical_areas (position, code, title, area_type, document)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(position as i32)
            .bind(&area.code)
            .bind(&area.title)
            .bind(area.area_type.as_str())
            .bind(Json(area))
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        info!("Inserted {} statistical areas", inserted);
        Ok(inserted)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM core_based_statistical_areas")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// All stored areas in insertion order
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<CoreBasedStatisticalArea>, DbError> {
        let documents = sqlx::query_scalar::<_, Json<CoreBasedStatisticalArea>>(
            "SELECT document FROM core_based_statistical_areas ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} statistical areas", documents.len());
        Ok(documents.into_iter().map(|document| document.0).collect())
    }

    #[instrument(skip(self), fields(code = %code))]
    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<CoreBasedStatisticalArea>, DbError> {
        let document = sqlx::query_scalar::<_, Json<CoreBasedStatisticalArea>>(
            "SELECT document FROM core_based_statistical_areas WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document.map(|document| document.0))
    }
}
