use sqlx::sqlite::SqlitePool;
use tracing::info;

// Une entrée de l'index : la provenance d'un artefact rendu. Créée une
// seule fois par clé au premier rendu, jamais modifiée, détruite
// uniquement par le reset complet.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub cache_key: String,
    pub station_id: String,
    pub range_start: String,
    pub range_end: String,
    pub filename: String,
    pub created_at: f64,
}

// Index des graphiques rendus, adossé à la table `chart_cache`. Il se
// reconstruit à partir du répertoire d'artefacts : une ligne n'est
// jamais la source de vérité, le fichier sur disque l'est.
#[derive(Debug, Clone)]
pub struct CacheIndex {
    db: SqlitePool,
}

impl CacheIndex {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn lookup(&self, cache_key: &str) -> Result<Option<CacheEntry>, sqlx::Error> {
        let row = sqlx::query_as::<_, (String, String, String, String, String, f64)>(
            "SELECT cache_key, station_id, range_start, range_end, filename, created_at
             FROM chart_cache WHERE cache_key = ?",
        )
        .bind(cache_key)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(
            |(cache_key, station_id, range_start, range_end, filename, created_at)| CacheEntry {
                cache_key,
                station_id,
                range_start,
                range_end,
                filename,
                created_at,
            },
        ))
    }

    // `INSERT OR IGNORE` : la contrainte UNIQUE sur cache_key garantit
    // au plus une ligne par clé canonique, même si deux rendus
    // concurrents aboutissent ici.
    pub async fn insert(&self, entry: &CacheEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO chart_cache
             (cache_key, station_id, range_start, range_end, filename, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.cache_key)
        .bind(&entry.station_id)
        .bind(&entry.range_start)
        .bind(&entry.range_end)
        .bind(&entry.filename)
        .bind(entry.created_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM chart_cache")
            .execute(&self.db)
            .await?;
        if result.rows_affected() > 0 {
            info!(
                "Index du cache vidé: {} entrée(s) supprimée(s)",
                result.rows_affected()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_database;
    use tempfile::TempDir;

    async fn test_index() -> (CacheIndex, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db_file = dir.path().join("test.sqlite");
        let pool = init_database(db_file.to_str().expect("utf-8 path"))
            .await
            .expect("init");
        (CacheIndex::new(pool), dir)
    }

    fn entry(key: &str) -> CacheEntry {
        CacheEntry {
            cache_key: key.to_string(),
            station_id: "42".to_string(),
            range_start: "2024-01-01".to_string(),
            range_end: "2024-01-31".to_string(),
            filename: format!("{}.svg", key),
            created_at: 1_700_000_000.0,
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_inserted_entry() {
        let (index, _dir) = test_index().await;
        let e = entry("station_42_start_2024-01-01_end_2024-01-31_t1s1m0e0");

        index.insert(&e).await.expect("insert");

        let found = index
            .lookup(&e.cache_key)
            .await
            .expect("lookup")
            .expect("entry should exist");
        assert_eq!(found, e);
    }

    #[tokio::test]
    async fn test_lookup_missing_key_returns_none() {
        let (index, _dir) = test_index().await;
        assert!(index.lookup("inconnue").await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_single_entry() {
        let (index, _dir) = test_index().await;
        let first = entry("station_42_start_all_end_all_t1s0m0e0");
        let mut second = first.clone();
        second.created_at = first.created_at + 60.0;

        index.insert(&first).await.expect("first insert");
        index.insert(&second).await.expect("second insert");

        let found = index
            .lookup(&first.cache_key)
            .await
            .expect("lookup")
            .expect("entry should exist");
        // La première insertion gagne, la seconde est ignorée.
        assert_eq!(found.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_clear_empties_the_index() {
        let (index, _dir) = test_index().await;
        index.insert(&entry("a")).await.expect("insert a");
        index.insert(&entry("b")).await.expect("insert b");

        index.clear().await.expect("clear");

        assert!(index.lookup("a").await.expect("lookup").is_none());
        assert!(index.lookup("b").await.expect("lookup").is_none());
    }
}
