use sqlx::sqlite::SqlitePool;
use tracing::info;

// Migration embarquée dans le binaire, appliquée au plus une fois et
// tracée dans la table `schema_migrations`.
struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
}

// L'ordre du tableau est l'ordre d'application.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_stations",
        sql: include_str!("../migrations/001_create_stations.sql"),
    },
    Migration {
        version: 2,
        name: "create_histo",
        sql: include_str!("../migrations/002_create_histo.sql"),
    },
    Migration {
        version: 3,
        name: "create_chart_cache",
        sql: include_str!("../migrations/003_create_chart_cache.sql"),
    },
];

// Ouvre la base SQLite (`rwc` : création du fichier si absent) et
// applique les migrations manquantes. Les données stations/histo sont
// importées hors processus ; le serveur ne les lit qu'en lecture seule.
pub async fn init_database(db_file: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_file)).await?;

    // Réglages SQLite : WAL pour ne pas bloquer les lecteurs pendant
    // l'insertion des entrées d'index, et un busy_timeout plutôt qu'une
    // erreur immédiate si la base est momentanément verrouillée.
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA temp_store = MEMORY")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at REAL NOT NULL
        )",
    )
    .execute(&pool)
    .await?;

    for migration in MIGRATIONS {
        let applied =
            sqlx::query_as::<_, (i32,)>("SELECT version FROM schema_migrations WHERE version = ?")
                .bind(migration.version)
                .fetch_optional(&pool)
                .await?
                .is_some();

        if !applied {
            info!(
                "Running migration {}: {}",
                migration.version, migration.name
            );

            // Chaque migration s'exécute dans sa propre transaction :
            // tout passe ou rien ne passe.
            let mut tx = pool.begin().await?;
            sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
            sqlx::query(
                "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
            )
            .bind(migration.version)
            .bind(migration.name)
            .bind(current_timestamp())
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            info!("Migration {} applied successfully", migration.version);
        }
    }

    info!("Database initialization complete");

    Ok(pool)
}

// Timestamp courant en secondes (f64), format commun à tout le serveur.
pub fn current_timestamp() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
