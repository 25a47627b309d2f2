use std::path::PathBuf;

// Configuration du processus, lue une fois au démarrage puis passée
// telle quelle aux constructeurs. Aucun état global modifiable.
#[derive(Debug, Clone)]
pub struct Config {
    // Fichier SQLite contenant les stations, l'historique et l'index du cache.
    pub database_file: String,
    // Répertoire où sont écrits les graphiques rendus.
    pub cache_dir: PathBuf,
    // Port TCP d'écoute.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let database_file =
            std::env::var("DATABASE_FILE").unwrap_or_else(|_| "velov.sqlite".to_string());
        let cache_dir = std::env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("courbes"));
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            database_file,
            cache_dir,
            port,
        }
    }
}
