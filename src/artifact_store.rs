use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

// Extension fixe des artefacts : les graphiques sont rendus en SVG.
pub const ARTIFACT_EXT: &str = "svg";

// Stockage durable des graphiques rendus : un fichier par clé
// canonique dans un répertoire dédié. La présence du fichier fait foi ;
// l'index SQLite n'est qu'un accélérateur dérivé.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    // Nom de fichier canonique d'une clé, relatif au répertoire.
    pub fn filename(key: &str) -> String {
        format!("{}.{}", key, ARTIFACT_EXT)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(Self::filename(key))
    }

    pub async fn exists(&self, key: &str) -> bool {
        fs::try_exists(self.path(key)).await.unwrap_or(false)
    }

    // Lecture d'un artefact ; `NotFound` si la clé est absente. Le
    // chemin chaud vérifie `exists` d'abord, cette erreur n'y sert donc
    // que de garde-fou.
    pub async fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path(key)).await
    }

    // Écriture durable des octets sous la clé. Idempotente pour un
    // même couple clé/octets ; réécrire des octets différents sous une
    // clé existante est interdit par construction (clés déterministes
    // du contenu). L'insertion dans l'index n'a lieu qu'après le retour
    // de cette fonction.
    pub async fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.path(key), bytes).await
    }

    // Vide le répertoire des artefacts. Best-effort : une entrée non
    // régulière (sous-répertoire, lien) est ignorée, un échec de
    // suppression est journalisé sans interrompre le reste.
    pub async fn reset(&self) -> io::Result<()> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Répertoire encore jamais créé : rien à nettoyer.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let mut removed = 0u32;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match entry.file_type().await {
                Ok(ft) if ft.is_file() => match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("Impossible de supprimer {}: {}", path.display(), e),
                },
                Ok(_) => warn!("Entrée non régulière ignorée: {}", path.display()),
                Err(e) => warn!("Type illisible pour {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            info!("Cache réinitialisé: {} artefact(s) supprimé(s)", removed);
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
