use crate::artifact_store::ArtifactStore;
use crate::cache_index::{CacheEntry, CacheIndex};
use crate::cache_key::ChartQuery;
use crate::database::current_timestamp;
use crate::errors::ApiError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

// Orchestrateur du cache de graphiques : construit la clé, sert les
// artefacts déjà rendus, et ne délègue au moteur de rendu qu'au premier
// accès d'une clé. Propriétaire exclusif du répertoire d'artefacts et
// de l'index pour toute la vie du processus.
pub struct ChartCache {
    store: ArtifactStore,
    index: CacheIndex,
    // Un verrou par clé : les rendus de clés distinctes restent
    // parallèles, deux requêtes concurrentes sur la même clé ne
    // rendent qu'une fois. La table ne rétrécit jamais, comme le cache
    // lui-même (pas d'éviction).
    render_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChartCache {
    pub fn new(store: ArtifactStore, index: CacheIndex) -> Self {
        Self {
            store,
            index,
            render_locks: RwLock::new(HashMap::new()),
        }
    }

    // Remise à zéro au démarrage : supprime les artefacts d'une
    // exécution précédente puis vide l'index, dans cet ordre. Après
    // cet appel, toute entrée de l'index correspond à un fichier écrit
    // pendant la vie du processus courant.
    pub async fn reset_all(&self) -> Result<(), ApiError> {
        self.store.reset().await?;
        self.index.clear().await?;
        Ok(())
    }

    // Point d'entrée unique du sous-système. `render_fn` retourne
    // `Ok(None)` quand la plage interrogée ne contient aucun relevé :
    // on répond alors avec un corps vide sans rien persister, car la
    // même plage peut devenir non vide à l'arrivée de nouvelles
    // données. L'ordre écriture-fichier puis insertion-index est
    // impératif : une panne d'E/S ne laisse jamais l'index pointer
    // vers des octets absents.
    pub async fn lookup_or_render<F, Fut>(
        &self,
        query: &ChartQuery,
        render_fn: F,
    ) -> Result<Vec<u8>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Vec<u8>>, ApiError>>,
    {
        let key = query.cache_key();

        // Chemin chaud : le fichier sur disque fait foi.
        if self.store.exists(&key).await {
            return self.serve_hit(query, &key).await;
        }

        let lock = self.render_lock(&key).await;
        let _guard = lock.lock().await;

        // Revérification sous verrou : un rendu concurrent de la même
        // clé a pu aboutir pendant l'attente.
        if self.store.exists(&key).await {
            return self.serve_hit(query, &key).await;
        }

        match render_fn().await? {
            // Plage sans relevé : artefact vide, jamais mis en cache.
            None => {
                info!("Aucun relevé pour {}, réponse vide non mise en cache", key);
                Ok(Vec::new())
            }
            Some(bytes) => {
                info!("Rendu du graphique {}", key);
                self.store.write(&key, &bytes).await?;
                self.index
                    .insert(&CacheEntry {
                        cache_key: key.clone(),
                        station_id: query.station_id.clone(),
                        range_start: query.range_start(),
                        range_end: query.range_end(),
                        filename: ArtifactStore::filename(&key),
                        created_at: current_timestamp(),
                    })
                    .await?;
                Ok(bytes)
            }
        }
    }

    // Sert un artefact présent sur disque et répare l'index si la
    // ligne de provenance manque (fichier présent sans ligne : il fait
    // foi, l'index n'est qu'un dérivé reconstructible).
    async fn serve_hit(&self, query: &ChartQuery, key: &str) -> Result<Vec<u8>, ApiError> {
        let bytes = self.store.read(key).await?;
        if self.index.lookup(key).await?.is_none() {
            self.index
                .insert(&CacheEntry {
                    cache_key: key.to_string(),
                    station_id: query.station_id.clone(),
                    range_start: query.range_start(),
                    range_end: query.range_end(),
                    filename: ArtifactStore::filename(key),
                    created_at: current_timestamp(),
                })
                .await?;
        }
        Ok(bytes)
    }

    async fn render_lock(&self, key: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.render_locks.read().await;
            if let Some(lock) = locks.get(key) {
                return lock.clone();
            }
        }
        let mut locks = self.render_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
