use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

// Taxonomie des erreurs exposées par le serveur. Une station inconnue
// est une erreur cliente, détectée avant toute interaction avec le
// cache ; une panne de stockage ou de base est une erreur serveur et
// fait échouer la requête entière (pas de politique de retry).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("ressource non trouvée : {0}")]
    NotFound(String),

    #[error("requête invalide : {0}")]
    BadRequest(String),

    #[error("erreur de stockage : {0}")]
    Storage(#[from] std::io::Error),

    #[error("erreur de base de données : {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(e) => {
                error!("Erreur de stockage: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Database(e) => {
                error!("Erreur SQLite: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
