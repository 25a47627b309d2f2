use crate::app_state::AppState;
use crate::cache_key::{ChartQuery, DisplayFlags};
use crate::database::current_timestamp;
use crate::errors::ApiError;
use crate::models::{Center, HealthStatus, StationDetails, StationSummary};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

// Handler pour GET `/regions` : la liste des stations du parc.
pub async fn regions_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<StationSummary>>, ApiError> {
    Ok(Json(state.store.list_stations().await?))
}

// Handler pour GET `/center` : le centre géographique du parc.
pub async fn center_handler(State(state): State<AppState>) -> Result<Json<Center>, ApiError> {
    state
        .store
        .center()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("aucune station dans la base".to_string()))
}

// Handler pour GET `/station/{id}` : détails d'une station (par
// identifiant ou nom exact) avec son dernier relevé.
pub async fn station_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationDetails>, ApiError> {
    state
        .store
        .station_details(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("station {} inconnue", id)))
}

// Paramètres de la query string du graphique, tels que reçus sur le
// fil. Les drapeaux acceptent `1` ou `true`.
#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub total: Option<String>,
    pub stands: Option<String>,
    pub mechanical: Option<String>,
    pub electric: Option<String>,
}

impl ChartParams {
    // Traduction des paramètres bruts en drapeaux typés. Sans aucun
    // paramètre de série, on trace la courbe du total, comme le
    // graphique historique à une seule courbe.
    pub fn display_flags(&self) -> DisplayFlags {
        let none_given = self.total.is_none()
            && self.stands.is_none()
            && self.mechanical.is_none()
            && self.electric.is_none();
        if none_given {
            return DisplayFlags::total_only();
        }
        DisplayFlags {
            total: flag_enabled(self.total.as_deref()),
            stands: flag_enabled(self.stands.as_deref()),
            mechanical: flag_enabled(self.mechanical.as_deref()),
            electric: flag_enabled(self.electric.as_deref()),
        }
    }
}

fn flag_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

// Handler pour GET `/chart/{id}` : le graphique d'occupation de la
// station sur la plage demandée. L'existence de la station est validée
// ici, avant toute interaction avec le cache : "station inconnue" est
// une erreur cliente, "graphique pas encore rendu" n'en est pas une.
pub async fn chart_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<impl IntoResponse, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::BadRequest("identifiant de station vide".to_string()));
    }

    let (number, nom) = state
        .store
        .find_station(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("station {} inconnue", id)))?;

    let flags = params.display_flags();
    let query = ChartQuery {
        station_id: number.to_string(),
        start: params.start.clone(),
        end: params.end.clone(),
        flags,
    };

    let store = state.store.clone();
    let renderer = state.renderer.clone();
    let start = params.start.clone();
    let end = params.end.clone();
    let bytes = state
        .chart_cache
        .lookup_or_render(&query, || async move {
            let samples = store
                .samples(number, start.as_deref(), end.as_deref())
                .await?;
            if samples.is_empty() {
                return Ok(None);
            }
            info!("creer_graphique: station {} ({} relevés)", number, samples.len());
            Ok(Some(renderer.render(&nom, &samples, flags)))
        })
        .await?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], bytes))
}

// Handler pour GET `/health` : sonde de vivacité du pool SQLite.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, StatusCode> {
    match state.store.db().acquire().await {
        Ok(_) => Ok(Json(HealthStatus {
            status: "healthy".to_string(),
            timestamp: current_timestamp(),
        })),
        Err(e) => {
            tracing::error!("Health check failed: DB acquire error: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
