use crate::models::{Center, Sample, StationDetails, StationSummary};
use sqlx::sqlite::SqlitePool;

// Accès en lecture seule aux données des stations. Les tables sont
// alimentées hors processus (import CSV) ; rien ici ne les modifie.
#[derive(Debug, Clone)]
pub struct StationStore {
    db: SqlitePool,
}

impl StationStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_stations(&self) -> Result<Vec<StationSummary>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (i64, String, f64, f64)>(
            "SELECT idstation, nom, lat, lon FROM stations ORDER BY idstation",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(idstation, nom, lat, lon)| StationSummary {
                idstation,
                nom,
                lat,
                lon,
            })
            .collect())
    }

    // Centre géographique du parc : milieu des latitudes et longitudes
    // extrêmes. `None` quand la table est vide.
    pub async fn center(&self) -> Result<Option<Center>, sqlx::Error> {
        let (lat, lon) = sqlx::query_as::<_, (Option<f64>, Option<f64>)>(
            "SELECT (MAX(lat) + MIN(lat)) / 2.0, (MAX(lon) + MIN(lon)) / 2.0 FROM stations",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Center { lat, lon }),
            _ => None,
        })
    }

    // Recherche d'une station par identifiant ou par nom exact, comme
    // dans le client historique. Retourne (idstation, nom).
    pub async fn find_station(&self, id_or_name: &str) -> Result<Option<(i64, String)>, sqlx::Error> {
        sqlx::query_as::<_, (i64, String)>(
            "SELECT idstation, nom FROM stations WHERE idstation = ? OR nom = ?",
        )
        .bind(id_or_name)
        .bind(id_or_name)
        .fetch_optional(&self.db)
        .await
    }

    // Détails d'une station, complétés par son dernier relevé connu
    // quand il existe.
    pub async fn station_details(
        &self,
        id_or_name: &str,
    ) -> Result<Option<StationDetails>, sqlx::Error> {
        type StationRow = (
            i64,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<i64>,
            Option<i64>,
            Option<String>,
            Option<i64>,
            f64,
            f64,
        );
        let station = sqlx::query_as::<_, StationRow>(
            "SELECT idstation, nom, adresse1, adresse2, commune, nbbornettes,
                    stationbonus, pole, ouverte, lon, lat
             FROM stations WHERE idstation = ? OR nom = ?",
        )
        .bind(id_or_name)
        .bind(id_or_name)
        .fetch_optional(&self.db)
        .await?;

        let Some((
            idstation,
            nom,
            adresse1,
            adresse2,
            commune,
            nbbornettes,
            stationbonus,
            pole,
            ouverte,
            lon,
            lat,
        )) = station
        else {
            return Ok(None);
        };

        type HistoRow = (
            String,
            Option<String>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
        );
        let latest = sqlx::query_as::<_, HistoRow>(
            "SELECT horodate, status, capacity, bikes, stands,
                    electrical_bikes, mechanical_bikes,
                    electrical_internal_battery_bikes, electrical_removable_battery_bikes
             FROM histo WHERE number = ?
             ORDER BY horodate DESC LIMIT 1",
        )
        .bind(idstation)
        .fetch_optional(&self.db)
        .await?;

        let mut details = StationDetails {
            idstation,
            nom,
            adresse1,
            adresse2,
            commune,
            nbbornettes,
            stationbonus,
            pole,
            ouverte,
            lon,
            lat,
            horodate: None,
            status: None,
            capacity: None,
            bikes: None,
            stands: None,
            electrical_bikes: None,
            mechanical_bikes: None,
            electrical_internal_battery_bikes: None,
            electrical_removable_battery_bikes: None,
        };

        if let Some((
            horodate,
            status,
            capacity,
            bikes,
            stands,
            electrical,
            mechanical,
            internal_battery,
            removable_battery,
        )) = latest
        {
            details.horodate = Some(horodate);
            details.status = status;
            details.capacity = capacity;
            details.bikes = bikes;
            details.stands = stands;
            details.electrical_bikes = electrical;
            details.mechanical_bikes = mechanical;
            details.electrical_internal_battery_bikes = internal_battery;
            details.electrical_removable_battery_bikes = removable_battery;
        }

        Ok(Some(details))
    }

    // Relevés ordonnés d'une station, bornes optionnelles incluses.
    // Une séquence vide est un résultat valide, pas une erreur.
    pub async fn samples(
        &self,
        station_number: i64,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Sample>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, i64, i64, i64, i64)>(
            "SELECT horodate, COALESCE(bikes, 0), COALESCE(stands, 0),
                    COALESCE(electrical_bikes, 0), COALESCE(mechanical_bikes, 0)
             FROM histo
             WHERE number = ?
               AND (? IS NULL OR horodate >= ?)
               AND (? IS NULL OR horodate <= ?)
             ORDER BY horodate",
        )
        .bind(station_number)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(horodate, bikes, stands, electrical_bikes, mechanical_bikes)| Sample {
                horodate,
                bikes,
                stands,
                electrical_bikes,
                mechanical_bikes,
            })
            .collect())
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }
}
