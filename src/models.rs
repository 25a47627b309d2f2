use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    pub idstation: i64,
    pub nom: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationDetails {
    pub idstation: i64,
    pub nom: String,
    pub adresse1: Option<String>,
    pub adresse2: Option<String>,
    pub commune: Option<String>,
    pub nbbornettes: Option<i64>,
    pub stationbonus: Option<i64>,
    pub pole: Option<String>,
    pub ouverte: Option<i64>,
    pub lon: f64,
    pub lat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horodate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bikes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stands: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrical_bikes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanical_bikes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrical_internal_battery_bikes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrical_removable_battery_bikes: Option<i64>,
}

// Un relevé d'occupation horodaté ; le store les retourne triés par horodate.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub horodate: String,
    pub bikes: i64,
    pub stands: i64,
    pub electrical_bikes: i64,
    pub mechanical_bikes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_omit_reading_fields_when_absent() {
        let details = StationDetails {
            idstation: 42,
            nom: "Bellecour".to_string(),
            adresse1: None,
            adresse2: None,
            commune: Some("Lyon".to_string()),
            nbbornettes: None,
            stationbonus: None,
            pole: None,
            ouverte: Some(1),
            lon: 4.83,
            lat: 45.76,
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

        let json = serde_json::to_value(&details).expect("serialize");
        assert_eq!(json["idstation"], 42);
        // Pas de relevé : les champs d'historique ne figurent pas dans la réponse.
        assert!(json.get("horodate").is_none());
        assert!(json.get("bikes").is_none());
    }
}
