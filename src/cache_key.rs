// Construction de la clé canonique du cache de graphiques.
//
// Deux requêtes portant les mêmes valeurs de champs doivent produire la
// même clé, octet pour octet. L'encodage est une fonction pure : aucun
// accès disque, aucune dépendance à l'horloge. Le schéma des drapeaux
// est fixe et ordonné (t, s, m, e) ; ajouter une série est donc une
// évolution du schéma, pas une concaténation ad hoc.

// Borne absente dans la requête : on encode une sentinelle plutôt que
// de laisser le champ vide, pour que "non spécifié" ne puisse pas
// entrer en collision avec une chaîne vide.
const OPEN_BOUND: &str = "all";

// Drapeaux d'affichage des séries, dans l'ordre canonique d'encodage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub total: bool,
    pub stands: bool,
    pub mechanical: bool,
    pub electric: bool,
}

impl DisplayFlags {
    // Graphique par défaut de l'URL sans paramètre : la seule courbe du
    // nombre total de vélos.
    pub fn total_only() -> Self {
        Self {
            total: true,
            stands: false,
            mechanical: false,
            electric: false,
        }
    }

    // Encodage canonique : une lettre d'étiquette et un chiffre 0/1 par
    // drapeau, dans l'ordre déclaré. Exemple : `t1s1m0e0`.
    pub fn encode(&self) -> String {
        let bit = |b: bool| if b { '1' } else { '0' };
        format!(
            "t{}s{}m{}e{}",
            bit(self.total),
            bit(self.stands),
            bit(self.mechanical),
            bit(self.electric)
        )
    }
}

// Paramètres typés d'une requête de graphique, tels que traduits par la
// couche HTTP. C'est la valeur dont dérive la clé de cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    pub station_id: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub flags: DisplayFlags,
}

impl ChartQuery {
    // Clé canonique, sûre comme fragment de nom de fichier.
    // Exemple : `station_42_start_2024-01-01_end_2024-01-31_t1s1m0e0`.
    pub fn cache_key(&self) -> String {
        format!(
            "station_{}_start_{}_end_{}_{}",
            sanitize(&self.station_id),
            encode_bound(self.start.as_deref()),
            encode_bound(self.end.as_deref()),
            self.flags.encode()
        )
    }

    // Bornes telles qu'enregistrées dans l'index (sentinelle comprise).
    pub fn range_start(&self) -> String {
        encode_bound(self.start.as_deref())
    }

    pub fn range_end(&self) -> String {
        encode_bound(self.end.as_deref())
    }
}

fn encode_bound(bound: Option<&str>) -> String {
    match bound {
        Some(b) if !b.is_empty() => sanitize(b),
        _ => OPEN_BOUND.to_string(),
    }
}

// Substitution déterministe des caractères gênants dans un nom de
// fichier. Sur le format d'horodatage attendu (ISO-8601), `:` -> `-` et
// espace -> `_` ne créent pas de collision.
fn sanitize(fragment: &str) -> String {
    fragment
        .chars()
        .map(|c| match c {
            ':' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>, flags: DisplayFlags) -> ChartQuery {
        ChartQuery {
            station_id: "42".to_string(),
            start: start.map(String::from),
            end: end.map(String::from),
            flags,
        }
    }

    #[test]
    fn test_key_matches_documented_format() {
        let q = query(
            Some("2024-01-01"),
            Some("2024-01-31"),
            DisplayFlags {
                total: true,
                stands: true,
                mechanical: false,
                electric: false,
            },
        );
        assert_eq!(
            q.cache_key(),
            "station_42_start_2024-01-01_end_2024-01-31_t1s1m0e0"
        );
    }

    #[test]
    fn test_key_is_deterministic() {
        let q = query(Some("2024-01-01"), None, DisplayFlags::total_only());
        assert_eq!(q.cache_key(), q.cache_key());
    }

    #[test]
    fn test_missing_bounds_encode_as_sentinel() {
        let q = query(None, None, DisplayFlags::total_only());
        assert_eq!(q.cache_key(), "station_42_start_all_end_all_t1s0m0e0");
    }

    #[test]
    fn test_empty_bound_equals_missing_bound() {
        let explicit = query(Some(""), None, DisplayFlags::total_only());
        let missing = query(None, None, DisplayFlags::total_only());
        assert_eq!(explicit.cache_key(), missing.cache_key());
    }

    #[test]
    fn test_unsafe_characters_are_substituted() {
        let q = query(
            Some("2024-01-01 10:30:00"),
            None,
            DisplayFlags::total_only(),
        );
        let key = q.cache_key();
        assert!(!key.contains(':'), "key still contains ':' — {}", key);
        assert!(!key.contains(' '), "key still contains ' ' — {}", key);
        assert!(key.contains("2024-01-01_10-30-00"));
    }

    #[test]
    fn test_distinct_queries_produce_distinct_keys() {
        let base = query(Some("2024-01-01"), Some("2024-01-31"), DisplayFlags::total_only());
        let other_station = ChartQuery {
            station_id: "43".to_string(),
            ..base.clone()
        };
        let other_range = query(Some("2024-02-01"), Some("2024-01-31"), DisplayFlags::total_only());
        let other_flags = query(
            Some("2024-01-01"),
            Some("2024-01-31"),
            DisplayFlags {
                total: true,
                stands: false,
                mechanical: true,
                electric: false,
            },
        );

        let keys = [
            base.cache_key(),
            other_station.cache_key(),
            other_range.cache_key(),
            other_flags.cache_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_flag_encoding_order_is_fixed() {
        let flags = DisplayFlags {
            total: false,
            stands: true,
            mechanical: false,
            electric: true,
        };
        assert_eq!(flags.encode(), "t0s1m0e1");
    }
}
