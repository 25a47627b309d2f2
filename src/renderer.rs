use crate::cache_key::DisplayFlags;
use crate::models::Sample;

// Le moteur de rendu est une fonction pure de ses entrées : mêmes
// relevés + mêmes drapeaux => mêmes octets. Il ignore tout du cache.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, station_label: &str, samples: &[Sample], flags: DisplayFlags) -> Vec<u8>;
}

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 300.0;
const MARGIN: f64 = 40.0;

// Une série tracée : étiquette, couleur, extraction de la valeur.
struct Series {
    label: &'static str,
    color: &'static str,
    value: fn(&Sample) -> i64,
}

// Rendu SVG des courbes d'occupation : une polyligne par série activée,
// axe X = rang du relevé (les horodates sont déjà triées), axe Y =
// valeur, échelle commune au maximum des séries tracées.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn new() -> Self {
        Self
    }

    fn series(flags: DisplayFlags) -> Vec<Series> {
        let mut series = Vec::with_capacity(4);
        if flags.total {
            series.push(Series {
                label: "Vélos disponibles",
                color: "#1f77b4",
                value: |s| s.bikes,
            });
        }
        if flags.stands {
            series.push(Series {
                label: "Bornettes libres",
                color: "#7f7f7f",
                value: |s| s.stands,
            });
        }
        if flags.mechanical {
            series.push(Series {
                label: "Vélos mécaniques",
                color: "#2ca02c",
                value: |s| s.mechanical_bikes,
            });
        }
        if flags.electric {
            series.push(Series {
                label: "Vélos électriques",
                color: "#ff7f0e",
                value: |s| s.electrical_bikes,
            });
        }
        series
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, station_label: &str, samples: &[Sample], flags: DisplayFlags) -> Vec<u8> {
        let series = Self::series(flags);

        // Échelle verticale : maximum observé sur les séries tracées
        // (1 au minimum pour éviter une division par zéro).
        let y_max = series
            .iter()
            .flat_map(|s| samples.iter().map(s.value))
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        // Avec un seul relevé, la courbe se réduit à un point à gauche.
        let x_step = if samples.len() > 1 {
            (WIDTH - 2.0 * MARGIN) / (samples.len() - 1) as f64
        } else {
            0.0
        };

        let mut svg = String::with_capacity(2048);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
            WIDTH as u32, HEIGHT as u32, WIDTH as u32, HEIGHT as u32
        ));
        svg.push_str(&format!(
            "  <title>Occupation de la station {}</title>\n",
            escape(station_label)
        ));
        svg.push_str(
            "  <rect width=\"100%\" height=\"100%\" fill=\"white\" stroke=\"#888888\"/>\n",
        );
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">Occupation de la station {}</text>\n",
            (WIDTH / 2.0) as u32,
            escape(station_label)
        ));

        for (rank, s) in series.iter().enumerate() {
            let points: Vec<String> = samples
                .iter()
                .enumerate()
                .map(|(i, sample)| {
                    let x = MARGIN + x_step * i as f64;
                    let v = (s.value)(sample).max(0) as f64;
                    let y = HEIGHT - MARGIN - (v / y_max) * (HEIGHT - 2.0 * MARGIN);
                    format!("{:.1},{:.1}", x, y)
                })
                .collect();
            svg.push_str(&format!(
                "  <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
                s.color,
                points.join(" ")
            ));
            // Légende empilée en haut à droite.
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"12\" fill=\"{}\">{}</text>\n",
                (WIDTH - MARGIN) as u32,
                48 + rank * 16,
                s.color,
                s.label
            ));
        }

        svg.push_str("</svg>\n");
        svg.into_bytes()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(horodate: &str, bikes: i64, stands: i64, mech: i64, elec: i64) -> Sample {
        Sample {
            horodate: horodate.to_string(),
            bikes,
            stands,
            mechanical_bikes: mech,
            electrical_bikes: elec,
        }
    }

    fn samples() -> Vec<Sample> {
        vec![
            sample("2024-01-01T08:00:00", 10, 5, 7, 3),
            sample("2024-01-01T09:00:00", 8, 7, 5, 3),
            sample("2024-01-01T10:00:00", 12, 3, 9, 3),
        ]
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = SvgRenderer::new();
        let flags = DisplayFlags::total_only();
        let first = renderer.render("Bellecour", &samples(), flags);
        let second = renderer.render("Bellecour", &samples(), flags);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_draws_one_polyline_per_enabled_series() {
        let renderer = SvgRenderer::new();
        let flags = DisplayFlags {
            total: true,
            stands: true,
            mechanical: false,
            electric: false,
        };
        let svg = String::from_utf8(renderer.render("42", &samples(), flags)).expect("utf-8");
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("Vélos disponibles"));
        assert!(svg.contains("Bornettes libres"));
        assert!(!svg.contains("Vélos électriques"));
    }

    #[test]
    fn test_render_single_sample_does_not_panic() {
        let renderer = SvgRenderer::new();
        let one = vec![sample("2024-01-01T08:00:00", 4, 2, 3, 1)];
        let svg = renderer.render("42", &one, DisplayFlags::total_only());
        assert!(!svg.is_empty());
    }

    #[test]
    fn test_render_escapes_station_label() {
        let renderer = SvgRenderer::new();
        let svg = String::from_utf8(
            renderer.render("Gare <Part-Dieu> & co", &samples(), DisplayFlags::total_only()),
        )
        .expect("utf-8");
        assert!(svg.contains("Gare &lt;Part-Dieu&gt; &amp; co"));
        assert!(!svg.contains("<Part-Dieu>"));
    }
}
