// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Materials Project summary lookups.
//!
//! API: https://api.materialsproject.org/materials/summary/
//! Any failure ends in the heuristic prediction, callers never see an error.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    advice, classify, estimate, formula, PredictionResult, PredictionSource, Properties,
    Provenance, MATERIALS_PROJECT_CONFIDENCE,
};
use crate::error::{ResearchError, Result};

const MP_API_BASE: &str = "https://api.materialsproject.org";
const SUMMARY_FIELDS: &str =
    "material_id,formula_pretty,elements,band_gap,band_gap_pbe,band_gap_mp,energy_above_hull";
const SERVICE: &str = "Materials Project";

pub struct MaterialsProjectClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl MaterialsProjectClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: MP_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Look the formula up remotely, or predict it when that is not possible.
    #[instrument(skip(self))]
    pub async fn properties(&self, formula: &str) -> PredictionResult {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No Materials Project key, using heuristics");
            return super::predict(formula);
        };

        match self.fetch_summary(api_key, formula).await {
            Ok(doc) => {
                info!("Materials Project match for {}", formula);
                from_summary_doc(formula, &doc)
            }
            Err(e) => {
                warn!("Materials Project lookup failed, falling back to heuristics: {}", e);
                super::predict(formula)
            }
        }
    }

    async fn fetch_summary(&self, api_key: &str, formula: &str) -> Result<Value> {
        let url = format!("{}/materials/summary/", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", api_key)
            .header("Accept", "application/json")
            .query(&[("formula", formula.trim()), ("_fields", SUMMARY_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ResearchError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        first_document(&body).cloned()
    }
}

/// The summary endpoint answers `{"data": [doc, ...]}`. Anything else is unusable.
fn first_document(body: &Value) -> Result<&Value> {
    let docs = body["data"]
        .as_array()
        .ok_or_else(|| invalid("missing data array"))?;
    let doc = docs.first().ok_or_else(|| invalid("no material matches the formula"))?;
    if !doc.is_object() {
        return Err(invalid("document is not an object"));
    }
    Ok(doc)
}

fn invalid(reason: &str) -> ResearchError {
    ResearchError::InvalidResponse {
        service: SERVICE,
        reason: reason.to_string(),
    }
}

/// Lower energy above the hull is more stable, 0 eV/atom maps to 100.
fn stability_from_hull(e_hull: f64) -> u8 {
    estimate::stability_score(100.0 - e_hull * 100.0)
}

/// Rough Shockley-Queisser proxy peaking at 30% around 1.3 eV.
fn efficiency_from_gap(band_gap: f64) -> f64 {
    (30.0 - (band_gap - 1.3).abs() * 15.0).max(0.0)
}

fn from_summary_doc(formula: &str, doc: &Value) -> PredictionResult {
    let band_gap = ["band_gap", "band_gap_pbe", "band_gap_mp"]
        .iter()
        .find_map(|field| doc[*field].as_f64());
    let e_hull = doc["energy_above_hull"].as_f64();

    let elements: Vec<String> = match doc["elements"].as_array() {
        Some(list) => list
            .iter()
            .filter_map(|e| e.as_str().map(str::to_string))
            .collect(),
        None => formula::parse_elements(formula),
    };

    let classification = classify::classify(formula, &elements);

    PredictionResult {
        formula: doc["formula_pretty"]
            .as_str()
            .unwrap_or(formula)
            .to_string(),
        properties: Properties {
            band_gap: band_gap.map(|g| estimate::round_to(g, 2)),
            efficiency: band_gap.map(|g| estimate::round_to(efficiency_from_gap(g), 1)),
            stability: e_hull.map(stability_from_hull),
        },
        composition: formula::parse_composition(formula),
        classification,
        suggested_applications: advice::suggest_applications(classification, band_gap),
        warnings: advice::warnings(formula, &elements),
        recommendations: advice::recommendations(classification),
        rationale: advice::rationale(classification, band_gap, e_hull),
        confidence: MATERIALS_PROJECT_CONFIDENCE,
        source: PredictionSource::MaterialsProject,
        provenance: Provenance {
            mp_id: doc["material_id"]
                .as_str()
                .or_else(|| doc["task_id"].as_str())
                .map(str::to_string),
            elements,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Classification;
    use serde_json::json;

    #[test]
    fn test_from_summary_doc() {
        let doc = json!({
            "material_id": "mp-2657",
            "formula_pretty": "TiO2",
            "elements": ["Ti", "O"],
            "band_gap": 3.2123,
            "energy_above_hull": 0.0123
        });
        let result = from_summary_doc("TiO2", &doc);

        assert_eq!(result.source, PredictionSource::MaterialsProject);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.classification, Classification::TransitionMetalOxide);
        assert_eq!(result.properties.band_gap, Some(3.21));
        // 30 - 1.9123 * 15 < 2
        assert_eq!(result.properties.efficiency, Some(1.3));
        assert_eq!(result.properties.stability, Some(99));
        assert_eq!(result.provenance.mp_id.as_deref(), Some("mp-2657"));
        assert!(result.suggested_applications.contains(&"UV Photocatalysis".to_string()));
        assert!(result
            .rationale
            .ends_with("Energy above hull 0.012 eV/atom maps to stability score."));
    }

    #[test]
    fn test_band_gap_field_fallbacks() {
        let doc = json!({ "band_gap_pbe": 1.3, "elements": ["Cs", "Pb", "I"] });
        let result = from_summary_doc("CsPbI3", &doc);
        assert_eq!(result.properties.band_gap, Some(1.3));
        assert_eq!(result.properties.efficiency, Some(30.0));
        assert_eq!(result.properties.stability, None);
        assert_eq!(result.formula, "CsPbI3");
        assert!(!result.rationale.contains("Energy above hull"));

        let result = from_summary_doc("NaCl", &json!({}));
        assert_eq!(result.properties, Properties::default());
        assert_eq!(result.provenance.elements, vec!["Na", "Cl"]);
        assert_eq!(
            result.rationale,
            "Classified as Generic Inorganic based on elemental composition."
        );
    }

    #[test]
    fn test_hull_and_gap_mappings() {
        assert_eq!(stability_from_hull(0.0), 100);
        assert_eq!(stability_from_hull(2.5), 0);
        assert_eq!(efficiency_from_gap(5.0), 0.0);
        assert_eq!(efficiency_from_gap(1.3), 30.0);
    }

    #[test]
    fn test_shape_validation() {
        assert!(first_document(&json!({ "data": [{ "material_id": "mp-1" }] })).is_ok());
        assert!(first_document(&json!({ "data": [] })).is_err());
        assert!(first_document(&json!({ "data": ["mp-1"] })).is_err());
        assert!(first_document(&json!({ "detail": "Not authenticated" })).is_err());
        assert!(first_document(&json!(null)).is_err());
    }

    #[tokio::test]
    async fn test_without_key_uses_heuristics() {
        let client = MaterialsProjectClient::new(Client::new(), None);
        assert!(!client.is_configured());

        let result = client.properties("CsPbBr3").await;
        assert_eq!(result.source, PredictionSource::ComputationalPrediction);
        assert_eq!(result.confidence, 0.65);
    }

    // Answers by API key: "revoked" gets a 401, "nomatch" an empty data array,
    // anything else a TiO2 document.
    async fn spawn_summary_stub() -> String {
        use warp::http::StatusCode;
        use warp::Filter;

        let summary = warp::header::<String>("x-api-key").map(|key: String| {
            let (status, body) = match key.as_str() {
                "revoked" => (StatusCode::UNAUTHORIZED, json!({ "detail": "Invalid API key" })),
                "nomatch" => (StatusCode::OK, json!({ "data": [] })),
                _ => (
                    StatusCode::OK,
                    json!({ "data": [{
                        "material_id": "mp-2657",
                        "formula_pretty": "TiO2",
                        "elements": ["O", "Ti"],
                        "band_gap": 3.2,
                        "energy_above_hull": 0.0
                    }] }),
                ),
            };
            warp::reply::with_status(warp::reply::json(&body), status)
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(warp::serve(summary).incoming(listener).run());
        format!("http://{}", addr)
    }

    fn local_client(key: &str, base_url: &str) -> MaterialsProjectClient {
        let client = Client::builder().no_proxy().build().unwrap();
        MaterialsProjectClient::new(client, Some(key.to_string())).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_error_status_and_empty_data_fall_back() {
        let base_url = spawn_summary_stub().await;

        let result = local_client("revoked", &base_url).properties("TiO2").await;
        assert_eq!(result.source, PredictionSource::ComputationalPrediction);
        assert_eq!(result.confidence, 0.65);

        let result = local_client("nomatch", &base_url).properties("TiO2").await;
        assert_eq!(result.source, PredictionSource::ComputationalPrediction);
        assert_eq!(result.provenance.mp_id, None);

        let result = local_client("valid", &base_url).properties("TiO2").await;
        assert_eq!(result.source, PredictionSource::MaterialsProject);
        assert_eq!(result.provenance.mp_id.as_deref(), Some("mp-2657"));
        assert_eq!(result.properties.stability, Some(100));
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        // Nothing listens on the discard port
        let client = MaterialsProjectClient::new(Client::new(), Some("key".to_string()))
            .with_base_url("http://127.0.0.1:9");

        let result = client.properties("LiFePO4").await;
        assert_eq!(result.source, PredictionSource::ComputationalPrediction);
        assert_eq!(result.classification, Classification::TransitionMetalOxide);
    }
}
