// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Material property prediction.
//!
//! `predict` is the offline heuristic path. It always succeeds and is what the
//! Materials Project client falls back to when it has no key, the request
//! fails, or the response is not usable.

pub mod advice;
pub mod classify;
pub mod estimate;
pub mod formula;
pub mod project;

use fastrand::Rng;
use serde::Serialize;

pub use classify::Classification;
pub use estimate::Properties;

pub const HEURISTIC_CONFIDENCE: f64 = 0.65;
pub const MATERIALS_PROJECT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    ComputationalPrediction,
    MaterialsProject,
}

impl PredictionSource {
    /// Same tag as the JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionSource::ComputationalPrediction => "computational_prediction",
            PredictionSource::MaterialsProject => "materials_project",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp_id: Option<String>,
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub formula: String,
    pub properties: Properties,
    pub composition: formula::Composition,
    pub classification: Classification,
    pub suggested_applications: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub rationale: String,
    pub confidence: f64,
    pub source: PredictionSource,
    pub provenance: Provenance,
}

/// Heuristic prediction. Output varies between calls, see `predict_with_rng`.
pub fn predict(formula: &str) -> PredictionResult {
    predict_with_rng(formula, &mut Rng::new())
}

pub fn predict_with_rng(formula: &str, rng: &mut Rng) -> PredictionResult {
    let elements = formula::parse_elements(formula);
    let composition = formula::parse_composition(formula);
    let (raw_band_gap, properties) = estimate::estimate(formula, &elements, rng);
    let classification = classify::classify(formula, &elements);

    PredictionResult {
        formula: formula.to_string(),
        properties,
        composition,
        classification,
        suggested_applications: advice::suggest_applications(classification, Some(raw_band_gap)),
        warnings: advice::warnings(formula, &elements),
        recommendations: advice::recommendations(classification),
        rationale: advice::rationale(classification, Some(raw_band_gap), None),
        confidence: HEURISTIC_CONFIDENCE,
        source: PredictionSource::ComputationalPrediction,
        provenance: Provenance {
            mp_id: None,
            elements,
        },
    }
}
