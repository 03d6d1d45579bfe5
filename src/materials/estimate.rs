// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use fastrand::Rng;
use serde::Serialize;

use super::classify::looks_like_framework;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    /// eV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_gap: Option<f64>,
    /// Percent. Power conversion for absorbers, capture efficiency for frameworks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    /// 0 to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<u8>,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn stability_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

// Uniform offset in [0, span)
fn jitter(rng: &mut Rng, span: f64) -> f64 {
    rng.f64() * span
}

/// Rule-of-thumb estimates. Later rules overwrite earlier ones, they never combine.
///
/// Returns the unrounded band gap next to the rounded properties. Application
/// thresholds are checked against the unrounded value.
pub fn estimate(formula: &str, elements: &[String], rng: &mut Rng) -> (f64, Properties) {
    let mut band_gap = 1.0;
    let mut stability = 50.0;
    let mut efficiency = 10.0;

    // Lead halide perovskites sit around 1.5-2 eV
    if formula.contains("Pb") {
        band_gap = 1.5 + jitter(rng, 0.5);
        efficiency = 20.0 + jitter(rng, 15.0);
    }

    // TiO2 is ~3.2 eV
    let has_ti = elements.iter().any(|e| e == "Ti");
    let has_o = elements.iter().any(|e| e == "O");
    if has_ti && has_o {
        band_gap = 3.0 + jitter(rng, 0.5);
        efficiency = 5.0 + jitter(rng, 10.0);
    }

    // CO2 capture efficiency proxy
    if looks_like_framework(formula, elements) {
        efficiency = 60.0 + jitter(rng, 30.0);
        stability = 70.0 + jitter(rng, 20.0);
    }

    let properties = Properties {
        band_gap: Some(round_to(band_gap, 2)),
        efficiency: Some(round_to(efficiency, 1)),
        stability: Some(stability_score(stability)),
    };
    (band_gap, properties)
}
