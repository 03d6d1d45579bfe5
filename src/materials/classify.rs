// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::Serialize;
use std::fmt;

const HALIDES: [&str; 4] = ["Cl", "Br", "I", "F"];
const TRANSITION_METALS: [&str; 10] = ["Ti", "Fe", "Ni", "Co", "V", "Cr", "Mn", "Cu", "Zn", "Zr"];
const FRAMEWORK_METALS: [&str; 5] = ["Zn", "Cu", "Zr", "Co", "Ni"];
const CATHODE_METALS: [&str; 3] = ["Fe", "Co", "Ni"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    #[serde(rename = "Halide Perovskite-like")]
    HalidePerovskite,
    #[serde(rename = "Transition Metal Oxide")]
    TransitionMetalOxide,
    #[serde(rename = "Metal-Organic Framework")]
    MetalOrganicFramework,
    #[serde(rename = "Battery Electrode Material")]
    BatteryElectrode,
    #[serde(rename = "Generic Inorganic")]
    GenericInorganic,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::HalidePerovskite => "Halide Perovskite-like",
            Classification::TransitionMetalOxide => "Transition Metal Oxide",
            Classification::MetalOrganicFramework => "Metal-Organic Framework",
            Classification::BatteryElectrode => "Battery Electrode Material",
            Classification::GenericInorganic => "Generic Inorganic",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn has(elements: &[String], symbol: &str) -> bool {
    elements.iter().any(|e| e == symbol)
}

fn has_any(elements: &[String], symbols: &[&str]) -> bool {
    elements.iter().any(|e| symbols.contains(&e.as_str()))
}

/// Organic linker plus a framework metal, or an explicit "MOF" name.
/// Shared with the property estimator.
pub(crate) fn looks_like_framework(formula: &str, elements: &[String]) -> bool {
    formula.contains("MOF")
        || (has(elements, "C") && has(elements, "H") && has_any(elements, &FRAMEWORK_METALS))
}

/// First matching rule wins, everything else is generic.
pub fn classify(formula: &str, elements: &[String]) -> Classification {
    if has(elements, "Pb") && has_any(elements, &HALIDES) {
        Classification::HalidePerovskite
    } else if has(elements, "O") && has_any(elements, &TRANSITION_METALS) {
        Classification::TransitionMetalOxide
    } else if looks_like_framework(formula, elements) {
        Classification::MetalOrganicFramework
    } else if has(elements, "Li") && has_any(elements, &CATHODE_METALS) {
        Classification::BatteryElectrode
    } else {
        Classification::GenericInorganic
    }
}
