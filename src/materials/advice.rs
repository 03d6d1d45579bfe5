// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

// Fixed advisory text keyed on classification and composition.

use super::classify::Classification;

const MAX_APPLICATIONS: usize = 6;
const COMPLEX_FORMULA_LEN: usize = 30;

pub const LEAD_WARNING: &str = "Contains Pb (lead): toxicity and environmental concerns.";
pub const CADMIUM_WARNING: &str = "Contains Cd (cadmium): handle with care and proper disposal.";
pub const COMPLEXITY_WARNING: &str = "Complex formula: predictions may have higher uncertainty.";

pub fn base_applications(classification: Classification) -> &'static [&'static str] {
    match classification {
        Classification::HalidePerovskite => &["Solar Cell Absorber", "LED Emitter", "Photodetector"],
        Classification::TransitionMetalOxide => &["Photocatalyst", "Dielectric", "Gas Sensor"],
        Classification::MetalOrganicFramework => &["CO2 Capture", "Gas Separation", "Catalysis Support"],
        Classification::BatteryElectrode => &["Lithium-ion Cathode", "Sodium-ion Cathode"],
        Classification::GenericInorganic => &[],
    }
}

pub fn suggest_applications(classification: Classification, band_gap: Option<f64>) -> Vec<String> {
    let mut apps: Vec<&str> = base_applications(classification).to_vec();

    if let Some(gap) = band_gap {
        if (1.0..=2.0).contains(&gap) {
            apps.push("PV Absorber Candidate");
        }
        if gap > 3.0 {
            apps.push("UV Photocatalysis");
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(apps.len());
    for app in apps {
        if !unique.iter().any(|u| u == app) {
            unique.push(app.to_string());
        }
    }
    unique.truncate(MAX_APPLICATIONS);
    unique
}

pub fn warnings(formula: &str, elements: &[String]) -> Vec<String> {
    let mut warns = Vec::new();
    if elements.iter().any(|e| e == "Pb") {
        warns.push(LEAD_WARNING.to_string());
    }
    if elements.iter().any(|e| e == "Cd") {
        warns.push(CADMIUM_WARNING.to_string());
    }
    if formula.chars().count() > COMPLEX_FORMULA_LEN {
        warns.push(COMPLEXITY_WARNING.to_string());
    }
    warns
}

pub fn recommendations(classification: Classification) -> Vec<String> {
    let recs: [&str; 3] = match classification {
        Classification::HalidePerovskite => [
            "Consider anti-solvent engineering",
            "Test moisture stability",
            "Optimize halide ratio",
        ],
        Classification::TransitionMetalOxide => [
            "Try annealing above 400°C",
            "Control oxygen partial pressure",
            "Consider doping for conductivity",
        ],
        Classification::MetalOrganicFramework => [
            "Assess thermal stability",
            "Consider post-synthetic metal exchange",
            "Optimize linker length for selectivity",
        ],
        Classification::BatteryElectrode => [
            "Evaluate rate capability",
            "Check cycle stability",
            "Surface coating to mitigate degradation",
        ],
        Classification::GenericInorganic => [
            "Conduct XRD for phase identification",
            "Measure band gap via UV-Vis",
            "Perform stability tests under operating conditions",
        ],
    };
    recs.iter().map(|r| r.to_string()).collect()
}

/// `energy_above_hull` is only known when the Materials Project answered.
pub fn rationale(
    classification: Classification,
    band_gap: Option<f64>,
    energy_above_hull: Option<f64>,
) -> String {
    let mut parts = vec![format!(
        "Classified as {} based on elemental composition.",
        classification
    )];
    if let Some(gap) = band_gap {
        parts.push(format!(
            "Estimated band gap {:.2} eV suggests potential for optoelectronic applications.",
            gap
        ));
    }
    if let Some(e_hull) = energy_above_hull {
        parts.push(format!(
            "Energy above hull {:.3} eV/atom maps to stability score.",
            e_hull
        ));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::formula::parse_elements;

    const ALL: [Classification; 5] = [
        Classification::HalidePerovskite,
        Classification::TransitionMetalOxide,
        Classification::MetalOrganicFramework,
        Classification::BatteryElectrode,
        Classification::GenericInorganic,
    ];

    #[test]
    fn test_base_tags_always_present() {
        for classification in ALL {
            for gap in [None, Some(0.2), Some(1.5), Some(3.4)] {
                let apps = suggest_applications(classification, gap);
                assert!(apps.len() <= MAX_APPLICATIONS);
                for tag in base_applications(classification) {
                    assert!(apps.iter().any(|a| a == tag), "{classification} missing {tag}");
                }
            }
        }
    }

    #[test]
    fn test_band_gap_tags() {
        let apps = suggest_applications(Classification::HalidePerovskite, Some(1.73));
        assert_eq!(
            apps,
            vec!["Solar Cell Absorber", "LED Emitter", "Photodetector", "PV Absorber Candidate"]
        );

        let apps = suggest_applications(Classification::TransitionMetalOxide, Some(3.21));
        assert_eq!(apps.last().map(String::as_str), Some("UV Photocatalysis"));

        // Both ends of the PV window are inclusive, 3.0 itself is not UV
        assert!(suggest_applications(Classification::GenericInorganic, Some(1.0))
            .contains(&"PV Absorber Candidate".to_string()));
        assert!(suggest_applications(Classification::GenericInorganic, Some(2.0))
            .contains(&"PV Absorber Candidate".to_string()));
        assert!(suggest_applications(Classification::GenericInorganic, Some(3.0)).is_empty());
        assert!(suggest_applications(Classification::GenericInorganic, None).is_empty());
    }

    #[test]
    fn test_lead_warning_iff_lead() {
        for formula in ["CsPbBr3", "PbS", "NaCl", "CdTe", "Pt", "P"] {
            let elements = parse_elements(formula);
            let warns = warnings(formula, &elements);
            let has_lead = elements.iter().any(|e| e == "Pb");
            assert_eq!(warns.iter().any(|w| w == LEAD_WARNING), has_lead, "{formula}");
        }
    }

    #[test]
    fn test_cadmium_and_complexity_warnings() {
        let warns = warnings("CdTe", &parse_elements("CdTe"));
        assert_eq!(warns, vec![CADMIUM_WARNING]);

        let long = "C10H16N5O13P3C10H16N5O13P3CaMgK";
        assert!(long.len() > 30);
        let warns = warnings(long, &parse_elements(long));
        assert_eq!(warns, vec![COMPLEXITY_WARNING]);

        let exactly_thirty = "H".repeat(30);
        assert!(warnings(&exactly_thirty, &parse_elements(&exactly_thirty)).is_empty());
    }

    #[test]
    fn test_recommendations_have_three_entries() {
        for classification in ALL {
            assert_eq!(recommendations(classification).len(), 3);
        }
        assert_eq!(
            recommendations(Classification::BatteryElectrode)[0],
            "Evaluate rate capability"
        );
    }

    #[test]
    fn test_rationale_sentences() {
        assert_eq!(
            rationale(Classification::GenericInorganic, None, None),
            "Classified as Generic Inorganic based on elemental composition."
        );
        assert_eq!(
            rationale(Classification::TransitionMetalOxide, Some(3.2), Some(0.0123)),
            "Classified as Transition Metal Oxide based on elemental composition. \
             Estimated band gap 3.20 eV suggests potential for optoelectronic applications. \
             Energy above hull 0.012 eV/atom maps to stability score."
        );
    }
}
