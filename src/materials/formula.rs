// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

// Element extraction from formulas like "CsPbBr3". No chemistry is checked,
// garbage in gives an empty or partial parse.

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::LazyLock;

static ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z][a-z]*").unwrap());
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z][a-z]*)(\d*)").unwrap());

/// Element symbol to atom count, kept in the order symbols first appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition(Vec<(String, u32)>);

impl Composition {
    fn add(&mut self, element: &str, count: u32) {
        match self.0.iter_mut().find(|(el, _)| el == element) {
            Some((_, existing)) => *existing = existing.saturating_add(count),
            None => self.0.push((element.to_string(), count)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, element: &str) -> Option<u32> {
        self.0.iter().find(|(el, _)| el == element).map(|(_, n)| *n)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(el, n)| (el.as_str(), *n))
    }
}

impl Serialize for Composition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (element, count) in &self.0 {
            map.serialize_entry(element, count)?;
        }
        map.end()
    }
}

/// Every element symbol in the formula, left to right, repeats included.
pub fn parse_elements(formula: &str) -> Vec<String> {
    ELEMENT_RE
        .find_iter(formula)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Atom counts per element. A missing count means 1, repeats accumulate.
pub fn parse_composition(formula: &str) -> Composition {
    let mut composition = Composition::default();

    for caps in TOKEN_RE.captures_iter(formula) {
        let element = &caps[1];
        let digits = &caps[2];
        // "0" and overflowing digit runs still count as present
        let count = if digits.is_empty() {
            1
        } else {
            digits.parse::<u32>().unwrap_or(u32::MAX).max(1)
        };
        composition.add(element, count);
    }

    composition
}
