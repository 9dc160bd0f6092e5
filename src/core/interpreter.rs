use regex::Regex;

use crate::models::{FilterParameters, PropertyType};

/// Rule-based free-text query interpreter.
///
/// Turns a phrase like "3 bedroom house under 400k in Austin, TX" into
/// structured [`FilterParameters`]. Extraction is deterministic and never
/// fails; text that matches no rule yields empty parameters.
///
/// Extraction order: location, price bounds, bedrooms, property type,
/// then semantic defaults for fields still unset.
#[derive(Debug, Clone)]
pub struct QueryInterpreter {
    location_patterns: Vec<Regex>,
    max_price_patterns: Vec<Regex>,
    min_price_patterns: Vec<Regex>,
    bedroom_pattern: Regex,
    type_patterns: Vec<(Regex, PropertyType)>,
}

impl QueryInterpreter {
    pub fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("invalid query pattern");

        // Tried in order; first match wins. State is always exactly 2 letters.
        let location_patterns = vec![
            compile(r"(?i)\b(?:in|near|around)\s+([a-zA-Z][a-zA-Z .'-]*?),\s*([a-zA-Z]{2})\b"),
            compile(r"(?i)\b(?:in|near|around)\s+([a-zA-Z][a-zA-Z .'-]*?)\s+([a-zA-Z]{2})\b"),
            compile(r"(?i)\b([a-zA-Z][a-zA-Z .'-]*?),\s*([a-zA-Z]{2})\b"),
        ];

        // Evaluated in order; a later match overwrites an earlier one
        // within the same direction.
        let max_price_patterns = vec![
            compile(r"(?i)\b(?:under|below)\s+\$?([0-9][0-9,]*)(k)?\b"),
            compile(r"(?i)\bmax(?:imum)?\s*(?:of\s+)?\$?([0-9][0-9,]*)(k)?\b"),
            compile(r"(?i)\$?([0-9][0-9,]*)(k)?\s+or\s+less\b"),
        ];
        let min_price_patterns = vec![
            compile(r"(?i)\b(?:above|over)\s+\$?([0-9][0-9,]*)(k)?\b"),
            compile(r"(?i)\bmin(?:imum)?\s*(?:of\s+)?\$?([0-9][0-9,]*)(k)?\b"),
            compile(r"(?i)\$?([0-9][0-9,]*)(k)?\s+or\s+more\b"),
        ];

        let bedroom_pattern = compile(r"(?i)\b([0-9]+)\s*-?\s*(?:bed(?:room)?s?|br)\b");

        let type_patterns = vec![
            (
                compile(r"(?i)\b(?:houses?|homes?|single[ -]?family)\b"),
                PropertyType::SingleFamily,
            ),
            (
                compile(r"(?i)\b(?:condos?|condominiums?)\b"),
                PropertyType::Condo,
            ),
            (
                compile(r"(?i)\b(?:town\s?houses?|townhomes?)\b"),
                PropertyType::Townhouse,
            ),
            (compile(r"(?i)\bapartments?\b"), PropertyType::MultiFamily),
        ];

        Self {
            location_patterns,
            max_price_patterns,
            min_price_patterns,
            bedroom_pattern,
            type_patterns,
        }
    }

    /// Extract filter parameters from free text. Never fails.
    pub fn interpret(&self, text: &str) -> FilterParameters {
        let mut params = FilterParameters::default();

        self.extract_location(text, &mut params);
        self.extract_prices(text, &mut params);
        self.extract_bedrooms(text, &mut params);
        self.extract_property_type(text, &mut params);
        self.apply_semantic_defaults(text, &mut params);

        params
    }

    fn extract_location(&self, text: &str, params: &mut FilterParameters) {
        for pattern in &self.location_patterns {
            if let Some(caps) = pattern.captures(text) {
                let city = trim_prepositions(caps[1].trim());
                if city.is_empty() {
                    continue;
                }
                params.city = Some(city);
                params.state = Some(caps[2].to_uppercase());
                return;
            }
        }
    }

    fn extract_prices(&self, text: &str, params: &mut FilterParameters) {
        for pattern in &self.max_price_patterns {
            if let Some(value) = match_price(pattern, text) {
                params.max_price = Some(value);
            }
        }
        for pattern in &self.min_price_patterns {
            if let Some(value) = match_price(pattern, text) {
                params.min_price = Some(value);
            }
        }
    }

    fn extract_bedrooms(&self, text: &str, params: &mut FilterParameters) {
        if let Some(caps) = self.bedroom_pattern.captures(text) {
            if let Ok(count) = caps[1].parse::<u32>() {
                params.min_bedrooms = Some(count);
            }
        }
    }

    fn extract_property_type(&self, text: &str, params: &mut FilterParameters) {
        for (pattern, property_type) in &self.type_patterns {
            if pattern.is_match(text) {
                params.property_type = Some(*property_type);
                return;
            }
        }
    }

    /// Keyword-driven defaults, applied only to fields still unset.
    fn apply_semantic_defaults(&self, text: &str, params: &mut FilterParameters) {
        let lower = text.to_lowercase();

        if lower.contains("luxury") {
            params.min_price.get_or_insert(500_000);
        }
        if lower.contains("starter")
            || lower.contains("first-time home")
            || lower.contains("first time home")
            || lower.contains("affordable")
        {
            params.max_price.get_or_insert(350_000);
        }
        if lower.contains("family") {
            params.min_bedrooms.get_or_insert(3);
        }
    }
}

impl Default for QueryInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop leading preposition words that leak into the city capture.
fn trim_prepositions(city: &str) -> String {
    let mut words = city.split_whitespace().peekable();
    while let Some(word) = words.peek() {
        match word.to_lowercase().as_str() {
            "in" | "near" | "around" => {
                words.next();
            }
            _ => break,
        }
    }
    words.collect::<Vec<_>>().join(" ")
}

/// Parse a price match; a trailing "k" in the matched text multiplies by 1000.
/// A value too large to represent is treated as no match.
fn match_price(pattern: &Regex, text: &str) -> Option<u64> {
    let caps = pattern.captures(text)?;
    let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    let value: u64 = digits.parse().ok()?;
    if caps.get(2).is_some() {
        value.checked_mul(1000)
    } else {
        Some(value)
    }
}
