use crate::types::Point;
use std::collections::BTreeSet;

/// Sentinel municipality choice meaning "no municipality filter".
pub const ALL_MUNICIPALITIES: &str = "Todas";

const MATERIAL_DELIMITERS: [char; 3] = [';', '/', '|'];

/// Lower-case material tokens named in one free-text `materials` field.
pub fn split_materials(field: &str) -> impl Iterator<Item = String> + '_ {
    field
        .split(|c: char| c == ',' || MATERIAL_DELIMITERS.contains(&c))
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
}

pub fn extract_materials(points: &[Point]) -> BTreeSet<String> {
    points.iter().flat_map(|p| split_materials(&p.materials)).collect()
}

/// "Todas" followed by the sorted distinct non-empty municipalities.
pub fn municipalities(points: &[Point]) -> Vec<String> {
    let distinct: BTreeSet<&str> = points
        .iter()
        .map(|p| p.municipality.as_str())
        .filter(|m| !m.is_empty())
        .collect();

    std::iter::once(ALL_MUNICIPALITIES)
        .chain(distinct)
        .map(str::to_string)
        .collect()
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
