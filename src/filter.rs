use crate::types::Point;
use crate::vocabulary::ALL_MUNICIPALITIES;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MunicipalityChoice {
    #[default]
    All,
    Named(String),
}

impl MunicipalityChoice {
    /// `None`, an empty choice and the "Todas" sentinel all mean no filter.
    pub fn parse(choice: Option<&str>) -> Self {
        match choice {
            None | Some("") | Some(ALL_MUNICIPALITIES) => Self::All,
            Some(name) => Self::Named(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub municipality: MunicipalityChoice,
    /// Lower-cased; an empty set applies no material predicate.
    pub materials: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new<I, S>(municipality: MunicipalityChoice, materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let materials = materials
            .into_iter()
            .map(|m| m.as_ref().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        Self { municipality, materials }
    }

    /// Criteria from the raw control values: a municipality choice and a
    /// comma-separated material list.
    pub fn from_controls(municipality: Option<&str>, materials: Option<&str>) -> Self {
        let chosen = materials
            .unwrap_or_default()
            .split(',')
            .map(str::trim);
        Self::new(MunicipalityChoice::parse(municipality), chosen)
    }

    pub fn matches(&self, point: &Point) -> bool {
        let municipality_ok = match &self.municipality {
            MunicipalityChoice::All => true,
            MunicipalityChoice::Named(name) => point.municipality.to_lowercase() == name.to_lowercase(),
        };
        if !municipality_ok {
            return false;
        }
        if self.materials.is_empty() {
            return true;
        }
        // substring against the raw field, not the tokenized vocabulary
        let field = point.materials.to_lowercase();
        self.materials.iter().any(|m| field.contains(m.as_str()))
    }
}

/// Rows matching `criteria`, in their original order.
pub fn filter_points<'a>(points: &'a [Point], criteria: &FilterCriteria) -> Vec<&'a Point> {
    points.iter().filter(|p| criteria.matches(p)).collect()
}
