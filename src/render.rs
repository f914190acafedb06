use crate::html;
use crate::map::MapView;
use crate::types::Point;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;
use std::fs;
use std::path::Path;

pub const EMPTY_RESULT: &str = "No hay puntos que coincidan con los filtros seleccionados.";
pub const UNAVAILABLE: &str = "La base de datos está vacía o no se pudo cargar. \
Asegúrate de que el archivo de datos exista en la carpeta del proyecto.";

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub name: String,
    pub address: String,
    pub hours: String,
    pub materials: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The result list, including the explicit empty-result indicator.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub count: usize,
    pub heading: String,
    pub entries: Vec<ListEntry>,
    pub empty_message: Option<&'static str>,
}

impl ListView {
    pub fn from_points(points: &[&Point]) -> Self {
        let entries: Vec<ListEntry> = points.iter().map(|p| ListEntry {
            name: p.name.clone(),
            address: p.address.clone(),
            hours: p.hours.clone(),
            materials: p.materials.clone(),
            kind: p.kind.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
        }).collect();

        Self {
            count: entries.len(),
            heading: format!("Resultados: {} puntos encontrados", entries.len()),
            empty_message: entries.is_empty().then_some(EMPTY_RESULT),
            entries,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}\n", self.heading);
        if let Some(message) = self.empty_message {
            let _ = writeln!(out, "{}", message);
        }
        for entry in &self.entries {
            let _ = writeln!(out, "{}", entry.name);
            let _ = writeln!(out, "  📍 {}", entry.address);
            let _ = writeln!(out, "  🕒 {}", entry.hours);
            let _ = writeln!(out, "  ♻️ {}", entry.materials);
            let _ = writeln!(out, "  🧾 Tipo: {}", entry.kind);
            if let (Some(lat), Some(lon)) = (entry.latitude, entry.longitude) {
                let _ = writeln!(out, "  🌐 {:.5}, {:.5}", lat, lon);
            }
            let _ = writeln!(out, "---");
        }
        out
    }
}

/// Standalone Leaflet document for `view`.
pub fn map_document(view: &MapView) -> Result<String> {
    let json = serde_json::to_string(view).context("Failed to serialize map view")?;
    // keep "</script>" inside string values from closing the script element
    let json = json.replace("</", "<\\/");
    Ok(html::map_page(&json))
}

pub fn write_map(view: &MapView, out: &Path) -> Result<()> {
    let document = map_document(view)?;
    fs::write(out, document).with_context(|| format!("Failed to write map to {:?}", out))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::map::build_map_view;

    fn point(name: &str) -> Point {
        Point {
            name: name.into(),
            address: "Av. Chile 1".into(),
            hours: "9-18".into(),
            materials: "Vidrio".into(),
            kind: "Fijo".into(),
            latitude: Some(-33.3),
            longitude: Some(-70.6),
            ..Default::default()
        }
    }

    #[test]
    fn list_counts_and_renders_entries() {
        let points = [point("Punto A"), point("Punto B")];
        let refs: Vec<&Point> = points.iter().collect();
        let view = ListView::from_points(&refs);
        assert_eq!(view.count, 2);
        assert_eq!(view.heading, "Resultados: 2 puntos encontrados");
        assert!(view.empty_message.is_none());

        let text = view.to_text();
        assert!(text.contains("Punto B"));
        assert!(text.contains("🧾 Tipo: Fijo"));
    }

    #[test]
    fn empty_list_carries_indicator() {
        let view = ListView::from_points(&[]);
        assert_eq!(view.heading, "Resultados: 0 puntos encontrados");
        assert_eq!(view.empty_message, Some(EMPTY_RESULT));
        assert!(view.to_text().contains(EMPTY_RESULT));
    }

    #[test]
    fn map_document_embeds_escaped_view() {
        let points = [point("</script><b>x</b>")];
        let refs: Vec<&Point> = points.iter().collect();
        let view = build_map_view(&refs, None, &MapConfig::default().settings());

        let document = map_document(&view).unwrap();
        assert!(document.contains("drawMap({"));
        assert!(document.contains("markerClusterGroup"));
        // the single marker gives a degenerate box, still offered as a fit control
        assert!(document.contains("\"bounds\":{"));
        assert!(document.contains("fitBounds"));
        assert!(!document.contains("</script><b>"));
        assert!(!document.contains("__MAP_VIEW__"));
    }

    #[test]
    fn write_map_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("mapa.html");
        let view = build_map_view(&[], None, &MapConfig::default().settings());
        write_map(&view, &out).unwrap();
        assert!(fs::read_to_string(out).unwrap().starts_with("<!doctype html>"));
    }
}
