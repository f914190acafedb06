use serde::{Deserialize, Serialize};

pub const COL_NAME: &str = "Nombre Punto Limpio";
pub const COL_ADDRESS: &str = "Dirección";
pub const COL_MATERIALS: &str = "Materiales que recibe";
pub const COL_HOURS: &str = "Horario";
pub const COL_LATITUDE: &str = "Latitud";
pub const COL_LONGITUDE: &str = "Longitud";
pub const COL_MUNICIPALITY: &str = "Comuna";
pub const COL_KIND: &str = "Tipo de punto";

/// Columns every loaded table carries, synthesized empty when absent.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_NAME,
    COL_ADDRESS,
    COL_MATERIALS,
    COL_HOURS,
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_MUNICIPALITY,
    COL_KIND,
];

/// One recycling drop-off location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Point {
    pub name: String,
    pub address: String,
    pub materials: String,
    pub hours: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub municipality: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Point {
    /// Both coordinates, when the row has them.
    pub fn position(&self) -> Option<LatLon> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(LatLon::new(lat, lon)),
            _ => None,
        }
    }
}

pub type Table = Vec<Point>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// User-selected location the map re-centers on. Owned by one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl FocusPoint {
    /// Focus taken from a row; absent coordinates become NaN and the map
    /// later refuses to place the marker.
    pub fn from_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            latitude: latitude.unwrap_or(f64::NAN),
            longitude: longitude.unwrap_or(f64::NAN),
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_requires_both_axes() {
        let mut point = Point { latitude: Some(-33.3), ..Default::default() };
        assert_eq!(point.position(), None);
        point.longitude = Some(-70.6);
        assert_eq!(point.position(), Some(LatLon::new(-33.3, -70.6)));
    }

    #[test]
    fn focus_from_row_without_coordinates_is_invalid() {
        let focus = FocusPoint::from_coordinates(None, Some(-70.6));
        assert!(focus.latitude.is_nan());
        assert!(!focus.location().is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
        assert!(LatLon::new(-33.3, -70.6).is_valid());
    }
}
