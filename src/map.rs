//! Map view computation: center, clustered markers and the focus override.

use crate::types::{FocusPoint, LatLon, Point};
use geo::{BoundingRect, MultiPoint};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub default_center: LatLon,
    pub zoom: u8,
    pub focus_zoom: u8,
    pub tile_url: String,
    pub tile_attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLabel {
    pub name: String,
    pub address: String,
    pub hours: String,
    pub materials: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: LatLon,
    pub label: MarkerLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tiles {
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: LatLon,
    pub zoom: u8,
    pub tiles: Tiles,
    /// Rendered inside a cluster group.
    pub markers: Vec<Marker>,
    pub focus: Option<LatLon>,
    pub bounds: Option<Bounds>,
}

/// Mean of present latitudes and mean of present longitudes, each axis on its
/// own. `None` when either axis has no value at all.
pub fn mean_center(points: &[&Point]) -> Option<LatLon> {
    let latitude = mean(points.iter().filter_map(|p| p.latitude))?;
    let longitude = mean(points.iter().filter_map(|p| p.longitude))?;
    Some(LatLon::new(latitude, longitude))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn marker_bounds(markers: &[Marker]) -> Option<Bounds> {
    let cloud: MultiPoint<f64> = markers
        .iter()
        .map(|m| geo::Point::new(m.position.longitude, m.position.latitude))
        .collect();
    cloud.bounding_rect().map(|rect| Bounds {
        south_west: LatLon::new(rect.min().y, rect.min().x),
        north_east: LatLon::new(rect.max().y, rect.max().x),
    })
}

impl Marker {
    fn for_point(point: &Point) -> Option<Self> {
        Some(Self {
            position: point.position()?,
            label: MarkerLabel {
                name: point.name.clone(),
                address: point.address.clone(),
                hours: point.hours.clone(),
                materials: point.materials.clone(),
                kind: point.kind.clone(),
            },
        })
    }
}

pub fn build_map_view(points: &[&Point], focus: Option<&FocusPoint>, settings: &MapSettings) -> MapView {
    let markers: Vec<Marker> = points.iter().filter_map(|p| Marker::for_point(p)).collect();

    let mut view = MapView {
        center: mean_center(points).unwrap_or(settings.default_center),
        zoom: settings.zoom,
        tiles: Tiles {
            url: settings.tile_url.clone(),
            attribution: settings.tile_attribution.clone(),
        },
        bounds: marker_bounds(&markers),
        markers,
        focus: None,
    };

    if let Some(focus) = focus {
        let location = focus.location();
        if location.is_valid() {
            view.focus = Some(location);
            view.center = location;
            view.zoom = settings.focus_zoom;
        } else {
            debug!("Skipping focus marker at invalid location {:?}", location);
        }
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    fn settings() -> MapSettings {
        MapConfig::default().settings()
    }

    fn at(name: &str, latitude: Option<f64>, longitude: Option<f64>) -> Point {
        Point { name: name.into(), latitude, longitude, ..Default::default() }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn center_is_per_axis_mean() {
        let points = [
            at("a", Some(-33.0), Some(-70.0)),
            at("b", Some(-34.0), None),
            at("c", None, Some(-71.0)),
        ];
        let refs: Vec<&Point> = points.iter().collect();
        let center = mean_center(&refs).unwrap();
        assert!(close(center.latitude, -33.5));
        assert!(close(center.longitude, -70.5));
    }

    #[test]
    fn split_axes_still_yield_a_center() {
        let points = [at("lat-only", Some(-33.2), None), at("lon-only", None, Some(-70.8))];
        let refs: Vec<&Point> = points.iter().collect();
        assert_eq!(mean_center(&refs), Some(LatLon::new(-33.2, -70.8)));

        let view = build_map_view(&refs, None, &settings());
        assert_eq!(view.center, LatLon::new(-33.2, -70.8));
        // neither row has both coordinates
        assert!(view.markers.is_empty());
        assert!(view.bounds.is_none());
    }

    #[test]
    fn no_coordinates_falls_back_to_default_center() {
        let points = [at("a", Some(-33.0), None), at("b", None, None)];
        let refs: Vec<&Point> = points.iter().collect();
        let view = build_map_view(&refs, None, &settings());
        assert_eq!(view.center, LatLon::new(-33.3039, -70.6722));
        assert_eq!(view.zoom, 12);

        let empty = build_map_view(&[], None, &settings());
        assert_eq!(empty.center, LatLon::new(-33.3039, -70.6722));
    }

    #[test]
    fn markers_only_for_complete_coordinates() {
        let points = [
            Point { address: "Av. 1".into(), kind: "Fijo".into(), ..at("a", Some(-33.0), Some(-70.0)) },
            at("b", Some(-33.5), None),
            at("c", Some(-33.4), Some(-70.9)),
        ];
        let refs: Vec<&Point> = points.iter().collect();
        let view = build_map_view(&refs, None, &settings());

        let labels: Vec<&str> = view.markers.iter().map(|m| m.label.name.as_str()).collect();
        assert_eq!(labels, vec!["a", "c"]);
        assert_eq!(view.markers[0].label.address, "Av. 1");
        assert_eq!(view.markers[0].label.kind, "Fijo");
        assert_eq!(view.bounds, Some(Bounds {
            south_west: LatLon::new(-33.4, -70.9),
            north_east: LatLon::new(-33.0, -70.0),
        }));
    }

    #[test]
    fn focus_overrides_center_and_zoom() {
        let points = [at("a", Some(-33.0), Some(-70.0))];
        let refs: Vec<&Point> = points.iter().collect();
        let focus = FocusPoint { latitude: -33.21, longitude: -70.64 };
        let view = build_map_view(&refs, Some(&focus), &settings());
        assert_eq!(view.center, LatLon::new(-33.21, -70.64));
        assert_eq!(view.focus, Some(LatLon::new(-33.21, -70.64)));
        assert_eq!(view.zoom, 15);
        assert_eq!(view.markers.len(), 1);
    }

    #[test]
    fn invalid_focus_is_ignored() {
        let points = [at("a", Some(-33.0), Some(-70.0))];
        let refs: Vec<&Point> = points.iter().collect();
        let focus = FocusPoint::from_coordinates(None, Some(-70.6));
        let view = build_map_view(&refs, Some(&focus), &settings());
        assert!(view.focus.is_none());
        assert_eq!(view.center, LatLon::new(-33.0, -70.0));
        assert_eq!(view.zoom, 12);
        assert_eq!(view.markers.len(), 1);
    }
}
