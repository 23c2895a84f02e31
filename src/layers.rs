//! Map layers of a feed: the lines, the stations and a path, as GeoJSON features.
//!
//! Every feature carries the properties a map client needs to draw it
//! (`color`, `weight`, `opacity`, `radius`, `popup`) and a `layer` property
//! telling which layer it belongs to.

use crate::lines::{line_key, Palette};
use crate::objects::Stop;
use crate::serde_helpers::format_color;
use crate::Gtfs;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const LINE_WEIGHT: u32 = 4;
pub const LINE_OPACITY: f64 = 0.95;
pub const STATION_RADIUS: u32 = 5;
/// Radius of a station served by more than one line
pub const INTERCHANGE_RADIUS: u32 = 7;
pub const PATH_COLOR: &str = "#ffffff";
pub const PATH_WEIGHT: u32 = 6;

/// All the layers drawn on the map
#[derive(Debug, Default)]
pub struct MapLayers {
    pub lines: Vec<Feature>,
    pub stations: Vec<Feature>,
    pub path: Option<Feature>,
}

impl MapLayers {
    /// Builds the lines and stations of the feed, and the given path if any
    pub fn build(gtfs: &Gtfs, palette: &Palette, path: Option<&[String]>) -> Self {
        let layers = MapLayers {
            lines: line_features(gtfs, palette),
            stations: station_features(gtfs, palette),
            path: path.and_then(|p| path_feature(gtfs, p)),
        };
        debug!(
            lines = layers.lines.len(),
            stations = layers.stations.len(),
            path = layers.path.is_some(),
            "map layers built"
        );
        layers
    }

    /// Lines first, then stations, then the path so it is drawn on top
    pub fn into_feature_collection(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self
                .lines
                .into_iter()
                .chain(self.stations)
                .chain(self.path)
                .collect(),
            foreign_members: None,
        }
    }
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// One polyline per shape, colored by the line of the route whose trips follow the shape
pub fn line_features(gtfs: &Gtfs, palette: &Palette) -> Vec<Feature> {
    // The first trip using a shape decides its route
    let mut shape_to_route: HashMap<&str, &str> = HashMap::new();
    for trip in gtfs.trips_in_order() {
        if let Some(shape_id) = trip.shape_id.as_deref().filter(|s| !s.is_empty()) {
            shape_to_route
                .entry(shape_id)
                .or_insert(trip.route_id.as_str());
        }
    }

    let mut shape_ids: Vec<&String> = gtfs.shapes.keys().collect();
    shape_ids.sort();

    shape_ids
        .into_iter()
        .filter_map(|shape_id| {
            let points = &gtfs.shapes[shape_id];
            if points.len() < 2 {
                warn!(shape_id = %shape_id, "shape has less than 2 points, not drawn");
                return None;
            }
            let route_id = shape_to_route.get(shape_id.as_str()).copied();
            let route = route_id.and_then(|id| gtfs.routes.get(id));
            let coordinates = points
                .iter()
                .map(|p| vec![p.longitude, p.latitude])
                .collect();
            Some(feature(
                Value::LineString(coordinates),
                properties(json!({
                    "layer": "line",
                    "shape_id": shape_id,
                    "route_id": route_id,
                    "line": route.and_then(|r| line_key(&r.long_name)),
                    "color": palette.route_css_color(route),
                    "weight": LINE_WEIGHT,
                    "opacity": LINE_OPACITY,
                })),
            ))
        })
        .collect()
}

/// The lines serving each stop, in the order they are met
///
/// Trips are walked in the order of trips.txt, and the stops of a trip in travel order.
/// Stop times whose route has no line are ignored.
pub fn station_lines(gtfs: &Gtfs) -> HashMap<String, Vec<String>> {
    let route_lines: HashMap<&str, String> = gtfs
        .routes
        .values()
        .filter_map(|r| line_key(&r.long_name).map(|key| (r.id.as_str(), key)))
        .collect();

    let mut res: HashMap<String, Vec<String>> = HashMap::new();
    for trip in gtfs.trips_in_order() {
        let key = match route_lines.get(trip.route_id.as_str()) {
            Some(key) => key,
            None => continue,
        };
        for stop_id in trip.stop_ids() {
            let lines = res.entry(stop_id.to_owned()).or_default();
            if !lines.contains(key) {
                lines.push(key.clone());
            }
        }
    }
    res
}

/// One circle marker per stop having coordinates
pub fn station_features(gtfs: &Gtfs, palette: &Palette) -> Vec<Feature> {
    let served = station_lines(gtfs);
    let mut stops: Vec<&Stop> = gtfs.stops.values().map(|s| s.as_ref()).collect();
    stops.sort_by(|a, b| a.id.cmp(&b.id));

    stops
        .into_iter()
        .filter_map(|stop| {
            let (lat, lon) = match stop.coordinates() {
                Some(c) => c,
                None => {
                    debug!(stop_id = %stop.id, "stop without coordinates, not drawn");
                    return None;
                }
            };
            let lines = served.get(&stop.id).map(Vec::as_slice).unwrap_or(&[]);
            let color = format_color(palette.station_color(lines));
            let radius = if lines.len() > 1 {
                INTERCHANGE_RADIUS
            } else {
                STATION_RADIUS
            };
            Some(feature(
                Value::Point(vec![lon, lat]),
                properties(json!({
                    "layer": "station",
                    "stop_id": stop.id,
                    "name": stop.name,
                    "lines": lines,
                    "color": color,
                    "radius": radius,
                    "fill_opacity": 1,
                    "popup": popup(stop, lines),
                })),
            ))
        })
        .collect()
}

fn popup(stop: &Stop, lines: &[String]) -> String {
    format!(
        "<b>{} {}</b><br>{}",
        escape_html(&stop.name),
        escape_html(&stop.id),
        escape_html(&lines.join(", "))
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The polyline of a path, through the stops having coordinates
///
/// `None` when less than 2 stops of the path can be placed on the map.
pub fn path_feature(gtfs: &Gtfs, path: &[String]) -> Option<Feature> {
    let coordinates: Vec<Vec<f64>> = path
        .iter()
        .filter_map(|id| gtfs.stops.get(id))
        .filter_map(|stop| stop.coordinates())
        .map(|(lat, lon)| vec![lon, lat])
        .collect();
    if coordinates.len() < 2 {
        return None;
    }
    Some(feature(
        Value::LineString(coordinates),
        properties(json!({
            "layer": "path",
            "stops": path,
            "color": PATH_COLOR,
            "weight": PATH_WEIGHT,
            "opacity": 1,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!("a &amp; b &lt;c&gt;", escape_html("a & b <c>"));
    }

    #[test]
    fn empty_layers() {
        let collection = MapLayers::default().into_feature_collection();
        assert!(collection.features.is_empty());
    }
}
