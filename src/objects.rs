use crate::serde_helpers::*;
use rgb::RGB8;
use serde::de::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Objects that have an identifier implement this trait
///
/// Those identifier are technical and should not be shown to travellers
pub trait Id {
    /// Identifier of the object
    fn id(&self) -> &str;
}

/// Describes the kind of [Route]. See <https://gtfs.org/reference/static/#routestxt> `route_type`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RouteType {
    Tramway,
    Subway,
    Rail,
    #[default]
    Bus,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    // Any other value than 0..7 is invalid in the GTFS
    // However, some bad files might have other values
    // We don’t want to stop nor skip too soon during deserialization
    Other(u16),
}

impl<'de> ::serde::Deserialize<'de> for RouteType {
    fn deserialize<D>(deserializer: D) -> Result<RouteType, D::Error>
    where
        D: ::serde::Deserializer<'de>,
    {
        // A value that is not a number is read as the default type
        let i = match String::deserialize(deserializer)?.trim().parse::<u16>() {
            Ok(i) => i,
            Err(_) => return Ok(RouteType::default()),
        };
        Ok(match i {
            0 => RouteType::Tramway,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableCar,
            6 => RouteType::Gondola,
            7 => RouteType::Funicular,
            _ => RouteType::Other(i),
        })
    }
}

/// A physical stop, station or area. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Stop {
    #[serde(rename = "stop_id")]
    pub id: String,
    #[serde(rename = "stop_code", default)]
    pub code: Option<String>,
    #[serde(rename = "stop_name", default)]
    pub name: String,
    #[serde(default, rename = "stop_desc")]
    pub description: String,
    #[serde(default)]
    pub parent_station: Option<String>,
    #[serde(deserialize_with = "de_with_optional_float")]
    #[serde(rename = "stop_lon", default)]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "de_with_optional_float")]
    #[serde(rename = "stop_lat", default)]
    pub latitude: Option<f64>,
}

impl Stop {
    /// `(latitude, longitude)` when both are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A [StopTime] where the relations with [Trip] and [Stop] have not been tested
#[derive(Debug, Deserialize, Default)]
pub struct RawStopTime {
    pub trip_id: String,
    #[serde(deserialize_with = "deserialize_optional_time", default)]
    pub arrival_time: Option<u32>,
    #[serde(deserialize_with = "deserialize_optional_time", default)]
    pub departure_time: Option<u32>,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// The moment where a vehicle, running on [Trip] stops at a [Stop]
#[derive(Debug, Default)]
pub struct StopTime {
    pub arrival_time: Option<u32>,
    pub stop: Arc<Stop>,
    pub departure_time: Option<u32>,
    pub stop_sequence: u32,
}

impl StopTime {
    /// Creates [StopTime] by linking a [RawStopTime] to the [Stop] it references
    pub fn from(stop_time_gtfs: &RawStopTime, stop: Arc<Stop>) -> Self {
        Self {
            arrival_time: stop_time_gtfs.arrival_time,
            departure_time: stop_time_gtfs.departure_time,
            stop,
            stop_sequence: stop_time_gtfs.stop_sequence,
        }
    }
}

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Deserialize, Default)]
pub struct Route {
    #[serde(rename = "route_id")]
    pub id: String,
    #[serde(rename = "route_short_name", default)]
    pub short_name: String,
    #[serde(rename = "route_long_name", default)]
    pub long_name: String,
    #[serde(deserialize_with = "de_with_empty_default", default)]
    pub route_type: RouteType,
    #[serde(default)]
    pub agency_id: Option<String>,
    #[serde(deserialize_with = "deserialize_option_color", default)]
    pub route_color: Option<RGB8>,
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.long_name.is_empty() {
            write!(f, "{}", self.long_name)
        } else {
            write!(f, "{}", self.short_name)
        }
    }
}

/// A [Trip] where the relationships with other objects have not been checked
#[derive(Debug, Deserialize, Default)]
pub struct RawTrip {
    #[serde(rename = "trip_id")]
    pub id: String,
    #[serde(default)]
    pub service_id: String,
    pub route_id: String,
    #[serde(default)]
    pub shape_id: Option<String>,
}

impl Id for RawTrip {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RawTrip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id, self.service_id
        )
    }
}

/// A Trip is a vehicle that follows a sequence of [StopTime]
#[derive(Debug, Default)]
pub struct Trip {
    pub id: String,
    pub service_id: String,
    pub route_id: String,
    /// Sorted by `stop_sequence`
    pub stop_times: Vec<StopTime>,
    pub shape_id: Option<String>,
}

impl Trip {
    /// Iterates over the ids of the stops served, in travel order
    pub fn stop_ids(&self) -> impl Iterator<Item = &str> {
        self.stop_times.iter().map(|st| st.stop.id.as_str())
    }
}

impl Id for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id, self.service_id
        )
    }
}

/// A single geographical point describing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Shape {
    #[serde(rename = "shape_id")]
    pub id: String,
    #[serde(rename = "shape_pt_lat", deserialize_with = "de_with_trimed_float")]
    pub latitude: f64,
    #[serde(rename = "shape_pt_lon", deserialize_with = "de_with_trimed_float")]
    pub longitude: f64,
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: usize,
    #[serde(rename = "shape_dist_traveled", default)]
    pub dist_traveled: Option<f32>,
}

impl Id for Shape {
    fn id(&self) -> &str {
        &self.id
    }
}
