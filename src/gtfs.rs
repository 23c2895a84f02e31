use crate::{objects::*, Error, GtfsReader, RawGtfs};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Data structure with all the GTFS objects needed to draw the network
///
/// This structure is easier to use than the [RawGtfs] structure as all the relationships are checked.
#[derive(Default)]
pub struct Gtfs {
    /// Time needed to read and parse the archive in milliseconds
    pub read_duration: i64,
    /// All stops by `stop_id`. Stops are in an [Arc] because they are also referenced by each [StopTime]
    pub stops: HashMap<String, Arc<Stop>>,
    /// All routes by `route_id`
    pub routes: HashMap<String, Route>,
    /// All trips by `trip_id`, each with its [StopTime] sorted by `stop_sequence`
    pub trips: HashMap<String, Trip>,
    /// Trip ids in the order of trips.txt
    pub trip_order: Vec<String>,
    /// All shape points by `shape_id`, sorted by `shape_pt_sequence`
    pub shapes: HashMap<String, Vec<Shape>>,
}

impl TryFrom<RawGtfs> for Gtfs {
    type Error = Error;
    /// Create a GTFS from a [RawGtfs] object
    fn try_from(raw: RawGtfs) -> Result<Gtfs, Error> {
        let stops = to_stop_map(raw.stops?);
        let raw_trips = raw.trips?;
        let trip_order = raw_trips.iter().map(|t| t.id.clone()).collect();
        let trips = create_trips(raw_trips, raw.stop_times?, &stops)?;

        let gtfs = Gtfs {
            stops,
            routes: to_map(raw.routes?),
            trips,
            trip_order,
            shapes: to_shape_map(raw.shapes.unwrap_or_else(|| Ok(Vec::new()))?),
            read_duration: raw.read_duration,
        };
        info!(
            stops = gtfs.stops.len(),
            routes = gtfs.routes.len(),
            trips = gtfs.trips.len(),
            shapes = gtfs.shapes.len(),
            "gtfs loaded"
        );
        Ok(gtfs)
    }
}

impl Gtfs {
    /// Prints on stdout some basic statistics about the GTFS file (numbers of elements for each object). Mostly to be sure that everything was read
    pub fn print_stats(&self) {
        println!("GTFS data:");
        println!("  Read in {} ms", self.read_duration);
        println!("  Stops: {}", self.stops.len());
        println!("  Routes: {}", self.routes.len());
        println!("  Trips: {}", self.trips.len());
        println!(
            "  Stop times: {}",
            self.trips.values().map(|t| t.stop_times.len()).sum::<usize>()
        );
        println!("  Shapes: {}", self.shapes.len());
    }

    /// Reads from an url (if starts with http), or a local path (either a directory or zipped file)
    ///
    /// To read from an url, build with read-url feature
    /// See also [Gtfs::from_url] and [Gtfs::from_path] if you don’t want the library to guess
    pub fn new(gtfs: &str) -> Result<Gtfs, Error> {
        GtfsReader::default().read(gtfs)
    }

    /// Reads the GTFS from a local zip archive or local directory
    pub fn from_path<P>(path: P) -> Result<Gtfs, Error>
    where
        P: AsRef<std::path::Path>,
    {
        GtfsReader::default().read_from_path(path)
    }

    /// Reads the GTFS from a remote url
    ///
    /// The library must be built with the read-url feature
    #[cfg(feature = "read-url")]
    pub fn from_url<U: reqwest::IntoUrl>(url: U) -> Result<Gtfs, Error> {
        GtfsReader::default().read_from_url(url)
    }

    /// Reads for any object implementing [std::io::Read] and [std::io::Seek]
    pub fn from_reader<T: std::io::Read + std::io::Seek>(reader: T) -> Result<Gtfs, Error> {
        RawGtfs::from_reader(reader).and_then(Gtfs::try_from)
    }

    /// Gets a [Stop] by its `stop_id`
    pub fn get_stop<'a>(&'a self, id: &str) -> Result<&'a Stop, Error> {
        match self.stops.get(id) {
            Some(stop) => Ok(stop),
            None => Err(Error::ReferenceError(id.to_owned())),
        }
    }

    /// Gets a [Trip] by its `trip_id`
    pub fn get_trip<'a>(&'a self, id: &str) -> Result<&'a Trip, Error> {
        match self.trips.get(id) {
            Some(trip) => Ok(trip),
            None => Err(Error::ReferenceError(id.to_owned())),
        }
    }

    /// Gets a [Route] by its `route_id`
    pub fn get_route<'a>(&'a self, id: &str) -> Result<&'a Route, Error> {
        match self.routes.get(id) {
            Some(route) => Ok(route),
            None => Err(Error::ReferenceError(id.to_owned())),
        }
    }

    /// Gets the points of a shape by its `shape_id`, sorted by sequence
    pub fn get_shape<'a>(&'a self, id: &str) -> Result<&'a Vec<Shape>, Error> {
        self.shapes
            .get(id)
            .ok_or_else(|| Error::ReferenceError(id.to_owned()))
    }

    /// Iterates over the trips in the order of trips.txt
    pub fn trips_in_order(&self) -> impl Iterator<Item = &Trip> {
        self.trip_order.iter().filter_map(move |id| self.trips.get(id))
    }

    /// Finds a stop from something a traveller would type
    ///
    /// The query is first matched against the `stop_id`, then against the stop names, ignoring case.
    pub fn find_stop<'a>(&'a self, query: &str) -> Result<&'a Stop, Error> {
        let query = query.trim();
        if let Some(stop) = self.stops.get(query) {
            return Ok(stop);
        }
        let wanted = query.to_lowercase();
        let mut candidates: Vec<&Stop> = self
            .stops
            .values()
            .filter(|s| s.name.trim().to_lowercase() == wanted)
            .map(|s| s.as_ref())
            .collect();
        match candidates.len() {
            0 => Err(Error::UnknownStop(query.to_owned())),
            1 => Ok(candidates.remove(0)),
            _ => {
                let mut ids: Vec<String> = candidates.iter().map(|s| s.id.clone()).collect();
                ids.sort();
                Err(Error::AmbiguousStop {
                    query: query.to_owned(),
                    candidates: ids,
                })
            }
        }
    }
}

fn to_map<O: Id>(elements: impl IntoIterator<Item = O>) -> HashMap<String, O> {
    elements
        .into_iter()
        .map(|e| (e.id().to_owned(), e))
        .collect()
}

fn to_stop_map(stops: Vec<Stop>) -> HashMap<String, Arc<Stop>> {
    stops
        .into_iter()
        .map(|s| (s.id.clone(), Arc::new(s)))
        .collect()
}

fn to_shape_map(shapes: Vec<Shape>) -> HashMap<String, Vec<Shape>> {
    let mut res = HashMap::default();
    for s in shapes {
        let shape = res.entry(s.id.to_owned()).or_insert_with(Vec::new);
        shape.push(s);
    }
    // we sort the shape by it's pt_sequence
    for shapes in res.values_mut() {
        shapes.sort_by_key(|s| s.sequence);
    }

    res
}

fn create_trips(
    raw_trips: Vec<RawTrip>,
    raw_stop_times: Vec<RawStopTime>,
    stops: &HashMap<String, Arc<Stop>>,
) -> Result<HashMap<String, Trip>, Error> {
    let mut trips = to_map(raw_trips.into_iter().map(|rt| Trip {
        id: rt.id,
        service_id: rt.service_id,
        route_id: rt.route_id,
        stop_times: vec![],
        shape_id: rt.shape_id,
    }));
    for s in raw_stop_times {
        let trip = &mut trips
            .get_mut(&s.trip_id)
            .ok_or_else(|| Error::ReferenceError(s.trip_id.to_string()))?;
        let stop = stops
            .get(&s.stop_id)
            .ok_or_else(|| Error::ReferenceError(s.stop_id.to_string()))?;
        trip.stop_times.push(StopTime::from(&s, Arc::clone(stop)));
    }

    for trip in &mut trips.values_mut() {
        trip.stop_times
            .sort_by(|a, b| a.stop_sequence.cmp(&b.stop_sequence));
        if trip.stop_times.is_empty() {
            debug!(trip_id = %trip.id, "trip has no stop times");
        }
    }
    Ok(trips)
}
