use crate::layers::{line_features, path_feature, station_features, station_lines, MapLayers};
use crate::lines::Palette;
use crate::objects::*;
use crate::{Error, Gtfs, GtfsReader, Network, RawGtfs};
use rgb::RGB8;
use serde_json::json;

static NULL: serde_json::Value = serde_json::Value::Null;

fn prop<'a>(feature: &'a geojson::Feature, name: &str) -> &'a serde_json::Value {
    feature
        .properties
        .as_ref()
        .and_then(|p| p.get(name))
        .unwrap_or(&NULL)
}

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn read_stop() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    assert_eq!(12, gtfs.stops.len());
    // the file starts with a BOM
    assert_eq!("Dwarka", gtfs.get_stop("1").unwrap().name);
    assert_eq!(Some(28.615), gtfs.get_stop("1").unwrap().latitude);
    assert_eq!(Some("DW".to_owned()), gtfs.get_stop("1").unwrap().code);
    // coordinates with spaces around are trimmed
    assert_eq!(Some((28.612, 77.04)), gtfs.get_stop("12").unwrap().coordinates());
    assert_eq!(None, gtfs.get_stop("11").unwrap().latitude);
    assert_eq!(None, gtfs.get_stop("11").unwrap().coordinates());
    assert!(matches!(gtfs.get_stop("404"), Err(Error::ReferenceError(_))));
}

#[test]
fn read_routes() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    assert_eq!(4, gtfs.routes.len());
    assert_eq!(RouteType::Subway, gtfs.get_route("B").unwrap().route_type);
    // quoted field with a comma
    assert_eq!(
        "YELLOW_Samaypur Badli, HUDA City Centre",
        gtfs.get_route("Y").unwrap().long_name
    );
    assert_eq!(None, gtfs.get_route("B").unwrap().route_color);
    assert_eq!(
        Some(RGB8::new(0x80, 0x80, 0x80)),
        gtfs.get_route("G").unwrap().route_color
    );
}

#[test]
fn read_trips() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    assert_eq!(5, gtfs.trips.len());
    assert_eq!(
        vec!["blue_1", "yellow_1", "red_1", "grey_1", "yellow_2"],
        gtfs.trips_in_order().map(|t| t.id.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(None, gtfs.get_trip("red_1").unwrap().shape_id);
    assert_eq!(
        Some("shp_blue".to_owned()),
        gtfs.get_trip("yellow_2").unwrap().shape_id
    );
}

#[test]
fn read_stop_times() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let trip = gtfs.get_trip("blue_1").unwrap();
    // stop times are sorted by stop_sequence
    assert_eq!(vec!["1", "2", "3", "4"], trip.stop_ids().collect::<Vec<_>>());
    assert_eq!(Some(6 * 3600 + 10 * 60), trip.stop_times[1].arrival_time);
    assert_eq!("Janakpuri West", trip.stop_times[1].stop.name);

    let red = gtfs.get_trip("red_1").unwrap();
    assert_eq!(None, red.stop_times[0].arrival_time);

    let grey = gtfs.get_trip("grey_1").unwrap();
    assert_eq!(Some(24 * 3600 + 10 * 60), grey.stop_times[0].arrival_time);

    assert!(gtfs.get_trip("yellow_2").unwrap().stop_times.is_empty());
}

#[test]
fn read_shapes() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    assert_eq!(4, gtfs.shapes.len());
    let blue = gtfs.get_shape("shp_blue").unwrap();
    assert_eq!(
        vec![1, 2, 3, 4],
        blue.iter().map(|p| p.sequence).collect::<Vec<_>>()
    );
    assert_eq!(28.615, blue[0].latitude);
}

#[test]
fn read_from_zip_in_subdirectory() {
    let gtfs = Gtfs::from_path("fixtures/zips/gtfs.zip").expect("impossible to read zip");
    assert_eq!(12, gtfs.stops.len());
    assert_eq!(5, gtfs.trips.len());
    assert_eq!(4, gtfs.shapes.len());

    let raw = RawGtfs::from_path("fixtures/zips/gtfs.zip").expect("impossible to read zip");
    assert_eq!(5, raw.files.len());
    assert!(raw.sha256.is_some());
}

#[test]
fn read_guessing_the_source() {
    let gtfs = Gtfs::new("fixtures/zips/gtfs.zip").expect("impossible to read zip");
    assert_eq!(4, gtfs.routes.len());
    assert!(matches!(
        Gtfs::new("fixtures/does_not_exist"),
        Err(Error::NotFileNorDirectory(_))
    ));
}

#[test]
fn raw_gtfs_keeps_errors_per_file() {
    let raw = RawGtfs::from_path("fixtures/missing_stop_times").expect("impossible to read dir");
    assert!(raw.stops.is_ok());
    assert!(matches!(raw.stop_times, Err(Error::MissingFile(ref f)) if f == "stop_times.txt"));
    assert!(raw.shapes.is_none());
    raw.print_stats();

    assert!(matches!(
        Gtfs::from_path("fixtures/missing_stop_times"),
        Err(Error::MissingFile(_))
    ));
}

#[test]
fn reader_without_stop_times() {
    let gtfs = GtfsReader::default()
        .without_stop_times()
        .read_from_path("fixtures/missing_stop_times")
        .expect("impossible to read gtfs");
    assert_eq!(12, gtfs.stops.len());
    assert!(Network::from_gtfs(&gtfs).is_empty());
}

#[test]
fn reader_without_shapes() {
    let gtfs = GtfsReader::default()
        .without_shapes()
        .read("fixtures/basic")
        .expect("impossible to read gtfs");
    assert!(gtfs.shapes.is_empty());
    assert!(line_features(&gtfs, &Palette::default()).is_empty());
}

#[test]
fn find_stop_by_id_or_name() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    assert_eq!("3", gtfs.find_stop("3").unwrap().id);
    assert_eq!("3", gtfs.find_stop("rajiv chowk").unwrap().id);
    assert_eq!("6", gtfs.find_stop(" Kashmere Gate ").unwrap().id);
    assert!(matches!(
        gtfs.find_stop("Connaught Place"),
        Err(Error::UnknownStop(_))
    ));
}

#[test]
fn find_stop_with_a_shared_name() {
    let gtfs = Gtfs::from_path("fixtures/lenient").expect("impossible to read gtfs");
    match gtfs.find_stop("central") {
        Err(Error::AmbiguousStop { query, candidates }) => {
            assert_eq!("central", query);
            assert_eq!(ids(&["s1", "s2"]), candidates);
        }
        other => panic!("expected an ambiguous stop, got {:?}", other.map(|s| &s.id)),
    }
    // an id is never ambiguous
    assert_eq!("s2", gtfs.find_stop("s2").unwrap().id);
    assert_eq!("s3", gtfs.find_stop("Harbour").unwrap().id);
}

#[test]
fn read_with_malformed_optional_values() {
    let gtfs = Gtfs::from_path("fixtures/lenient").expect("impossible to read gtfs");

    // an empty shapes.txt means no line geometry
    assert!(gtfs.shapes.is_empty());
    assert!(line_features(&gtfs, &Palette::default()).is_empty());

    // times overflowing or badly formatted are dropped, the stop times are kept
    let trip = gtfs.get_trip("m_1").unwrap();
    assert_eq!(vec!["s2", "s3"], trip.stop_ids().collect::<Vec<_>>());
    assert_eq!(None, trip.stop_times[0].arrival_time);
    assert_eq!(None, trip.stop_times[1].arrival_time);
    assert_eq!(Some(6 * 3600 + 5 * 60 + 30), trip.stop_times[1].departure_time);

    assert_eq!(RouteType::default(), gtfs.get_route("M").unwrap().route_type);

    // the route name has no line key, its stops belong to no line
    assert!(station_lines(&gtfs).is_empty());
    assert_eq!(
        Some(ids(&["s2", "s3"])),
        Network::from_gtfs(&gtfs).shortest_path("s2", "s3")
    );
}

#[test]
fn raw_gtfs_reads_empty_file() {
    let raw = RawGtfs::from_path("fixtures/lenient").expect("impossible to read dir");
    assert!(matches!(raw.shapes, Some(Ok(ref shapes)) if shapes.is_empty()));
}

#[test]
fn network_from_trips() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let network = Network::from_gtfs(&gtfs);
    assert_eq!(11, network.len());
    assert_eq!(20, network.edge_count());
    assert_eq!(ids(&["2", "4", "6", "7"]), network.neighbors("3"));
    assert_eq!(ids(&["2", "12"]), network.neighbors("1"));
    assert!(network.neighbors("10").is_empty());
}

#[test]
fn shortest_paths() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let network = Network::from_gtfs(&gtfs);
    assert_eq!(
        Some(ids(&["1", "2", "3", "6", "9"])),
        network.shortest_path("1", "9")
    );
    assert_eq!(Some(ids(&["4", "3", "6", "8"])), network.shortest_path("4", "8"));
    assert_eq!(
        Some(ids(&["11", "12", "1", "2", "3", "7"])),
        network.shortest_path("11", "7")
    );
    assert_eq!(Some(ids(&["5"])), network.shortest_path("5", "5"));
    assert_eq!(None, network.shortest_path("1", "10"));
}

#[test]
fn lines_are_colored_by_route() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let lines = line_features(&gtfs, &Palette::default());
    assert_eq!(4, lines.len());

    let blue = &lines[0];
    assert_eq!(&json!("shp_blue"), prop(blue, "shape_id"));
    // the first trip using the shape decides
    assert_eq!(&json!("B"), prop(blue, "route_id"));
    assert_eq!(&json!("BLUE"), prop(blue, "line"));
    assert_eq!(&json!("#2563eb"), prop(blue, "color"));
    assert_eq!(&json!(4), prop(blue, "weight"));
    assert_eq!(&json!(0.95), prop(blue, "opacity"));
    match &blue.geometry.as_ref().unwrap().value {
        geojson::Value::LineString(points) => {
            assert_eq!(4, points.len());
            assert_eq!(vec![77.022, 28.615], points[0]);
            assert_eq!(vec![77.356, 28.5747], points[3]);
        }
        v => panic!("unexpected geometry {:?}", v),
    }

    // not in the palette, the route_color is used
    assert_eq!(&json!("#808080"), prop(&lines[1], "color"));
    // no trip uses it
    assert_eq!(&json!("shp_orphan"), prop(&lines[2], "shape_id"));
    assert_eq!(&json!("#64748b"), prop(&lines[2], "color"));
    assert_eq!(&serde_json::Value::Null, prop(&lines[2], "route_id"));
    assert_eq!(&json!("#facc15"), prop(&lines[3], "color"));
}

#[test]
fn stations_are_colored_by_first_line() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let served = station_lines(&gtfs);
    assert_eq!(ids(&["BLUE", "YELLOW"]), served["3"]);
    assert_eq!(ids(&["YELLOW", "RED"]), served["6"]);
    assert_eq!(ids(&["BLUE", "GREY"]), served["1"]);
    assert!(!served.contains_key("10"));

    let stations = station_features(&gtfs, &Palette::default());
    // stop 11 has no latitude
    assert_eq!(11, stations.len());
    let station = |id: &str| {
        stations
            .iter()
            .find(|f| prop(f, "stop_id") == &json!(id))
            .unwrap_or_else(|| panic!("no station {}", id))
    };

    let rajiv_chowk = station("3");
    assert_eq!(&json!("#2563eb"), prop(rajiv_chowk, "color"));
    assert_eq!(&json!(7), prop(rajiv_chowk, "radius"));
    assert_eq!(
        &json!("<b>Rajiv Chowk 3</b><br>BLUE, YELLOW"),
        prop(rajiv_chowk, "popup")
    );

    assert_eq!(&json!("#facc15"), prop(station("6"), "color"));
    assert_eq!(&json!("#ef4444"), prop(station("9"), "color"));
    assert_eq!(&json!(5), prop(station("9"), "radius"));

    let depot = station("10");
    assert_eq!(&json!("#94a3b8"), prop(depot, "color"));
    assert_eq!(&json!(5), prop(depot, "radius"));
    assert_eq!(&json!("<b>Depot 10</b><br>"), prop(depot, "popup"));

    // only served by a line missing from the palette
    assert_eq!(&json!("#94a3b8"), prop(station("12"), "color"));
}

#[test]
fn path_layer() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let network = Network::from_gtfs(&gtfs);

    let path = network.shortest_path("1", "9").unwrap();
    let feature = path_feature(&gtfs, &path).unwrap();
    assert_eq!(&json!("#ffffff"), prop(&feature, "color"));
    assert_eq!(&json!(6), prop(&feature, "weight"));
    match &feature.geometry.as_ref().unwrap().value {
        geojson::Value::LineString(points) => assert_eq!(5, points.len()),
        v => panic!("unexpected geometry {:?}", v),
    }

    // stop 11 has no coordinates, it is skipped
    let path = network.shortest_path("11", "1").unwrap();
    match &path_feature(&gtfs, &path).unwrap().geometry.unwrap().value {
        geojson::Value::LineString(points) => assert_eq!(2, points.len()),
        v => panic!("unexpected geometry {:?}", v),
    }

    assert!(path_feature(&gtfs, &ids(&["5"])).is_none());
}

#[test]
fn all_layers() {
    let gtfs = Gtfs::from_path("fixtures/basic").expect("impossible to read gtfs");
    let path = Network::from_gtfs(&gtfs).shortest_path("4", "8").unwrap();
    let collection =
        MapLayers::build(&gtfs, &Palette::default(), Some(&path)).into_feature_collection();
    assert_eq!(4 + 11 + 1, collection.features.len());
    assert_eq!(&json!("line"), prop(&collection.features[0], "layer"));
    assert_eq!(&json!("station"), prop(&collection.features[4], "layer"));
    assert_eq!(&json!("path"), prop(&collection.features[15], "layer"));
}
