/*! Draws a public transit network from a GTFS feed and finds paths between its stops.

The feed is read with [Gtfs] (or [RawGtfs] to look at each file with little intelligence).
From it, [Network] links every pair of stops served one after the other by a trip, and
[Network::shortest_path] searches the path crossing the fewest links.
[layers::MapLayers] turns the lines, stations and a path into GeoJSON that [map::render_html]
draws on a Leaflet page.

```
use gtfs_network::{Gtfs, Network};

let gtfs = Gtfs::from_path("fixtures/basic")?;
let network = Network::from_gtfs(&gtfs);
let path = network.shortest_path("1", "9");
assert_eq!(Some(vec!["1", "2", "3", "6", "9"].into_iter().map(String::from).collect::<Vec<_>>()), path);
# Ok::<(), gtfs_network::Error>(())
```
*/

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

pub mod error;
mod gtfs;
mod gtfs_reader;
pub mod layers;
pub mod lines;
pub mod map;
mod network;
pub(crate) mod objects;
mod raw_gtfs;
mod serde_helpers;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use gtfs::Gtfs;
pub use gtfs_reader::GtfsReader;
pub use network::Network;
pub use objects::*;
pub use raw_gtfs::RawGtfs;
