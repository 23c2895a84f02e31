//! The stop graph of a feed and the search of the shortest path between two stops.
//!
//! Two stops are linked when a trip serves them one after the other. Links go both ways
//! and all weigh the same, so the shortest path is the one crossing the fewest links and
//! a breadth-first search finds it.

use crate::Gtfs;
use itertools::Itertools;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

/// Adjacency list of the stops, keyed by `stop_id`
#[derive(Debug, Default, Clone)]
pub struct Network {
    adjacency: HashMap<String, Vec<String>>,
}

impl Network {
    /// Builds the network from the stop sequence of every trip of the feed
    pub fn from_gtfs(gtfs: &Gtfs) -> Self {
        let network =
            Self::from_stop_sequences(gtfs.trips_in_order().map(|trip| trip.stop_ids()));
        info!(
            stops = network.len(),
            edges = network.edge_count(),
            "network built"
        );
        network
    }

    /// Builds the network from ordered sequences of `stop_id`
    ///
    /// Each pair of consecutive stops gives an edge in both directions.
    pub fn from_stop_sequences<I, S, T>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = T>,
        T: AsRef<str> + Clone,
    {
        let mut network = Network::default();
        for sequence in sequences {
            for (from, to) in sequence.into_iter().tuple_windows() {
                network.add_edge(from.as_ref(), to.as_ref());
                network.add_edge(to.as_ref(), from.as_ref());
            }
        }
        network
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        // A stop served twice in a row by a trip is not a link
        if from == to {
            return;
        }
        let neighbors = self.adjacency.entry(from.to_owned()).or_default();
        if !neighbors.iter().any(|n| n == to) {
            neighbors.push(to.to_owned());
        }
    }

    /// Stops directly linked to `stop_id`, in the order the links were found
    pub fn neighbors(&self, stop_id: &str) -> &[String] {
        self.adjacency
            .get(stop_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of stops having at least one link
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Shortest path from `start` to `end`, both included, as a list of `stop_id`
    ///
    /// Returns `None` when `end` cannot be reached from `start`.
    pub fn shortest_path(&self, start: &str, end: &str) -> Option<Vec<String>> {
        if start == end {
            return Some(vec![start.to_owned()]);
        }

        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::from([start]);
        let mut parent: HashMap<&str, &str> = HashMap::new();

        while let Some(current) = queue.pop_front() {
            if current == end {
                break;
            }
            for next in self.neighbors(current) {
                if visited.insert(next.as_str()) {
                    parent.insert(next.as_str(), current);
                    queue.push_back(next.as_str());
                }
            }
        }

        if !parent.contains_key(end) {
            debug!(start, end, visited = visited.len(), "no path");
            return None;
        }

        let mut path = vec![end.to_owned()];
        let mut current = end;
        while let Some(&previous) = parent.get(current) {
            path.push(previous.to_owned());
            current = previous;
        }
        path.reverse();
        debug!(start, end, stops = path.len(), "path found");
        Some(path)
    }
}
