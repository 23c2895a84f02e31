use crate::{Error, Gtfs, RawGtfs};
use std::path::Path;

/// Allows to parameterize how the parsing library behaves
///
/// ```
///let gtfs = gtfs_network::GtfsReader::default()
///    .without_shapes()
///    .read("fixtures/basic")?;
///assert!(gtfs.shapes.is_empty());
/// # Ok::<(), gtfs_network::Error>(())
///```
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct GtfsReader {
    /// [crate::objects::StopTime] are very large and not always needed. This allows to skip reading them
    ///
    /// Without them the network has no edge
    #[derivative(Default(value = "true"))]
    pub read_stop_times: bool,
    /// Shapes are only needed to draw the lines
    #[derivative(Default(value = "true"))]
    pub read_shapes: bool,
}

impl GtfsReader {
    /// Configures the reader to not read the stop times
    ///
    /// This can be useful to save time and memory with large datasets when only the stops and lines are drawn
    /// Returns Self and can be chained
    pub fn without_stop_times(&mut self) -> &mut Self {
        self.read_stop_times = false;
        self
    }

    /// Configures the reader to not read shapes.txt
    ///
    /// Returns Self and can be chained
    pub fn without_shapes(&mut self) -> &mut Self {
        self.read_shapes = false;
        self
    }

    /// Reads from an url (if starts with `"http"`), or a local path (either a directory or zipped file)
    ///
    /// To read from an url, build with read-url feature
    /// See also [GtfsReader::read_from_url] and [GtfsReader::read_from_path] if you don’t want the library to guess
    pub fn read(&self, gtfs: &str) -> Result<Gtfs, Error> {
        RawGtfs::new_params(gtfs, self).and_then(Gtfs::try_from)
    }

    /// Reads the GTFS from a local zip archive or local directory
    pub fn read_from_path<P>(&self, path: P) -> Result<Gtfs, Error>
    where
        P: AsRef<Path>,
    {
        RawGtfs::from_path_params(path, self).and_then(Gtfs::try_from)
    }

    /// Reads the GTFS from a remote url
    ///
    /// The library must be built with the read-url feature
    #[cfg(feature = "read-url")]
    pub fn read_from_url<U: reqwest::IntoUrl>(&self, url: U) -> Result<Gtfs, Error> {
        RawGtfs::from_url_params(url, self).and_then(Gtfs::try_from)
    }
}
