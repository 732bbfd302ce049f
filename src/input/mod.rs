pub(crate) mod gpx;
