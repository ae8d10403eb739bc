/// Location of the base configuration document
pub const DEFAULT_CONFIG_URL: &str = "/config.json";
/// Base path handed to the dataset listing viewer
pub const LISTING_BASE_PATH: &str = "/data/";
/// Arguments kept in sync between the two layers of a magic lens
pub const LENS_SYNC_ARGUMENTS: [&str; 4] = ["phi", "theta", "n_pos", "time"];

/// Manifest `type` tag of an ensemble of datasets
pub const ENSEMBLE_TAG: &str = "ensemble-dataset";
/// Manifest `type` tag of a dataset listing
pub const LISTING_TAG: &str = "arctic-viewer-list";
/// Manifest `type` tag of datasets driven by a query data model
pub const QUERY_DATA_MODEL_TAG: &str = "tonic-query-data-model";

/// Configuration key enabling the magic lens
pub const MAGIC_LENS_KEY: &str = "MagicLens";
/// Configuration key set on the configuration of every ensemble child
pub const ENSEMBLE_KEY: &str = "ensemble";
