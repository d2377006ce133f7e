use thiserror::Error;

/// The dataset could not be loaded at all. Nothing in the dashboard is usable
/// after one of these.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to fetch dataset from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("dataset request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read dataset file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("dataset is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Filter input coming from the UI that cannot be turned into a `FilterState`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    Category(#[from] crate::types::UnknownCategory),
}
