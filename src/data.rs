use crate::config::AppConfig;
use crate::error::LoadError;
use crate::types::{Category, Record};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Mis-decoded UTF-8 "à" (0xC3 0xA0 read as Latin-1). The second form shows up
/// when the non-breaking space was flattened to a plain space on the way.
const MISDECODED_A_GRAVE: [&str; 2] = ["Ã\u{a0}", "Ã "];

/// The full set of retained communes. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

/// Values offered by the filter selectors, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<Category>,
    pub servers: Vec<String>,
    pub https: Vec<String>,
}

impl Dataset {
    /// Keeps the first record for each INSEE code; later duplicates are dropped
    /// so the code stays a usable render key.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let total = records.len();
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| seen.insert(r.code_insee.clone()))
            .collect();
        if records.len() < total {
            debug!("Dropped {} rows with a duplicate INSEE code", total - records.len());
        }
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            categories: distinct(self.records.iter().map(|r| r.category)),
            servers: distinct(self.records.iter().map(|r| r.server.clone())),
            https: distinct(self.records.iter().map(|r| r.https.clone())),
        }
    }
}

fn distinct<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Fetches and parses the dataset named by `input.data_source`.
pub async fn load_dataset(config: &AppConfig) -> Result<Dataset, LoadError> {
    let source = &config.input.data_source;
    info!("Loading communes from {}", source);

    let bytes = fetch_source(source).await?;
    let dataset = parse_dataset(&bytes)?;

    info!("Loaded {} communes", dataset.len());
    Ok(dataset)
}

async fn fetch_source(source: &str) -> Result<Vec<u8>, LoadError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let fetch_err = |e| LoadError::Fetch { url: source.to_string(), source: e };

        let response = reqwest::get(source).await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: source.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(fetch_err)?;
        Ok(body.to_vec())
    } else {
        tokio::fs::read(source).await.map_err(|e| LoadError::Read {
            path: source.to_string(),
            source: e,
        })
    }
}

/// Column positions in the source header.
struct Columns {
    commune: usize,
    code_insee: usize,
    url: usize,
    category: usize,
    population: usize,
    site: Option<usize>,
    https: usize,
    server: usize,
    server_version: usize,
    application: usize,
    application_version: usize,
    language: Option<usize>,
    language_version: Option<usize>,
    latitude: usize,
    longitude: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(Self {
            commune: required("Commune")?,
            code_insee: required("Code Insee")?,
            url: required("url")?,
            category: required("Catégorie")?,
            population: required("Population")?,
            site: find("Site"),
            https: required("https")?,
            server: required("Serveur")?,
            server_version: required("Version du serveur")?,
            application: required("Application")?,
            application_version: required("Version de l'application")?,
            language: find("Langage"),
            language_version: find("Version du langage"),
            latitude: required("Latitude")?,
            longitude: required("Longitude")?,
        })
    }

    /// Builds a record from one row, or `None` when its coordinates are unusable.
    fn normalize(&self, row: &StringRecord) -> Option<Record> {
        let text = |idx: usize| row.get(idx).unwrap_or("").to_string();
        let opt_text = |idx: Option<usize>| idx.map(text).unwrap_or_default();

        let latitude = parse_number(row.get(self.latitude).unwrap_or(""));
        let longitude = parse_number(row.get(self.longitude).unwrap_or(""));
        if !valid_coordinates(latitude, longitude) {
            return None;
        }

        let category_label = normalize_category_label(row.get(self.category).unwrap_or(""));

        Some(Record {
            commune: text(self.commune),
            code_insee: text(self.code_insee),
            url: text(self.url),
            category: Category::from_label(&category_label),
            category_label,
            population: parse_population(row.get(self.population).unwrap_or("")),
            site: opt_text(self.site),
            https: text(self.https),
            server: text(self.server),
            server_version: text(self.server_version),
            application: text(self.application),
            application_version: text(self.application_version),
            language: opt_text(self.language),
            language_version: opt_text(self.language_version),
            latitude,
            longitude,
        })
    }
}

/// Parses a CSV payload into the dataset. Rows with unusable coordinates are
/// dropped; only structural problems fail the load. Fields are decoded
/// lossily, so a stray non-UTF-8 byte costs a replacement character rather
/// than the row.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = decode_lossy(rdr.byte_headers()?);
    let columns = Columns::locate(&headers)?;

    let rows: Vec<ByteRecord> = rdr.byte_records().collect::<Result<_, _>>()?;

    let records: Vec<Record> = rows
        .par_iter()
        .filter_map(|row| columns.normalize(&decode_lossy(row)))
        .collect();

    let skipped = rows.len() - records.len();
    if skipped > 0 {
        debug!("Skipped {} rows with missing or zero coordinates", skipped);
    }

    Ok(Dataset::from_records(records))
}

fn decode_lossy(row: &ByteRecord) -> StringRecord {
    row.iter().map(String::from_utf8_lossy).collect()
}

/// Rewrites the first mis-decoded "à" sequence. Labels without it are
/// returned unchanged.
pub fn normalize_category_label(label: &str) -> String {
    match MISDECODED_A_GRAVE.iter().find(|p| label.contains(**p)) {
        Some(pattern) => label.replacen(*pattern, "à", 1),
        None => label.to_string(),
    }
}

/// Numeric cell parse: blank is 0, anything unparseable is NaN.
fn parse_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    raw.parse().unwrap_or(f64::NAN)
}

fn parse_population(raw: &str) -> Option<u64> {
    let value = parse_number(raw);
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite() && longitude.is_finite() && latitude != 0.0 && longitude != 0.0
}
