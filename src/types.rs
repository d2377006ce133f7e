use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Software freshness bucket of a commune's website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    UpToDate,
    PartiallyUpToDate,
    Outdated,
}

impl Category {
    /// Classify a normalized label. Anything that is not one of the two
    /// "up to date" labels counts as outdated.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "À jour" => Category::UpToDate,
            "Partiellement à jour" => Category::PartiallyUpToDate,
            _ => Category::Outdated,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::UpToDate => "À jour",
            Category::PartiallyUpToDate => "Partiellement à jour",
            Category::Outdated => "Pas à jour",
        }
    }

    /// Fill colour used by the map and the snapshot.
    pub fn color(self) -> &'static str {
        match self {
            Category::UpToDate => "#2ecc71",
            Category::PartiallyUpToDate => "#f39c12",
            Category::Outdated => "#e74c3c",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the variant name (`UpToDate`) or the display label (`À jour`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "UpToDate" | "À jour" => Ok(Category::UpToDate),
            "PartiallyUpToDate" | "Partiellement à jour" => Ok(Category::PartiallyUpToDate),
            "Outdated" | "Pas à jour" => Ok(Category::Outdated),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// One municipality row after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub commune: String,
    pub code_insee: String,
    pub url: String,
    pub category: Category,
    pub category_label: String,
    pub population: Option<u64>,
    pub site: String,
    pub https: String,
    pub server: String,
    pub server_version: String,
    pub application: String,
    pub application_version: String,
    pub language: String,
    pub language_version: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Record {
    pub fn location(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// `All` or an exact value to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub category: Selection<Category>,
    pub server: Selection<String>,
    pub https: Selection<String>,
    pub min_population: Option<i64>,
}
