use crate::pagination::Page;
use crate::types::Record;
use serde::Serialize;

/// Version placeholder the source uses when a version could not be detected.
const UNKNOWN_VERSION: &str = "Inconnue";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub commune: String,
    pub code: String,
    pub population: String,
    pub category: String,
    pub server: String,
    pub application: String,
    pub https: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub rows: Vec<TableRow>,
    pub page: Page,
}

pub fn render_table(page: Page, records: &[&Record]) -> TableView {
    TableView {
        rows: records.iter().map(|r| table_row(r)).collect(),
        page,
    }
}

pub fn table_row(record: &Record) -> TableRow {
    TableRow {
        commune: record.commune.clone(),
        code: record.code_insee.clone(),
        population: record.population.map(group_digits).unwrap_or_default(),
        category: record.category_label.clone(),
        server: with_version(&record.server, &record.server_version),
        application: with_version(&record.application, &record.application_version),
        https: record.https.clone(),
        url: record.url.clone(),
    }
}

pub fn with_version(name: &str, version: &str) -> String {
    if version == UNKNOWN_VERSION || version.is_empty() {
        name.to_string()
    } else {
        format!("{name} {version}")
    }
}

/// French digit grouping with a narrow no-break space: 1234567 -> "1 234 567".
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{202f}');
        }
        out.push(ch);
    }
    out
}
