use crate::types::{Category, Record};

pub fn record(id: usize, server: &str, category: Category, population: u64) -> Record {
    Record {
        commune: format!("Commune {id}"),
        code_insee: format!("{:05}", 10000 + id),
        url: format!("https://commune-{id}.fr"),
        category,
        category_label: category.label().to_string(),
        population: Some(population),
        site: "oui".to_string(),
        https: if id % 2 == 0 { "Oui" } else { "Non" }.to_string(),
        server: server.to_string(),
        server_version: "1.0".to_string(),
        application: "WordPress".to_string(),
        application_version: "6.4".to_string(),
        language: "PHP".to_string(),
        language_version: "8.2".to_string(),
        latitude: 43.0 + id as f64 * 0.1,
        longitude: 1.0 + id as f64 * 0.05,
    }
}

/// Deterministic spread of servers, categories and populations.
pub fn sample_records(n: usize) -> Vec<Record> {
    const SERVERS: [&str; 3] = ["nginx", "Apache", "IIS"];
    const CATEGORIES: [Category; 3] = [
        Category::UpToDate,
        Category::PartiallyUpToDate,
        Category::Outdated,
    ];

    (0..n)
        .map(|i| record(i, SERVERS[i % 3], CATEGORIES[(i / 3) % 3], (i as u64) * 700))
        .collect()
}
