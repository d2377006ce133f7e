use crate::types::Record;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerCount {
    pub server: String,
    pub count: usize,
}

/// Communes per server, most common first. Ties keep first-appearance order.
pub fn server_counts<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<ServerCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ServerCount> = Vec::new();

    for record in records {
        match slots.get(record.server.as_str()) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(&record.server, counts.len());
                counts.push(ServerCount { server: record.server.clone(), count: 1 });
            }
        }
    }

    // stable: equal counts stay in insertion order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
