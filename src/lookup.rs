use crate::table_view::{group_digits, with_version};
use crate::types::Record;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::Serialize;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-commune index over every retained record, in lon/lat degrees.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

/// What the map shows when hovering a commune.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub code: String,
    pub commune: String,
    pub population: String,
    pub category: String,
    pub server: String,
    pub application: String,
    pub https: String,
    pub url: String,
}

impl Tooltip {
    pub fn from_record(record: &Record) -> Self {
        Self {
            code: record.code_insee.clone(),
            commune: record.commune.clone(),
            population: record.population.map(group_digits).unwrap_or_default(),
            category: record.category_label.clone(),
            server: with_version(&record.server, &record.server_version),
            application: with_version(&record.application, &record.application_version),
            https: record.https.clone(),
            url: record.url.clone(),
        }
    }
}

impl PointIndex {
    pub fn build(records: &[Record]) -> Self {
        let points = records
            .iter()
            .enumerate()
            .map(|(i, r)| GeomWithData::new([r.longitude, r.latitude], i))
            .collect();
        Self { tree: RTree::bulk_load(points) }
    }

    /// Index of the closest record within `radius` degrees for which `accept`
    /// holds.
    pub fn nearest(
        &self,
        lon: f64,
        lat: f64,
        radius: f64,
        accept: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        let max_distance_2 = radius * radius;
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[lon, lat])
            .take_while(|(_, d2)| *d2 <= max_distance_2)
            .map(|(point, _)| point.data)
            .find(|&i| accept(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_records;

    #[test]
    fn finds_closest_accepted_record_within_radius() {
        let records = sample_records(10);
        let index = PointIndex::build(&records);

        // record 3 sits at (1.15, 43.3)
        assert_eq!(index.nearest(1.151, 43.301, 0.05, |_| true), Some(3));
        assert_eq!(index.nearest(1.151, 43.301, 0.2, |i| i != 3), Some(4));
        assert_eq!(index.nearest(1.151, 43.301, 0.05, |i| i != 3), None);
        assert_eq!(index.nearest(10.0, 50.0, 0.05, |_| true), None);
    }

    #[test]
    fn tooltip_formats_like_the_table() {
        let records = sample_records(4);
        let tip = Tooltip::from_record(&records[3]);
        assert_eq!(tip.commune, "Commune 3");
        assert_eq!(tip.population, "2\u{202f}100");
        assert_eq!(tip.server, "nginx 1.0");
    }
}
