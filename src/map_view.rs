use crate::config::MapConfig;
use crate::render::{Keyed, KeyedLayer, Mercator, Patch};
use crate::types::{Category, Record};
use serde::Serialize;

/// One commune on the map, keyed by INSEE code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDot {
    pub code: String,
    pub commune: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub category: Category,
    pub fill: &'static str,
}

impl Keyed for MapDot {
    fn key(&self) -> &str {
        &self.code
    }
}

/// Dot radius grows with the square root of the population.
pub fn dot_radius(population: Option<u64>) -> f64 {
    population.map_or(0.0, |p| (p as f64).sqrt() / 20.0)
}

pub struct MapRenderer {
    projection: Mercator,
    layer: KeyedLayer<MapDot>,
}

impl MapRenderer {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            projection: Mercator::new(config),
            layer: KeyedLayer::default(),
        }
    }

    pub fn projection(&self) -> &Mercator {
        &self.projection
    }

    pub fn dot(&self, record: &Record) -> MapDot {
        let (x, y) = self.projection.project(record.location());
        MapDot {
            code: record.code_insee.clone(),
            commune: record.commune.clone(),
            x,
            y,
            radius: dot_radius(record.population),
            category: record.category,
            fill: record.category.color(),
        }
    }

    pub fn render<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) -> Patch<MapDot> {
        let dots = records.into_iter().map(|r| self.dot(r)).collect();
        self.layer.reconcile(dots)
    }

    pub fn dots(&self) -> impl Iterator<Item = &MapDot> + '_ {
        self.layer.elements()
    }

    pub fn len(&self) -> usize {
        self.layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }
}
