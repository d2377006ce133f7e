use crate::aggregate::ServerCount;
use crate::config::ChartConfig;
use crate::render::{nice_max, Keyed, KeyedLayer, Patch};
use serde::Serialize;

/// One bar of the server chart, keyed by server name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub server: String,
    pub count: usize,
    pub x: f64,
    pub width: f64,
    pub y: f64,
    pub height: f64,
}

impl Keyed for Bar {
    fn key(&self) -> &str {
        &self.server
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    /// Top of the y axis after rounding.
    pub y_max: f64,
    /// Server names in axis order.
    pub domain: Vec<String>,
    pub bars: Patch<Bar>,
}

pub struct ChartRenderer {
    config: ChartConfig,
    layer: KeyedLayer<Bar>,
    y_max: f64,
}

impl ChartRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            config: config.clone(),
            layer: KeyedLayer::default(),
            y_max: 0.0,
        }
    }

    /// Lays out `counts` (already sorted) and diffs against the previous bars.
    pub fn render(&mut self, counts: &[ServerCount]) -> ChartFrame {
        let height = self.config.height;
        let padding = self.config.padding;
        let n = counts.len() as f64;

        // band scale with equal inner and outer padding
        let step = if counts.is_empty() { 0.0 } else { self.config.width / (n + padding) };
        let bandwidth = step * (1.0 - padding);
        let offset = step * padding;

        let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as f64;
        self.y_max = nice_max(max);

        let bars = counts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let bar_height = if self.y_max > 0.0 {
                    c.count as f64 / self.y_max * height
                } else {
                    0.0
                };
                Bar {
                    server: c.server.clone(),
                    count: c.count,
                    x: offset + step * i as f64,
                    width: bandwidth,
                    y: height - bar_height,
                    height: bar_height,
                }
            })
            .collect();

        ChartFrame {
            y_max: self.y_max,
            domain: counts.iter().map(|c| c.server.clone()).collect(),
            bars: self.layer.reconcile(bars),
        }
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> + '_ {
        self.layer.elements()
    }
}
