//! Shared rendering machinery: keyed element reconciliation, the map
//! projection and the chart's value scale.

use crate::config::MapConfig;
use geo::Point;
use image::Rgba;
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;

/// A visual element with a stable identity across renders.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Changes a drawing surface must apply to match the latest data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patch<T> {
    pub enter: Vec<T>,
    pub update: Vec<T>,
    pub exit: Vec<String>,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self {
            enter: Vec::new(),
            update: Vec::new(),
            exit: Vec::new(),
        }
    }
}

impl<T> Patch<T> {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }
}

/// The elements currently on screen for one view.
#[derive(Debug)]
pub struct KeyedLayer<T> {
    elements: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for KeyedLayer<T> {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Keyed + Clone + PartialEq> KeyedLayer<T> {
    /// Replaces the layer's contents with `next` and returns the difference.
    /// Persisting elements only appear in `update` if an attribute changed.
    pub fn reconcile(&mut self, next: Vec<T>) -> Patch<T> {
        let mut patch = Patch::default();
        let mut elements = HashMap::with_capacity(next.len());
        let mut order = Vec::with_capacity(next.len());

        for element in next {
            let key = element.key().to_string();
            match self.elements.remove(&key) {
                None => patch.enter.push(element.clone()),
                Some(previous) if previous != element => patch.update.push(element.clone()),
                Some(_) => {}
            }
            order.push(key.clone());
            elements.insert(key, element);
        }

        // anything still in the old map was not in `next`
        patch.exit = self
            .order
            .iter()
            .filter(|k| self.elements.contains_key(*k))
            .cloned()
            .collect();

        self.elements = elements;
        self.order = order;
        patch
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().filter_map(|k| self.elements.get(k))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Spherical Mercator centred on a configured point.
#[derive(Debug, Clone)]
pub struct Mercator {
    center: (f64, f64),
    scale: f64,
    translate: (f64, f64),
}

impl Mercator {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            center: raw_mercator(config.center[0], config.center[1]),
            scale: config.width * config.scale_factor,
            translate: (config.width / 2.0, config.height / 2.0),
        }
    }

    /// Screen position of a lon/lat point; y grows downward.
    pub fn project(&self, point: Point<f64>) -> (f64, f64) {
        let (x, y) = raw_mercator(point.x(), point.y());
        (
            self.translate.0 + self.scale * (x - self.center.0),
            self.translate.1 - self.scale * (y - self.center.1),
        )
    }
}

fn raw_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lambda = lon.to_radians();
    let phi = lat.to_radians();
    (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
}

/// Round tick step for `[0, max]` split into about `count` intervals.
fn tick_step(max: f64, count: usize) -> f64 {
    let raw = max / count as f64;
    let power = raw.log10().floor();
    let error = raw / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * 10f64.powf(power)
}

/// Extends `max` up to a round value so the y axis ends on a tick.
pub fn nice_max(max: f64) -> f64 {
    const TICKS: usize = 10;
    if max.is_nan() || max <= 0.0 {
        return 0.0;
    }

    let mut stop = max;
    let mut previous = None;
    for _ in 0..10 {
        let step = tick_step(stop, TICKS);
        if previous == Some(step) {
            break;
        }
        // work in whole steps to keep 0.1-ish steps from drifting
        stop = (stop / step - 1e-9).ceil() * step;
        stop = (stop * 1e6).round() / 1e6;
        previous = Some(step);
    }
    stop
}

pub fn hex_to_rgba(hex: &str) -> Rgba<u8> {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    Rgba([channel(0..2), channel(2..4), channel(4..6), 255])
}
