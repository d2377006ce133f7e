//! The controller and its three views, kept in step.

use crate::basemap::Outline;
use crate::chart_view::{Bar, ChartFrame, ChartRenderer};
use crate::config::AppConfig;
use crate::controller::{Command, Effect, ViewStateController};
use crate::data::{Dataset, FilterOptions};
use crate::lookup::{PointIndex, Tooltip};
use crate::map_view::{MapDot, MapRenderer};
use crate::render::Patch;
use crate::snapshot;
use crate::table_view::{render_table, TableView};
use anyhow::Result;
use image::RgbaImage;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What changed after one command. Views that did not change are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub filtered: usize,
    pub map: Option<Patch<MapDot>>,
    pub chart: Option<ChartFrame>,
    pub table: TableView,
}

/// Full current state, for a client that has nothing drawn yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub filtered: usize,
    pub dots: Vec<MapDot>,
    pub y_max: f64,
    pub bars: Vec<Bar>,
    pub table: TableView,
}

pub struct Dashboard {
    controller: ViewStateController,
    map: MapRenderer,
    chart: ChartRenderer,
    index: PointIndex,
    outlines: Vec<Outline>,
    map_size: (u32, u32),
}

impl Dashboard {
    /// Builds the dashboard and draws it from empty, returning that first
    /// frame: every dot and bar enters.
    pub fn new(dataset: Arc<Dataset>, config: &AppConfig) -> (Self, Frame) {
        let index = PointIndex::build(dataset.records());
        let mut dashboard = Self {
            controller: ViewStateController::new(dataset),
            map: MapRenderer::new(&config.map),
            chart: ChartRenderer::new(&config.chart),
            index,
            outlines: Vec::new(),
            map_size: (config.map.width.round() as u32, config.map.height.round() as u32),
        };
        let first = dashboard.frame(Effect::Refiltered);
        (dashboard, first)
    }

    /// Projects basemap outlines with the map's projection.
    pub fn with_basemap(mut self, shapes: &[geo::MultiPolygon<f64>]) -> Self {
        self.outlines = crate::basemap::project_outlines(shapes, self.map.projection());
        self
    }

    pub fn dispatch(&mut self, command: Command) -> Frame {
        let effect = self.controller.dispatch(command);
        self.frame(effect)
    }

    fn frame(&mut self, effect: Effect) -> Frame {
        let (map, chart) = match effect {
            Effect::Refiltered => (
                Some(self.map.render(self.controller.filtered())),
                Some(self.chart.render(&self.controller.server_counts())),
            ),
            Effect::Repaged | Effect::Unchanged => (None, None),
        };

        Frame {
            filtered: self.controller.filtered_len(),
            map,
            chart,
            table: self.table(),
        }
    }

    pub fn view(&mut self) -> View {
        View {
            filtered: self.controller.filtered_len(),
            dots: self.map.dots().cloned().collect(),
            y_max: self.chart.y_max(),
            bars: self.chart.bars().cloned().collect(),
            table: self.table(),
        }
    }

    fn table(&mut self) -> TableView {
        let (page, rows) = self.controller.page();
        render_table(page, &rows)
    }

    pub fn options(&self) -> FilterOptions {
        self.controller.dataset().options()
    }

    pub fn controller(&self) -> &ViewStateController {
        &self.controller
    }

    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    /// Nearest commune of the filtered subset around a lon/lat point.
    pub fn lookup(&self, lon: f64, lat: f64, radius: f64) -> Option<Tooltip> {
        let hit = self
            .index
            .nearest(lon, lat, radius, |i| self.controller.contains(i))?;
        self.controller.dataset().records().get(hit).map(Tooltip::from_record)
    }

    pub fn render_map_image(&self) -> RgbaImage {
        let (width, height) = self.map_size;
        snapshot::render_map(width, height, &self.outlines, self.map.dots())
    }
}

/// Loads the dataset (and basemap, if configured) and draws the first frame.
pub async fn build_dashboard(config: &AppConfig) -> Result<Dashboard> {
    let dataset = Arc::new(crate::data::load_dataset(config).await?);
    let (dashboard, first) = Dashboard::new(dataset, config);
    debug!(
        dots = first.map.as_ref().map_or(0, |p| p.enter.len()),
        bars = first.chart.as_ref().map_or(0, |c| c.bars.enter.len()),
        "First frame drawn"
    );

    let dashboard = match &config.input.basemap {
        Some(path) => dashboard.with_basemap(&crate::basemap::load_basemap(path)?),
        None => dashboard,
    };
    info!(
        communes = dashboard.controller().dataset().len(),
        outlines = dashboard.outlines().len(),
        "Dashboard ready"
    );
    Ok(dashboard)
}
