use crate::render::Mercator;
use anyhow::{Context, Result, anyhow};
use geo::{LineString, MultiPolygon};
use geojson::GeoJson;
use std::convert::TryInto;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Outline rings of the background map, in screen coordinates.
pub type Outline = Vec<(f64, f64)>;

/// Loads polygon features from a GeoJSON FeatureCollection. Non-polygon
/// geometries are skipped.
pub fn load_basemap(path: &Path) -> Result<Vec<MultiPolygon<f64>>> {
    info!("Loading basemap from {:?}", path);
    let file = File::open(path)
        .with_context(|| format!("Failed to open basemap GeoJSON: {:?}", path))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .context("Failed to parse basemap GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Basemap GeoJSON must be a FeatureCollection")),
    };

    let mut shapes = Vec::new();
    let mut skipped = 0usize;

    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };

        let geometry: geo::Geometry<f64> = geometry.value.try_into()
            .map_err(|e| anyhow!("Failed to convert basemap geometry: {:?}", e))?;

        match geometry {
            geo::Geometry::MultiPolygon(mp) => shapes.push(mp),
            geo::Geometry::Polygon(p) => shapes.push(MultiPolygon::new(vec![p])),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Basemap: skipped {} features without polygon geometry", skipped);
    }
    info!("Basemap has {} shapes", shapes.len());
    Ok(shapes)
}

/// Projects every exterior and interior ring of `shapes`.
pub fn project_outlines(shapes: &[MultiPolygon<f64>], projection: &Mercator) -> Vec<Outline> {
    let project_ring = |ring: &LineString<f64>| -> Outline {
        ring.points().map(|p| projection.project(p)).collect()
    };

    shapes
        .iter()
        .flat_map(|mp| mp.iter())
        .flat_map(|polygon| {
            std::iter::once(project_ring(polygon.exterior()))
                .chain(polygon.interiors().iter().map(project_ring))
        })
        .collect()
}
