use geo::{CoordsIter, Geometry, SimplifyVwPreserve};
use tracing::warn;

use crate::geo_core::AdminShape;

/// Bytes charged per coordinate (two f64)
const COORD_BYTES: usize = 16;
/// Bytes charged per record on top of its coordinates and attributes
const RECORD_OVERHEAD: usize = 64;
/// Visvalingam epsilon as a fraction of the bounding-box area
const EPSILON_AREA_FRACTION: f64 = 1e-7;

/// Rough in-memory footprint of a shape
pub fn estimate_size(shape: &AdminShape) -> usize {
    shape
        .records
        .iter()
        .map(|record| {
            let attributes: usize = record
                .properties
                .iter()
                .map(|(key, value)| key.len() + value.to_string().len())
                .sum();
            record.geometry.coords_count() * COORD_BYTES
                + record.name.len()
                + record.fill.len()
                + attributes
                + RECORD_OVERHEAD
        })
        .sum()
}

/// Lossy vertex reduction
pub trait Simplifier {
    fn simplify(&self, shape: AdminShape) -> AdminShape;
}

/// Topology-preserving Visvalingam-Whyatt on polygonal records
#[derive(Debug, Clone, Copy, Default)]
pub struct VwSimplifier;

impl Simplifier for VwSimplifier {
    fn simplify(&self, mut shape: AdminShape) -> AdminShape {
        let epsilon = match shape.bbox() {
            Some(bbox) => bbox.width() * bbox.height() * EPSILON_AREA_FRACTION,
            None => return shape,
        };

        for record in &mut shape.records {
            record.geometry = match &record.geometry {
                Geometry::Polygon(p) => Geometry::Polygon(p.simplify_vw_preserve(&epsilon)),
                Geometry::MultiPolygon(mp) => {
                    Geometry::MultiPolygon(mp.simplify_vw_preserve(&epsilon))
                }
                Geometry::LineString(ls) => {
                    Geometry::LineString(ls.simplify_vw_preserve(&epsilon))
                }
                Geometry::MultiLineString(mls) => {
                    Geometry::MultiLineString(mls.simplify_vw_preserve(&epsilon))
                }
                other => other.clone(),
            };
        }
        shape
    }
}

/// Simplify once when the estimate exceeds `threshold`, otherwise hand back as-is
pub fn simplify_if_large<S: Simplifier>(
    shape: AdminShape,
    threshold: usize,
    simplifier: &S,
) -> AdminShape {
    let size = estimate_size(&shape);
    if size > threshold {
        warn!(
            "Shape is large ({} > {} bytes), simplifying; this may take a while",
            size, threshold
        );
        simplifier.simplify(shape)
    } else {
        shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_core::AdminRecord;
    use geo::{LineString, Polygon};
    use serde_json::Map;
    use std::cell::Cell;

    struct CountingSimplifier {
        calls: Cell<usize>,
    }

    impl Simplifier for CountingSimplifier {
        fn simplify(&self, shape: AdminShape) -> AdminShape {
            self.calls.set(self.calls.get() + 1);
            shape
        }
    }

    /// Wobbly circle with `n` vertices
    fn ring_shape(n: usize) -> AdminShape {
        let coords: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                let r = 10.0 + if i % 2 == 0 { 0.0001 } else { -0.0001 };
                (r * t.cos(), r * t.sin())
            })
            .collect();
        let polygon = Polygon::new(LineString::from(coords), vec![]);
        AdminShape::new(vec![AdminRecord::new(
            Geometry::Polygon(polygon),
            Map::new(),
            1,
        )])
    }

    #[test]
    fn test_estimate_grows_with_vertices() {
        assert!(estimate_size(&ring_shape(1000)) > estimate_size(&ring_shape(10)));
        assert!(estimate_size(&ring_shape(1000)) >= 1000 * COORD_BYTES);
    }

    #[test]
    fn test_simplifier_invoked_once_above_threshold() {
        let shape = ring_shape(100);
        let simplifier = CountingSimplifier {
            calls: Cell::new(0),
        };
        let threshold = estimate_size(&shape) - 1;
        simplify_if_large(shape, threshold, &simplifier);
        assert_eq!(simplifier.calls.get(), 1);
    }

    #[test]
    fn test_simplifier_skipped_at_or_below_threshold() {
        let shape = ring_shape(100);
        let simplifier = CountingSimplifier {
            calls: Cell::new(0),
        };
        let threshold = estimate_size(&shape);
        let out = simplify_if_large(shape.clone(), threshold, &simplifier);
        assert_eq!(simplifier.calls.get(), 0);
        assert_eq!(out, shape);
    }

    #[test]
    fn test_vw_reduces_vertex_count() {
        let shape = ring_shape(5000);
        let before = shape.records[0].geometry.coords_count();
        let simplified = VwSimplifier.simplify(shape);
        let after = simplified.records[0].geometry.coords_count();
        assert!(after < before, "{} >= {}", after, before);
        assert!(after >= 4);
    }
}
