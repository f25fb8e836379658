use anyhow::{anyhow, Result};
use geo::{Geometry, LineString, Polygon as GeoPolygon};
use image::imageops::FilterType;
use image::DynamicImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

use crate::collect::global_variables::{LEGEND_LABEL, TITLE_SUFFIX};
use crate::commons::error::MemeMapError;
use crate::geo_core::{AdminShape, BoundingBox};

/// Where the single-entry legend sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    UpperRight,
    LowerRight,
    #[default]
    LowerMiddle,
    LowerLeft,
    UpperLeft,
}

impl From<LegendPosition> for SeriesLabelPosition {
    fn from(position: LegendPosition) -> Self {
        match position {
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPosition::LowerMiddle => SeriesLabelPosition::LowerMiddle,
            LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        }
    }
}

/// One layer of the figure, kept in drawing order
#[derive(Debug, Clone)]
pub enum Component {
    /// Administrative polygons filled per their tag, outlined in `outline`
    Base {
        shape: AdminShape,
        fill: RGBColor,
        outline: RGBColor,
    },
    /// `show_axes: false` is the flat map look: no axes, no gridlines
    Theme { show_axes: bool },
    Title { text: String, font_size: u32 },
    Legend {
        position: LegendPosition,
        font_size: u32,
    },
    /// Overlay stretched over `extent` (data coordinates)
    Raster {
        image: DynamicImage,
        extent: BoundingBox,
    },
}

/// A composed map, ready to be drawn by the caller
#[derive(Debug, Clone)]
pub struct Figure {
    components: Vec<Component>,
}

pub fn title_for(display_name: &str) -> String {
    format!("{} {}", display_name, TITLE_SUFFIX)
}

impl Figure {
    /// Compose base layer, flat theme, title, legend and overlay, in that order
    /// Nothing is drawn here.
    pub fn compose(
        mut shape: AdminShape,
        display_name: &str,
        fill: RGBColor,
        overlay: DynamicImage,
    ) -> Result<Self> {
        let bbox = shape.bbox().ok_or(MemeMapError::EmptyShape)?;
        let extent = bbox.expanded();
        debug!("Shape bbox {:?}, overlay extent {:?}", bbox, extent);

        shape.tag_fill(LEGEND_LABEL);

        Ok(Figure {
            components: vec![
                Component::Base {
                    shape,
                    fill,
                    outline: WHITE,
                },
                Component::Theme { show_axes: false },
                Component::Title {
                    text: title_for(display_name),
                    font_size: 30,
                },
                Component::Legend {
                    position: LegendPosition::default(),
                    font_size: 20,
                },
                Component::Raster {
                    image: overlay,
                    extent,
                },
            ],
        })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn title(&self) -> Option<&str> {
        self.components.iter().find_map(|c| match c {
            Component::Title { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn raster_extent(&self) -> Option<BoundingBox> {
        self.components.iter().find_map(|c| match c {
            Component::Raster { extent, .. } => Some(*extent),
            _ => None,
        })
    }

    pub fn shape(&self) -> Option<&AdminShape> {
        self.components.iter().find_map(|c| match c {
            Component::Base { shape, .. } => Some(shape),
            _ => None,
        })
    }

    /// Data window: the shape plus the overlay extent
    pub fn view_box(&self) -> Option<BoundingBox> {
        let shape_bbox = self.shape().and_then(AdminShape::bbox)?;
        Some(match self.raster_extent() {
            Some(extent) => shape_bbox.union(&extent),
            None => shape_bbox,
        })
    }

    /// Draw into a PNG (or any format `BitMapBackend` infers from the extension)
    pub fn render_png<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<()> {
        let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
        self.draw(&root)?;
        root.present()
            .map_err(|e| anyhow!("Failed to write {:?}: {}", path.as_ref(), e))
    }

    /// Draw into an RGB buffer of `width * height * 3` bytes
    pub fn render_rgb(&self, size: (u32, u32)) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; rgb_buffer_len(size)];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            self.draw(&root)?;
            root.present()
                .map_err(|e| anyhow!("Failed to flush drawing buffer: {}", e))?;
        }
        Ok(buffer)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let view = self.view_box().ok_or(MemeMapError::EmptyShape)?;

        root.fill(&WHITE)
            .map_err(|e| anyhow!("Failed to clear canvas: {}", e))?;

        let mut builder = ChartBuilder::on(root);
        builder.margin(10);
        if let Some(Component::Title { text, font_size }) = self
            .components
            .iter()
            .find(|c| matches!(c, Component::Title { .. }))
        {
            builder.caption(text, ("sans-serif", *font_size));
        }
        let show_axes = self
            .components
            .iter()
            .any(|c| matches!(c, Component::Theme { show_axes: true }));
        if show_axes {
            builder.x_label_area_size(30).y_label_area_size(40);
        }

        let mut chart = builder
            .build_cartesian_2d(view.min_x..view.max_x, view.min_y..view.max_y)
            .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

        for component in &self.components {
            match component {
                Component::Base {
                    shape,
                    fill,
                    outline,
                } => {
                    let (exteriors, holes) = split_rings(shape);
                    let fill = *fill;
                    chart
                        .draw_series(
                            exteriors
                                .iter()
                                .map(|ring| Polygon::new(ring.clone(), fill.filled())),
                        )
                        .map_err(|e| anyhow!("Failed to draw boundaries: {}", e))?
                        .label(LEGEND_LABEL)
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 6), (x + 12, y + 6)], fill.filled())
                        });
                    chart
                        .draw_series(
                            holes
                                .iter()
                                .map(|ring| Polygon::new(ring.clone(), WHITE.filled())),
                        )
                        .map_err(|e| anyhow!("Failed to draw holes: {}", e))?;
                    chart
                        .draw_series(
                            exteriors
                                .iter()
                                .chain(holes.iter())
                                .map(|ring| PathElement::new(ring.clone(), outline.stroke_width(1))),
                        )
                        .map_err(|e| anyhow!("Failed to draw outlines: {}", e))?;
                }
                Component::Theme { show_axes } => {
                    if *show_axes {
                        chart
                            .configure_mesh()
                            .draw()
                            .map_err(|e| anyhow!("Failed to draw axes: {}", e))?;
                    }
                }
                // Drawn as the chart caption
                Component::Title { .. } => {}
                Component::Legend {
                    position,
                    font_size,
                } => {
                    chart
                        .configure_series_labels()
                        .position((*position).into())
                        .label_font(("sans-serif", *font_size))
                        .background_style(WHITE.mix(0.8))
                        .border_style(BLACK)
                        .draw()
                        .map_err(|e| anyhow!("Failed to draw legend: {}", e))?;
                }
                Component::Raster { image, extent } => {
                    let (x0, y0) = chart.backend_coord(&(extent.min_x, extent.max_y));
                    let (x1, y1) = chart.backend_coord(&(extent.max_x, extent.min_y));
                    let width = (x1 - x0).unsigned_abs().max(1);
                    let height = (y1 - y0).unsigned_abs().max(1);
                    let scaled = image.resize_exact(width, height, FilterType::Triangle);
                    chart
                        .draw_series(std::iter::once(BitMapElement::from((
                            (extent.min_x, extent.max_y),
                            scaled,
                        ))))
                        .map_err(|e| anyhow!("Failed to draw overlay: {}", e))?;
                }
            }
        }
        Ok(())
    }
}

fn rgb_buffer_len(size: (u32, u32)) -> usize {
    size.0 as usize * size.1 as usize * 3
}

type Ring = Vec<(f64, f64)>;

/// Exterior rings and interior rings of every polygonal record
fn split_rings(shape: &AdminShape) -> (Vec<Ring>, Vec<Ring>) {
    let mut exteriors = Vec::new();
    let mut holes = Vec::new();
    for record in &shape.records {
        collect_rings(&record.geometry, &mut exteriors, &mut holes);
    }
    (exteriors, holes)
}

fn collect_rings(geometry: &Geometry<f64>, exteriors: &mut Vec<Ring>, holes: &mut Vec<Ring>) {
    match geometry {
        Geometry::Polygon(p) => push_polygon(p, exteriors, holes),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                push_polygon(p, exteriors, holes);
            }
        }
        Geometry::Rect(r) => push_polygon(&r.to_polygon(), exteriors, holes),
        Geometry::Triangle(t) => push_polygon(&t.to_polygon(), exteriors, holes),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_rings(g, exteriors, holes);
            }
        }
        _ => {}
    }
}

fn push_polygon(polygon: &GeoPolygon<f64>, exteriors: &mut Vec<Ring>, holes: &mut Vec<Ring>) {
    exteriors.push(ring_points(polygon.exterior()));
    holes.extend(polygon.interiors().iter().map(ring_points));
}

fn ring_points(ring: &LineString<f64>) -> Ring {
    ring.coords().map(|c| (c.x, c.y)).collect()
}
