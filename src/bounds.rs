//! Screen-space bounding boxes for multi-vertex regions.

use crate::model::{Position, Region, Shape};

/// A projected screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPt {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Maps region positions onto a screen. Returns `None` for positions the
/// projection cannot represent (e.g. a sky point outside the image).
pub trait ScreenProjector {
    fn project(&self, position: &Position) -> Option<ScreenPt>;
}

/// Bounding box of a polygon or line under the given projection. Other
/// shapes carry their extent in their own parameters and report `None`,
/// as does any region with an unprojectable vertex.
pub fn screen_bounds<P: ScreenProjector>(region: &Region, projector: &P) -> Option<ScreenRect> {
    let positions: Vec<&Position> = match &region.shape {
        Shape::Polygon { vertices } => vertices.iter().collect(),
        Shape::Line { p1, p2 } => vec![p1, p2],
        _ => return None,
    };

    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for position in positions {
        let pt = projector.project(position)?;
        min_x = min_x.min(pt.x);
        min_y = min_y.min(pt.y);
        max_x = max_x.max(pt.x);
        max_y = max_y.max(pt.y);
    }

    Some(ScreenRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RegionOptions, Shape};

    /// Identity projection over image positions.
    struct FlatProjector;

    impl ScreenProjector for FlatProjector {
        fn project(&self, position: &Position) -> Option<ScreenPt> {
            match position {
                Position::Image { x, y } => Some(ScreenPt { x: *x, y: *y }),
                Position::World { .. } => None,
            }
        }
    }

    fn region(shape: Shape) -> Region {
        Region {
            shape,
            options: RegionOptions::default(),
            raw: String::new(),
        }
    }

    #[test]
    fn test_polygon_bounds() {
        let r = region(Shape::Polygon {
            vertices: vec![
                Position::Image { x: 10.0, y: 5.0 },
                Position::Image { x: 2.0, y: 30.0 },
                Position::Image { x: 25.0, y: 12.0 },
            ],
        });
        let rect = screen_bounds(&r, &FlatProjector).unwrap();
        assert_eq!(
            rect,
            ScreenRect {
                x: 2.0,
                y: 5.0,
                width: 23.0,
                height: 25.0
            }
        );
    }

    #[test]
    fn test_line_bounds() {
        let r = region(Shape::Line {
            p1: Position::Image { x: 4.0, y: 8.0 },
            p2: Position::Image { x: 1.0, y: 2.0 },
        });
        let rect = screen_bounds(&r, &FlatProjector).unwrap();
        assert_eq!(
            rect,
            ScreenRect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 6.0
            }
        );
    }

    #[test]
    fn test_unprojectable_vertex_gives_none() {
        let r = region(Shape::Line {
            p1: Position::Image { x: 4.0, y: 8.0 },
            p2: Position::World {
                lon: 10.0,
                lat: 20.0,
                sys: crate::coords::CoordSys::J2000,
            },
        });
        assert!(screen_bounds(&r, &FlatProjector).is_none());
    }

    #[test]
    fn test_non_vertex_shapes_give_none() {
        let r = region(Shape::Point {
            center: Position::Image { x: 1.0, y: 1.0 },
        });
        assert!(screen_bounds(&r, &FlatProjector).is_none());
    }
}
