//! Region data model: positions, shapes, and drawing options.

use crate::coords::CoordSys;
use crate::value::{RegionDimension, RegionValue, ValueError};

/// Marker style of a point region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Circle,
    Box,
    Diamond,
    Cross,
    X,
    Arrow,
    BoxCircle,
}

impl PointKind {
    pub fn parse(s: &str) -> Option<PointKind> {
        match s.to_ascii_lowercase().as_str() {
            "circle" => Some(PointKind::Circle),
            "box" => Some(PointKind::Box),
            "diamond" => Some(PointKind::Diamond),
            "cross" => Some(PointKind::Cross),
            "x" => Some(PointKind::X),
            "arrow" => Some(PointKind::Arrow),
            "boxcircle" => Some(PointKind::BoxCircle),
            _ => None,
        }
    }
}

/// Font specification, parsed from a `font="name size weight slant"`
/// property. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFont {
    pub name: String,
    pub size: String,
    pub weight: String,
    pub slant: String,
}

impl Default for RegionFont {
    fn default() -> RegionFont {
        RegionFont {
            name: "helvetica".to_string(),
            size: "10".to_string(),
            weight: "normal".to_string(),
            slant: "roman".to_string(),
        }
    }
}

impl RegionFont {
    pub fn parse(text: &str) -> RegionFont {
        let mut font = RegionFont::default();
        let mut parts = text.split_whitespace();
        if let Some(name) = parts.next() {
            font.name = name.to_string();
        }
        if let Some(size) = parts.next() {
            font.size = size.to_string();
        }
        if let Some(weight) = parts.next() {
            font.weight = weight.to_string();
        }
        if let Some(slant) = parts.next() {
            font.slant = slant.to_string();
        }
        font
    }
}

/// A resolved anchor point, either on the sky or on the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    World { lon: f64, lat: f64, sys: CoordSys },
    Image { x: f64, y: f64 },
}

impl Position {
    /// Combine two converted components into a position. Both must have
    /// resolved to the same family of units. A degree pair under a pixel
    /// or unset frame is promoted to a J2000 world point, since explicit
    /// angular notation overrides the pixel default.
    pub fn build(
        lon: RegionValue,
        lat: RegionValue,
        sys: Option<CoordSys>,
    ) -> Result<Position, ValueError> {
        let lon_deg = lon.to_degrees();
        let lat_deg = lat.to_degrees();
        match (lon_deg, lat_deg) {
            (Some(lon), Some(lat)) => {
                let sys = match sys {
                    Some(s) if !s.is_pixel() => s,
                    _ => CoordSys::J2000,
                };
                Ok(Position::World { lon, lat, sys })
            }
            (None, None) => Ok(Position::Image {
                x: lon.value,
                y: lat.value,
            }),
            _ => Err(ValueError::MixedUnits),
        }
    }

    pub fn is_world(&self) -> bool {
        matches!(self, Position::World { .. })
    }
}

/// Drawing and interaction options, accumulated from the `global` line
/// and per-region property text. `None` means the option was never set,
/// which is distinct from an explicit `=0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOptions {
    pub coord_sys: CoordSys,
    pub color: Option<String>,
    pub line_width: Option<i32>,
    pub text: Option<String>,
    pub font: Option<RegionFont>,
    pub dash_list: Option<String>,
    pub point: Option<PointKind>,
    pub point_size: Option<i32>,
    pub offset_x: Option<i32>,
    pub offset_y: Option<i32>,
    pub include: Option<bool>,
    pub editable: Option<bool>,
    pub movable: Option<bool>,
    pub rotatable: Option<bool>,
    pub deletable: Option<bool>,
    pub selectable: Option<bool>,
    pub highlightable: Option<bool>,
    pub dash: Option<bool>,
    pub fixed: Option<bool>,
    pub source: Option<bool>,
    pub tags: Vec<String>,
}

impl Default for RegionOptions {
    fn default() -> RegionOptions {
        RegionOptions {
            coord_sys: CoordSys::Physical,
            color: None,
            line_width: None,
            text: None,
            font: None,
            dash_list: None,
            point: None,
            point_size: None,
            offset_x: None,
            offset_y: None,
            include: None,
            editable: None,
            movable: None,
            rotatable: None,
            deletable: None,
            selectable: None,
            highlightable: None,
            dash: None,
            fixed: None,
            source: None,
            tags: Vec::new(),
        }
    }
}

/// Geometry of a single region.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point {
        center: Position,
    },
    Text {
        center: Position,
        label: Option<String>,
    },
    Line {
        p1: Position,
        p2: Position,
    },
    Circle {
        center: Position,
        radius: RegionValue,
    },
    /// One dimension pair is a plain box; several are a box annulus.
    Box {
        center: Position,
        dims: Vec<RegionDimension>,
        angle: RegionValue,
    },
    Ellipse {
        center: Position,
        dims: Vec<RegionDimension>,
        angle: RegionValue,
    },
    Annulus {
        center: Position,
        radii: Vec<RegionValue>,
    },
    Polygon {
        vertices: Vec<Position>,
    },
}

/// One fully parsed region statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub shape: Shape,
    pub options: RegionOptions,
    pub raw: String,
}

impl Region {
    /// True when the anchor position(s) landed on the sky rather than
    /// the pixel grid.
    pub fn is_on_world_coordinates(&self) -> bool {
        let pos = match &self.shape {
            Shape::Point { center }
            | Shape::Text { center, .. }
            | Shape::Circle { center, .. }
            | Shape::Box { center, .. }
            | Shape::Ellipse { center, .. }
            | Shape::Annulus { center, .. } => center,
            Shape::Line { p1, .. } => p1,
            Shape::Polygon { vertices } => match vertices.first() {
                Some(p) => p,
                None => return false,
            },
        };
        pos.is_world()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RegionUnit;

    #[test]
    fn test_point_kind_parse() {
        assert_eq!(PointKind::parse("circle"), Some(PointKind::Circle));
        assert_eq!(PointKind::parse("BoxCircle"), Some(PointKind::BoxCircle));
        assert_eq!(PointKind::parse("X"), Some(PointKind::X));
        assert_eq!(PointKind::parse("star"), None);
    }

    #[test]
    fn test_font_parse_with_defaults() {
        let f = RegionFont::parse("times 12 bold italic");
        assert_eq!(f.name, "times");
        assert_eq!(f.size, "12");
        assert_eq!(f.weight, "bold");
        assert_eq!(f.slant, "italic");

        let f = RegionFont::parse("courier 14");
        assert_eq!(f.name, "courier");
        assert_eq!(f.size, "14");
        assert_eq!(f.weight, "normal");
        assert_eq!(f.slant, "roman");
    }

    #[test]
    fn test_position_build_world() {
        let pos = Position::build(
            RegionValue::new(10.0, RegionUnit::Degree),
            RegionValue::new(20.0, RegionUnit::Degree),
            Some(CoordSys::Galactic),
        )
        .unwrap();
        assert_eq!(
            pos,
            Position::World {
                lon: 10.0,
                lat: 20.0,
                sys: CoordSys::Galactic
            }
        );
    }

    #[test]
    fn test_position_build_image() {
        let pos = Position::build(
            RegionValue::new(100.0, RegionUnit::ImagePixel),
            RegionValue::new(200.0, RegionUnit::ImagePixel),
            Some(CoordSys::Image),
        )
        .unwrap();
        assert_eq!(pos, Position::Image { x: 100.0, y: 200.0 });
    }

    #[test]
    fn test_degree_pair_promotes_to_j2000_under_pixel_frame() {
        let pos = Position::build(
            RegionValue::new(10.0, RegionUnit::Degree),
            RegionValue::new(20.0, RegionUnit::Degree),
            Some(CoordSys::Physical),
        )
        .unwrap();
        assert_eq!(
            pos,
            Position::World {
                lon: 10.0,
                lat: 20.0,
                sys: CoordSys::J2000
            }
        );
        let pos = Position::build(
            RegionValue::new(1.0, RegionUnit::ArcMin),
            RegionValue::new(2.0, RegionUnit::ArcSec),
            None,
        )
        .unwrap();
        assert!(pos.is_world());
    }

    #[test]
    fn test_mixed_units_rejected() {
        let err = Position::build(
            RegionValue::new(10.0, RegionUnit::Degree),
            RegionValue::new(20.0, RegionUnit::ImagePixel),
            Some(CoordSys::J2000),
        )
        .unwrap_err();
        assert_eq!(err, ValueError::MixedUnits);
    }
}
