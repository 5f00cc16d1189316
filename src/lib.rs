//! # ds9-region
//!
//! A parser for DS9 region descriptions. A region document is a list of
//! statements: comments, a `global` properties header, coordinate-system
//! declarations, and shape statements such as
//!
//! ```text
//! # Region file format: DS9 version 4.1
//! global color=green dashlist=8 3 width=1
//! fk5
//! circle(10h20m30s,+41d16m09s,2.5')
//! box(202.4,47.2,0.1,0.05,30) # color=red text={the core}
//! ```
//!
//! Parsing is line by line and never fails as a whole: each statement
//! yields a [`ParseOutcome`] that is either a resolved [`Region`], a
//! [`ParseError`] describing why that statement was rejected, or a
//! skip for lines that carry no region. The one exception is a broken
//! `global` header, which poisons everything after it and aborts the
//! document.
//!
//! Coordinates and sizes are normalized on the way in: sexagesimal
//! notation becomes decimal degrees, unit suffixes are resolved, and
//! bare numbers take their meaning from the active coordinate system.
//!
//! ```
//! use ds9_region::{parse_document, ParseOutcome, Shape};
//!
//! let outcomes = parse_document("fk5\ncircle(202.5,47.2,0.01)");
//! match &outcomes[1] {
//!     ParseOutcome::Region(region) => {
//!         assert!(matches!(region.shape, Shape::Circle { .. }));
//!         assert!(region.is_on_world_coordinates());
//!     }
//!     other => panic!("expected a region, got {other:?}"),
//! }
//! ```

mod bounds;
mod coords;
mod error;
mod model;
mod parser;
mod props;
mod tokenize;
mod value;

pub use bounds::{screen_bounds, ScreenPt, ScreenProjector, ScreenRect};
pub use coords::{format_sexagesimal, parse_sexagesimal, CoordSys, SexError};
pub use error::{ParseError, ParseErrorKind};
pub use model::{PointKind, Position, Region, RegionFont, RegionOptions, Shape};
pub use parser::{parse_statement, ParsedStatement, StatementContext};
pub use props::PropError;
pub use value::{
    convert_angle, convert_value, RegionDimension, RegionUnit, RegionValue, ValueError, ValueHint,
};

use log::debug;

/// What one input statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Comment, blank, coordinate-system or `global` line: consumed, but
    /// no region of its own.
    Skip,
    Region(Box<Region>),
    Error(ParseError),
}

impl ParseOutcome {
    pub fn as_region(&self) -> Option<&Region> {
        match self {
            ParseOutcome::Region(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ParseError> {
        match self {
            ParseOutcome::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// Running document state. Statements are folded over it left to right;
/// only coordinate-system and `global` statements change it.
#[derive(Debug, Clone)]
struct ScanState {
    sys: Option<CoordSys>,
    global: RegionOptions,
    header_open: bool,
}

impl ScanState {
    fn new() -> ScanState {
        ScanState {
            sys: None,
            global: RegionOptions::default(),
            header_open: true,
        }
    }
}

/// Parse a whole region document. Lines are split on `;` (outside of
/// braces and quotes) into statements; every statement maps to exactly
/// one outcome, in input order.
pub fn parse_document(input: &str) -> Vec<ParseOutcome> {
    let units: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| {
            tokenize::split_statements(line)
                .into_iter()
                .map(move |unit| (idx + 1, unit))
        })
        .collect();
    scan(&units)
}

/// Parse pre-split statements, one outcome per `;`-separated unit. The
/// reported line number is the 1-based index into `statements`.
pub fn parse_statements<S: AsRef<str>>(statements: &[S]) -> Vec<ParseOutcome> {
    let units: Vec<(usize, &str)> = statements
        .iter()
        .enumerate()
        .flat_map(|(idx, s)| {
            tokenize::split_statements(s.as_ref())
                .into_iter()
                .map(move |unit| (idx + 1, unit))
        })
        .collect();
    scan(&units)
}

fn scan(units: &[(usize, &str)]) -> Vec<ParseOutcome> {
    let mut outcomes = Vec::with_capacity(units.len());
    let mut state = ScanState::new();

    for &(line, unit) in units {
        let ctx = StatementContext {
            sys: state.sys,
            global: &state.global,
            allow_global: state.header_open,
            line,
        };
        match parser::parse_statement(unit, &ctx) {
            Ok(ParsedStatement::Skip) => {
                outcomes.push(ParseOutcome::Skip);
            }
            Ok(ParsedStatement::CoordSys(sys)) => {
                state.sys = Some(sys);
                outcomes.push(ParseOutcome::Skip);
            }
            Ok(ParsedStatement::Global(opts)) => {
                state.global = opts;
                outcomes.push(ParseOutcome::Skip);
            }
            Ok(ParsedStatement::Region(region)) => {
                outcomes.push(ParseOutcome::Region(region));
                // The first region closes the header; later `global`
                // lines no longer apply.
                state.header_open = false;
            }
            Err(e) => {
                let fatal = e.is_fatal();
                outcomes.push(ParseOutcome::Error(e));
                if fatal {
                    break;
                }
                state.header_open = false;
            }
        }
    }

    let regions = outcomes.iter().filter(|o| o.as_region().is_some()).count();
    let errors = outcomes.iter().filter(|o| o.as_error().is_some()).count();
    debug!(
        "parsed {} statements: {} regions, {} errors",
        outcomes.len(),
        regions,
        errors
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(outcomes: &[ParseOutcome]) -> Vec<&Region> {
        outcomes.iter().filter_map(ParseOutcome::as_region).collect()
    }

    #[test]
    fn test_full_document() {
        let doc = "\
# Region file format: DS9 version 4.1
global color=green dashlist=8 3 width=1 font=\"helvetica 10 normal roman\" select=1
fk5
circle(202.469575,47.195258,0.028)
box(202.4,47.2,0.1,0.05,30) # color=red text={the core}
-ellipse(202.3,47.1,0.05,0.02,0.08,0.04,15)
";
        let outcomes = parse_document(doc);
        assert_eq!(outcomes.len(), 6);
        assert_eq!(outcomes[0], ParseOutcome::Skip);
        assert_eq!(outcomes[1], ParseOutcome::Skip);
        assert_eq!(outcomes[2], ParseOutcome::Skip);

        let regions = regions(&outcomes);
        assert_eq!(regions.len(), 3);

        // Global options flow into every region.
        assert_eq!(regions[0].options.color.as_deref(), Some("green"));
        assert_eq!(regions[0].options.line_width, Some(1));
        assert_eq!(regions[0].options.selectable, Some(true));
        assert_eq!(regions[0].options.dash_list.as_deref(), Some("8 3"));
        assert_eq!(regions[0].options.coord_sys, CoordSys::Fk5);
        assert!(regions[0].is_on_world_coordinates());

        // Per-region properties override the globals.
        assert_eq!(regions[1].options.color.as_deref(), Some("red"));
        assert_eq!(regions[1].options.text.as_deref(), Some("the core"));
        assert_eq!(regions[1].options.line_width, Some(1));

        // The exclusion prefix and the ellipse annulus variant.
        assert_eq!(regions[2].options.include, Some(false));
        match &regions[2].shape {
            Shape::Ellipse { dims, .. } => assert_eq!(dims.len(), 2),
            other => panic!("expected ellipse, got {other:?}"),
        }
    }

    #[test]
    fn test_semicolon_statements_share_a_line() {
        let outcomes = parse_document("image\ncircle(10,20,5);box(1,2,3,4,0)");
        let regions = regions(&outcomes);
        assert_eq!(regions.len(), 2);
        assert!(matches!(regions[0].shape, Shape::Circle { .. }));
        assert!(matches!(regions[1].shape, Shape::Box { .. }));
        assert_eq!(regions[0].raw, "circle(10,20,5)");
    }

    #[test]
    fn test_semicolon_inside_label_does_not_split() {
        let outcomes = parse_document("fk5\ntext(10,20,{hello; world})");
        let regions = regions(&outcomes);
        assert_eq!(regions.len(), 1);
        match &regions[0].shape {
            Shape::Text { label, .. } => assert_eq!(label.as_deref(), Some("hello; world")),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_error_statement_does_not_stop_the_scan() {
        let doc = "fk5\nblob(1,2,3)\ncircle(10,20,5)";
        let outcomes = parse_document(doc);
        assert_eq!(outcomes.len(), 3);
        let err = outcomes[1].as_error().unwrap();
        assert_eq!(err.kind, ParseErrorKind::InvalidType);
        assert_eq!(err.line, 2);
        assert!(outcomes[2].as_region().is_some());
    }

    #[test]
    fn test_bad_global_aborts_the_document() {
        let doc = "global wobble=1\ncircle(10,20,5)\ncircle(30,40,5)";
        let outcomes = parse_document(doc);
        // The fatal error is the last outcome; nothing after it parses.
        assert_eq!(outcomes.len(), 1);
        let err = outcomes[0].as_error().unwrap();
        assert_eq!(err.kind, ParseErrorKind::InvalidGlobalProp);
        assert!(err.is_fatal());

        // A missing value behaves the same way: one fatal error, no
        // regions at all.
        let outcomes = parse_document("global color=\nfk5\ncircle(10,20,5)");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].as_error().unwrap().kind,
            ParseErrorKind::InvalidGlobalProp
        );
    }

    #[test]
    fn test_late_global_is_ignored() {
        let doc = "fk5\ncircle(10,20,5)\nglobal color=red\ncircle(30,40,5)";
        let outcomes = parse_document(doc);
        let regions = regions(&outcomes);
        assert_eq!(regions.len(), 2);
        // The late global neither errors nor recolors later regions.
        assert_eq!(outcomes[2], ParseOutcome::Skip);
        assert_eq!(regions[1].options.color, None);
    }

    #[test]
    fn test_coord_sys_switch_mid_document() {
        let doc = "fk5\ncircle(10,20,0.5)\nimage\ncircle(100,200,10)";
        let outcomes = parse_document(doc);
        let regions = regions(&outcomes);
        assert!(regions[0].is_on_world_coordinates());
        assert!(!regions[1].is_on_world_coordinates());
        assert_eq!(regions[1].options.coord_sys, CoordSys::Image);
    }

    #[test]
    fn test_parse_statements_slice_api() {
        let statements = ["fk5", "circle(202.5,47.2,0.01)", "bad one(1)"];
        let outcomes = parse_statements(&statements);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[1].as_region().is_some());
        let err = outcomes[2].as_error().unwrap();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_not_implemented_is_reported_per_statement() {
        let doc = "fk5\nvector(1,2,3,4)\ncircle(10,20,5)";
        let outcomes = parse_document(doc);
        assert_eq!(
            outcomes[1].as_error().unwrap().kind,
            ParseErrorKind::NotImplemented
        );
        assert!(outcomes[2].as_region().is_some());
    }

    #[test]
    fn test_outcomes_preserve_input_order_and_count() {
        let doc = "# header\n\nfk5\ncircle(1,2,3)\n\nblob(1)\n";
        let outcomes = parse_document(doc);
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes[3].as_region().is_some());
        assert!(outcomes[5].as_error().is_some());
    }
}
