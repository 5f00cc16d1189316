//! Per-statement parsing.
//!
//! A statement is one of: a comment, a `global` properties line, a bare
//! coordinate-system name, or a shape description optionally followed by
//! `# name=value ...` properties. The shape grammar is positional; the
//! tokenizer treats whitespace, commas and parentheses interchangeably
//! as separators so that `circle(1,2,3)`, `circle 1 2 3` and mixtures
//! of the two all read the same.

use log::warn;
use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::combinator::map;
use nom::error::VerboseError;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;

use crate::coords::CoordSys;
use crate::error::{ParseError, ParseErrorKind};
use crate::model::{PointKind, Position, Region, RegionOptions, Shape};
use crate::props::{self, delimited_string};
use crate::value::{convert_angle, convert_value, RegionDimension, RegionUnit, RegionValue, ValueHint};

type Input<'a> = &'a str;
type ParserResult<'a, O> = IResult<Input<'a>, O, VerboseError<Input<'a>>>;

/// What one statement turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStatement {
    /// Comment, blank line, or an ignored late `global`.
    Skip,
    CoordSys(CoordSys),
    Global(RegionOptions),
    Region(Box<Region>),
}

/// Document state a statement is parsed against.
#[derive(Debug)]
pub struct StatementContext<'a> {
    /// Coordinate system declared earlier in the document, if any.
    pub sys: Option<CoordSys>,
    /// Options from the `global` line, inherited by every region.
    pub global: &'a RegionOptions,
    /// `global` is only honored in the document header.
    pub allow_global: bool,
    /// 1-based source line, for error reporting.
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Quoted(&'a str),
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == '(' || c == ')'
}

fn separators(input: Input) -> ParserResult<&str> {
    take_while(is_separator)(input)
}

fn bare_word(input: Input) -> ParserResult<&str> {
    take_while1(|c: char| !is_separator(c))(input)
}

fn statement_tokens(input: Input) -> ParserResult<Vec<Token>> {
    let (rest, tokens) = many0(preceded(
        separators,
        alt((map(delimited_string, Token::Quoted), map(bare_word, Token::Word))),
    ))(input)?;
    let (rest, _) = separators(rest)?;
    Ok((rest, tokens))
}

const NOT_IMPLEMENTED: &[&str] = &[
    "vector", "ruler", "compass", "projection", "panda", "epanda", "bpanda", "composite",
];

/// Parse one statement against the current document state.
pub fn parse_statement(text: &str, ctx: &StatementContext) -> Result<ParsedStatement, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(ParsedStatement::Skip);
    }

    // `global` is recognized before any `#` splitting so that hex colors
    // in its payload survive.
    if let Some(rest) = strip_keyword(trimmed, "global") {
        if !ctx.allow_global {
            warn!("line {}: global statement outside header ignored", ctx.line);
            return Ok(ParsedStatement::Skip);
        }
        return match props::parse_options(rest, &RegionOptions::default()) {
            Ok(opts) => Ok(ParsedStatement::Global(opts)),
            Err(e) => Err(ParseError::new(
                ParseErrorKind::InvalidGlobalProp,
                e.message,
                ctx.line,
                text,
            )),
        };
    }

    // A lone word is a coordinate-system declaration.
    if !trimmed.contains(|c: char| c.is_whitespace() || c == '(' || c == ',') {
        return match CoordSys::parse(trimmed) {
            Some(sys) => Ok(ParsedStatement::CoordSys(sys)),
            None => Err(ParseError::new(
                ParseErrorKind::InvalidCoord,
                format!("unrecognized coordinate system `{trimmed}`"),
                ctx.line,
                text,
            )),
        };
    }

    let (desc, props_text) = match trimmed.split_once('#') {
        Some((d, p)) => (d.trim(), Some(p)),
        None => (trimmed, None),
    };

    // A leading sign selects inclusion or exclusion.
    let (desc, include_prefix) = match desc.strip_prefix('-') {
        Some(rest) => (rest.trim_start(), Some(false)),
        None => match desc.strip_prefix('+') {
            Some(rest) => (rest.trim_start(), Some(true)),
            None => (desc, None),
        },
    };

    let tokens = match statement_tokens(desc) {
        Ok((rest, tokens)) if rest.is_empty() => tokens,
        _ => {
            return Err(ParseError::new(
                ParseErrorKind::InvalidParam,
                "unable to read region description".to_string(),
                ctx.line,
                text,
            ))
        }
    };

    let mut head = match tokens.first() {
        Some(Token::Word(w)) => w.to_ascii_lowercase(),
        _ => {
            return Err(ParseError::new(
                ParseErrorKind::InvalidType,
                "missing region type".to_string(),
                ctx.line,
                text,
            ))
        }
    };
    let mut args = &tokens[1..];

    // Qualified point form: `<marker> point x y`.
    let mut qualified_point = None;
    if let Some(kind) = PointKind::parse(&head) {
        if let Some(Token::Word(second)) = args.first() {
            if second.eq_ignore_ascii_case("point") {
                qualified_point = Some(kind);
                head = "point".to_string();
                args = &args[1..];
            }
        }
    }

    // A point may carry the same trailing brace/quote label a text does;
    // it lands in the text option rather than in the shape.
    let mut point_label = None;
    if head == "point" && args.len() == 3 {
        if let Some(Token::Quoted(s)) = args.last() {
            point_label = Some(s.to_string());
            args = &args[..2];
        }
    }

    if NOT_IMPLEMENTED.contains(&head.as_str()) {
        return Err(ParseError::new(
            ParseErrorKind::NotImplemented,
            format!("unsupported region type, {head}"),
            ctx.line,
            text,
        ));
    }

    let builder = ShapeBuilder {
        sys: ctx.sys,
        line: ctx.line,
        raw: text,
    };
    let shape = builder.build(&head, args)?;

    let mut options = ctx.global.clone();
    options.coord_sys = ctx.sys.unwrap_or(CoordSys::Physical);
    if let Some(include) = include_prefix {
        options.include = Some(include);
    }
    if let Some(kind) = qualified_point {
        options.point = Some(kind);
    }
    if let Some(props_text) = props_text {
        options = props::parse_options(props_text, &options).map_err(|e| {
            ParseError::new(ParseErrorKind::InvalidProp, e.message, ctx.line, text)
        })?;
    }
    if point_label.is_some() {
        options.text = point_label;
    }

    // An inline brace label takes priority over a text= property.
    let shape = match shape {
        Shape::Text { center, label: None } => Shape::Text {
            center,
            label: options.text.clone(),
        },
        s => s,
    };

    Ok(ParsedStatement::Region(Box::new(Region {
        shape,
        options,
        raw: trimmed.to_string(),
    })))
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    if text.len() < keyword.len() || !text.is_char_boundary(keyword.len()) {
        return None;
    }
    let (head, rest) = text.split_at(keyword.len());
    if head.eq_ignore_ascii_case(keyword) && (rest.is_empty() || rest.starts_with(char::is_whitespace))
    {
        return Some(rest.trim_start());
    }
    None
}

struct ShapeBuilder<'a> {
    sys: Option<CoordSys>,
    line: usize,
    raw: &'a str,
}

impl ShapeBuilder<'_> {
    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(ParseErrorKind::InvalidParam, message, self.line, self.raw)
    }

    fn word<'t>(&self, token: &Token<'t>) -> Result<&'t str, ParseError> {
        match token {
            Token::Word(w) => Ok(w),
            Token::Quoted(_) => Err(self.err("unexpected quoted value in region parameters")),
        }
    }

    fn value(&self, token: &Token, hint: ValueHint) -> Result<RegionValue, ParseError> {
        let word = self.word(token)?;
        convert_value(word, self.sys, hint).map_err(|e| self.err(e.to_string()))
    }

    fn position(&self, lon: &Token, lat: &Token) -> Result<Position, ParseError> {
        let lon = self.value(lon, ValueHint::Longitude)?;
        let lat = self.value(lat, ValueHint::Latitude)?;
        Position::build(lon, lat, self.sys).map_err(|e| self.err(e.to_string()))
    }

    /// Rotation angles are always reduced to degrees, whatever unit they
    /// were written in.
    fn angle(&self, token: &Token) -> Result<RegionValue, ParseError> {
        let word = self.word(token)?;
        let v = convert_value(word, None, ValueHint::Scalar).map_err(|e| self.err(e.to_string()))?;
        let degrees = convert_angle(v.value, v.unit, RegionUnit::Degree).unwrap_or(v.value);
        Ok(RegionValue::new(degrees, RegionUnit::Degree))
    }

    fn build(&self, head: &str, args: &[Token]) -> Result<Shape, ParseError> {
        match head {
            "circle" => {
                if args.len() != 3 {
                    return Err(self.err("circle takes a center and a radius"));
                }
                let center = self.position(&args[0], &args[1])?;
                let radius = self.value(&args[2], ValueHint::Scalar)?;
                Ok(Shape::Circle { center, radius })
            }
            "line" => {
                if args.len() != 4 {
                    return Err(self.err("line takes two endpoints"));
                }
                let p1 = self.position(&args[0], &args[1])?;
                let p2 = self.position(&args[2], &args[3])?;
                Ok(Shape::Line { p1, p2 })
            }
            "point" => {
                if args.len() != 2 {
                    return Err(self.err("point takes a single position"));
                }
                let center = self.position(&args[0], &args[1])?;
                Ok(Shape::Point { center })
            }
            "text" => {
                if args.len() < 2 || args.len() > 3 {
                    return Err(self.err("text takes a position and an optional label"));
                }
                let center = self.position(&args[0], &args[1])?;
                let label = match args.get(2) {
                    Some(Token::Quoted(s)) => Some(s.to_string()),
                    Some(Token::Word(_)) => {
                        return Err(self.err("text label must be brace or quote delimited"))
                    }
                    None => None,
                };
                Ok(Shape::Text { center, label })
            }
            "annulus" => {
                if args.len() < 4 {
                    return Err(self.err("annulus takes a center and at least two radii"));
                }
                let center = self.position(&args[0], &args[1])?;
                let radii = args[2..]
                    .iter()
                    .map(|t| self.value(t, ValueHint::Scalar))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Shape::Annulus { center, radii })
            }
            "box" | "ellipse" => {
                if args.len() < 5 || args.len() % 2 == 0 {
                    return Err(self.err(format!(
                        "{head} takes a center, one or more dimension pairs, and an angle"
                    )));
                }
                let center = self.position(&args[0], &args[1])?;
                let mut dims = Vec::with_capacity((args.len() - 3) / 2);
                let mut i = 2;
                while i + 2 < args.len() {
                    let width = self.value(&args[i], ValueHint::Scalar)?;
                    let height = self.value(&args[i + 1], ValueHint::Scalar)?;
                    dims.push(RegionDimension { width, height });
                    i += 2;
                }
                let angle = self.angle(&args[args.len() - 1])?;
                let shape = if head == "box" {
                    Shape::Box { center, dims, angle }
                } else {
                    Shape::Ellipse { center, dims, angle }
                };
                Ok(shape)
            }
            "polygon" => {
                if args.len() < 6 || args.len() % 2 != 0 {
                    return Err(self.err("polygon takes at least three vertices"));
                }
                let vertices = args
                    .chunks_exact(2)
                    .map(|pair| self.position(&pair[0], &pair[1]))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Shape::Polygon { vertices })
            }
            other => Err(ParseError::new(
                ParseErrorKind::InvalidType,
                format!("unrecognized region type, {other}"),
                self.line,
                self.raw,
            )),
        }
    }
}
