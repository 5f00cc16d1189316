//! Region property parsing.
//!
//! Property text is the part of a statement after the `#` marker (or the
//! whole payload of a `global` line): a sequence of `name=value` settings
//! where the end of a value is not delimited consistently. A value ends
//! at its matching brace/quote pair when it starts with one, otherwise at
//! the next recognized `name=` keyword, otherwise at the end of the text.

use nom::branch::alt;
use nom::bytes::complete::take_until;
use nom::character::complete::char;
use nom::error::VerboseError;
use nom::sequence::delimited;
use nom::IResult;

use crate::model::{PointKind, RegionFont, RegionOptions};

type Input<'a> = &'a str;
type ParserResult<'a, O> = IResult<Input<'a>, O, VerboseError<Input<'a>>>;

/// A `{...}`, `"..."` or `'...'` delimited span.
pub(crate) fn delimited_string(input: Input) -> ParserResult<&str> {
    alt((
        delimited(char('{'), take_until("}"), char('}')),
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
    ))(input)
}

/// A property parse failure. Settings read before the failing one are
/// kept, so a region can still be rendered with partial styling.
#[derive(Debug, Clone, PartialEq)]
pub struct PropError {
    pub message: String,
    pub parsed: RegionOptions,
}

const KNOWN_NAMES: &[&str] = &[
    "color", "width", "text", "tag", "font", "dashlist", "point", "offsetx", "offsety",
    "highlite", "highlight", "select", "include", "edit", "move", "rotate", "delete", "dash",
    "fixed", "source",
];

/// Offset in `rest` where the next `name=` setting begins, if any.
fn next_setting_start(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        // Walk back over the word preceding this '='.
        let mut start = i;
        while start > 0 && bytes[start - 1].is_ascii_alphanumeric() {
            start -= 1;
        }
        if start == i || start == 0 {
            continue;
        }
        let name = rest[start..i].to_ascii_lowercase();
        if KNOWN_NAMES.contains(&name.as_str()) {
            return Some(start);
        }
    }
    None
}

/// A value that runs until the next recognized setting or the end of
/// the text. Returns (value, rest-after-value).
fn take_lookahead_value(rest: &str) -> (&str, &str) {
    match next_setting_start(rest) {
        Some(pos) => (rest[..pos].trim(), &rest[pos..]),
        None => (rest.trim(), ""),
    }
}

/// A value delimited by braces or quotes when it starts with one,
/// otherwise read with the lookahead rule.
fn take_string_value(rest: &str) -> (&str, &str) {
    if rest.starts_with(['{', '"', '\'']) {
        if let Ok((after, value)) = delimited_string(rest) {
            return (value, after);
        }
    }
    take_lookahead_value(rest)
}

/// One whitespace-bounded word. Returns (word, rest-after-word).
fn take_word(rest: &str) -> (&str, &str) {
    match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    }
}

fn parse_flag(rest: &str) -> Option<(bool, &str)> {
    let (word, after) = take_word(rest);
    word.parse::<i64>().ok().map(|n| (n != 0, after))
}

/// Parse a run of `name=value` settings on top of a baseline, returning
/// the merged options. On failure the error carries everything parsed so
/// far.
pub fn parse_options(text: &str, baseline: &RegionOptions) -> Result<RegionOptions, PropError> {
    let mut opts = baseline.clone();
    let mut rest = text.trim_start();

    while let Some(eq) = rest.find('=') {
        let name = rest[..eq].trim();
        if name.is_empty() {
            return Err(PropError {
                message: "empty region property found".to_string(),
                parsed: opts,
            });
        }
        let name = name.to_ascii_lowercase();
        let value_text = rest[eq + 1..].trim_start();
        if value_text.is_empty() {
            return Err(PropError {
                message: format!("invalid setting of {name}"),
                parsed: opts,
            });
        }

        let after = match name.as_str() {
            "color" => {
                let (word, after) = take_word(value_text);
                opts.color = Some(word.to_string());
                after
            }
            "width" | "offsetx" | "offsety" => {
                let (word, after) = take_word(value_text);
                match word.parse::<i32>() {
                    Ok(n) => {
                        match name.as_str() {
                            "width" => opts.line_width = Some(n),
                            "offsetx" => opts.offset_x = Some(n),
                            _ => opts.offset_y = Some(n),
                        }
                        after
                    }
                    Err(_) => {
                        return Err(PropError {
                            message: format!("invalid setting of {name}"),
                            parsed: opts,
                        })
                    }
                }
            }
            "text" => {
                let (value, after) = take_string_value(value_text);
                opts.text = Some(value.to_string());
                after
            }
            "tag" => {
                let (value, after) = take_string_value(value_text);
                opts.tags.push(value.to_string());
                after
            }
            "font" => {
                let (value, after) = take_string_value(value_text);
                opts.font = Some(RegionFont::parse(value));
                after
            }
            "dashlist" => {
                let (value, after) = take_lookahead_value(value_text);
                opts.dash_list = Some(value.to_string());
                after
            }
            "point" => {
                let (word, after) = take_word(value_text);
                let kind = match PointKind::parse(word) {
                    Some(k) => k,
                    None => {
                        return Err(PropError {
                            message: format!("invalid setting of {name}"),
                            parsed: opts,
                        })
                    }
                };
                opts.point = Some(kind);
                // An optional trailing integer is the marker size; it is
                // halved since sizes are written as full extents, except
                // for arrows which are drawn from the anchor outward.
                let trimmed = after.trim_start();
                let (maybe_size, after_size) = take_word(trimmed);
                match maybe_size.parse::<i32>() {
                    Ok(n) => {
                        opts.point_size = Some(if kind == PointKind::Arrow { n } else { n / 2 });
                        after_size
                    }
                    Err(_) => after,
                }
            }
            "highlite" | "highlight" | "select" | "include" | "edit" | "move" | "rotate"
            | "delete" | "dash" | "fixed" | "source" => match parse_flag(value_text) {
                Some((flag, after)) => {
                    match name.as_str() {
                        "highlite" | "highlight" => opts.highlightable = Some(flag),
                        "select" => opts.selectable = Some(flag),
                        "include" => opts.include = Some(flag),
                        "edit" => opts.editable = Some(flag),
                        "move" => opts.movable = Some(flag),
                        "rotate" => opts.rotatable = Some(flag),
                        "delete" => opts.deletable = Some(flag),
                        "dash" => opts.dash = Some(flag),
                        "fixed" => opts.fixed = Some(flag),
                        _ => opts.source = Some(flag),
                    }
                    after
                }
                None => {
                    return Err(PropError {
                        message: format!("invalid setting of {name}"),
                        parsed: opts,
                    })
                }
            },
            _ => {
                return Err(PropError {
                    message: format!("invalid region property, {name}"),
                    parsed: opts,
                })
            }
        };
        rest = after.trim_start();
    }

    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordSys;

    fn parse(text: &str) -> RegionOptions {
        parse_options(text, &RegionOptions::default())
            .unwrap_or_else(|e| panic!("property parse failed: {}", e.message))
    }

    #[test]
    fn test_basic_settings() {
        let opts = parse("color=red width=2");
        assert_eq!(opts.color.as_deref(), Some("red"));
        assert_eq!(opts.line_width, Some(2));
    }

    #[test]
    fn test_hex_color() {
        let opts = parse("color=#ff00aa width=3");
        assert_eq!(opts.color.as_deref(), Some("#ff00aa"));
        assert_eq!(opts.line_width, Some(3));
    }

    #[test]
    fn test_delimited_text_forms() {
        assert_eq!(parse("text={hello world}").text.as_deref(), Some("hello world"));
        assert_eq!(parse("text=\"hello world\"").text.as_deref(), Some("hello world"));
        assert_eq!(parse("text='hello world'").text.as_deref(), Some("hello world"));
    }

    #[test]
    fn test_unquoted_text_runs_to_next_setting() {
        let opts = parse("text=plain label color=blue");
        assert_eq!(opts.text.as_deref(), Some("plain label"));
        assert_eq!(opts.color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_dashlist_value_is_multi_word() {
        let opts = parse("dash=1 dashlist=8 3 color=green");
        assert_eq!(opts.dash, Some(true));
        assert_eq!(opts.dash_list.as_deref(), Some("8 3"));
        assert_eq!(opts.color.as_deref(), Some("green"));

        let opts = parse("dashlist=5 10");
        assert_eq!(opts.dash_list.as_deref(), Some("5 10"));
    }

    #[test]
    fn test_boolean_flags_tristate() {
        let opts = parse("edit=1 move=0 delete=1");
        assert_eq!(opts.editable, Some(true));
        assert_eq!(opts.movable, Some(false));
        assert_eq!(opts.deletable, Some(true));
        // Unmentioned flags stay unset rather than defaulting to false.
        assert_eq!(opts.rotatable, None);
        assert_eq!(opts.include, None);
    }

    #[test]
    fn test_point_with_size_halved() {
        let opts = parse("point=circle 20");
        assert_eq!(opts.point, Some(PointKind::Circle));
        assert_eq!(opts.point_size, Some(10));

        let opts = parse("point=arrow 20");
        assert_eq!(opts.point, Some(PointKind::Arrow));
        assert_eq!(opts.point_size, Some(20));

        let opts = parse("point=cross color=red");
        assert_eq!(opts.point, Some(PointKind::Cross));
        assert_eq!(opts.point_size, None);
        assert_eq!(opts.color.as_deref(), Some("red"));
    }

    #[test]
    fn test_tags_accumulate() {
        let opts = parse("tag={groupA} tag={groupB}");
        assert_eq!(opts.tags, vec!["groupA".to_string(), "groupB".to_string()]);
    }

    #[test]
    fn test_font_parsing() {
        let opts = parse("font=\"times 14 bold italic\"");
        let font = opts.font.unwrap();
        assert_eq!(font.name, "times");
        assert_eq!(font.size, "14");
        assert_eq!(font.weight, "bold");
        assert_eq!(font.slant, "italic");
    }

    #[test]
    fn test_baseline_inheritance_and_override() {
        let mut baseline = RegionOptions::default();
        baseline.color = Some("green".to_string());
        baseline.line_width = Some(4);
        let opts = parse_options("color=red", &baseline).unwrap();
        assert_eq!(opts.color.as_deref(), Some("red"));
        assert_eq!(opts.line_width, Some(4));
        assert_eq!(opts.coord_sys, CoordSys::Physical);
    }

    #[test]
    fn test_unknown_property_keeps_prefix() {
        let err = parse_options("color=red wobble=3", &RegionOptions::default()).unwrap_err();
        assert_eq!(err.message, "invalid region property, wobble");
        assert_eq!(err.parsed.color.as_deref(), Some("red"));
    }

    #[test]
    fn test_empty_name_and_empty_value() {
        let err = parse_options("=red", &RegionOptions::default()).unwrap_err();
        assert_eq!(err.message, "empty region property found");
        let err = parse_options("color=", &RegionOptions::default()).unwrap_err();
        assert_eq!(err.message, "invalid setting of color");
        let err = parse_options("width=abc", &RegionOptions::default()).unwrap_err();
        assert_eq!(err.message, "invalid setting of width");
        let err = parse_options("point=star", &RegionOptions::default()).unwrap_err();
        assert_eq!(err.message, "invalid setting of point");
    }

    #[test]
    fn test_brace_value_containing_equals() {
        let opts = parse("text={a=b c} color=cyan");
        assert_eq!(opts.text.as_deref(), Some("a=b c"));
        assert_eq!(opts.color.as_deref(), Some("cyan"));
    }
}
