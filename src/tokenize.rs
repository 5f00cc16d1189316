//! Splitting input lines into individual statements.
//!
//! A line may hold several statements separated by `;`, but a `;` inside
//! a `{...}`, `"..."` or `'...'` span belongs to the enclosed string and
//! must not split.

/// Split one line on top-level semicolons.
pub fn split_statements(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_brace = false;
    let mut quote: Option<char> = None;

    for (i, c) in line.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if in_brace => {
                if c == '}' {
                    in_brace = false;
                }
            }
            None => match c {
                '{' => in_brace = true,
                '"' | '\'' => quote = Some(c),
                ';' => {
                    parts.push(&line[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&line[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_split() {
        assert_eq!(
            split_statements("circle(1,2,3);box(4,5,6,7,0)"),
            vec!["circle(1,2,3)", "box(4,5,6,7,0)"]
        );
    }

    #[test]
    fn test_no_semicolon() {
        assert_eq!(split_statements("circle(1,2,3)"), vec!["circle(1,2,3)"]);
        assert_eq!(split_statements(""), vec![""]);
    }

    #[test]
    fn test_semicolon_inside_braces_is_kept() {
        assert_eq!(
            split_statements("text(10,20) # text={hello; world}"),
            vec!["text(10,20) # text={hello; world}"]
        );
    }

    #[test]
    fn test_semicolon_inside_quotes_is_kept() {
        assert_eq!(
            split_statements("text(1,2) # text=\"a;b\";circle(3,4,5)"),
            vec!["text(1,2) # text=\"a;b\"", "circle(3,4,5)"]
        );
        assert_eq!(
            split_statements("text(1,2) # text='a;b'"),
            vec!["text(1,2) # text='a;b'"]
        );
    }

    #[test]
    fn test_unclosed_delimiter_swallows_rest() {
        assert_eq!(
            split_statements("text(1,2) # text={open;circle(3,4,5)"),
            vec!["text(1,2) # text={open;circle(3,4,5)"]
        );
    }
}
