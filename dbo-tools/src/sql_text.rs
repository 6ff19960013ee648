use std::fmt::Display;
use std::ops::Deref;
use serde::{Deserialize, Serialize};

/// Sql source text, such as a function body or a view query.
///
/// Two texts are equal when they only differ in the whitespace between tokens. Quoted
/// literals, quoted identifiers and dollar quoted strings are compared exactly, since
/// whitespace inside them is part of the value. The text itself is kept as written.
#[derive(Debug, Default, Eq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqlText(String);

impl SqlText {
    /// The text with whitespace outside of quotes collapsed to single spaces and trimmed.
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut pending_space = false;
        let mut rest = self.0.as_str();

        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                pending_space = !out.is_empty();
                rest = &rest[c.len_utf8()..];
                continue;
            }

            if pending_space {
                out.push(' ');
                pending_space = false;
            }

            // Unterminated quotes run to the end of the text.
            let len = match c {
                '\'' | '"' => rest[1..].find(c).map_or(rest.len(), |end| end + 2),
                '$' => dollar_quoted_len(rest).unwrap_or(1),
                _ => c.len_utf8(),
            };

            out.push_str(&rest[..len]);
            rest = &rest[len..];
        }

        out
    }
}

/// Length of the `$tag$...$tag$` string at the start of `text`, or `None` when the `$`
/// does not open one, as in a positional parameter like `$1`.
fn dollar_quoted_len(text: &str) -> Option<usize> {
    let open = text[1..].find('$')? + 2;
    let tag = &text[..open];
    let name = &tag[1..open - 1];

    if name.starts_with(|c: char| c.is_ascii_digit()) || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    Some(text[open..].find(tag).map_or(text.len(), |end| open + end + open))
}

impl PartialEq for SqlText {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || self.normalized() == other.normalized()
    }
}

impl Deref for SqlText {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for SqlText {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SqlText {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for SqlText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_surrounding_whitespace() {
        let s1 = SqlText::from("  select 1  ");
        let s2 = SqlText::from("select 1");
        assert_eq!(s1, s2);
        assert_eq!(s1.to_string(), "  select 1  ");
    }

    #[test]
    fn ignores_line_breaks_between_tokens() {
        let s1 = SqlText::from("begin\n    return new;\nend;");
        let s2 = SqlText::from("begin return new; end;");
        assert_eq!(s1, s2);
        assert_eq!(s1.normalized(), "begin return new; end;");
    }

    #[test]
    fn token_boundaries_matter() {
        let s1 = SqlText::from("select a from b");
        let s2 = SqlText::from("select afrom b");
        assert_ne!(s1, s2);
    }

    #[test]
    fn whitespace_inside_literals_matters() {
        assert_ne!(SqlText::from("select 'hello  world'"), SqlText::from("select 'hello world'"));
        assert_ne!(SqlText::from(r#"select 1 as "a  b""#), SqlText::from(r#"select 1 as "a b""#));
        assert_ne!(SqlText::from("select $q$a  b$q$"), SqlText::from("select $q$a b$q$"));
        assert_eq!(SqlText::from("select  'it''s  here' ,\n 2"), SqlText::from("select 'it''s  here' , 2"));
    }

    #[test]
    fn positional_parameters_are_not_dollar_quotes() {
        let s1 = SqlText::from("select $1,   $2");
        assert_eq!(s1.normalized(), "select $1, $2");
    }

    #[test]
    fn unterminated_literal_runs_to_the_end() {
        let s1 = SqlText::from("select 'a  b");
        assert_eq!(s1.normalized(), "select 'a  b");
        assert_ne!(s1, SqlText::from("select 'a b"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let s = SqlText::from("select 1");
        assert_eq!(serde_json::to_string(&s).unwrap(), r#""select 1""#);
    }
}
