use itertools::Itertools;

pub(crate) trait StringExt {
    fn push_join(&mut self, separator: &str, items: impl IntoIterator<Item = impl AsRef<str>>);
}

impl StringExt for String {
    fn push_join(&mut self, separator: &str, items: impl IntoIterator<Item = impl AsRef<str>>) {
        for (idx, v) in items.into_iter().enumerate() {
            if idx > 0 {
                self.push_str(separator);
            }
            self.push_str(v.as_ref());
        }
    }
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Returns the first name that occurs more than once.
pub(crate) fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    names.into_iter().duplicates().next()
}

/// Renders the value side of a `comment on ... is` statement.
///
/// Values are interpolated verbatim, a missing comment clears it.
pub(crate) fn comment_value(comment: Option<&str>) -> String {
    match comment {
        Some(c) => format!("'{}'", c),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_join_separates_items() {
        let mut s = "(".to_string();
        s.push_join(", ", ["a", "b", "c"]);
        s.push(')');
        assert_eq!(s, "(a, b, c)");
    }

    #[test]
    fn finds_duplicates() {
        assert_eq!(first_duplicate(["a", "b", "a"]), Some("a"));
        assert_eq!(first_duplicate(["a", "b"]), None);
    }

    #[test]
    fn comment_values() {
        assert_eq!(comment_value(Some("hello")), "'hello'");
        assert_eq!(comment_value(None), "null");
    }
}
