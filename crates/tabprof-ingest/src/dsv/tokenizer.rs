//! Field splitting for one delimited record.

use super::options::DsvOptions;

/// Outcome of splitting a record.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Tokenized {
    Complete(Vec<String>),
    /// A bookend was still open at the end of the input. The fields are a
    /// best-effort split that treats the end of input as the closing bookend.
    Unterminated(Vec<String>),
}

#[derive(Default)]
struct Field {
    value: String,
    /// Text after the closing bookend and before the next delimiter.
    tail: String,
    bookended: bool,
}

impl Field {
    fn push(&mut self, ch: char, in_bookend: bool) {
        if in_bookend || !self.bookended {
            self.value.push(ch);
        } else {
            self.tail.push(ch);
        }
    }

    fn finish(self, options: &DsvOptions) -> String {
        if self.bookended {
            let mut value = if options.bookend_strip {
                self.value.trim().to_string()
            } else {
                self.value
            };
            let tail = self.tail.trim();
            if !tail.is_empty() {
                value.push_str(tail);
            }
            value
        } else if options.strip {
            self.value.trim().to_string()
        } else {
            self.value
        }
    }
}

/// Splits `line` on the configured delimiter, honoring bookends.
///
/// A bookend opens only at the start of a field (after optional whitespace);
/// inside a bookended field a doubled bookend is a literal bookend character.
pub(crate) fn tokenize(line: &str, options: &DsvOptions) -> Tokenized {
    let delimiter = options.delimiter.as_str();
    let mut fields = Vec::new();
    let mut field = Field::default();
    let mut in_bookend = false;
    let mut rest = line;

    while let Some(ch) = rest.chars().next() {
        if let Some(mark) = options.bookend.filter(|_| in_bookend) {
            if let Some(after) = rest.strip_prefix(mark) {
                if let Some(after_escape) = after.strip_prefix(mark) {
                    field.value.push(mark);
                    rest = after_escape;
                } else {
                    in_bookend = false;
                    rest = after;
                }
                continue;
            }
        } else if let Some(after) = rest
            .strip_prefix(delimiter)
            .filter(|_| !delimiter.is_empty())
        {
            fields.push(std::mem::take(&mut field).finish(options));
            rest = after;
            continue;
        } else if let Some(after) = options.bookend.and_then(|mark| rest.strip_prefix(mark)) {
            if !field.bookended && field.value.trim().is_empty() {
                field.value.clear();
                field.bookended = true;
                in_bookend = true;
                rest = after;
                continue;
            }
        }
        field.push(ch, in_bookend);
        rest = &rest[ch.len_utf8()..];
    }

    fields.push(field.finish(options));
    if in_bookend {
        Tokenized::Unterminated(fields)
    } else {
        Tokenized::Complete(fields)
    }
}

/// Returns true when every field is blank.
pub(crate) fn is_blank(fields: &[String]) -> bool {
    fields.iter().all(|field| field.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str, options: &DsvOptions) -> Vec<String> {
        match tokenize(line, options) {
            Tokenized::Complete(fields) => fields,
            Tokenized::Unterminated(fields) => panic!("unterminated: {fields:?}"),
        }
    }

    #[test]
    fn test_simple() {
        let result = split("a,b,c", &DsvOptions::default());
        assert_eq!(result, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_bookended_delimiter() {
        let result = split("\"hello, world\",b,c", &DsvOptions::default());
        assert_eq!(result, vec!["hello, world", "b", "c"]);
    }

    #[test]
    fn test_escaped_bookend() {
        let result = split("\"he said \"\"hello\"\"\",b", &DsvOptions::default());
        assert_eq!(result, vec!["he said \"hello\"", "b"]);
    }

    #[test]
    fn test_trimmed() {
        let result = split("  a  ,  b  ", &DsvOptions::default());
        assert_eq!(result, vec!["a", "b"]);
    }

    #[test]
    fn test_strip_disabled() {
        let options = DsvOptions::default().with_strip(false);
        let result = split("  a  ,b", &options);
        assert_eq!(result, vec!["  a  ", "b"]);
    }

    #[test]
    fn test_bookend_strip_disabled() {
        let options = DsvOptions::default().with_bookend_strip(false);
        let result = split("\" padded \",\"x\"", &options);
        assert_eq!(result, vec![" padded ", "x"]);
        let stripped = split("\" padded \",\"x\"", &DsvOptions::default());
        assert_eq!(stripped, vec!["padded", "x"]);
    }

    #[test]
    fn test_multi_character_delimiter() {
        let options = DsvOptions::default().with_delimiter("||");
        let result = split("a||b|c||\"d||e\"", &options);
        assert_eq!(result, vec!["a", "b|c", "d||e"]);
    }

    #[test]
    fn test_trailing_delimiter_yields_blank_field() {
        let result = split("id,name,", &DsvOptions::default());
        assert_eq!(result, vec!["id", "name", ""]);
    }

    #[test]
    fn test_bookend_in_middle_is_literal() {
        let result = split("5\" pipe,x", &DsvOptions::default());
        assert_eq!(result, vec!["5\" pipe", "x"]);
    }

    #[test]
    fn test_no_bookend() {
        let options = DsvOptions::default().with_bookend(None);
        let result = split("\"a,b\"", &options);
        assert_eq!(result, vec!["\"a", "b\""]);
    }

    #[test]
    fn test_unterminated_bookend() {
        let result = tokenize("\"open,field", &DsvOptions::default());
        assert_eq!(
            result,
            Tokenized::Unterminated(vec!["open,field".to_string()])
        );
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&["".to_string(), "  ".to_string()]));
        assert!(!is_blank(&["".to_string(), "x".to_string()]));
    }
}
