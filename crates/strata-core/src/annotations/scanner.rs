//! Splits an annotation body into raw clause text.

/// Iterator over the trimmed, non-empty clauses of an annotation body.
#[derive(Debug, Clone)]
pub struct ClauseScanner<'a> {
    rest: Option<&'a str>,
    separator: char,
}

impl<'a> ClauseScanner<'a> {
    /// Creates a scanner. The separator is `;` when the body contains one,
    /// `,` otherwise.
    #[must_use]
    pub fn new(body: &'a str) -> Self {
        let separator = if body.contains(';') { ';' } else { ',' };
        Self {
            rest: Some(body),
            separator,
        }
    }

    /// The separator this scanner splits on.
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }
}

impl<'a> Iterator for ClauseScanner<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.rest?;
            let (segment, tail) = match rest.split_once(self.separator) {
                Some((segment, tail)) => (segment, Some(tail)),
                None => (rest, None),
            };
            self.rest = tail;

            let segment = segment.trim();
            if !segment.is_empty() {
                return Some(segment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(body: &str) -> Vec<&str> {
        ClauseScanner::new(body).collect()
    }

    #[test]
    fn test_semicolon_separated() {
        assert_eq!(
            scan("writable:post,put; readable;required"),
            ["writable:post,put", "readable", "required"]
        );
    }

    #[test]
    fn test_comma_fallback() {
        let scanner = ClauseScanner::new("required, unique");
        assert_eq!(scanner.separator(), ',');
        assert_eq!(scanner.collect::<Vec<_>>(), ["required", "unique"]);
    }

    #[test]
    fn test_skips_empty_segments() {
        assert_eq!(scan(" ; required;; unique ; "), ["required", "unique"]);
        assert!(scan("").is_empty());
        assert!(scan("   ").is_empty());
    }
}
