/// Domain suffixes that always resolve through the relay in smart mode.
///
/// Matching is a plain, case-sensitive suffix test against each entry as
/// stored: no case folding, no trailing-dot handling, no label boundary. Routing
/// decisions depend on these exact semantics.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    suffixes: Vec<String>,
}

impl Whitelist {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { suffixes: suffixes.into_iter().map(Into::into).collect() }
    }

    /// Parse a whitelist file: one suffix per line, blank lines and `#`
    /// comments ignored.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn matches(&self, domain: &str) -> bool {
        self.suffixes.iter().any(|suffix| domain.ends_with(suffix.as_str()))
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_match() {
        let list = Whitelist::new(["google.com", "blocked.example"]);

        assert!(list.matches("google.com"));
        assert!(list.matches("www.google.com"));
        assert!(list.matches("blocked.example"));
        assert!(!list.matches("example.com"));
    }

    #[test]
    fn test_no_label_boundary() {
        let list = Whitelist::new(["google.com"]);
        assert!(list.matches("notgoogle.com"));
    }

    #[test]
    fn test_case_sensitive_and_unnormalized() {
        let list = Whitelist::new(["google.com"]);

        assert!(!list.matches("WWW.GOOGLE.COM"));
        assert!(!list.matches("www.google.com."));
    }

    #[test]
    fn test_parse() {
        let list = Whitelist::parse("# forced\ngoogle.com\n\n  twitter.com  \n");
        assert_eq!(list.len(), 2);
        assert!(list.matches("api.twitter.com"));
    }

    #[test]
    fn test_empty_matches_nothing() {
        assert!(!Whitelist::default().matches("example.com"));
    }
}
