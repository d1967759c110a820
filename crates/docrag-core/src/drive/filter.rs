use glob::{Pattern, PatternError};

/// Allow/deny glob lists on Drive file names.
///
/// Deny always wins. An empty allow list admits every name.
#[derive(Debug, Clone, Default)]
pub struct DriveFilter {
    allow: Vec<Pattern>,
    deny: Vec<Pattern>,
}

impl DriveFilter {
    /// # Errors
    ///
    /// Returns an error if any pattern is not a valid glob.
    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, PatternError> {
        let compile = |list: &[String]| {
            list.iter()
                .map(|p| Pattern::new(p))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            allow: compile(allow)?,
            deny: compile(deny)?,
        })
    }

    #[must_use]
    pub fn permits(&self, name: &str) -> bool {
        if self.deny.iter().any(|p| p.matches(name)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|p| p.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(allow: &[&str], deny: &[&str]) -> DriveFilter {
        let owned = |l: &[&str]| l.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
        DriveFilter::new(&owned(allow), &owned(deny)).unwrap()
    }

    #[test]
    fn empty_filter_allows_everything() {
        assert!(DriveFilter::default().permits("anything.pdf"));
    }

    #[test]
    fn deny_excludes_exact_name() {
        let f = filter(&[], &["demo.pdf"]);
        assert!(!f.permits("demo.pdf"));
        assert!(f.permits("report.pdf"));
    }

    #[test]
    fn allow_restricts() {
        let f = filter(&["*.pdf", "*.csv"], &[]);
        assert!(f.permits("a.pdf"));
        assert!(f.permits("b.csv"));
        assert!(!f.permits("c.txt"));
    }

    #[test]
    fn deny_wins_over_allow() {
        let f = filter(&["*.pdf"], &["draft-*"]);
        assert!(!f.permits("draft-1.pdf"));
        assert!(f.permits("final.pdf"));
    }

    #[test]
    fn invalid_pattern_rejected() {
        assert!(DriveFilter::new(&["[".into()], &[]).is_err());
    }
}
