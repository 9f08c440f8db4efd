//! Local boilerplate filter: a zero-cost pre-filter over rendered text.
//!
//! Phrases are organizational self-description markers. The list is curated
//! to be specific, so a match is a high-confidence reject; pages it admits
//! still face the LLM verifier downstream.

/// Markers of founding-history, greeting, governance, and legal pages.
const BOILERPLATE_PHRASES: &[&str] = &[
    "founding history",
    "message from the chairman",
    "chairman's greeting",
    "board of directors",
    "organizational chart",
    "directions to our office",
    "how to find us",
    "notice board",
    "customer center",
    "frequently asked questions",
    "sign in to your account",
    "forgot your password",
    "all rights reserved",
    "privacy policy",
    "terms of service",
];

/// Substring filter over extracted page text.
#[derive(Debug, Clone)]
pub struct BoilerplateFilter {
    phrases: &'static [&'static str],
}

impl Default for BoilerplateFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BoilerplateFilter {
    pub fn new() -> Self {
        Self {
            phrases: BOILERPLATE_PHRASES,
        }
    }

    /// All phrases found in the text, for diagnostics. Empty means clean.
    pub fn matches(&self, text: &str) -> Vec<&'static str> {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .copied()
            .filter(|p| lower.contains(p))
            .collect()
    }

    /// Whether any phrase matches.
    pub fn is_boilerplate(&self, text: &str) -> bool {
        !self.matches(text).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_self_description_pages() {
        let filter = BoilerplateFilter::new();
        let text = "Our Founding History The foundation was established in 1987 \
                    by the late chairman. Board of Directors Organizational Chart";
        let matched = filter.matches(text);
        assert!(matched.contains(&"founding history"));
        assert!(matched.contains(&"board of directors"));
        assert!(matched.contains(&"organizational chart"));
    }

    #[test]
    fn test_reports_all_matches_not_just_first() {
        let filter = BoilerplateFilter::new();
        let text = "Privacy Policy Terms of Service All rights reserved";
        assert_eq!(filter.matches(text).len(), 3);
    }

    #[test]
    fn test_admits_program_announcements() {
        let filter = BoilerplateFilter::new();
        let text = "2026 Scholarship Program now accepting applications. \
                    Application period: March 1-31. Eligible: undergraduate \
                    students from low-income households.";
        assert!(!filter.is_boilerplate(text));
    }
}
