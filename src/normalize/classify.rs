//! Category classification from ownership and instrument-operation text.
//!
//! Ownership is decided by a small rule table (`token → Ownership`). Exactly one
//! ownership side must match; zero or both is `ClassifyError`, never a default.
//! The IFR flag is a plain token match on the instrument field.

use thiserror::Error;

use crate::domain::{Category, Ownership};
use crate::normalize::text::fold;

/// A set of folded tokens matched as substrings of folded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatcher {
    tokens: Vec<String>,
}

impl TokenMatcher {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| fold(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// First configured token that occurs in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        let folded = fold(text);
        self.tokens
            .iter()
            .find(|t| folded.contains(t.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// A token that is guaranteed to match, for rendering text back out.
    pub fn canonical(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }
}

/// One row of the ownership rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRule {
    pub ownership: Ownership,
    pub matcher: TokenMatcher,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("ownership text is missing")]
    MissingOwnership,
    #[error("no ownership marker in '{0}'")]
    NoMarker(String),
    #[error("both private ('{private}') and public ('{public}') markers in '{text}'")]
    ConflictingMarkers {
        text: String,
        private: String,
        public: String,
    },
}

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<OwnershipRule>,
    instrument: TokenMatcher,
}

impl CategoryClassifier {
    pub fn new<S: AsRef<str>>(private: &[S], public: &[S], instrument: &[S]) -> Self {
        Self {
            rules: vec![
                OwnershipRule {
                    ownership: Ownership::Private,
                    matcher: TokenMatcher::new(private),
                },
                OwnershipRule {
                    ownership: Ownership::Public,
                    matcher: TokenMatcher::new(public),
                },
            ],
            instrument: TokenMatcher::new(instrument),
        }
    }

    pub fn ownership(&self, text: Option<&str>) -> Result<Ownership, ClassifyError> {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ClassifyError::MissingOwnership)?;

        let hits: Vec<(Ownership, &str)> = self
            .rules
            .iter()
            .filter_map(|rule| rule.matcher.find(text).map(|tok| (rule.ownership, tok)))
            .collect();

        match hits.as_slice() {
            [] => Err(ClassifyError::NoMarker(text.to_string())),
            [(ownership, _)] => Ok(*ownership),
            _ => {
                let token_for = |side: Ownership| {
                    hits.iter()
                        .find(|(o, _)| *o == side)
                        .map(|(_, t)| t.to_string())
                        .unwrap_or_default()
                };
                Err(ClassifyError::ConflictingMarkers {
                    text: text.to_string(),
                    private: token_for(Ownership::Private),
                    public: token_for(Ownership::Public),
                })
            }
        }
    }

    /// Instrument operations permitted. A missing field means no.
    pub fn is_ifr(&self, instrument: Option<&str>) -> bool {
        instrument.is_some_and(|t| self.instrument.matches(t))
    }

    pub fn classify(&self, ownership: Option<&str>, instrument: Option<&str>) -> Result<Category, ClassifyError> {
        let ownership = self.ownership(ownership)?;
        Ok(Category::from_parts(ownership, self.is_ifr(instrument)))
    }

    /// Text that classifies back to `ownership`.
    pub fn ownership_marker(&self, ownership: Ownership) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.ownership == ownership)
            .and_then(|r| r.matcher.canonical())
    }

    pub fn instrument_marker(&self) -> Option<&str> {
        self.instrument.canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> CategoryClassifier {
        CategoryClassifier::new(&["privad", "private"], &["públic", "public"], &["ifr"])
    }

    #[test]
    fn decision_table() {
        let c = classifier();
        assert_eq!(c.classify(Some("Privado"), Some("VFR")), Ok(Category::Private));
        assert_eq!(c.classify(Some("Privado"), Some("VFR/IFR")), Ok(Category::PrivateIfr));
        assert_eq!(c.classify(Some("Público"), None), Ok(Category::Public));
        assert_eq!(c.classify(Some("Pública"), Some("VFR / IFR")), Ok(Category::PublicIfr));
    }

    #[test]
    fn matching_ignores_case_and_accents() {
        let c = classifier();
        assert_eq!(c.classify(Some("PUBLICO"), Some("vfr/ifr")), Ok(Category::PublicIfr));
        assert_eq!(c.classify(Some("aeródromo privado"), Some("")), Ok(Category::Private));
        assert_eq!(c.classify(Some("PÃºblico"), None), Ok(Category::Public));
    }

    #[test]
    fn vfr_alone_is_not_ifr() {
        let c = classifier();
        assert!(!c.is_ifr(Some("VFR")));
        assert!(!c.is_ifr(Some("Sem operação noturna")));
        assert!(!c.is_ifr(None));
        assert!(c.is_ifr(Some("IFR não precisão")));
    }

    #[test]
    fn neither_marker_is_an_error() {
        let c = classifier();
        assert_eq!(
            c.classify(Some("Militar"), None),
            Err(ClassifyError::NoMarker("Militar".to_string()))
        );
        assert_eq!(c.classify(None, None), Err(ClassifyError::MissingOwnership));
        assert_eq!(c.classify(Some("   "), None), Err(ClassifyError::MissingOwnership));
    }

    #[test]
    fn both_markers_is_an_error() {
        let c = classifier();
        let err = c.classify(Some("Privado de uso público"), None).unwrap_err();
        assert!(matches!(err, ClassifyError::ConflictingMarkers { .. }));
    }

    #[test]
    fn category_labels_classify_back() {
        let c = classifier();
        for cat in Category::ALL {
            let ifr = if cat.is_ifr() { c.instrument_marker() } else { None };
            assert_eq!(c.classify(Some(cat.label()), ifr), Ok(cat));
        }
    }
}
