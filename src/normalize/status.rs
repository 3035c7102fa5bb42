//! Closure flag from the free-text status field.

use crate::normalize::classify::TokenMatcher;

#[derive(Debug, Clone)]
pub struct StatusFlagger {
    closure: TokenMatcher,
}

impl StatusFlagger {
    pub fn new<S: AsRef<str>>(closure_tokens: &[S]) -> Self {
        Self {
            closure: TokenMatcher::new(closure_tokens),
        }
    }

    /// `true` only when the status mentions a closure token. A missing status
    /// reads as operational.
    pub fn is_closed(&self, status: Option<&str>) -> bool {
        status.is_some_and(|s| self.closure.matches(s))
    }

    pub fn closure_marker(&self) -> Option<&str> {
        self.closure.canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_detection() {
        let flagger = StatusFlagger::new(&["interditad"]);
        assert!(flagger.is_closed(Some("AERÓDROMO INTERDITADO")));
        assert!(flagger.is_closed(Some("Pista interditada para reforma")));
        assert!(!flagger.is_closed(Some("Operando normalmente")));
        assert!(!flagger.is_closed(Some("")));
        assert!(!flagger.is_closed(None));
    }

    #[test]
    fn no_tokens_never_flags() {
        let flagger = StatusFlagger::new::<&str>(&[]);
        assert!(!flagger.is_closed(Some("INTERDITADO")));
    }
}
