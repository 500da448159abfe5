use crate::claims::JwtClaims;

/// Who is calling, as resolved once per request from the bearer token.
///
/// Immutable after construction. A missing, malformed or expired token all
/// resolve to [`CallerIdentity::Anonymous`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallerIdentity {
    #[default]
    Anonymous,
    Authenticated(JwtClaims),
}

impl CallerIdentity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, CallerIdentity::Authenticated(_))
    }

    pub fn claims(&self) -> Option<&JwtClaims> {
        match self {
            CallerIdentity::Anonymous => None,
            CallerIdentity::Authenticated(claims) => Some(claims),
        }
    }

    /// Username for log fields; `None` for anonymous callers.
    pub fn username(&self) -> Option<&str> {
        self.claims().map(|c| c.name.as_str())
    }
}
