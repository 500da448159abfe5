use libcat_auth::CallerIdentity;

/// Caller identity for a request, resolved once by the identity middleware.
///
/// Inserted into request extensions for every route; handlers and the
/// permission gate read it instead of re-decoding the token.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    identity: CallerIdentity,
}

impl CallerContext {
    pub fn new(identity: CallerIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }
}
