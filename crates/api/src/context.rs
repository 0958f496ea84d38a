use assetdesk_core::UserId;

/// Authenticated identity for a request.
///
/// Present on every protected route; the soft-delete path requires it so the
/// audit trail always names who removed a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    name: Option<String>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, name: Option<String>) -> Self {
        Self { user_id, name }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
