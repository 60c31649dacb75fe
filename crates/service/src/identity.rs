/// Request-scoped identity of the authenticated caller.
///
/// Constructed by the embedding application once its session layer has
/// verified the user, then passed explicitly into every operation. The
/// core never reads ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// Stable user identifier, recorded as a transfer's owner.
    pub user_id: String,
    /// Display address, used only for logging.
    pub email: String,
}

impl UserContext {
    /// Creates a context for a verified user.
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}
