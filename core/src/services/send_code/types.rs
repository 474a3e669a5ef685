//! Request type for the dispatch service

use serde::{Deserialize, Serialize};

/// One send request, built fluently
///
/// ```
/// use sc_core::SendCodeRequest;
///
/// let request = SendCodeRequest::new().to("+8613812345678").code("123456").kind("login");
/// assert_eq!(request.kind.as_deref(), Some("login"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCodeRequest {
    /// Recipient of the code
    pub to: Option<String>,
    /// Code value supplied by the caller
    pub code: Option<String>,
    /// Notification type, further namespacing the code and count keys
    pub kind: Option<String>,
}

impl SendCodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recipient
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Set the code value
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the notification type
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}
