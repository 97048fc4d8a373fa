use crate::random_string_def_len;

/// Opaque bearer token issued by the server on login
///
/// No format is assumed, it is stored and echoed back as-is
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new_rand() -> Self {
        random_string_def_len().into()
    }
}

impl From<String> for AuthToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AuthToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for AuthToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
