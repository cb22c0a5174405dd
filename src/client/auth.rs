use base64::Engine;

/// Credentials presented to the FHIR server
#[derive(Clone)]
pub enum Auth {
    /// Use a bearer token via the Authorization header
    Bearer(String),
    /// Use username and password authentication via Basic Auth headers
    Basic(String, String),
    /// Don't use any authentication
    None,
}

impl Auth {
    pub fn new(
        token: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        match (token, username, password) {
            (Some(token), _, _) => Self::Bearer(token),
            (None, Some(username), Some(password)) => Self::Basic(username, password),
            _ => Self::None,
        }
    }

    /// Value for the `Authorization` header, if any
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("Bearer {}", token)),
            Self::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", credentials))
            }
            Self::None => None,
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::Basic(_, _) => write!(f, "Basic"),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_wins() {
        let auth = Auth::new(
            Some("abc".to_string()),
            Some("user".to_string()),
            Some("pass".to_string()),
        );
        assert_eq!(auth.header_value().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_basic_encoding() {
        let auth = Auth::new(None, Some("user".to_string()), Some("pass".to_string()));
        assert_eq!(auth.to_string(), "Basic");
        assert_eq!(auth.header_value().as_deref(), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_incomplete_basic_is_none() {
        let auth = Auth::new(None, Some("user".to_string()), None);
        assert!(auth.header_value().is_none());
        assert_eq!(auth.to_string(), "None");
    }
}
