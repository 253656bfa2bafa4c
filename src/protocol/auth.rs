/// Decides whether a request may touch translation data.
pub trait AuthGate: Send + Sync {
    fn is_authorized(&self, token: Option<&str>) -> bool;
}

/// Compares against a fixed admin token. Without one every request passes.
pub struct TokenGate {
    token: Option<String>,
}

impl TokenGate {
    pub fn new(token: Option<String>) -> Self {
        TokenGate { token }
    }
}

impl AuthGate for TokenGate {
    fn is_authorized(&self, token: Option<&str>) -> bool {
        match &self.token {
            None => true,
            Some(expected) => token.is_some_and(|t| t == expected),
        }
    }
}
