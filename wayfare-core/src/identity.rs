use async_trait::async_trait;
use wayfare_shared::Masked;

/// Source of the signed-in user's auth token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// `None` when nobody is signed in. Booking submission requires a token.
    async fn get_token(&self) -> Option<Masked<String>>;
}

/// Fixed token, for the headless binary and for tests.
pub struct StaticTokenProvider {
    token: Option<Masked<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()).map(Masked::new),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Option<Masked<String>> {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_token_counts_as_absent() {
        assert!(StaticTokenProvider::new(Some("  ".to_string())).get_token().await.is_none());
        assert!(StaticTokenProvider::new(None).get_token().await.is_none());
        let token = StaticTokenProvider::new(Some("tok".to_string())).get_token().await;
        assert_eq!(token.unwrap().expose(), "tok");
    }
}
