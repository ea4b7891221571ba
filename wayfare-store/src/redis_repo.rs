use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use crate::session::{SessionError, SessionStore};

/// Session blobs for one browser session, stored as `session:{id}:{key}` with a TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    session_id: String,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(connection_string: &str, session_id: &str, ttl_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            session_id: session_id.to_string(),
            ttl_seconds,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("session:{}:{}", self.session_id, key)
    }
}

impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::Backend(err.to_string())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(self.key(key)).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let full_key = self.key(key);
        conn.set_ex::<_, _, ()>(&full_key, value, self.ttl_seconds).await?;
        debug!("Session value written: {}", full_key);
        Ok(())
    }
}
