pub mod app_config;
pub mod redis_repo;
pub mod session;

pub use redis_repo::RedisSessionStore;
pub use session::{BookingHandoff, InMemorySessionStore, SessionBridge, SessionError, SessionStore};
