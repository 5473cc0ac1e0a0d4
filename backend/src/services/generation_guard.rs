//! Per-user plan generation guard
//!
//! At most one generation may be in flight per user. With Redis available
//! the guard is a `SET NX PX` key, so it holds across instances and expires
//! on its own if a process dies mid-generation. Without Redis an in-process
//! set is used.

use anyhow::Result;
use redis::aio::ConnectionManager;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

#[derive(Clone)]
pub struct GenerationGuard {
    redis: Option<ConnectionManager>,
    ttl: Duration,
    local: Arc<Mutex<HashSet<Uuid>>>,
}

/// Held while a generation runs; call [`GenerationPermit::release`] when done.
/// Dropping without releasing frees the in-process slot; a Redis key then
/// lapses at its TTL.
pub struct GenerationPermit {
    guard: GenerationGuard,
    user_id: Uuid,
    redis_token: Option<String>,
    released: bool,
}

fn redis_key(user_id: Uuid) -> String {
    format!("fitcoach:plan-generation:{}", user_id)
}

impl GenerationGuard {
    pub fn new(redis: Option<ConnectionManager>, ttl: Duration) -> Self {
        Self {
            redis,
            ttl,
            local: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// In-process guard only
    pub fn local() -> Self {
        Self::new(None, Duration::from_secs(300))
    }

    /// Try to take the guard for `user_id`; `None` when already held
    pub async fn try_acquire(&self, user_id: Uuid) -> Option<GenerationPermit> {
        if let Some(conn) = &self.redis {
            match self.try_acquire_redis(conn.clone(), user_id).await {
                Ok(Some(token)) => {
                    return Some(GenerationPermit {
                        guard: self.clone(),
                        user_id,
                        redis_token: Some(token),
                        released: false,
                    })
                }
                Ok(None) => return None,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Redis guard unavailable, using in-process guard");
                }
            }
        }

        let inserted = self
            .local
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id);

        inserted.then(|| GenerationPermit {
            guard: self.clone(),
            user_id,
            redis_token: None,
            released: false,
        })
    }

    async fn try_acquire_redis(&self, mut conn: ConnectionManager, user_id: Uuid) -> Result<Option<String>> {
        let token = Uuid::new_v4().to_string();
        let reply: Option<String> = redis::cmd("SET")
            .arg(redis_key(user_id))
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(self.ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;

        Ok(reply.map(|_| token))
    }

    fn release_local(&self, user_id: Uuid) {
        self.local
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&user_id);
    }
}

impl GenerationPermit {
    pub async fn release(mut self) {
        if let (Some(conn), Some(token)) = (&self.guard.redis, &self.redis_token) {
            let mut conn = conn.clone();
            let result: redis::RedisResult<i32> = redis::Script::new(RELEASE_SCRIPT)
                .key(redis_key(self.user_id))
                .arg(token)
                .invoke_async(&mut conn)
                .await;
            if let Err(e) = result {
                warn!(user_id = %self.user_id, error = %e, "Failed to release generation guard");
            }
        } else {
            self.guard.release_local(self.user_id);
        }
        self.released = true;
    }
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        if !self.released && self.redis_token.is_none() {
            self.guard.release_local(self.user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquire_is_refused() {
        let guard = GenerationGuard::local();
        let user_id = Uuid::new_v4();

        let permit = guard.try_acquire(user_id).await;
        assert!(permit.is_some());
        assert!(guard.try_acquire(user_id).await.is_none());

        // Other users are independent
        assert!(guard.try_acquire(Uuid::new_v4()).await.is_some());

        permit.unwrap().release().await;
        assert!(guard.try_acquire(user_id).await.is_some());
    }

    #[tokio::test]
    async fn test_drop_releases_local_slot() {
        let guard = GenerationGuard::local();
        let user_id = Uuid::new_v4();

        {
            let _permit = guard.try_acquire(user_id).await.unwrap();
        }
        assert!(guard.try_acquire(user_id).await.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let guard = GenerationGuard::local();
        let clone = guard.clone();
        let user_id = Uuid::new_v4();

        let _permit = guard.try_acquire(user_id).await.unwrap();
        assert!(clone.try_acquire(user_id).await.is_none());
    }
}
