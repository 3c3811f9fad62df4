#![allow(dead_code)]

use async_trait::async_trait;
use cart::ports::HashStore;
use shared::{Error, Result, TtlSecs};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub const TTL: TtlSecs = TtlSecs(3600);

/// In-memory stand-in for Redis hashes.
/// Records every command it receives and can be told to fail.
#[derive(Default)]
pub struct ScriptedHashStore {
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    ttls: Mutex<HashMap<String, u64>>,
    commands: Mutex<Vec<String>>,
    fail_command: Mutex<Option<&'static str>>,
    fail_all: AtomicBool,
}

impl ScriptedHashStore {
    /// Fail the next command with this name (e.g. "HSET")
    pub fn fail_next(&self, command: &'static str) {
        *self.fail_command.lock().unwrap() = Some(command);
    }

    pub fn fail_all(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().unwrap().clear();
    }

    pub fn expired_keys(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| c.strip_prefix("EXPIRE ").map(str::to_string))
            .collect()
    }

    pub fn hash(&self, key: &str) -> HashMap<String, String> {
        self.hashes.lock().unwrap().get(key).cloned().unwrap_or_default()
    }

    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.ttls.lock().unwrap().get(key).copied()
    }

    pub fn seed(&self, key: &str, field: &str, value: &str) {
        self.hashes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    fn record(&self, command: &'static str, args: String) -> Result<()> {
        self.commands.lock().unwrap().push(format!("{} {}", command, args));

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(Error::Backend("connection refused".into()));
        }
        let mut fail_command = self.fail_command.lock().unwrap();
        if *fail_command == Some(command) {
            *fail_command = None;
            return Err(Error::Backend(format!("{} timed out", command)));
        }
        Ok(())
    }

    /// Redis drops a hash once its last field is gone
    fn prune(&self, hashes: &mut HashMap<String, HashMap<String, String>>, key: &str) {
        if hashes.get(key).is_some_and(|h| h.is_empty()) {
            hashes.remove(key);
            self.ttls.lock().unwrap().remove(key);
        }
    }
}

#[async_trait]
impl HashStore for ScriptedHashStore {
    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.record("HINCRBY", format!("{} {} {}", key, field, delta))?;
        let mut hashes = self.hashes.lock().unwrap();
        let hash = hashes.entry(key.to_string()).or_default();
        let current = match hash.get(field) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| Error::Backend("hash value is not an integer".into()))?,
            None => 0,
        };
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.record("HSET", format!("{} {}", key, field))?;
        self.seed(key, field, value);
        Ok(())
    }

    async fn hset_multiple(&self, key: &str, items: &[(String, String)]) -> Result<()> {
        self.record("HMSET", format!("{} {}", key, items.len()))?;
        for (field, value) in items {
            self.seed(key, field, value);
        }
        Ok(())
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>> {
        self.record("HGETALL", key.to_string())?;
        Ok(self.hash(key))
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        self.record("HEXISTS", format!("{} {}", key, field))?;
        Ok(self.hash(key).contains_key(field))
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool> {
        self.record("HDEL", format!("{} {}", key, field))?;
        let mut hashes = self.hashes.lock().unwrap();
        let removed = hashes
            .get_mut(key)
            .is_some_and(|hash| hash.remove(field).is_some());
        self.prune(&mut hashes, key);
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl: TtlSecs) -> Result<()> {
        self.record("EXPIRE", format!("{} {}", key, ttl.0))?;
        if self.hashes.lock().unwrap().contains_key(key) {
            self.ttls.lock().unwrap().insert(key.to_string(), ttl.0);
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.record("DEL", key.to_string())?;
        self.hashes.lock().unwrap().remove(key);
        self.ttls.lock().unwrap().remove(key);
        Ok(())
    }
}
