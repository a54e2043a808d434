//! Redis key-value adapter.
//!
//! Implements [`KeyValueStore`] on top of the `redis` crate's blocking
//! connection.
//!
//! ## Reconnection policy
//!
//! The connection is opened lazily.  When a request fails at the
//! connection level the socket is dropped and the adapter waits an
//! exponential backoff (250 ms → 500 ms → 1 s … capped at 5 s by default)
//! before dialing again.  While that window is open `get` fails fast with
//! [`StoreError::Unavailable`], so the sampling loop never blocks on a
//! dead server for longer than one connect timeout.

use std::time::{Duration, Instant};

use log::{info, warn};
use redis::{Client, Connection, RedisError};

use crate::app::ports::KeyValueStore;
use crate::config::BridgeConfig;
use crate::error::StoreError;

// ───────────────────────────────────────────────────────────────
// Backoff
// ───────────────────────────────────────────────────────────────

/// Exponential reconnect delay.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    next_attempt: Option<Instant>,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
            current: initial,
            next_attempt: None,
        }
    }

    /// Whether a connection attempt is allowed at `now`.
    pub fn ready(&self, now: Instant) -> bool {
        self.next_attempt.is_none_or(|at| now >= at)
    }

    /// Record a failure at `now`: the next attempt waits the current delay,
    /// and the delay after that doubles (up to the cap).
    pub fn failed(&mut self, now: Instant) {
        self.next_attempt = Some(now + self.current);
        self.current = (self.current * 2).min(self.max);
    }

    /// Forget past failures after a successful connect.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.next_attempt = None;
    }

    /// Delay that the next failure will impose.
    pub fn current_delay(&self) -> Duration {
        self.current
    }
}

// ───────────────────────────────────────────────────────────────
// Error mapping
// ───────────────────────────────────────────────────────────────

fn classify(e: &RedisError) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else if e.is_connection_dropped() || e.is_connection_refusal() || e.is_io_error() {
        StoreError::ConnectionLost
    } else {
        StoreError::Rejected
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

/// Redis-backed store with lazy connect and backoff-gated reconnects.
pub struct RedisStore {
    client: Client,
    conn: Option<Connection>,
    timeout: Duration,
    backoff: ReconnectBackoff,
}

impl RedisStore {
    /// Parse `url` and prepare a client.  No network traffic yet.
    pub fn new(url: &str, timeout: Duration, backoff: ReconnectBackoff) -> Result<Self, RedisError> {
        Ok(Self {
            client: Client::open(url)?,
            conn: None,
            timeout,
            backoff,
        })
    }

    pub fn from_config(cfg: &BridgeConfig) -> Result<Self, RedisError> {
        Self::new(
            &cfg.store_url,
            cfg.store_timeout(),
            ReconnectBackoff::new(
                Duration::from_millis(u64::from(cfg.reconnect_initial_ms)),
                Duration::from_millis(u64::from(cfg.reconnect_max_ms)),
            ),
        )
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Dial now instead of on the first `get`.  Failure is not fatal: the
    /// loop keeps retrying through the backoff.
    pub fn connect(&mut self) -> Result<(), StoreError> {
        self.connection().map(|_| ())
    }

    fn open_connection(&self) -> Result<Connection, RedisError> {
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }

    fn connection(&mut self) -> Result<&mut Connection, StoreError> {
        if self.conn.is_none() {
            let now = Instant::now();
            if !self.backoff.ready(now) {
                return Err(StoreError::Unavailable);
            }
            match self.open_connection() {
                Ok(conn) => {
                    info!("Redis: connected to {}", self.client.get_connection_info().addr);
                    self.backoff.reset();
                    self.conn = Some(conn);
                }
                Err(e) => {
                    let wait = self.backoff.current_delay();
                    self.backoff.failed(now);
                    warn!("Redis: connect failed ({}), retry in {:?}", e, wait);
                    return Err(classify(&e));
                }
            }
        }
        self.conn.as_mut().ok_or(StoreError::Unavailable)
    }

    fn drop_connection(&mut self, reason: &RedisError) {
        if self.conn.take().is_some() {
            warn!("Redis: connection dropped ({})", reason);
        }
        self.backoff.failed(Instant::now());
    }
}

impl KeyValueStore for RedisStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connection()?;
        // Fetch raw bytes so a non-UTF-8 value surfaces as a parse failure
        // in the loop rather than a store error.
        match redis::cmd("GET").arg(key).query::<Option<Vec<u8>>>(conn) {
            Ok(reply) => Ok(reply.map(|bytes| String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => {
                let err = classify(&e);
                if err.is_connection_level() {
                    self.drop_connection(&e);
                }
                Err(err)
            }
        }
    }
}
