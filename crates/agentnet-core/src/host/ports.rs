//! Ephemeral port allocation
//!
//! A port is claimed by binding it. The bound listener is handed to the
//! agent server, so no other start can land on the same port in between.

use crate::config::NetworkConfig;
use crate::error::{ConfigError, Error, HostError, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::net::TcpListener;
use tracing::{debug, trace};

/// Hands out bound listeners from the configured range
#[derive(Debug)]
pub struct PortAllocator {
    start: u16,
    end: u16,
    max_attempts: u32,
    cursor: AtomicU32,
}

impl PortAllocator {
    pub fn new(config: &NetworkConfig) -> Self {
        // Spread processes across the range so parallel hosts rarely collide
        let seed = chrono::Utc::now().timestamp_subsec_nanos() ^ std::process::id();
        Self {
            start: config.port_range_start,
            end: config.port_range_end,
            max_attempts: config.max_port_attempts,
            cursor: AtomicU32::new(seed),
        }
    }

    /// Number of ports in the range, zero when the range is empty
    fn span(&self) -> u32 {
        if self.start == 0 || self.start > self.end {
            0
        } else {
            u32::from(self.end - self.start) + 1
        }
    }

    fn next_candidate(&self) -> u16 {
        let offset = self.cursor.fetch_add(1, Ordering::Relaxed) % self.span();
        // offset < span <= 65536 - start, so the sum stays within u16
        self.start + offset as u16
    }

    /// Bind a free port on `host`, skipping ports `is_taken` reports as held
    pub async fn claim<F>(&self, host: &str, is_taken: F) -> Result<TcpListener>
    where
        F: Fn(u16) -> bool,
    {
        // Port 0 would let the OS pick a port outside the range
        if self.span() == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                key: "portRange".to_string(),
                reason: format!("{}-{} is empty", self.start, self.end),
            }));
        }

        let attempts = self.max_attempts.min(self.span());
        for _ in 0..attempts {
            let port = self.next_candidate();
            if is_taken(port) {
                trace!("Port {} held by a registered agent", port);
                continue;
            }
            match TcpListener::bind((host, port)).await {
                Ok(listener) => {
                    debug!("Claimed port {}", port);
                    return Ok(listener);
                }
                Err(e) => trace!("Port {} unavailable: {}", port, e),
            }
        }

        Err(Error::Host(HostError::PortExhausted {
            start: self.start,
            end: self.end,
            attempts,
        }))
    }
}
