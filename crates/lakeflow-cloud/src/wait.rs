//! TCP port readiness wait with exponential backoff
//!
//! A freshly booted instance is only handed downstream once its management
//! port accepts connections. The wait is bounded: connection attempts back
//! off exponentially, and an overall deadline turns the wait into a hard
//! failure instead of an indefinite hang.

use crate::error::{CloudError, Result};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

/// Backoff and deadline settings for a port wait
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Overall deadline for the whole wait
    pub deadline: Duration,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Cap on the per-attempt delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub multiplier: f64,
    /// Per-attempt connect timeout
    pub connect_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(300),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(15),
            multiplier: 2.0,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl WaitConfig {
    /// Delay to apply after the given zero-based attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// Block until `address:port` accepts a TCP connection or the deadline passes
pub async fn wait_for_port(address: &str, port: u16, config: &WaitConfig) -> Result<()> {
    let started = Instant::now();
    let target = format!("{}:{}", address, port);
    let mut attempt: u32 = 0;

    loop {
        let remaining = config.deadline.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            break;
        }

        let connect_budget = remaining.min(config.connect_timeout);
        match timeout(connect_budget, TcpStream::connect(&target)).await {
            Ok(Ok(_stream)) => {
                tracing::debug!(target = %target, attempts = attempt + 1, "port is open");
                return Ok(());
            }
            Ok(Err(e)) => {
                tracing::trace!(target = %target, error = %e, "connect refused, will retry");
            }
            Err(_) => {
                tracing::trace!(target = %target, "connect attempt timed out, will retry");
            }
        }

        let delay = config
            .delay_for_attempt(attempt)
            .min(config.deadline.saturating_sub(started.elapsed()));
        if delay.is_zero() {
            break;
        }
        sleep(delay).await;
        attempt += 1;
    }

    Err(CloudError::PortWaitTimeout {
        address: address.to_string(),
        port,
        waited_secs: started.elapsed().as_secs(),
    })
}
