//! Deploy Client
//!
//! Pushes an archive to a function as a direct code update, then polls the
//! management API until the update settles into a terminal state. Every
//! observed state is handed to the caller's reporter before the next wait.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::api::{FunctionApi, UpdateStatus};

/// Fixed wait between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct Deployer<A: FunctionApi> {
    api: A,
    poll_interval: Duration,
    poll_limit: Option<usize>,
}

impl<A: FunctionApi> Deployer<A> {
    /// Create a deploy client with the fixed poll interval and no poll
    /// bound.
    pub fn new(api: A) -> Self {
        Self {
            api,
            poll_interval: POLL_INTERVAL,
            poll_limit: None,
        }
    }

    /// Bound the number of polls; exceeding the bound is an error.
    pub fn with_poll_limit(mut self, limit: usize) -> Self {
        self.poll_limit = Some(limit);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit `archive` to `function_name` and wait for the update to
    /// settle.
    ///
    /// Each observed state, including the one returned synchronously by the
    /// update call, goes through `report` exactly once. A terminal failure
    /// status still returns `Ok(())`; callers see it through the reporter.
    /// Transport failures on the update call or any poll abort immediately.
    pub async fn deploy<F>(
        &self,
        function_name: &str,
        archive: Vec<u8>,
        mut report: F,
    ) -> Result<()>
    where
        F: FnMut(&UpdateStatus),
    {
        let mut status = self.api.update_function_code(function_name, archive).await?;
        let mut polls = 0usize;

        loop {
            report(&status);
            if status.state.is_terminal() {
                break;
            }
            if let Some(limit) = self.poll_limit {
                if polls >= limit {
                    bail!(
                        "update for {} still in progress after {} polls",
                        function_name,
                        limit
                    );
                }
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;
            status = self.api.get_function(function_name).await?;
        }

        Ok(())
    }
}
