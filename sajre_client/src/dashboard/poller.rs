//! Background refresh of a mentor's student list.

use crate::api::ApiClient;
use crate::models::StudentRecord;
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Longest wait between failing polls, in multiples of the poll interval.
pub const MAX_BACKOFF_FACTOR: u32 = 8;

/// Polls `/api/mentor/students` every `interval`. After a failed poll the
/// wait doubles from `interval` up to [`MAX_BACKOFF_FACTOR`] times it, and a
/// successful poll restores the normal cadence.
///
/// Dropping the poller stops the task.
pub struct StudentPoller {
    handle: JoinHandle<()>,
    students: watch::Receiver<Vec<StudentRecord>>,
}

impl StudentPoller {
    pub fn spawn(api: ApiClient, token: String, interval: Duration, initial: Vec<StudentRecord>) -> Self {
        let (tx, rx) = watch::channel(initial);
        let handle = tokio::spawn(async move {
            let mut backoff = retry_policy(interval);
            let mut delay = interval;
            loop {
                tokio::time::sleep(delay).await;
                match api.get_mentor_students(&token).await {
                    Ok(res) => {
                        let students = res.into_data();
                        tracing::debug!(count = students.len(), "students refreshed");
                        tx.send_replace(students);
                        backoff.reset();
                        delay = interval;
                    }
                    Err(e) => {
                        delay = retry_delay(&mut backoff, interval);
                        tracing::warn!(error = %e, retry_in = ?delay, "failed to fetch students");
                    }
                }
            }
        });
        Self { handle, students: rx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<StudentRecord>> {
        self.students.clone()
    }

    pub fn latest(&self) -> Vec<StudentRecord> {
        self.students.borrow().clone()
    }

    /// Same as dropping the poller.
    pub fn stop(self) {}
}

impl Drop for StudentPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn retry_policy(interval: Duration) -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(interval)
        .with_randomization_factor(0.0)
        .with_multiplier(2.0)
        .with_max_interval(interval * MAX_BACKOFF_FACTOR)
        .with_max_elapsed_time(None)
        .build()
}

fn retry_delay(policy: &mut ExponentialBackoff, interval: Duration) -> Duration {
    let cap = interval * MAX_BACKOFF_FACTOR;
    policy.next_backoff().unwrap_or(cap).clamp(interval, cap)
}
