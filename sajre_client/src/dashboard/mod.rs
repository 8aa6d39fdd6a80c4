//! Data shaping for the role dashboards. Every loader checks the session's
//! role before issuing a request.

pub mod admin;
pub mod mentor;
pub mod poller;
pub mod search;
pub mod student;
pub mod table;
pub mod vendor;

use crate::error::{AccessError, ApiError, StorageError, StoreError};
use crate::models::Activity;
use crate::routes::Route;
use thiserror::Error;

/// Entries shown in an activity feed.
pub const FEED_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Rejected(String),
}

impl DashboardError {
    /// Page to offer instead of the dashboard, if any.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            DashboardError::Access(e) => Some(e.redirect()),
            DashboardError::Api(ApiError::Http { status: 401, .. }) => Some(Route::Login),
            _ => None,
        }
    }
}

/// Head of the feed.
pub fn recent(activities: &[Activity]) -> &[Activity] {
    &activities[..activities.len().min(FEED_SIZE)]
}
