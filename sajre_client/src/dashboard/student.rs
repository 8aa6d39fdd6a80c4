//! Student profile page. Reads the local store first and falls back to the
//! signed-in session user.

use super::DashboardError;
use crate::api::ApiClient;
use crate::models::{Activity, UserStats};
use crate::session::Session;
use crate::store::{LocalStore, UserUpdate};

pub fn fallback_activities() -> Vec<Activity> {
    vec![
        Activity::new("login", "Logged in", "Last login from Chrome browser", "2 hours ago"),
        Activity::new("course", "Course Progress", "Completed Module 3: Advanced React", "1 day ago"),
        Activity::new("achievement", "Achievement Unlocked", "Earned 'Quick Learner' badge", "3 days ago"),
    ]
}

/// Share of the 20-course track completed, as a percentage. With nothing
/// completed yet the ring shows 75.
pub fn completion_progress(stats: &UserStats) -> f64 {
    if stats.courses_completed > 0 {
        (f64::from(stats.courses_completed) / 20.0 * 100.0).min(100.0)
    } else {
        75.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileView {
    /// Present only for store-backed profiles; edits need it.
    pub store_id: Option<String>,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub username: String,
    pub phone: String,
    pub bio: String,
}

#[derive(Debug, Clone, Default)]
pub struct StudentDashboard {
    pub profile: ProfileView,
    pub stats: UserStats,
    pub activities: Vec<Activity>,
}

impl StudentDashboard {
    /// `None` when neither the store nor the session knows the user.
    #[tracing::instrument(name = "Load student dashboard", skip_all)]
    pub async fn load(api: &ApiClient, session: &Session, store: &LocalStore) -> Option<Self> {
        let profile = match (store.current_user(), session.user()) {
            (Some(entity), _) => ProfileView {
                store_id: Some(entity.id.clone()),
                username: entity.username.clone(),
                email: entity.email.clone(),
                phone: entity.phone.clone().unwrap_or_default(),
                bio: entity.bio.clone().unwrap_or_default(),
                photo: entity.photo.clone(),
            },
            (None, Some(user)) => ProfileView {
                store_id: None,
                username: user.name.clone(),
                email: user.email.clone(),
                ..ProfileView::default()
            },
            (None, None) => return None,
        };
        let stats = session.user().and_then(|u| u.stats.clone()).unwrap_or_default();

        let mut activities = match session.token() {
            Some(token) => match api.get_recent_activities(token).await {
                Ok(res) => res.into_data(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load activities");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        if activities.is_empty() {
            activities = fallback_activities();
        }
        Some(Self {
            profile,
            stats,
            activities,
        })
    }

    pub fn progress(&self) -> f64 {
        completion_progress(&self.stats)
    }

    /// Writes the edit to the local store. Session-only profiles cannot be
    /// edited and report `false`.
    pub fn save_profile(&mut self, store: &mut LocalStore, edit: ProfileEdit) -> Result<bool, DashboardError> {
        let Some(id) = self.profile.store_id.clone() else {
            return Ok(false);
        };
        let updated = store.update_user(
            &id,
            UserUpdate {
                username: Some(edit.username.clone()),
                phone: Some(edit.phone.clone()),
                bio: Some(edit.bio.clone()),
                ..UserUpdate::default()
            },
        )?;
        if updated {
            self.profile.username = edit.username;
            self.profile.phone = edit.phone;
            self.profile.bio = edit.bio;
        }
        Ok(updated)
    }

    /// Stores an uploaded picture, typically a data URL.
    pub fn set_photo(&mut self, store: &mut LocalStore, photo: String) -> Result<bool, DashboardError> {
        let Some(id) = self.profile.store_id.clone() else {
            return Ok(false);
        };
        let updated = store.update_user(
            &id,
            UserUpdate {
                photo: Some(photo.clone()),
                ..UserUpdate::default()
            },
        )?;
        if updated {
            self.profile.photo = Some(photo);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_caps_at_one_hundred() {
        let mut stats = UserStats::default();
        assert_eq!(completion_progress(&stats), 75.0);
        stats.courses_completed = 5;
        assert_eq!(completion_progress(&stats), 25.0);
        stats.courses_completed = 30;
        assert_eq!(completion_progress(&stats), 100.0);
    }
}
