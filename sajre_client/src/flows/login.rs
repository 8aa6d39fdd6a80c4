use super::FlowError;
use crate::api::ApiClient;
use crate::error::{StorageError, ValidationError};
use crate::models::SessionUser;
use crate::routes::Route;
use crate::session::Session;

pub const LOGIN_FAILED: &str = "Login failed";

/// Signs in and returns the role's landing page.
///
/// When `admin_email` matches, the admin endpoint is tried first and a
/// failure there falls through to the regular login.
#[tracing::instrument(name = "Login", skip(api, session, admin_email, password))]
pub async fn login(
    api: &ApiClient,
    session: &mut Session,
    admin_email: Option<&str>,
    email: &str,
    password: &str,
) -> Result<Route, FlowError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::new("Email and password are required").into());
    }

    if admin_email.is_some_and(|admin| !admin.is_empty() && admin == email) {
        match api.admin_login(email, password).await {
            Ok(res) => {
                session.sign_in(res.token, res.data)?;
                return Ok(Route::Admin);
            }
            Err(e) => tracing::info!(error = %e, "admin login failed, trying regular login"),
        }
    }

    let res = api.login(email, password).await?;
    let route = landing_for(&res.user);
    session.sign_in(res.token, res.user)?;
    Ok(route)
}

fn landing_for(user: &SessionUser) -> Route {
    Route::for_role(user.role)
}

/// Drops token and user. The caller goes back to the home page.
pub fn logout(session: &mut Session) -> Result<Route, StorageError> {
    session.sign_out()?;
    tracing::info!("signed out");
    Ok(Route::Home)
}
