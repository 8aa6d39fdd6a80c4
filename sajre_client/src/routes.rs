//! Client route table.

use crate::models::Role;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Gallery,
    Register,
    Contact,
    Career,
    Otp,
    Courses,
    UserDashboard,
    Login,
    Payment,
    Admin,
    Mentor,
    Vendor,
}

impl Route {
    pub const ALL: [Route; 14] = [
        Route::Home,
        Route::About,
        Route::Gallery,
        Route::Register,
        Route::Contact,
        Route::Career,
        Route::Otp,
        Route::Courses,
        Route::UserDashboard,
        Route::Login,
        Route::Payment,
        Route::Admin,
        Route::Mentor,
        Route::Vendor,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Gallery => "/gallery",
            Route::Register => "/register",
            Route::Contact => "/contact",
            Route::Career => "/career",
            Route::Otp => "/otp",
            Route::Courses => "/courses",
            Route::UserDashboard => "/userdashboard",
            Route::Login => "/login",
            Route::Payment => "/payment",
            Route::Admin => "/admin",
            Route::Mentor => "/mentor",
            Route::Vendor => "/vendor",
        }
    }

    /// Query strings and a trailing slash are ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Only the payment page is wrapped in the auth gate; dashboards do their
    /// own role check.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Payment)
    }

    /// Landing page after login.
    pub fn for_role(role: Role) -> Route {
        match role {
            Role::Admin => Route::Admin,
            Role::Vendor => Route::Vendor,
            Role::Mentor => Route::Mentor,
            Role::Student => Route::Courses,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
