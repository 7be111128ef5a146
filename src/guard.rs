use crate::domain::models::Role;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Manager,
    Employee,
}

impl Route {
    /// Unknown paths land on the login page.
    pub fn from_path(path: &str) -> Route {
        match path.trim().trim_end_matches('/') {
            "/signup" => Route::Signup,
            "/manager" => Route::Manager,
            "/employee" => Route::Employee,
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Manager => "/manager",
            Route::Employee => "/employee",
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Manager => Some(Role::Manager),
            Route::Employee => Some(Role::Employee),
            Route::Login | Route::Signup => None,
        }
    }
}

pub fn landing_route(role: Role) -> Route {
    match role {
        Role::Manager => Route::Manager,
        Role::Employee => Route::Employee,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

pub fn guard(required: Role, session: Option<&Session>) -> GuardDecision {
    match session {
        Some(session) if session.role == required => GuardDecision::Allow,
        _ => GuardDecision::Redirect(Route::Login),
    }
}

/// Resolves a navigation request to the route that actually renders.
pub fn navigate(path: &str, session: Option<&Session>) -> Route {
    let route = Route::from_path(path);
    match route.required_role() {
        None => route,
        Some(role) => match guard(role, session) {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(target) => target,
        },
    }
}
