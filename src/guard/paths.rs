//! Fixed route literals understood by the guard.
//!
//! Anything outside [`PUBLIC_ROUTES`] is a private route and requires a fully
//! confirmed session to render.

pub const LANDING: &str = "/";
pub const LOGIN: &str = "/login";
pub const DASHBOARD: &str = "/dashboard";

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &[
    LANDING,
    LOGIN,
    "/signup",
    "/forgot-password",
    "/reset-password",
    "/verify-email",
    "/privacy",
    "/terms",
];

/// Strip query string, fragment and trailing slashes so `/login/?next=x`
/// compares equal to `/login`.
#[must_use]
pub fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { LANDING } else { trimmed }
}

#[must_use]
pub fn is_public(path: &str) -> bool {
    let path = normalize(path);
    PUBLIC_ROUTES.contains(&path)
}

#[must_use]
pub fn is_landing(path: &str) -> bool {
    normalize(path) == LANDING
}
