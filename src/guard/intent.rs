use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One-shot marker handed from the login flow to the first admission check.
///
/// It can be read at most once: [`LoginGrace::take`] returns the value and
/// clears it in the same step.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct LoginGrace(bool);

impl LoginGrace {
    #[must_use]
    pub const fn armed() -> Self {
        Self(true)
    }

    #[must_use]
    pub const fn is_armed(self) -> bool {
        self.0
    }

    /// Consume the grace. Subsequent calls return `false`.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.0)
    }

    /// Move the grace out, leaving this one cleared.
    pub fn transfer(&mut self) -> Self {
        Self(self.take())
    }

    /// Keep an existing arm, or adopt `other`'s.
    pub fn merge(&mut self, mut other: Self) {
        self.0 |= other.take();
    }
}

/// How the browser arrived at a route.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NavigationType {
    /// In-app link or button.
    #[default]
    Push,
    /// In-app redirect replacing the current entry.
    Replace,
    /// Browser back/forward.
    Pop,
}

impl NavigationType {
    #[must_use]
    pub const fn is_browser_history(self) -> bool {
        matches!(self, Self::Pop)
    }
}

/// A single "should this route render now" decision point.
///
/// Where the navigation came from and how the browser got here are tracked
/// by the interceptor through [`NavigationEvent`](super::interceptor::NavigationEvent);
/// admission only needs the target and the login grace.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NavigationIntent {
    pub target_path: String,
    #[serde(default)]
    pub just_completed_login: LoginGrace,
}

impl NavigationIntent {
    #[must_use]
    pub fn to(target_path: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn after_login(mut self) -> Self {
        self.just_completed_login = LoginGrace::armed();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grace_can_be_taken_once() {
        let mut grace = LoginGrace::armed();
        assert!(grace.take());
        assert!(!grace.take());
        assert!(!grace.is_armed());
    }

    #[test]
    fn transfer_moves_the_arm() {
        let mut source = LoginGrace::armed();
        let moved = source.transfer();
        assert!(moved.is_armed());
        assert!(!source.is_armed());
    }

    #[test]
    fn merge_adopts_other_arm() {
        let mut grace = LoginGrace::default();
        grace.merge(LoginGrace::armed());
        assert!(grace.is_armed());
        grace.merge(LoginGrace::default());
        assert!(grace.is_armed());
    }

    #[test]
    fn intent_builder() {
        let intent = NavigationIntent::to("/dashboard").after_login();
        assert_eq!(intent.target_path, "/dashboard");
        assert!(intent.just_completed_login.is_armed());
        assert!(!NavigationIntent::to("/dashboard").just_completed_login.is_armed());
    }

    #[test]
    fn intent_defaults_when_fields_missing() -> Result<(), serde_json::Error> {
        let intent: NavigationIntent = serde_json::from_str(r#"{"target_path":"/clients"}"#)?;
        assert_eq!(intent, NavigationIntent::to("/clients"));
        Ok(())
    }

    #[test]
    fn only_pop_is_browser_history() {
        assert!(NavigationType::Pop.is_browser_history());
        assert!(!NavigationType::Push.is_browser_history());
        assert!(!NavigationType::Replace.is_browser_history());
    }
}
