//! Navigation gate. The decision only looks at whether a token is held, never
//! at whether it is still valid; the dashboard lookup catches stale tokens.

use crate::Destination;

const DEFAULT_LOGIN_PREFIXES: [&str; 3] = ["/login", "/register", "/verify-email"];
const DEFAULT_CALLBACK_PREFIXES: [&str; 1] = ["/auth/callback"];
const DEFAULT_UNGATED_PREFIXES: [&str; 4] = ["/api", "/static", "/favicon.ico", "/health"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToDashboard,
    RedirectToLogin,
}

impl GuardDecision {
    /// Redirect target, `None` when the navigation is allowed.
    #[must_use]
    pub fn destination(self) -> Option<Destination> {
        match self {
            Self::Allow => None,
            Self::RedirectToDashboard => Some(Destination::Dashboard),
            Self::RedirectToLogin => Some(Destination::Login),
        }
    }
}

/// Path areas the guard distinguishes.
#[derive(Clone, Debug)]
pub struct GuardRules {
    login_prefixes: Vec<String>,
    callback_prefixes: Vec<String>,
    ungated_prefixes: Vec<String>,
}

impl Default for GuardRules {
    fn default() -> Self {
        Self {
            login_prefixes: to_owned(&DEFAULT_LOGIN_PREFIXES),
            callback_prefixes: to_owned(&DEFAULT_CALLBACK_PREFIXES),
            ungated_prefixes: to_owned(&DEFAULT_UNGATED_PREFIXES),
        }
    }
}

impl GuardRules {
    #[must_use]
    pub fn with_login_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.login_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_callback_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.callback_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_ungated_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.ungated_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn is_login_area(&self, path: &str) -> bool {
        matches_any(&self.login_prefixes, path)
    }

    #[must_use]
    pub fn is_callback_area(&self, path: &str) -> bool {
        matches_any(&self.callback_prefixes, path)
    }

    /// API, static assets and the favicon bypass the guard entirely.
    #[must_use]
    pub fn is_gated(&self, path: &str) -> bool {
        !matches_any(&self.ungated_prefixes, path)
    }
}

/// Decide what happens to a navigation to `path`.
#[must_use]
pub fn decide(rules: &GuardRules, path: &str, has_token: bool) -> GuardDecision {
    let login_area = rules.is_login_area(path);

    if login_area && has_token {
        return GuardDecision::RedirectToDashboard;
    }

    if !login_area && !rules.is_callback_area(path) && !has_token {
        return GuardDecision::RedirectToLogin;
    }

    GuardDecision::Allow
}

fn matches_any(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

fn to_owned(prefixes: &[&str]) -> Vec<String> {
    prefixes.iter().map(ToString::to_string).collect()
}
