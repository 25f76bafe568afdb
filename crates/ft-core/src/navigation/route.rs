use serde::{Deserialize, Serialize};

/// The top-level route group the user is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteSegment {
    Onboarding,
    Auth,
    App,
}

impl RouteSegment {
    pub const ALL: [RouteSegment; 3] = [RouteSegment::Onboarding, RouteSegment::Auth, RouteSegment::App];

    /// Classify a router path by its first segment.
    ///
    /// `/(onboarding)/goals` and `onboarding/goals` are onboarding, `/(auth)/…`
    /// is auth, anything else (tabs, modals, the root index) is the app.
    pub fn from_path(path: &str) -> Self {
        let first = path
            .split('/')
            .map(str::trim)
            .find(|segment| !segment.is_empty())
            .unwrap_or_default();
        let group = first.trim_start_matches('(').trim_end_matches(')');
        match group {
            "onboarding" => RouteSegment::Onboarding,
            "auth" => RouteSegment::Auth,
            _ => RouteSegment::App,
        }
    }
}

/// A legal redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    Onboarding,
    SignIn,
    Home,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Onboarding => "/(onboarding)",
            Destination::SignIn => "/(auth)/sign-in",
            Destination::Home => "/(tabs)",
        }
    }

    pub fn segment(&self) -> RouteSegment {
        match self {
            Destination::Onboarding => RouteSegment::Onboarding,
            Destination::SignIn => RouteSegment::Auth,
            Destination::Home => RouteSegment::App,
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
