//! Route table.
//!
//! Routes belong to exactly one of two mutually exclusive stacks. The
//! unauthenticated stack holds the sign-in screens, the authenticated stack
//! holds everything else.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stack {
    /// Login and signup screens.
    Unauthenticated,
    /// Screens that require a session.
    Authenticated,
}

impl Stack {
    /// Screen a redirect into this stack lands on.
    pub fn default_route(self) -> Route {
        match self {
            Self::Unauthenticated => Route::Login,
            Self::Authenticated => Route::Home,
        }
    }

    /// Routes in this stack, in tab order.
    pub fn routes(self) -> &'static [Route] {
        match self {
            Self::Unauthenticated => &[Route::Login, Route::Signup],
            Self::Authenticated => &[Route::Home, Route::Explore, Route::Profile],
        }
    }
}

/// A screen the shell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Sign in.
    Login,
    /// Create an account.
    Signup,
    /// Landing screen of the authenticated stack.
    Home,
    /// Library showcase.
    Explore,
    /// Account details.
    Profile,
}

impl Route {
    /// Every route.
    pub const ALL: [Self; 5] = [Self::Login, Self::Signup, Self::Home, Self::Explore, Self::Profile];

    /// Stack the route belongs to.
    pub fn stack(self) -> Stack {
        match self {
            Self::Login | Self::Signup => Stack::Unauthenticated,
            Self::Home | Self::Explore | Self::Profile => Stack::Authenticated,
        }
    }

    /// URL-style path.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Home => "/home",
            Self::Explore => "/explore",
            Self::Profile => "/profile",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Signup => "Create account",
            Self::Home => "Home",
            Self::Explore => "Explore",
            Self::Profile => "Profile",
        }
    }

    /// Next route in the same stack, wrapping around.
    pub fn next_in_stack(self) -> Self {
        let routes = self.stack().routes();
        let index = routes.iter().position(|r| *r == self).unwrap_or(0);
        routes[(index + 1) % routes.len()]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Path did not name a known route.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Accepts paths with or without the leading slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/');
        Self::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == name)
            .ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_partition_routes() {
        for route in Route::ALL {
            assert!(route.stack().routes().contains(&route), "{route} missing from its stack");
        }
        let total = Stack::Unauthenticated.routes().len() + Stack::Authenticated.routes().len();
        assert_eq!(total, Route::ALL.len());
    }

    #[test]
    fn default_routes_belong_to_their_stack() {
        assert_eq!(Stack::Unauthenticated.default_route(), Route::Login);
        assert_eq!(Stack::Authenticated.default_route(), Route::Home);
        for stack in [Stack::Unauthenticated, Stack::Authenticated] {
            assert_eq!(stack.default_route().stack(), stack);
        }
    }

    #[test]
    fn parse_accepts_paths_and_bare_names() {
        assert_eq!("/explore".parse::<Route>(), Ok(Route::Explore));
        assert_eq!("signup".parse::<Route>(), Ok(Route::Signup));
        assert_eq!("/admin".parse::<Route>(), Err(UnknownRoute("/admin".to_string())));
    }

    #[test]
    fn next_in_stack_wraps() {
        assert_eq!(Route::Home.next_in_stack(), Route::Explore);
        assert_eq!(Route::Profile.next_in_stack(), Route::Home);
        assert_eq!(Route::Signup.next_in_stack(), Route::Login);
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&Route::Home).ok().as_deref(), Some("\"home\""));
        assert_eq!(
            serde_json::to_string(&Stack::Unauthenticated).ok().as_deref(),
            Some("\"unauthenticated\"")
        );
    }
}
