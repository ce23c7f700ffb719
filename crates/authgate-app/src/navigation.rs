//! Navigation capability.

use authgate_core::Route;

/// Declarative redirect-to-route collaborator.
///
/// The shell decides where the user belongs; implementations only move the
/// platform's navigation state to match.
pub trait NavigationController {
    /// Replace the current screen with `route`.
    fn redirect(&mut self, route: Route);
}

/// Navigation controller that records every redirect.
///
/// Used by drivers that have no native navigation stack of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteHistory {
    redirects: Vec<Route>,
}

impl RouteHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent redirect target. `None` before the first redirect.
    pub fn current(&self) -> Option<Route> {
        self.redirects.last().copied()
    }

    /// All redirects, oldest first.
    pub fn redirects(&self) -> &[Route] {
        &self.redirects
    }
}

impl NavigationController for RouteHistory {
    fn redirect(&mut self, route: Route) {
        tracing::debug!(%route, "redirect");
        self.redirects.push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_redirects_in_order() {
        let mut history = RouteHistory::new();
        assert_eq!(history.current(), None);

        history.redirect(Route::Login);
        history.redirect(Route::Home);

        assert_eq!(history.current(), Some(Route::Home));
        assert_eq!(history.redirects(), &[Route::Login, Route::Home]);
    }
}
