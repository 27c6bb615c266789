use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::ports::{Notice, Notifier, RenderContext, Renderer};
use crate::domain::service::Service;

/// Navigable views, addressed as `#/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    VerifyEmail,
    Profile,
    Requests,
    Employees,
    Departments,
    Accounts,
}

impl View {
    pub const ALL: [View; 9] = [
        View::Home,
        View::Login,
        View::Register,
        View::VerifyEmail,
        View::Profile,
        View::Requests,
        View::Employees,
        View::Departments,
        View::Accounts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Login => "login",
            View::Register => "register",
            View::VerifyEmail => "verify-email",
            View::Profile => "profile",
            View::Requests => "requests",
            View::Employees => "employees",
            View::Departments => "departments",
            View::Accounts => "accounts",
        }
    }

    /// Location fragment that navigates to this view.
    pub fn location(&self) -> String {
        match self {
            View::Home => "#/".to_string(),
            other => format!("#/{}", other.name()),
        }
    }

    pub fn parse(name: &str) -> Option<View> {
        View::ALL.into_iter().find(|v| v.name() == name)
    }

    /// Map a location (`#/requests`, `/requests`, `requests`, `#/`, empty) to a view.
    /// Anything unrecognized is Home.
    pub fn from_location(location: &str) -> View {
        let route = location.trim();
        let route = route.strip_prefix('#').unwrap_or(route);
        let route = route.strip_prefix('/').unwrap_or(route);
        if route.is_empty() {
            return View::Home;
        }
        View::parse(route).unwrap_or(View::Home)
    }

    /// Requires an authenticated identity.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            View::Profile | View::Requests | View::Employees | View::Departments | View::Accounts
        )
    }

    /// Additionally requires the Admin role.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, View::Employees | View::Departments | View::Accounts)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// View the location asked for (Home for unknown locations).
    pub requested: View,
    /// View that was activated and rendered.
    pub active: View,
    /// Notice emitted when the gate redirected.
    pub notice: Option<Notice>,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        self.requested != self.active
    }
}

/// Authorization gate in front of the render callbacks.
///
/// Holds no per-navigation state: each call re-derives access from the service's
/// current session.
pub struct Router {
    notifier: Arc<dyn Notifier>,
}

impl Router {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    #[instrument(name = "hr_portal.router.navigate", skip(self, service, renderer))]
    pub fn navigate(
        &self,
        service: &Service,
        location: &str,
        renderer: &mut dyn Renderer,
    ) -> Navigation {
        let requested = View::from_location(location);

        let (active, notice) = match Self::check(service, requested) {
            Ok(view) => (view, None),
            Err((to, notice)) => {
                warn!(requested = %requested, redirect = %to, "{}", notice.message);
                self.notifier.notify(notice.clone());
                (to, Some(notice))
            }
        };

        debug!(active = %active, "view activated");
        Self::render(service, active, renderer);
        Navigation {
            requested,
            active,
            notice,
        }
    }

    /// Gate decision: the view to activate, or the redirect target with its notice.
    pub fn check(service: &Service, view: View) -> Result<View, (View, Notice)> {
        if !view.is_protected() {
            return Ok(view);
        }
        let Some(account) = service.current_account() else {
            return Err((
                View::Login,
                Notice::warning("Please log in to access this page"),
            ));
        };
        if view.is_admin_only() && !account.is_admin() {
            return Err((View::Home, Notice::danger("Admin access required")));
        }
        Ok(view)
    }

    fn render(service: &Service, view: View, renderer: &mut dyn Renderer) {
        let pending = service.pending_verification();
        let ctx = RenderContext {
            collections: service.store().collections(),
            current: service.current_account(),
            pending_verification: pending.as_deref(),
        };
        match view {
            View::Home => renderer.render_home(&ctx),
            View::Login => renderer.render_login(&ctx),
            View::Register => renderer.render_register(&ctx),
            View::VerifyEmail => renderer.render_verify_email(&ctx),
            View::Profile => renderer.render_profile(&ctx),
            View::Requests => renderer.render_requests(&ctx),
            View::Employees => renderer.render_employees(&ctx),
            View::Departments => renderer.render_departments(&ctx),
            View::Accounts => renderer.render_accounts(&ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_map_to_views() {
        assert_eq!(View::from_location(""), View::Home);
        assert_eq!(View::from_location("#/"), View::Home);
        assert_eq!(View::from_location("#/verify-email"), View::VerifyEmail);
        assert_eq!(View::from_location("/accounts"), View::Accounts);
        assert_eq!(View::from_location("requests"), View::Requests);
        assert_eq!(View::from_location("#/nowhere"), View::Home);
        assert_eq!(View::from_location("#/Accounts"), View::Home);
    }

    #[test]
    fn location_round_trips_for_every_view() {
        for view in View::ALL {
            assert_eq!(View::from_location(&view.location()), view);
        }
    }

    #[test]
    fn admin_only_views_are_protected() {
        for view in View::ALL {
            if view.is_admin_only() {
                assert!(view.is_protected(), "{view}");
            }
        }
        assert!(!View::Login.is_protected());
        assert!(View::Profile.is_protected() && !View::Profile.is_admin_only());
    }
}
