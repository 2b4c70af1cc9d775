//! Route table used by the navigation guard. Only the auth requirement matters
//! here; which view a route renders is the caller's business.

/// A navigable destination.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Route {
    path: String,
    name: Option<String>,
    requires_auth: bool,
}

impl Route {
    /// A destination that needs a verified session.
    #[must_use]
    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            requires_auth: true,
        }
    }

    /// A destination open to anyone.
    #[must_use]
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            requires_auth: false,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Matches a normalized destination; `:param` segments match any segment.
    fn matches(&self, destination: &str) -> bool {
        let pattern = segments(&self.path);
        let target = segments(destination);
        pattern.len() == target.len()
            && pattern
                .iter()
                .zip(&target)
                .all(|(expected, actual)| expected.starts_with(':') || expected == actual)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The attendance dashboard's routes: everything behind a session except
    /// login, logout and the public check-in page.
    #[must_use]
    pub fn dashboard() -> Self {
        Self::new(vec![
            Route::protected("/"),
            Route::protected("/messages"),
            Route::protected("/users"),
            Route::protected("/groups"),
            Route::protected("/absenceHistories"),
            Route::protected("/incapacityPermissions"),
            Route::protected("/mealLogs"),
            Route::protected("/vacationPermissions"),
            Route::protected("/tardinessPermissions"),
            Route::public("/login").named("Login"),
            Route::public("/logout").named("logout"),
            Route::public("/asistencia/registro-entrada").named("AsistenciaEntrada"),
        ])
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// All routes matching the destination. Query string, fragment and a
    /// trailing slash are ignored.
    #[must_use]
    pub fn matched(&self, destination: &str) -> Vec<&Route> {
        let destination = strip_suffixes(destination);
        self.routes
            .iter()
            .filter(|route| route.matches(destination))
            .collect()
    }

    /// True when any matched route needs a session. Unknown destinations are public.
    #[must_use]
    pub fn requires_auth(&self, destination: &str) -> bool {
        self.matched(destination)
            .iter()
            .any(|route| route.requires_auth())
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name() == Some(name))
    }
}

fn strip_suffixes(destination: &str) -> &str {
    let end = destination.find(['?', '#']).unwrap_or(destination.len());
    &destination[..end]
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}
