/// Pages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Menu,
    Cart,
    Profile,
    Orders,
    Payment,
    TrackOrder,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Landing,
        Route::Login,
        Route::Menu,
        Route::Cart,
        Route::Profile,
        Route::Orders,
        Route::Payment,
        Route::TrackOrder,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Menu => "/menu",
            Route::Cart => "/cart",
            Route::Profile => "/profile",
            Route::Orders => "/orders",
            Route::Payment => "/payment",
            Route::TrackOrder => "/track-order",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Landing | Route::Login)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// Decides what a request for `path` ends up showing.
pub fn resolve(path: &str, logged_in: bool) -> Navigation {
    match Route::from_path(path) {
        Some(Route::Login) if logged_in => Navigation::Redirect(Route::Menu),
        Some(route) if route.requires_session() && !logged_in => Navigation::Redirect(Route::Login),
        Some(route) => Navigation::Render(route),
        None if logged_in => Navigation::Redirect(Route::Menu),
        None => Navigation::Redirect(Route::Landing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_pages_need_a_session() {
        for route in [Route::Menu, Route::Cart, Route::Profile, Route::Orders, Route::Payment, Route::TrackOrder] {
            assert_eq!(resolve(route.path(), false), Navigation::Redirect(Route::Login));
            assert_eq!(resolve(route.path(), true), Navigation::Render(route));
        }
        assert_eq!(resolve("/", false), Navigation::Render(Route::Landing));
        assert_eq!(resolve("/", true), Navigation::Render(Route::Landing));
    }

    #[test]
    fn login_page_bounces_signed_in_users() {
        assert_eq!(resolve("/login", true), Navigation::Redirect(Route::Menu));
        assert_eq!(resolve("/login/", false), Navigation::Render(Route::Login));
    }

    #[test]
    fn unknown_paths() {
        assert_eq!(resolve("/nope", true), Navigation::Redirect(Route::Menu));
        assert_eq!(resolve("/nope", false), Navigation::Redirect(Route::Landing));
    }
}
