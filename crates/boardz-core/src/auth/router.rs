/// Route the application shows when there is no session.
pub const LOGIN_ROUTE: &[&str] = &["Login"];

/// Navigation capability used to send the user back to the login view.
///
/// Navigation is fire-and-forget: implementations report failures through
/// their own channels.
pub trait Router: Send + Sync {
    fn navigate(&self, route: &[&str]);
}
