use auth::{AuthService, AuthorizationGuard};

/// Application state shared across all handlers
pub struct AppState {
    pub auth_service: AuthService,
    pub guard: AuthorizationGuard,
}

impl AppState {
    pub fn new(auth_service: AuthService, guard: AuthorizationGuard) -> Self {
        Self { auth_service, guard }
    }
}
