use flockkit_auth::CredentialService;
use flockkit_mail::TracingMailer;
use flockkit_store::MemoryStore;

/// The concrete service wiring used by the server binary.
pub type AuthService = CredentialService<MemoryStore, TracingMailer>;

/// Application state shared across all handlers
pub struct AppState {
    pub service: AuthService,
}

impl AppState {
    pub fn new(service: AuthService) -> Self {
        Self { service }
    }
}
