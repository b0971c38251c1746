use secrecy::{ExposeSecret, SecretString};

/// Runtime configuration shared by the admin handlers.
#[derive(Clone)]
pub struct AdminConfig {
    passkey: SecretString,
    secure_cookies: bool,
}

impl AdminConfig {
    #[must_use]
    pub fn new(passkey: SecretString, secure_cookies: bool) -> Self {
        Self {
            passkey,
            secure_cookies,
        }
    }

    #[must_use]
    pub fn passkey_matches(&self, candidate: &str) -> bool {
        self.passkey.expose_secret() == candidate
    }

    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("passkey", &"***")
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}
