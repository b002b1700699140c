use zeroize::Zeroizing;

/// Microsoft account email and password.
///
/// Moved into the login stage and dropped once the form post is sent; the
/// password buffer is zeroized on drop.
#[derive(Clone)]
pub struct Credential {
    email: String,
    password: Zeroizing<String>,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Use carefully - sensitive data
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
