//! Session gate at the operator boundary.
//!
//! The shared-secret gate is a plain equality check: no hashing, no rate
//! limiting, no expiry. Stronger credentials slot in behind `SessionGate`.

pub trait SessionGate {
    fn verify(&self, code: &str) -> bool;
}

pub struct SharedSecretGate {
    secret: String,
}

impl SharedSecretGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl SessionGate for SharedSecretGate {
    fn verify(&self, code: &str) -> bool {
        code == self.secret
    }
}
