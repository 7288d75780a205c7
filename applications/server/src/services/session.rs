/// Admin session verification
///
/// The write surface (upload, delete) sits behind an external identity
/// boundary. Here that boundary is reduced to a shared bearer token checked
/// per request; everything route-side only ever asks "is this an admin
/// session".
pub struct SessionService {
    admin_token: String,
}

impl SessionService {
    pub fn new(admin_token: String) -> Self {
        Self { admin_token }
    }

    /// Verify an admin bearer token
    pub fn verify_admin_token(&self, token: &str) -> bool {
        !self.admin_token.is_empty() && constant_time_eq(token.as_bytes(), self.admin_token.as_bytes())
    }
}

/// Comparison that does not short-circuit on the first mismatched byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_configured_token() {
        let service = SessionService::new("s3cret".to_string());
        assert!(service.verify_admin_token("s3cret"));
        assert!(!service.verify_admin_token("s3cret "));
        assert!(!service.verify_admin_token(""));
    }

    #[test]
    fn empty_configured_token_rejects_everything() {
        let service = SessionService::new(String::new());
        assert!(!service.verify_admin_token(""));
        assert!(!service.verify_admin_token("anything"));
    }
}
