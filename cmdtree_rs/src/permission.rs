//! Authorization hook.
//!
//! The engine does not know what a permission means. When it is about to enter
//! a command that declares one, it asks the registry's [`Authorizer`] and fails
//! with [`crate::ParseError::PermissionDenied`] on a `false` answer.

/// Caller-supplied permission decision.
pub trait Authorizer<C>: Send + Sync {
    fn is_authorized(&self, caller: &C, permission: &str) -> bool;
}

impl<C, F> Authorizer<C> for F
where
    F: Fn(&C, &str) -> bool + Send + Sync,
{
    fn is_authorized(&self, caller: &C, permission: &str) -> bool {
        self(caller, permission)
    }
}

/// Authorizer that allows everything. Used when the host installs none.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl<C> Authorizer<C> for AllowAll {
    fn is_authorized(&self, _caller: &C, _permission: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_authorizer() {
        let only_admin = |caller: &&str, permission: &str| {
            *caller == "admin" || !permission.starts_with("admin.")
        };
        assert!(only_admin.is_authorized(&"admin", "admin.kick"));
        assert!(!only_admin.is_authorized(&"guest", "admin.kick"));
        assert!(only_admin.is_authorized(&"guest", "chat.say"));
        assert!(Authorizer::<&str>::is_authorized(&AllowAll, &"guest", "admin.kick"));
    }
}
