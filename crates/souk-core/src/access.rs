//! # Access Control
//!
//! Role gate decisions for marketplace operations.
//!
//! ## The Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Role Gate Decision Flow                           │
//! │                                                                         │
//! │   request actor ──► profile present? ──no──► MissingProfile (500-ish)   │
//! │                           │                                             │
//! │                          yes                                            │
//! │                           │                                             │
//! │                    role == required? ──no──► AccessDenied (flash+303)   │
//! │                           │                                             │
//! │                          yes                                            │
//! │                           ▼                                             │
//! │                      operation runs                                     │
//! │                                                                         │
//! │   A missing profile and a wrong role are DIFFERENT failures: one is    │
//! │   a data integrity gap, the other is a normal user outcome.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Profile, Role};

/// Requires that the actor holds exactly `required`.
///
/// Roles are not hierarchical: an admin is not implicitly a seller, and a
/// seller is not implicitly a buyer. The match is exhaustive so a new role
/// variant forces this function to be revisited.
pub fn require_role(
    user_id: &str,
    profile: Option<&Profile>,
    required: Role,
) -> CoreResult<()> {
    let profile = profile.ok_or_else(|| CoreError::MissingProfile {
        user_id: user_id.to_string(),
    })?;

    let held = profile.role;
    let allowed = match (held, required) {
        (Role::Buyer, Role::Buyer) => true,
        (Role::Seller, Role::Seller) => true,
        (Role::Admin, Role::Admin) => true,
        (Role::Buyer, _) | (Role::Seller, _) | (Role::Admin, _) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::AccessDenied { required })
    }
}

/// Requires that `owner_id` matches the actor.
///
/// Used for edit/delete on listings and confirm on orders: role checks say
/// WHAT you may do, ownership checks say to WHICH rows.
pub fn require_owner(actor_id: &str, owner_id: &str, subject_id: &str) -> CoreResult<()> {
    if actor_id == owner_id {
        Ok(())
    } else {
        Err(CoreError::NotOwner {
            listing_id: subject_id.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role) -> Profile {
        Profile {
            user_id: "u-1".to_string(),
            role,
            phone: None,
        }
    }

    #[test]
    fn test_matching_role_passes() {
        let p = profile(Role::Seller);
        assert!(require_role("u-1", Some(&p), Role::Seller).is_ok());
    }

    #[test]
    fn test_wrong_role_is_denied() {
        let p = profile(Role::Buyer);
        let err = require_role("u-1", Some(&p), Role::Seller).unwrap_err();
        assert_eq!(
            err,
            CoreError::AccessDenied {
                required: Role::Seller
            }
        );
    }

    #[test]
    fn test_admin_is_not_implicitly_seller() {
        let p = profile(Role::Admin);
        assert!(require_role("u-1", Some(&p), Role::Seller).is_err());
        assert!(require_role("u-1", Some(&p), Role::Buyer).is_err());
        assert!(require_role("u-1", Some(&p), Role::Admin).is_ok());
    }

    #[test]
    fn test_missing_profile_is_its_own_error() {
        let err = require_role("u-orphan", None, Role::Buyer).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingProfile {
                user_id: "u-orphan".to_string()
            }
        );
    }

    #[test]
    fn test_ownership_check() {
        assert!(require_owner("u-1", "u-1", "l-9").is_ok());
        let err = require_owner("u-2", "u-1", "l-9").unwrap_err();
        assert_eq!(
            err,
            CoreError::NotOwner {
                listing_id: "l-9".to_string()
            }
        );
    }
}
