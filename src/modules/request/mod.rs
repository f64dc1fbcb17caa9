pub mod lifecycle;

use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

/// Lifecycle states of a relationship request. Accepted and Declined are
/// terminal; the only transition is out of Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Decline,
}

pub fn is_self_pair(a: &Uuid, b: &Uuid) -> bool {
    a == b
}

/// Canonical form of an unordered pair. Friendship rows and the pending
/// uniqueness index are keyed on this ordering, so (A,B) and (B,A) collide.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_ignores_direction() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        assert_eq!(canonical_pair(a, b), (a, b));
    }

    #[test]
    fn self_pair_detected() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
        assert!(is_self_pair(&a, &a));
        assert!(!is_self_pair(&a, &b));
    }
}
