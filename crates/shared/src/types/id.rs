//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where a
//! `TransactionBatchId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user (teller or officer).");
typed_id!(OrganizationId, "Unique identifier for a cooperative organization.");
typed_id!(BranchId, "Unique identifier for a branch.");
typed_id!(MemberProfileId, "Unique identifier for a member profile.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(TransactionId, "Unique identifier for a teller transaction.");
typed_id!(LedgerEntryId, "Unique identifier for a general ledger entry.");
typed_id!(
    AdjustmentEntryId,
    "Unique identifier for a manual adjustment entry."
);
typed_id!(
    TransactionBatchId,
    "Unique identifier for a teller transaction batch."
);
typed_id!(BatchFundingId, "Unique identifier for a batch funding record.");
typed_id!(LoanTransactionId, "Unique identifier for a loan transaction.");
typed_id!(MediaId, "Unique identifier for a stored media object.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_ids_are_distinct_types() {
        // Compile-time property: this function only accepts a BranchId.
        fn takes_branch(id: BranchId) -> Uuid {
            id.into_inner()
        }

        let branch = BranchId::new();
        assert_eq!(takes_branch(branch), branch.0);
    }

    #[test]
    fn test_id_roundtrip_through_string() {
        let id = TransactionBatchId::new();
        let parsed = TransactionBatchId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_new_ids_are_version_7() {
        let a = LedgerEntryId::new();
        let b = LedgerEntryId::new();
        assert_eq!(a.0.get_version_num(), 7);
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let raw = Uuid::now_v7();
        assert_eq!(AccountId::from_uuid(raw).into_inner(), raw);
    }
}
