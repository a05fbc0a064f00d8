//! Operation scope: the identity context every engine call runs under.
//!
//! The session layer resolves the current user and hands the engine a plain
//! scope value. The engine never inspects HTTP or session state itself.

use serde::{Deserialize, Serialize};

use super::id::{BranchId, OrganizationId, UserId};

/// Role of the acting user within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Branch owner.
    Owner,
    /// Back-office employee (teller, accountant).
    Employee,
    /// Cooperative member.
    Member,
}

/// The (user, organization, branch) tuple an operation is scoped to.
///
/// Every posting, batch action, and read in the engine carries one of these;
/// the "one open batch per teller" invariant is keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationScope {
    /// The acting user.
    pub user_id: UserId,
    /// The organization the user is operating in.
    pub organization_id: OrganizationId,
    /// The branch the user is assigned to.
    pub branch_id: BranchId,
    /// The acting user's role.
    pub user_type: UserType,
}

impl OperationScope {
    /// Creates a new employee-scoped context.
    #[must_use]
    pub const fn employee(
        user_id: UserId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            branch_id,
            user_type: UserType::Employee,
        }
    }

    /// Returns true if the scope belongs to the given user.
    #[must_use]
    pub fn is_user(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
