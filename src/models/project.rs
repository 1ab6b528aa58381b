// SPDX-License-Identifier: MIT

//! Project and membership models.
//!
//! The member list is embedded in the project document so that role checks
//! and the last-admin invariant are a single-document read-modify-write.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Membership role within a project.
///
/// The owner is not a separate role: the owning user is always present in
/// the member list as an admin and can never be demoted or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    /// Parse a role from its wire representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Whether this role may mutate board content.
    pub fn can_edit_board(self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

/// Project type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ProjectKind {
    Todo,
    Jira,
    Health,
    Mixed,
}

/// A (user, role) pair embedded in the project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub role: Role,
}

/// Project document stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Document ID (UUID v4)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Owner user ID; always an admin member
    pub owner_id: String,
    /// Embedded member list
    pub members: Vec<Member>,
    /// Denormalized member user IDs for array-contains listing queries.
    /// Kept in lockstep with `members` by every mutation.
    pub member_ids: Vec<String>,
    pub kind: ProjectKind,
    pub created_at: String,
    pub updated_at: String,
}

/// Errors from member-list mutations, mapped to API errors at the call site.
#[derive(Debug, PartialEq, Eq)]
pub enum MemberError {
    /// Target user is not in the member list
    NotAMember,
    /// Target user is already in the member list
    AlreadyMember,
    /// The owner cannot be demoted or removed
    OwnerImmutable,
    /// The mutation would leave the project without an admin
    LastAdmin,
}

impl Project {
    /// Look up a member's role. `None` when the user is not a member.
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }

    fn admin_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == Role::Admin)
            .count()
    }

    fn sync_member_ids(&mut self) {
        self.member_ids = self.members.iter().map(|m| m.user_id.clone()).collect();
    }

    /// Add a new member. Fails if the user is already a member.
    pub fn add_member(&mut self, user_id: String, role: Role) -> Result<(), MemberError> {
        if self.role_of(&user_id).is_some() {
            return Err(MemberError::AlreadyMember);
        }
        self.members.push(Member { user_id, role });
        self.sync_member_ids();
        Ok(())
    }

    /// Change an existing member's role.
    ///
    /// Refuses to touch the owner and refuses a demotion that would leave
    /// the project with zero admins.
    pub fn update_member_role(&mut self, user_id: &str, role: Role) -> Result<(), MemberError> {
        if user_id == self.owner_id {
            return Err(MemberError::OwnerImmutable);
        }
        let current = self.role_of(user_id).ok_or(MemberError::NotAMember)?;

        if current == Role::Admin && role != Role::Admin {
            // Demoting an admin; make sure another admin remains.
            let remaining = self
                .members
                .iter()
                .filter(|m| m.role == Role::Admin && m.user_id != user_id)
                .count();
            if remaining == 0 {
                return Err(MemberError::LastAdmin);
            }
        }

        let member = self
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or(MemberError::NotAMember)?;
        member.role = role;
        Ok(())
    }

    /// Remove a member. Same owner and last-admin protections as role
    /// changes.
    pub fn remove_member(&mut self, user_id: &str) -> Result<(), MemberError> {
        if user_id == self.owner_id {
            return Err(MemberError::OwnerImmutable);
        }
        let member = self
            .members
            .iter()
            .find(|m| m.user_id == user_id)
            .ok_or(MemberError::NotAMember)?;

        if member.role == Role::Admin && self.admin_count() == 1 {
            return Err(MemberError::LastAdmin);
        }

        self.members.retain(|m| m.user_id != user_id);
        self.sync_member_ids();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with(owner: &str, extra: &[(&str, Role)]) -> Project {
        let mut members = vec![Member {
            user_id: owner.to_string(),
            role: Role::Admin,
        }];
        members.extend(extra.iter().map(|(id, role)| Member {
            user_id: (*id).to_string(),
            role: *role,
        }));
        let member_ids = members.iter().map(|m| m.user_id.clone()).collect();
        Project {
            id: "p1".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            owner_id: owner.to_string(),
            members,
            member_ids,
            kind: ProjectKind::Mixed,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_role_parse_closed_set() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("editor"), Some(Role::Editor));
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse("ADMIN"), None);
    }

    #[test]
    fn test_add_member_rejects_duplicate() {
        let mut project = project_with("alice", &[("bob", Role::Editor)]);
        assert_eq!(
            project.add_member("bob".to_string(), Role::Viewer),
            Err(MemberError::AlreadyMember)
        );
    }

    #[test]
    fn test_add_member_updates_member_ids() {
        let mut project = project_with("alice", &[]);
        project.add_member("bob".to_string(), Role::Viewer).unwrap();
        assert!(project.member_ids.contains(&"bob".to_string()));
        assert_eq!(project.role_of("bob"), Some(Role::Viewer));
    }

    #[test]
    fn test_owner_cannot_be_demoted_or_removed() {
        let mut project = project_with("alice", &[("bob", Role::Admin)]);
        assert_eq!(
            project.update_member_role("alice", Role::Viewer),
            Err(MemberError::OwnerImmutable)
        );
        assert_eq!(
            project.remove_member("alice"),
            Err(MemberError::OwnerImmutable)
        );
    }

    #[test]
    fn test_last_admin_cannot_be_demoted_or_removed() {
        // When the owner is a member the invariant is covered by
        // OwnerImmutable; a document predating the owner-is-admin rule
        // can have an owner_id absent from the member list, and there the
        // last-admin check is the only protection.
        let mut project = project_with("alice", &[("bob", Role::Admin)]);
        project.owner_id = "founder".to_string();
        project.members.retain(|m| m.user_id != "alice");
        project.sync_member_ids();
        assert_eq!(project.admin_count(), 1);

        assert_eq!(
            project.update_member_role("bob", Role::Editor),
            Err(MemberError::LastAdmin)
        );
        assert_eq!(project.remove_member("bob"), Err(MemberError::LastAdmin));

        // Still mutable once a second admin exists.
        project.add_member("carol".to_string(), Role::Admin).unwrap();
        assert!(project.update_member_role("bob", Role::Editor).is_ok());
    }

    #[test]
    fn test_admin_invariant_over_mutation_sequence() {
        let mut project = project_with("alice", &[]);
        project.add_member("bob".to_string(), Role::Admin).unwrap();
        project.add_member("carol".to_string(), Role::Viewer).unwrap();
        project.update_member_role("carol", Role::Editor).unwrap();
        project.remove_member("bob").unwrap();
        project.update_member_role("carol", Role::Admin).unwrap();
        assert!(project.admin_count() >= 1);
        assert_eq!(project.role_of("carol"), Some(Role::Admin));
    }

    #[test]
    fn test_remove_missing_member() {
        let mut project = project_with("alice", &[]);
        assert_eq!(project.remove_member("ghost"), Err(MemberError::NotAMember));
    }

    #[test]
    fn test_viewer_cannot_edit_board() {
        assert!(!Role::Viewer.can_edit_board());
        assert!(Role::Editor.can_edit_board());
        assert!(Role::Admin.can_edit_board());
    }
}
