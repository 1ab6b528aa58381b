// SPDX-License-Identifier: MIT

//! Project membership and role checks.
//!
//! This is the single gate every project-scoped operation passes
//! through. Role checks read the embedded member list; mutations run
//! inside a Firestore transaction on the project document so the
//! last-admin invariant holds under concurrent updates.

use futures_util::future::try_join_all;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::user::normalize_email;
use crate::models::{MemberError, Project, Role};

/// Fetch a project or fail with NotFound.
pub async fn require_project(db: &FirestoreDb, project_id: &str) -> Result<Project> {
    db.get_project(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {} not found", project_id)))
}

/// A member's role, or `None` when the user is not a member. A missing
/// project is NotFound; "no role" is an expected outcome at access-check
/// call sites, not an error.
pub async fn get_user_role(
    db: &FirestoreDb,
    project_id: &str,
    user_id: &str,
) -> Result<Option<Role>> {
    let project = require_project(db, project_id).await?;
    Ok(project.role_of(user_id))
}

/// Require any membership role on the project.
pub fn require_member(project: &Project, user_id: &str) -> Result<Role> {
    project
        .role_of(user_id)
        .ok_or_else(|| AppError::Forbidden("not a member of this project".to_string()))
}

/// Require a role allowed to mutate board content (editor or admin).
pub fn require_editor(project: &Project, user_id: &str) -> Result<Role> {
    let role = require_member(project, user_id)?;
    if !role.can_edit_board() {
        return Err(AppError::Forbidden(
            "viewers cannot modify the board".to_string(),
        ));
    }
    Ok(role)
}

/// Require the admin role. Membership management is admin-gated, not
/// owner-gated: any admin can manage members.
pub fn require_admin(project: &Project, user_id: &str) -> Result<Role> {
    let role = require_member(project, user_id)?;
    if role != Role::Admin {
        return Err(AppError::Forbidden(
            "admin role required".to_string(),
        ));
    }
    Ok(role)
}

/// Member entry enriched with display fields joined from the user
/// collection at read time, so a later profile change is reflected
/// immediately.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberProfile {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// List members with display fields. Forbidden for non-members.
pub async fn list_members(
    db: &FirestoreDb,
    project_id: &str,
    actor_id: &str,
) -> Result<Vec<MemberProfile>> {
    let project = require_project(db, project_id).await?;
    require_member(&project, actor_id)?;

    let users = try_join_all(
        project
            .members
            .iter()
            .map(|member| db.get_user(&member.user_id)),
    )
    .await?;

    let profiles = project
        .members
        .iter()
        .zip(users)
        .map(|(member, user)| {
            // A missing user record shows up as a blank profile rather
            // than failing the whole listing.
            let (name, email, avatar_url) = match user {
                Some(u) => (u.name, u.email, u.avatar_url),
                None => (String::new(), String::new(), None),
            };
            MemberProfile {
                user_id: member.user_id.clone(),
                role: member.role,
                name,
                email,
                avatar_url,
            }
        })
        .collect();

    Ok(profiles)
}

fn map_member_error(err: MemberError) -> AppError {
    match err {
        MemberError::NotAMember => AppError::NotFound("member not found".to_string()),
        MemberError::AlreadyMember => AppError::Conflict("user is already a member".to_string()),
        MemberError::OwnerImmutable => {
            AppError::Conflict("the project owner cannot be demoted or removed".to_string())
        }
        MemberError::LastAdmin => {
            AppError::Conflict("a project must keep at least one admin".to_string())
        }
    }
}

/// Add a member by email. Admin-gated.
pub async fn add_member(
    db: &FirestoreDb,
    project_id: &str,
    email: &str,
    role: Role,
    actor_id: &str,
) -> Result<MemberProfile> {
    let project = require_project(db, project_id).await?;
    require_admin(&project, actor_id)?;

    let target = db
        .get_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user with email {}", email)))?;

    let target_id = target.id.clone();
    db.update_project_atomic(project_id, |project| {
        project
            .add_member(target_id.clone(), role)
            .map_err(map_member_error)
    })
    .await?;

    tracing::info!(project_id, user_id = %target.id, ?role, "Member added");

    Ok(MemberProfile {
        user_id: target.id,
        role,
        name: target.name,
        email: target.email,
        avatar_url: target.avatar_url,
    })
}

/// Change a member's role. Admin-gated; owner and last-admin protected.
pub async fn update_member_role(
    db: &FirestoreDb,
    project_id: &str,
    member_user_id: &str,
    role: Role,
    actor_id: &str,
) -> Result<Project> {
    let project = require_project(db, project_id).await?;
    require_admin(&project, actor_id)?;

    let updated = db
        .update_project_atomic(project_id, |project| {
            project
                .update_member_role(member_user_id, role)
                .map_err(map_member_error)
        })
        .await?;

    tracing::info!(project_id, user_id = member_user_id, ?role, "Member role updated");

    Ok(updated)
}

/// Remove a member. Admin-gated; owner and last-admin protected.
pub async fn remove_member(
    db: &FirestoreDb,
    project_id: &str,
    member_user_id: &str,
    actor_id: &str,
) -> Result<Project> {
    let project = require_project(db, project_id).await?;
    require_admin(&project, actor_id)?;

    let updated = db
        .update_project_atomic(project_id, |project| {
            project.remove_member(member_user_id).map_err(map_member_error)
        })
        .await?;

    tracing::info!(project_id, user_id = member_user_id, "Member removed");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Member, ProjectKind};

    fn project(owner: &str, extra: &[(&str, Role)]) -> Project {
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
            kind: ProjectKind::Jira,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_require_member_rejects_stranger() {
        let p = project("alice", &[]);
        assert!(matches!(
            require_member(&p, "mallory"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_editor_rejects_viewer() {
        let p = project("alice", &[("bob", Role::Viewer), ("carol", Role::Editor)]);
        assert!(matches!(
            require_editor(&p, "bob"),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(require_editor(&p, "carol").unwrap(), Role::Editor);
        assert_eq!(require_editor(&p, "alice").unwrap(), Role::Admin);
    }

    #[test]
    fn test_require_admin_rejects_editor() {
        let p = project("alice", &[("bob", Role::Editor)]);
        assert!(matches!(
            require_admin(&p, "bob"),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_admin(&p, "alice").is_ok());
    }

    #[test]
    fn test_member_error_mapping() {
        assert!(matches!(
            map_member_error(MemberError::LastAdmin),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            map_member_error(MemberError::AlreadyMember),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            map_member_error(MemberError::NotAMember),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            map_member_error(MemberError::OwnerImmutable),
            AppError::Conflict(_)
        ));
    }
}
