//! Who may touch a project, its bugs and their comments.
//!
//! Membership is the only gate for bugs and comments. The `admin` role adds
//! project deletion and member management. Comment edits belong to the
//! author alone, whatever their role.

use bugline_db::comments::models::Comment;
use bugline_db::guard::MutationGuard;
use bugline_db::projects::models::{MemberRole, ProjectMember};
use uuid::Uuid;

fn membership(user_id: Uuid, members: &[ProjectMember]) -> Option<&ProjectMember> {
    members.iter().find(|m| m.user_id == user_id)
}

/// True iff the user has a membership row in the project.
pub fn can_access_project(user_id: Uuid, members: &[ProjectMember]) -> bool {
    membership(user_id, members).is_some()
}

/// True iff the user's role in the project is `admin`.
pub fn can_delete_project(user_id: Uuid, members: &[ProjectMember]) -> bool {
    matches!(
        membership(user_id, members),
        Some(ProjectMember {
            role: MemberRole::Admin,
            ..
        })
    )
}

pub fn can_manage_members(user_id: Uuid, members: &[ProjectMember]) -> bool {
    can_delete_project(user_id, members)
}

pub fn can_modify_comment(user_id: Uuid, comment: &Comment) -> bool {
    comment.user_id == user_id
}

/// Evaluate a mutation guard in memory, the same predicate the database
/// applies. `author_id` is the row's author, when it has one.
pub fn guard_permits(
    guard: MutationGuard,
    members: &[ProjectMember],
    author_id: Option<Uuid>,
) -> bool {
    match guard {
        MutationGuard::Member(user_id) => can_access_project(user_id, members),
        MutationGuard::Admin(user_id) => can_delete_project(user_id, members),
        MutationGuard::Author(user_id) => author_id == Some(user_id),
    }
}
