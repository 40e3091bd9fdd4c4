pub mod progress;
pub mod rules;

pub use progress::{derive_project_status, project_progress, ProjectStatus};
pub use rules::{
    can_access_project, can_delete_project, can_manage_members, can_modify_comment, guard_permits,
};
