pub mod project;
pub mod usergroup;

pub use project::ProjectDataSource;
pub use usergroup::UserGroupDataSource;
