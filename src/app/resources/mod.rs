pub mod usergroup;

pub use usergroup::UserGroupResource;
