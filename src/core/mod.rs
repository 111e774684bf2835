pub mod client;
pub mod protocol;
pub mod provider;
pub mod server;

pub use crate::domain::model::{Project, UserGroup};
pub use crate::domain::ports::{ConfigProvider, DataSource, HarborApi, Resource};
pub use crate::utils::error::Result;
