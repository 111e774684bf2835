// Handlers that map the host schema onto Harbor API calls.

pub mod data_sources;
pub mod resources;

#[cfg(test)]
pub(crate) mod test_support;
