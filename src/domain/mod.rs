// Domain layer: remote models, the schema model, and ports (interfaces).

pub mod model;
pub mod ports;
pub mod schema;
