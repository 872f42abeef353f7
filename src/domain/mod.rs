// Domain layer: dataset descriptors, record models and ports (interfaces).

pub mod dataset;
pub mod model;
pub mod ports;
