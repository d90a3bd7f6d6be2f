// Domain layer: calculation and persistence models plus the storage port.

pub mod model;
pub mod ports;
