// Domain layer: Player API models and ports.

pub mod model;
pub mod ports;
