// Domain layer: records, derived quality objects and the ports the pipeline talks through.

pub mod model;
pub mod ports;
