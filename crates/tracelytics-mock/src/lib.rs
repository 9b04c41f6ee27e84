pub mod backend;
pub mod fixtures;
pub mod generator;

pub use backend::MockTraceSource;
pub use generator::TraceGenerator;
