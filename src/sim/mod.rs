//! Profile generation loop, reference dispatch, and run reporting.

pub mod dispatch;
pub mod generator;
pub mod report;
pub mod types;

pub use dispatch::ReferenceDispatch;
pub use generator::ProfileGenerator;
pub use report::RunReport;
pub use types::{SimConfig, StepRecord};
