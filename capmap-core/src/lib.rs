pub mod error;
pub mod report;
pub mod walk;

pub use error::ReportError;
pub use walk::{WalkOptions, WalkOutcome, execute_tree, execute_walk};
