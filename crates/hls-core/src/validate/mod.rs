pub mod checks;
pub mod engine;
pub mod finding;
pub mod report;

pub use checks::{default_checks, Check, CheckContext};
pub use engine::Validator;
pub use finding::{Finding, Severity};
pub use report::{NodeReport, Summary, ValidationReport};
