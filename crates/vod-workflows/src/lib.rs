//! Background-workflow trigger for AI metadata generation.

pub mod error;
pub mod job;
pub mod trigger;

pub use error::{WorkflowError, WorkflowResult};
pub use job::{GenerationJob, GenerationKind};
pub use trigger::{WorkflowConfig, WorkflowTrigger};
