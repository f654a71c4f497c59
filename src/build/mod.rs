//! Compile engine for sasskit
//!
//! Turns one "file changed" trigger into a set of concurrent Sass compile
//! jobs and reports their outcomes.
//!
//! # Overview
//!
//! The engine consists of:
//! - **Resolution**: Which sources a change affects (partials, dependency index)
//! - **Planning**: Output paths and per-file post-processing decisions
//! - **Execution**: Concurrent jobs with a single terminal `Finished` event
//!
//! # Example
//!
//! ```ignore
//! use sasskit::build::{CompileOrchestrator, ConsoleProgress, RunOutcome};
//! use sasskit::service::{FsPersister, Prefixer, SassCommand};
//!
//! let orchestrator = CompileOrchestrator::new(SassCommand::default(), Prefixer, FsPersister);
//! if let RunOutcome::Started(run) = orchestrator.run(&path, &compile, &prefix) {
//!     let summary = run.wait(&ConsoleProgress::new()).await;
//!     println!("{}", summary.summary());
//! }
//! ```

pub mod event;
pub mod gate;
pub mod job;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod policy;
pub mod progress;
pub mod resolve;
pub mod result;
pub mod source;

pub use event::*;
pub use gate::*;
pub use job::*;
pub use options::*;
pub use orchestrator::*;
pub use output::*;
pub use policy::*;
pub use progress::*;
pub use resolve::*;
pub use result::*;
pub use source::*;
