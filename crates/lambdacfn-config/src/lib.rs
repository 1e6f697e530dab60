//! Lambdacfn Config
//!
//! This crate contains the serializable function definition types for lambdacfn.
//! A [`FunctionDef`] describes one serverless function before any template
//! fragments are built from it.
//!
//! Definitions are usually loaded from JSON:
//!
//! ```json
//! {
//!   "name": "myFunction",
//!   "parameters": {
//!     "githubToken": { "Type": "String", "Description": "token for the api" }
//!   },
//!   "eventSources": { "schedule": { "expression": "rate(5 minutes)" } },
//!   "memorySize": 256
//! }
//! ```
//!
//! The builders take these types, validate them, and turn them into template
//! fragments for composition.

mod destination;
mod event;
mod function;
mod parameter;

pub use destination::{DestinationKind, SnsDestinationDef};
pub use event::{CloudwatchEventDef, EventSourceKind, ScheduleDef, WebhookDef};
pub use function::FunctionDef;
pub use parameter::ParameterDef;
