//! Lambdacfn Builder
//!
//! Turns a [`FunctionDef`](lambdacfn_config::FunctionDef) into a composed
//! [`Template`](lambdacfn_template::Template). Each builder emits one
//! fragment; [`FunctionBuilder`] runs them all and hands the fragments to the
//! composer:
//!
//! - parameters, including the code location and revision
//! - the function resource
//! - default service alarms and the alarm topic
//! - the primary execution role and the conditional dispatch role
//! - exactly one event source (an SNS topic when none is declared)
//! - optional notification destinations

mod alarms;
mod context;
mod destinations;
mod dispatch;
mod error;
mod events;
mod function;
mod lambda;
mod parameters;
mod roles;

pub use alarms::{
  ALARM_EMAIL_PARAMETER, ALARM_TOPIC, MAX_THRESHOLD, build_service_alarms, normalize_threshold,
};
pub use context::{BuildContext, handler_dir_from_path};
pub use destinations::{Destination, build_destination};
pub use dispatch::build_dispatch;
pub use error::BuildError;
pub use events::{
  EventSource, HTTP_METHODS, build_event_source, build_pattern_event, build_schedule_event,
  build_sns_event, build_webhook_event,
};
pub use function::FunctionBuilder;
pub use lambda::{
  DEFAULT_RUNTIME, DEFAULT_TIMEOUT, MAX_MEMORY_SIZE, MAX_TIMEOUT, MEMORY_INCREMENT,
  MIN_MEMORY_SIZE, RUNTIMES, build_lambda, normalize_memory_size, normalize_runtime,
  normalize_timeout,
};
pub use parameters::{
  CODE_BUCKET_PARAMETER, CODE_PREFIX_PARAMETER, REVISION_PARAMETER, build_parameters,
};
pub use roles::build_role;
