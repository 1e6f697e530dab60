//! Lambdacfn Template
//!
//! This crate provides the composition engine for lambdacfn. Builders each
//! produce a [`Fragment`]; the [`Composer`] folds them into one [`Template`]:
//!
//! - Keys must be unique per section unless re-declared with an identical value
//! - The dispatch condition is synthesized when no fragment declared it
//! - The parameter count stays within the platform limit
//! - Parameters and fragment variables become the function's environment
//! - Accumulated policies are appended to the execution roles
//!
//! Composed templates can be [`link`]ed into a single deployable unit.

mod compose;
mod error;
mod fragment;
pub mod intrinsic;
mod template;

pub use compose::{
  Composer, DISPATCH_ARN_PARAMETER, DISPATCH_CONDITION, DISPATCH_ROLE, MAX_PARAMETERS,
  PRIMARY_ROLE, dispatch_condition, link, merge,
};
pub use error::ComposeError;
pub use fragment::{Entries, Fragment, Section};
pub use template::{FORMAT_VERSION, Template};
