//! The function resource itself.

use lambdacfn_config::FunctionDef;
use lambdacfn_template::intrinsic::{fn_if, get_att, join, reference, stack_name};
use lambdacfn_template::{DISPATCH_CONDITION, DISPATCH_ROLE, Fragment, PRIMARY_ROLE, Section};
use serde_json::json;
use tracing::debug;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::parameters::{CODE_BUCKET_PARAMETER, CODE_PREFIX_PARAMETER, REVISION_PARAMETER};

pub const DEFAULT_TIMEOUT: i64 = 60;
pub const MAX_TIMEOUT: i64 = 300;
pub const MIN_MEMORY_SIZE: i64 = 128;
pub const MAX_MEMORY_SIZE: i64 = 1536;
pub const MEMORY_INCREMENT: i64 = 64;
pub const DEFAULT_RUNTIME: &str = "nodejs6.10";
pub const RUNTIMES: [&str; 2] = ["nodejs4.3", "nodejs6.10"];

/// Build the function resource.
///
/// Its role switches between the primary and dispatch execution roles on the
/// dispatch condition. The environment is left empty; the composer fills it.
pub fn build_lambda(def: &FunctionDef, ctx: &BuildContext) -> Result<Fragment, BuildError> {
  let runtime = normalize_runtime(def.runtime.as_deref())?;
  let timeout = normalize_timeout(def.timeout);
  let memory_size = normalize_memory_size(def.memory_size);

  let resource = json!({
    "Type": "AWS::Lambda::Function",
    "Properties": {
      "Code": {
        "S3Bucket": reference(CODE_BUCKET_PARAMETER),
        "S3Key": join(vec![
          reference(CODE_PREFIX_PARAMETER),
          reference(REVISION_PARAMETER),
          json!(".zip"),
        ]),
      },
      "Role": fn_if(
        DISPATCH_CONDITION,
        get_att(DISPATCH_ROLE, "Arn"),
        get_att(PRIMARY_ROLE, "Arn"),
      ),
      "Description": stack_name(),
      "Environment": { "Variables": {} },
      "Handler": ctx.handler(),
      "Timeout": timeout,
      "MemorySize": memory_size,
      "Runtime": runtime,
    }
  });

  debug!(function = %def.name, timeout, memory_size, runtime, "function resource built");
  Ok(Fragment::new().with(Section::Resources, def.name.clone(), resource))
}

/// Seconds in `(0, 300]` are kept, longer clamps to 300, anything else
/// falls back to 60.
pub fn normalize_timeout(timeout: Option<i64>) -> i64 {
  match timeout {
    Some(t) if t > MAX_TIMEOUT => MAX_TIMEOUT,
    Some(t) if t > 0 => t,
    _ => DEFAULT_TIMEOUT,
  }
}

/// Megabytes in `[128, 1536]` round down to a multiple of 64; larger clamps
/// to 1536, smaller or absent to 128.
pub fn normalize_memory_size(memory_size: Option<i64>) -> i64 {
  match memory_size {
    Some(m) if m > MAX_MEMORY_SIZE => MAX_MEMORY_SIZE,
    Some(m) if m >= MIN_MEMORY_SIZE => m - m % MEMORY_INCREMENT,
    _ => MIN_MEMORY_SIZE,
  }
}

pub fn normalize_runtime(runtime: Option<&str>) -> Result<&str, BuildError> {
  match runtime {
    None => Ok(DEFAULT_RUNTIME),
    Some(r) if RUNTIMES.contains(&r) => Ok(r),
    Some(r) => Err(BuildError::InvalidRuntime {
      runtime: r.to_string(),
    }),
  }
}
