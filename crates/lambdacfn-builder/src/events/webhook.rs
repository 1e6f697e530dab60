//! HTTP webhook trigger.
//!
//! Builds an API gateway in front of the function with a `prod` stage, an
//! API key, an invoke permission and three gateway alarms.

use lambdacfn_config::{FunctionDef, WebhookDef};
use lambdacfn_template::intrinsic::{account_id, get_att, join, reference, region, stack_name};
use lambdacfn_template::{Fragment, Section};
use serde_json::{Value, json};
use tracing::debug;

use crate::alarms::{ALARM_DOCS, ALARM_TOPIC};
use crate::context::BuildContext;
use crate::error::BuildError;

/// Methods accepted for a webhook, matched case-insensitively.
pub const HTTP_METHODS: [&str; 7] = ["GET", "HEAD", "PUT", "PATCH", "OPTIONS", "POST", "DELETE"];

const STAGE: &str = "prod";

struct GatewayAlarm {
  name: &'static str,
  metric: &'static str,
  threshold: &'static str,
}

const GATEWAY_ALARMS: [GatewayAlarm; 3] = [
  GatewayAlarm {
    name: "Latency",
    metric: "Latency",
    threshold: "4",
  },
  GatewayAlarm {
    name: "4xx",
    metric: "4xxError",
    threshold: "100",
  },
  GatewayAlarm {
    name: "Count",
    metric: "Count",
    threshold: "10000",
  },
];

pub fn build_webhook_event(
  def: &FunctionDef,
  webhook: &WebhookDef,
  ctx: &BuildContext,
) -> Result<Fragment, BuildError> {
  let method = http_method(webhook)?;
  let method_responses = responses(
    "methodResponses",
    webhook.method_responses.as_ref(),
    default_method_responses,
  )?;
  let integration_responses = responses(
    "integrationResponses",
    webhook.integration_responses.as_ref(),
    default_integration_responses,
  )?;

  let name = &def.name;
  let prefix = format!("{name}Webhook");
  let gateway = format!("{prefix}ApiGateway");
  let resource = format!("{prefix}Resource");
  let method_name = format!("{prefix}Method");
  let deployment = format!("{prefix}ApiDeployment{}", ctx.deployment_nonce);
  let api_key = format!("{prefix}ApiKey");
  let path_part = name.to_lowercase();

  let mut integration = json!({
    "Type": "AWS",
    "IntegrationHttpMethod": "POST",
    "IntegrationResponses": integration_responses,
    "Uri": join(vec![
      json!("arn:aws:apigateway:"),
      region(),
      json!(":lambda:path/2015-03-31/functions/"),
      get_att(name, "Arn"),
      json!("/invocations"),
    ]),
  });
  if let (Some(overrides), Some(target)) = (&webhook.integration, integration.as_object_mut()) {
    for (key, value) in overrides {
      target.insert(key.clone(), value.clone());
    }
  }

  let mut method_properties = json!({
    "RestApiId": reference(&gateway),
    "ResourceId": reference(&resource),
    "AuthorizationType": "None",
    "HttpMethod": method,
    "MethodResponses": method_responses,
    "Integration": integration,
  });
  if webhook.api_key {
    method_properties["ApiKeyRequired"] = json!(true);
  }

  let mut fragment = Fragment::new();
  fragment
    .insert(
      Section::Resources,
      gateway.clone(),
      json!({
        "Type": "AWS::ApiGateway::RestApi",
        "Properties": { "Name": stack_name(), "FailOnWarnings": "true" }
      }),
    )
    .insert(
      Section::Resources,
      resource,
      json!({
        "Type": "AWS::ApiGateway::Resource",
        "Properties": {
          "ParentId": get_att(&gateway, "RootResourceId"),
          "RestApiId": reference(&gateway),
          "PathPart": path_part,
        }
      }),
    )
    .insert(
      Section::Resources,
      method_name.clone(),
      json!({ "Type": "AWS::ApiGateway::Method", "Properties": method_properties }),
    )
    .insert(
      Section::Resources,
      deployment.clone(),
      json!({
        "Type": "AWS::ApiGateway::Deployment",
        "DependsOn": method_name,
        "Properties": { "RestApiId": reference(&gateway), "StageName": STAGE }
      }),
    )
    .insert(
      Section::Resources,
      api_key.clone(),
      json!({
        "Type": "AWS::ApiGateway::ApiKey",
        "DependsOn": deployment,
        "Properties": {
          "Name": stack_name(),
          "Enabled": "true",
          "StageKeys": [{ "RestApiId": reference(&gateway), "StageName": STAGE }]
        }
      }),
    )
    .insert(
      Section::Resources,
      format!("{prefix}Permission"),
      json!({
        "Type": "AWS::Lambda::Permission",
        "Properties": {
          "FunctionName": get_att(name, "Arn"),
          "Action": "lambda:InvokeFunction",
          "Principal": "apigateway.amazonaws.com",
          "SourceArn": join(vec![
            json!("arn:aws:execute-api:"),
            region(),
            json!(":"),
            account_id(),
            json!(":"),
            reference(&gateway),
            json!("/*"),
          ]),
        }
      }),
    );

  for alarm in &GATEWAY_ALARMS {
    fragment.insert(
      Section::Resources,
      format!("{prefix}Api{}Alarm", alarm.name),
      json!({
        "Type": "AWS::CloudWatch::Alarm",
        "Properties": {
          "AlarmDescription": format!("{ALARM_DOCS}Api{}Alarm", alarm.name),
          "EvaluationPeriods": "5",
          "Statistic": "Sum",
          "Threshold": alarm.threshold,
          "Period": "60",
          "AlarmActions": [reference(ALARM_TOPIC)],
          "Namespace": "AWS/ApiGateway",
          "Dimensions": [{ "Name": "APIName", "Value": stack_name() }],
          "ComparisonOperator": "GreaterThanThreshold",
          "MetricName": alarm.metric,
        }
      }),
    );
  }

  fragment.insert(
    Section::Outputs,
    format!("{prefix}APIEndpoint"),
    json!({
      "Value": join(vec![
        json!("https://"),
        reference(&gateway),
        json!(".execute-api."),
        region(),
        json!(format!(".amazonaws.com/{STAGE}/")),
        json!(name.to_lowercase()),
      ])
    }),
  );
  if webhook.api_key {
    fragment.insert(Section::Outputs, api_key.clone(), json!({ "Value": reference(&api_key) }));
  }

  debug!(function = %name, method = %method, api_key = webhook.api_key, "webhook built");
  Ok(fragment)
}

fn http_method(webhook: &WebhookDef) -> Result<String, BuildError> {
  let method = webhook
    .method
    .as_deref()
    .filter(|m| !m.is_empty())
    .ok_or(BuildError::MissingHttpMethod)?;
  let upper = method.to_uppercase();
  if HTTP_METHODS.contains(&upper.as_str()) {
    Ok(upper)
  } else {
    Err(BuildError::InvalidHttpMethod {
      method: method.to_string(),
    })
  }
}

fn responses(
  field: &'static str,
  supplied: Option<&Value>,
  default: fn() -> Value,
) -> Result<Value, BuildError> {
  match supplied {
    None => Ok(default()),
    Some(value @ Value::Array(_)) => Ok(value.clone()),
    Some(_) => Err(BuildError::InvalidWebhookResponses { field }),
  }
}

fn default_method_responses() -> Value {
  json!([
    {
      "StatusCode": "200",
      "ResponseModels": { "application/json": "Empty" }
    },
    {
      "StatusCode": "500",
      "ResponseModels": { "application/json": "Empty" }
    }
  ])
}

fn default_integration_responses() -> Value {
  json!([
    { "StatusCode": "200" },
    {
      "StatusCode": "500",
      "SelectionPattern": "^(?i)(error|exception).*"
    }
  ])
}
