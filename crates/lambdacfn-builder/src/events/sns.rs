use lambdacfn_config::FunctionDef;
use lambdacfn_template::intrinsic::{
  account_id, get_att, join, join_with, reference, region, stack_name,
};
use lambdacfn_template::{Fragment, Section};
use serde_json::json;
use tracing::debug;

/// A topic subscribed to the function, plus an IAM user and access key that
/// external publishers can use to post to it.
pub fn build_sns_event(def: &FunctionDef) -> Fragment {
  let name = &def.name;
  let topic = format!("{name}SNSTopic");
  let user = format!("{name}SNSUser");
  let access_key = format!("{name}SNSUserAccessKey");

  let mut fragment = Fragment::new();
  fragment
    .insert(
      Section::Resources,
      format!("{name}SNSPermission"),
      json!({
        "Type": "AWS::Lambda::Permission",
        "Properties": {
          "FunctionName": get_att(name, "Arn"),
          "Action": "lambda:InvokeFunction",
          "Principal": "sns.amazonaws.com",
          "SourceArn": reference(&topic),
        }
      }),
    )
    .insert(
      Section::Resources,
      user.clone(),
      json!({
        "Type": "AWS::IAM::User",
        "Properties": {
          "Policies": [{
            "PolicyName": format!("{topic}Policy"),
            "PolicyDocument": {
              "Statement": [
                {
                  "Resource": [reference(&topic)],
                  "Action": ["sns:ListTopics", "sns:Publish"],
                  "Effect": "Allow",
                },
                {
                  "Resource": [join(vec![
                    json!("arn:aws:sns:"),
                    region(),
                    json!(":"),
                    account_id(),
                    json!(":*"),
                  ])],
                  "Action": ["sns:ListTopics"],
                  "Effect": "Allow",
                }
              ]
            }
          }]
        }
      }),
    )
    .insert(
      Section::Resources,
      topic.clone(),
      json!({
        "Type": "AWS::SNS::Topic",
        "Properties": {
          "DisplayName": join_with("-", vec![stack_name(), json!(name)]),
          "TopicName": join_with("-", vec![stack_name(), json!(name)]),
          "Subscription": [{ "Endpoint": get_att(name, "Arn"), "Protocol": "lambda" }]
        }
      }),
    )
    .insert(
      Section::Resources,
      access_key.clone(),
      json!({
        "Type": "AWS::IAM::AccessKey",
        "Properties": { "UserName": reference(&user) }
      }),
    )
    .insert(Section::Outputs, topic.clone(), json!({ "Value": reference(&topic) }))
    .insert(
      Section::Outputs,
      access_key.clone(),
      json!({ "Value": reference(&access_key) }),
    )
    .insert(
      Section::Outputs,
      format!("{name}SNSUserSecretAccessKey"),
      json!({ "Value": get_att(&access_key, "SecretAccessKey") }),
    );

  debug!(function = %name, topic = %topic, "topic trigger built");
  fragment
}
