/// Errors that can occur while preparing a message.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
  /// Neither a dispatch, message nor service alarm topic is available.
  #[error("no topic to publish to")]
  NoTopic,

  #[error("failed to render event: {0}")]
  Serialize(#[from] serde_json::Error),
}
