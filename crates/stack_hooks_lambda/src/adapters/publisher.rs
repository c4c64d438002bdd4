pub trait MessagePublisher {
    /// Returns the message id assigned by the topic.
    fn publish(&self, topic_arn: &str, message: &str, message_type: &str) -> Result<String, String>;
}
