/// Normalized model output for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub content: String,
    /// Set when the exchange mentions symptoms or advice that call for urgent care.
    pub urgent: bool,
}
