mod assistant_reply;
mod chat_message;
mod conversation_history;
mod conversation_turn;
mod inbound_message;
mod message_role;
mod outbound_reply;
mod patient;
mod patient_id;
mod turn_id;
mod user;
mod user_id;

pub use assistant_reply::AssistantReply;
pub use chat_message::ChatMessage;
pub use conversation_history::{ConversationHistory, DEFAULT_HISTORY_CAPACITY};
pub use conversation_turn::ConversationTurn;
pub use inbound_message::{InboundMessage, InboundPayload, MessageContent, MessageKind};
pub use message_role::MessageRole;
pub use outbound_reply::{ErrorKind, OutboundReply};
pub use patient::{NewPatient, Patient};
pub use patient_id::PatientId;
pub use turn_id::TurnId;
pub use user::{IdentityId, User};
pub use user_id::UserId;
