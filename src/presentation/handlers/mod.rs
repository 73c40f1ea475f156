mod auth;
mod chat;
mod chat_socket;
mod conversations;
mod health;
mod patients;
mod voice;

pub use auth::{AuthResponse, CredentialsRequest, login_handler, signup_handler};
pub use chat::chat_handler;
pub use chat_socket::{SocketParams, chat_socket_handler, run_chat_connection};
pub use conversations::conversations_handler;
pub use health::health_handler;
pub use patients::{create_patient_handler, get_patient_handler, list_patients_handler};
pub use voice::voice_handler;
