mod hmac_session_tokens;

pub use hmac_session_tokens::HmacSessionTokens;
