// Services module - Business logic

pub mod oauth;
pub mod urgency;
pub mod validation;
