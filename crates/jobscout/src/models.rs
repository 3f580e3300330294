//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - openai-style messages/tools, sent to Groq
//! - gemini contents/function declarations, sent to Google
//! - tool calls, dispatched to the job-search toolkit
//!
//! Provider wire shapes are converted to and from these internal structs at
//! the adapter boundary; nothing above the adapters ever sees a raw payload.
pub mod message;
pub mod tool;
