//! These models represent the objects passed around by the agent
//!
//! There are two related formats to interact with:
//! - provider wire messages/tools, sent between the agent and the LLM API
//! - tool calls and results, sent between the agent and the local tools
//!
//! Provider payloads are converted to and from these internal structs at the
//! client boundary, so the rest of the crate never handles raw wire JSON.
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
