//! Port definitions - Interfaces implemented by infrastructure adapters

mod completion_port;

pub use completion_port::{CompletionPort, CompletionReply, CompletionRequest};
