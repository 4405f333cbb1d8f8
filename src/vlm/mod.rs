pub mod client;
pub mod parser;

pub use client::{OllamaClient, VlmClient};
pub use parser::{parse_prediction, ParseError};
