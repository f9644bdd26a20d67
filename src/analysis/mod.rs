//! Generative-text analysis of resolved videos

pub mod gemini;
pub mod prompt;

pub use gemini::AnalysisClient;
pub use prompt::{build_prompt, AnalysisKind, SYSTEM_INSTRUCTION};
