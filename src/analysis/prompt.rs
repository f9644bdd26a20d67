//! Prompt templates for each analysis kind

use crate::extractor::models::VideoMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert video content strategist and social media manager.";

/// Description characters quoted in a summary prompt
const SUMMARY_CONTEXT_CHARS: usize = 500;

/// Description characters quoted in a sentiment prompt
const SENTIMENT_CONTEXT_CHARS: usize = 300;

/// What the model is asked to write about a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Summary,
    Tags,
    Blog,
    Sentiment,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Tags => "tags",
            AnalysisKind::Blog => "blog",
            AnalysisKind::Sentiment => "sentiment",
        };
        write!(f, "{}", name)
    }
}

/// Build the user prompt for `kind` from the video's metadata
pub fn build_prompt(metadata: &VideoMetadata, kind: AnalysisKind) -> String {
    match kind {
        AnalysisKind::Summary => format!(
            "Provide a concise and engaging summary of a YouTube video based on the following metadata.\n\
             Title: \"{}\"\n\
             Channel: \"{}\"\n\
             Description Context: \"{}...\"\n\n\
             The summary should be bulleted and easy to read.",
            metadata.title,
            metadata.channel,
            head_chars(&metadata.description, SUMMARY_CONTEXT_CHARS)
        ),
        AnalysisKind::Tags => format!(
            "Generate a list of 15 high-ranking, SEO-optimized YouTube tags for this video.\n\
             Title: \"{}\"\n\
             Channel: \"{}\"\n\
             Output format: Comma-separated list.",
            metadata.title, metadata.channel
        ),
        AnalysisKind::Blog => format!(
            "Write a short introductory blog post (approx 200 words) promoting this video. Use an exciting tone.\n\
             Title: \"{}\"\n\
             Channel: \"{}\"",
            metadata.title, metadata.channel
        ),
        AnalysisKind::Sentiment => format!(
            "Analyze the likely sentiment and target audience appeal of this video title and description.\n\
             Title: \"{}\"\n\
             Description: \"{}...\"\n\n\
             Provide a \"Virality Score\" out of 10 and explain why.",
            metadata.title,
            head_chars(&metadata.description, SENTIMENT_CONTEXT_CHARS)
        ),
    }
}

fn head_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
