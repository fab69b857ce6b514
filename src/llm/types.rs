use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct EmbedRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
}

/// One line of the newline-delimited generation stream. Fields beyond the
/// partial text and the completion flag are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateFragment {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
