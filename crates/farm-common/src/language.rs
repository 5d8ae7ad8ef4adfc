use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Language a farmer talks to the assistant in.
///
/// Passed explicitly to every advisory call; it selects the chat greeting and the
/// reply instruction appended to model prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hausa,
    Yoruba,
    Igbo,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Hausa,
        Language::Yoruba,
        Language::Igbo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hausa => "hausa",
            Language::Yoruba => "yoruba",
            Language::Igbo => "igbo",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hausa => "Hausa",
            Language::Yoruba => "Yoruba",
            Language::Igbo => "Igbo",
        }
    }

    /// Opening assistant message of a chat session.
    pub fn greeting(self) -> &'static str {
        match self {
            Language::English => "Hello! I'm your farming assistant. How can I help you today?",
            Language::Hausa => "Sannu! Ni ne mataimakinka na noma. Yaya zan taimaka maka yau?",
            Language::Yoruba => {
                "Bawo ni! Mo je oluranlowo oko rẹ. Bawo ni mo ṣe le ran ọ lọwọ loni?"
            }
            Language::Igbo => {
                "Nnọọ! Abụ m onye enyemaka gị n'ọrụ ugbo. Kedu ka m ga-esi nyere gị aka taa?"
            }
        }
    }

    /// Hint shown in the question input box.
    pub fn input_placeholder(self) -> &'static str {
        match self {
            Language::English => "Type your farming question...",
            Language::Hausa => "Rubuta tambayarka ta noma...",
            Language::Yoruba => "Tẹ ibeere oko rẹ...",
            Language::Igbo => "Dee ajụjụ ọrụ ugbo gị...",
        }
    }

    /// Sentence appended to prompts so the model answers in this language.
    /// English needs none.
    pub fn reply_instruction(self) -> Option<String> {
        match self {
            Language::English => None,
            other => Some(format!(
                "Respond in {} using simple words a farmer would use. Keep JSON keys in English.",
                other.display_name()
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0} (expected english, hausa, yoruba or igbo)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == wanted)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
