//! Match commentary and interview questions.

use serde::{Deserialize, Serialize};

use crate::opponent::Opponent;
use crate::template::{commentary_prompt, interview_prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextFeature {
    Commentary,
    Interview,
}

impl TextFeature {
    pub fn all() -> &'static [TextFeature] {
        &[TextFeature::Commentary, TextFeature::Interview]
    }

    pub fn prompt(&self, opponent: Opponent) -> String {
        match self {
            TextFeature::Commentary => commentary_prompt(opponent),
            TextFeature::Interview => interview_prompt(opponent),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            TextFeature::Commentary => "Match Commentary",
            TextFeature::Interview => "Post-Match Interview",
        }
    }

    /// The fixed text shown in place of a failed result.
    pub fn failure_message(&self) -> &'static str {
        match self {
            TextFeature::Commentary => "Could not generate commentary. Please try again.",
            TextFeature::Interview => "Could not generate interview questions. Please try again.",
        }
    }
}

/// How one text request settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextOutcome {
    Generated(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextContent {
    Empty,
    Loading,
    Ready(String),
    Failed(&'static str),
}

/// A text container in the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPanel {
    pub visible: bool,
    pub content: TextContent,
}

impl Default for TextPanel {
    fn default() -> Self {
        Self {
            visible: false,
            content: TextContent::Empty,
        }
    }
}

/// Both text results, once each has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFeatures {
    pub commentary: TextOutcome,
    pub interview: TextOutcome,
}
