use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseOptionError;

/// Tone and visual preset applied to both the LLM prompt and the fallback synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlogStyle {
    #[default]
    Professional,
    Casual,
    Enthusiastic,
    Animated,
    Humorous,
}

const ANIMATED_CSS: &str = r#"<style>
  .animated-header {
    background: linear-gradient(45deg, #6e45e2, #88d3ce);
    color: white;
    padding: 10px;
    border-radius: 8px;
    text-shadow: 1px 1px 3px rgba(0,0,0,0.3);
    transition: all 0.3s ease;
  }
  .animated-text {
    font-weight: bold;
    color: #6e45e2;
    position: relative;
    display: inline-block;
    animation: pulse 2s infinite;
  }
  @keyframes pulse {
    0% { transform: scale(1); }
    50% { transform: scale(1.05); }
    100% { transform: scale(1); }
  }
</style>
"#;

impl BlogStyle {
    pub const ALL: [BlogStyle; 5] = [
        BlogStyle::Professional,
        BlogStyle::Casual,
        BlogStyle::Enthusiastic,
        BlogStyle::Animated,
        BlogStyle::Humorous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStyle::Professional => "professional",
            BlogStyle::Casual => "casual",
            BlogStyle::Enthusiastic => "enthusiastic",
            BlogStyle::Animated => "animated",
            BlogStyle::Humorous => "humorous",
        }
    }

    /// Prepended verbatim to the video title in the `h1`
    pub fn title_prefix(&self) -> &'static str {
        match self {
            BlogStyle::Professional => "",
            BlogStyle::Casual => "Let's Talk About ",
            BlogStyle::Enthusiastic => "You Won't Believe What We Found in ",
            BlogStyle::Animated => "✨ Amazing Discoveries in ",
            BlogStyle::Humorous => "The Hilarious Truth About ",
        }
    }

    pub fn intro_lead_in(&self) -> &'static str {
        match self {
            BlogStyle::Professional => "In this article, we'll explore",
            BlogStyle::Casual => "Hey there! Let's chat about",
            BlogStyle::Enthusiastic => "I'm thrilled to share",
            BlogStyle::Animated => "🚀 Get ready for an exciting journey through",
            BlogStyle::Humorous => "Buckle up for a funny take on",
        }
    }

    pub fn conclusion_lead_in(&self) -> &'static str {
        match self {
            BlogStyle::Professional => "In conclusion,",
            BlogStyle::Casual => "So, that's about it for",
            BlogStyle::Enthusiastic => "Wow! We've covered so much about",
            BlogStyle::Animated => "🎉 That wraps up our amazing exploration of",
            BlogStyle::Humorous => "Well, that was fun! Let's recap",
        }
    }

    /// Inline emphasis markup for a run of text
    pub fn emphasize(&self, text: &str) -> String {
        match self {
            BlogStyle::Professional => format!("<strong>{text}</strong>"),
            BlogStyle::Casual => format!("<em>{text}</em>"),
            BlogStyle::Enthusiastic => format!("<strong>{text}!</strong>"),
            BlogStyle::Animated => format!(r#"<span class="animated-text">{text}</span>"#),
            BlogStyle::Humorous => format!("<em>*chuckles*</em> {text}"),
        }
    }

    /// Attribute string placed inside heading tags, empty when unstyled
    pub fn heading_attr(&self) -> &'static str {
        match self {
            BlogStyle::Animated => r#"class="animated-header""#,
            _ => "",
        }
    }

    /// Stylesheet prepended to the whole document
    pub fn stylesheet(&self) -> Option<&'static str> {
        match self {
            BlogStyle::Animated => Some(ANIMATED_CSS),
            _ => None,
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, BlogStyle::Animated)
    }

    /// How the LLM is asked to write, completing "Write ..."
    pub fn tone(&self) -> &'static str {
        match self {
            BlogStyle::Professional => "in a formal, educational tone with clear structure and precise language",
            BlogStyle::Casual => "in a relaxed, conversational tone like you're talking to a friend",
            BlogStyle::Enthusiastic => "with high energy and excitement, using dynamic language and expressing passion",
            BlogStyle::Animated => {
                "with lively, vibrant language, using emojis, engaging visuals, and dynamic elements to create excitement"
            }
            BlogStyle::Humorous => "with a light-hearted, witty approach incorporating jokes and playful language",
        }
    }

    /// Persona adjectives for the system message
    pub fn persona(&self) -> &'static str {
        match self {
            BlogStyle::Professional => "clear, authoritative",
            BlogStyle::Casual => "relaxed, friendly",
            BlogStyle::Enthusiastic => "energetic, passionate",
            BlogStyle::Animated => "dynamic, visually exciting",
            BlogStyle::Humorous => "witty, entertaining",
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            BlogStyle::Professional => 0.6,
            BlogStyle::Animated | BlogStyle::Humorous => 0.9,
            BlogStyle::Casual | BlogStyle::Enthusiastic => 0.7,
        }
    }
}

impl fmt::Display for BlogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogStyle {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlogStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| ParseOptionError::new("style", s, BlogStyle::ALL.map(|st| st.as_str())))
    }
}
