//! Prompt construction for every model call.
//!
//! Prompts are assembled from static phrase tables keyed by [`BlogType`] and
//! [`Voice`]. Both selectors are parsed leniently: an unknown type means
//! [`BlogType::Informative`] and an unknown voice means [`Voice::Casual`], so
//! prompt construction is total and never fails.
//!
//! The generation prompt is laid out as:
//!
//! ```text
//! <task template with topic> <tone directive>. [Additional instructions: <extra>] <closing directive>
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of post being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogType {
    Instructional,
    Personable,
    Story,
    #[default]
    Informative,
    Persuasive,
}

impl BlogType {
    pub const ALL: [BlogType; 5] = [
        BlogType::Instructional,
        BlogType::Personable,
        BlogType::Story,
        BlogType::Informative,
        BlogType::Persuasive,
    ];

    /// Parse a selector, falling back to `Informative` for anything unknown.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "instructional" => Self::Instructional,
            "personable" => Self::Personable,
            "story" => Self::Story,
            "informative" => Self::Informative,
            "persuasive" => Self::Persuasive,
            _ => Self::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instructional => "instructional",
            Self::Personable => "personable",
            Self::Story => "story",
            Self::Informative => "informative",
            Self::Persuasive => "persuasive",
        }
    }

    fn task(self, topic: &str) -> String {
        match self {
            Self::Instructional => format!(
                "Write a detailed instructional blog post about \"{topic}\". Provide step-by-step guidance, practical tips, and actionable advice. Use clear headings and bullet points where appropriate. Aim for about 800-1000 words."
            ),
            Self::Personable => format!(
                "Write a personal and engaging blog post about \"{topic}\". Share personal experiences, anecdotes, and insights in a conversational tone. Make it relatable and authentic. Aim for about 800-1000 words."
            ),
            Self::Story => format!(
                "Write a compelling narrative blog post about \"{topic}\". Create a story that captivates readers with characters, plot, and emotional depth. Use descriptive language. Aim for about 800-1000 words."
            ),
            Self::Informative => format!(
                "Write an informative and well-researched blog post about \"{topic}\". Provide facts, data, and analysis while keeping it accessible and engaging. Aim for about 800-1000 words."
            ),
            Self::Persuasive => format!(
                "Write a persuasive blog post about \"{topic}\". Use compelling arguments, evidence, and rhetorical strategies to convince readers. Aim for about 800-1000 words."
            ),
        }
    }

    fn restructure(self) -> &'static str {
        match self {
            Self::Instructional => {
                "Format this content as an instructional blog post. Add appropriate headings, structure it with clear sections, and make it engaging for readers who want to learn."
            }
            Self::Personable => {
                "Format this content as a personal blog post. Add a conversational tone, appropriate headings, and structure it to tell a compelling story or share experiences."
            }
            Self::Story => {
                "Format this content as a narrative blog post. Add storytelling elements, appropriate headings, and structure it to create an engaging narrative flow."
            }
            Self::Informative => {
                "Format this content as an informative blog post. Add clear headings, organize information logically, and make it educational and engaging."
            }
            Self::Persuasive => {
                "Format this content as a persuasive blog post. Add compelling headings, structure arguments effectively, and make it convincing and engaging."
            }
        }
    }
}

impl fmt::Display for BlogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone of voice for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Inspirational,
    Serious,
    #[default]
    Casual,
    Humorous,
    Empathetic,
}

impl Voice {
    pub const ALL: [Voice; 5] = [
        Voice::Inspirational,
        Voice::Serious,
        Voice::Casual,
        Voice::Humorous,
        Voice::Empathetic,
    ];

    /// Parse a selector, falling back to `Casual` for anything unknown.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "inspirational" => Self::Inspirational,
            "serious" => Self::Serious,
            "casual" => Self::Casual,
            "humorous" => Self::Humorous,
            "empathetic" => Self::Empathetic,
            _ => Self::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inspirational => "inspirational",
            Self::Serious => "serious",
            Self::Casual => "casual",
            Self::Humorous => "humorous",
            Self::Empathetic => "empathetic",
        }
    }

    /// Tone directive used when writing a new draft.
    fn tone(self) -> &'static str {
        match self {
            Self::Inspirational => {
                "Use an inspirational and motivational tone that uplifts and encourages readers"
            }
            Self::Serious => {
                "Use a serious, professional, and authoritative tone suitable for expert audiences"
            }
            Self::Casual => "Use a casual, friendly, and relaxed tone as if talking to a friend",
            Self::Humorous => {
                "Use a humorous and witty tone with appropriate jokes and lighthearted observations"
            }
            Self::Empathetic => {
                "Use an empathetic, understanding, and compassionate tone that connects emotionally"
            }
        }
    }

    /// Shorter tone directive used when restructuring existing text.
    fn restyle(self) -> &'static str {
        match self {
            Self::Inspirational => "Use an inspirational and motivational tone.",
            Self::Serious => "Use a serious, professional, and authoritative tone.",
            Self::Casual => "Use a casual, friendly, and relaxed tone.",
            Self::Humorous => "Use a humorous and witty tone.",
            Self::Empathetic => "Use an empathetic, understanding, and compassionate tone.",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CLOSING_DIRECTIVE: &str = "Make the content sound human, avoid repetitive structures, and ensure uniqueness. Include markdown formatting with headings, lists, and emphasis where appropriate.";

pub const DRAFT_SYSTEM_PROMPT: &str = "You are a professional blog writer. Write engaging, human-like blog content with natural flow and varied sentence structures. Respond with well-formatted markdown including headings, paragraphs, and lists where appropriate.";

pub const FORMAT_SYSTEM_PROMPT: &str = "You are a professional blog editor. Format the provided content as a well-structured blog post with appropriate markdown formatting, headings, and organization. Do NOT change the core meaning or add new information. Only format and improve structure.";

pub const CORRECT_SYSTEM_PROMPT: &str = "You are a professional editor. Correct ONLY spelling and grammar errors in the provided text. Do NOT rewrite or change the meaning. Do NOT add new content. Do NOT change the style or tone. Only fix spelling mistakes and grammar errors. Return the corrected text exactly as provided, with only the necessary corrections.";

pub const TITLES_SYSTEM_PROMPT: &str = "You are an SEO expert and content strategist. Generate 5 highly clickable, SEO-optimized blog post titles. Each title should be unique, compelling, and include relevant keywords. Make them engaging and appropriate for the topic.";

pub const PROBE_PROMPT: &str = "Test connection - respond with \"OK\"";

/// Instruction for writing a new post about `topic`.
pub fn build_generation_prompt(
    topic: &str,
    blog_type: BlogType,
    voice: Voice,
    extra_instructions: &str,
) -> String {
    let mut prompt = format!("{} {}.", blog_type.task(topic), voice.tone());

    let extra = extra_instructions.trim();
    if !extra.is_empty() {
        prompt.push_str(" Additional instructions: ");
        prompt.push_str(extra);
    }

    prompt.push(' ');
    prompt.push_str(CLOSING_DIRECTIVE);
    prompt
}

/// Instruction for restructuring existing `content` without changing its meaning.
pub fn build_format_prompt(content: &str, blog_type: BlogType, voice: Voice) -> String {
    format!(
        "{} {} Keep the original meaning; only change structure and tone.\n\nFormat this content:\n\n{}",
        blog_type.restructure(),
        voice.restyle(),
        content
    )
}

/// Instruction for a spelling and grammar pass over `text`.
pub fn build_correction_prompt(text: &str) -> String {
    format!(
        "Please correct ONLY spelling and grammar errors in this text. Do not change anything else:\n\n{text}"
    )
}

/// Instruction asking for five candidate titles, one per line.
pub fn build_titles_prompt(topic: &str) -> String {
    format!(
        "Generate 5 SEO-optimized blog post titles about: \"{topic}\". Return ONLY the 5 titles, each on a new line, no numbering or bullet points."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSONABLE_TASK: &str = "Write a personal and engaging blog post about";
    const HUMOROUS_TONE: &str =
        "Use a humorous and witty tone with appropriate jokes and lighthearted observations";
    const INFORMATIVE_TASK: &str = "Write an informative and well-researched blog post about";
    const CASUAL_TONE: &str = "Use a casual, friendly, and relaxed tone as if talking to a friend";

    // =========================================================================
    // selector parsing
    // =========================================================================

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!(BlogType::parse("Story"), BlogType::Story);
        assert_eq!(BlogType::parse(" persuasive "), BlogType::Persuasive);
        for t in BlogType::ALL {
            assert_eq!(BlogType::parse(t.as_str()), t);
        }
    }

    #[test]
    fn unknown_type_falls_back_to_informative() {
        assert_eq!(BlogType::parse("listicle"), BlogType::Informative);
        assert_eq!(BlogType::parse(""), BlogType::Informative);
    }

    #[test]
    fn unknown_voice_falls_back_to_casual() {
        assert_eq!(Voice::parse("sarcastic"), Voice::Casual);
        for v in Voice::ALL {
            assert_eq!(Voice::parse(v.as_str()), v);
        }
    }

    // =========================================================================
    // generation prompt
    // =========================================================================

    #[test]
    fn personable_humorous_prompt_contains_both_phrases() {
        let prompt = build_generation_prompt(
            "Sourdough",
            BlogType::Personable,
            Voice::Humorous,
            "",
        );
        assert!(prompt.contains(PERSONABLE_TASK));
        assert!(prompt.contains(HUMOROUS_TONE));
        assert!(prompt.contains("\"Sourdough\""));
    }

    #[test]
    fn fallback_selectors_use_informative_and_casual_phrases() {
        let prompt = build_generation_prompt(
            "Tides",
            BlogType::parse("unknown"),
            Voice::parse("unknown"),
            "",
        );
        assert!(prompt.contains(INFORMATIVE_TASK));
        assert!(prompt.contains(CASUAL_TONE));
    }

    #[test]
    fn extra_instructions_included_when_present() {
        let prompt = build_generation_prompt(
            "Tides",
            BlogType::Story,
            Voice::Serious,
            "  Mention the moon.  ",
        );
        assert!(prompt.contains(" Additional instructions: Mention the moon."));
    }

    #[test]
    fn blank_extra_instructions_are_omitted() {
        let prompt = build_generation_prompt("Tides", BlogType::Story, Voice::Serious, " \n\t ");
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn prompt_ends_with_closing_directive() {
        let prompt = build_generation_prompt("Tides", BlogType::Story, Voice::Serious, "x");
        assert!(prompt.ends_with(CLOSING_DIRECTIVE));
    }

    // =========================================================================
    // format prompt
    // =========================================================================

    #[test]
    fn format_prompt_embeds_content_verbatim() {
        let content = "para one\n\npara two: with colon";
        let prompt = build_format_prompt(content, BlogType::Instructional, Voice::Empathetic);
        assert!(prompt.starts_with("Format this content as an instructional blog post."));
        assert!(prompt.contains("Use an empathetic, understanding, and compassionate tone."));
        assert!(prompt.contains("Keep the original meaning"));
        assert!(prompt.ends_with(content));
    }

    #[test]
    fn format_prompt_uses_same_fallbacks() {
        let prompt = build_format_prompt("x", BlogType::parse("?"), Voice::parse("?"));
        assert!(prompt.contains("as an informative blog post"));
        assert!(prompt.contains("Use a casual, friendly, and relaxed tone."));
    }

    #[test]
    fn titles_prompt_quotes_topic() {
        assert!(build_titles_prompt("Rust").contains("about: \"Rust\""));
    }
}
