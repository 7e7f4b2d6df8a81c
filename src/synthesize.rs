//! Template-based blog synthesis used whenever the LLM path is unavailable.
//!
//! The transform is structural: the transcript is cut into sentences by a
//! punctuation heuristic, sentences into paragraphs of three, paragraphs into
//! sections of five, and each section is rendered under a fixed heading with
//! the style's lead-in phrases. The only non-deterministic step (random
//! emphasis in Animated middle sections) draws from an injected
//! [`RandomSource`].

use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{BlogLength, BlogStyle, VideoDetails};

/// Substring present in every synthesized post and in no LLM output we ask for
pub const DISCLAIMER_MARKER: &str = "Note: This blog post was generated automatically based on the video transcript";

const DISCLAIMER: &str = "<p><em>Note: This blog post was generated automatically based on the video transcript. \n\
For the full experience, consider watching the original video on YouTube.</em></p>";

const PLACEHOLDER: &str = "No transcript available for this section.";

const SENTENCES_PER_PARAGRAPH: usize = 3;
const PARAGRAPHS_PER_SECTION: usize = 5;

/// Paragraphs with at most this many words are never emphasized
const EMPHASIS_MIN_WORDS: usize = 10;

/// Source of the random span index used for Animated emphasis
pub trait RandomSource {
    /// Returns an index in `0..upper`. `upper` is never zero.
    fn index_below(&mut self, upper: usize) -> usize;
}

/// Adapts any `rand` generator into a [`RandomSource`]
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn index_below(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..upper)
    }
}

/// Per-length transcript character budgets; `None` means the whole transcript is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharBudgets {
    pub short: Option<usize>,
    pub medium: Option<usize>,
    pub long: Option<usize>,
}

impl Default for CharBudgets {
    fn default() -> Self {
        Self {
            short: BlogLength::Short.fallback_char_budget(),
            medium: BlogLength::Medium.fallback_char_budget(),
            long: BlogLength::Long.fallback_char_budget(),
        }
    }
}

impl CharBudgets {
    pub fn for_length(&self, length: BlogLength) -> Option<usize> {
        match length {
            BlogLength::Short => self.short,
            BlogLength::Medium => self.medium,
            BlogLength::Long => self.long,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer {
    budgets: CharBudgets,
}

impl FallbackSynthesizer {
    pub fn with_budgets(budgets: CharBudgets) -> Self {
        Self { budgets }
    }

    pub fn budgets(&self) -> CharBudgets {
        self.budgets
    }

    /// Render the transcript as a styled HTML post. Never fails; an empty
    /// transcript yields the skeleton with placeholder text.
    pub fn synthesize(
        &self,
        transcript: &str,
        video: &VideoDetails,
        length: BlogLength,
        style: BlogStyle,
        rng: &mut dyn RandomSource,
    ) -> String {
        let text = truncate_chars(transcript, self.budgets.for_length(length));
        let sentences = split_sentences(text);
        let paragraphs: Vec<String> = group_paragraphs(&sentences)
            .iter()
            .map(|p| html_escape::encode_text(p).into_owned())
            .collect();
        let sections = group_sections(&paragraphs);

        let attr = style.heading_attr();
        let mut html = String::new();

        if let Some(css) = style.stylesheet() {
            html.push_str(css);
        }

        let _ = writeln!(
            html,
            "{}{}{}</h1>",
            open_tag("h1", attr),
            style.title_prefix(),
            html_escape::encode_text(&video.title)
        );
        let _ = writeln!(
            html,
            "<p><em>Based on content from {}</em></p>",
            html_escape::encode_text(&video.channel_title)
        );

        let intro_body = sections
            .first()
            .map(|s| s.join("</p>\n<p>"))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let _ = write!(
            html,
            "\n{}Introduction</h2>\n<p>{} {}</p>\n",
            open_tag("h2", attr),
            style.intro_lead_in(),
            intro_body
        );

        if sections.len() > 2 {
            for (i, section) in sections[1..sections.len() - 1].iter().enumerate() {
                let heading = middle_heading(i + 1, style);
                let paragraphs: Vec<String> = section
                    .iter()
                    .map(|p| {
                        if style.is_animated() {
                            emphasize_random_span(p, style, rng)
                        } else {
                            p.clone()
                        }
                    })
                    .collect();
                let _ = write!(
                    html,
                    "\n{}{}</h2>\n<p>{}</p>\n",
                    open_tag("h2", attr),
                    heading,
                    paragraphs.join("</p>\n<p>")
                );
            }
        }

        if let [_, .., last] = sections.as_slice() {
            let heading = if style.is_animated() {
                "🏁 Conclusion 🏁"
            } else {
                "Conclusion"
            };
            let _ = write!(
                html,
                "\n{}{}</h2>\n<p>{} {}</p>\n",
                open_tag("h2", attr),
                heading,
                style.conclusion_lead_in(),
                last.join("</p>\n<p>")
            );
        }

        if !video.description.is_empty() {
            let heading = if style.is_animated() {
                "📝 About this Video 📝"
            } else {
                "About this Video"
            };
            let _ = write!(
                html,
                "\n{}{}</h3>\n<p>{}</p>\n",
                open_tag("h3", attr),
                heading,
                html_escape::encode_text(&video.description)
            );
        }

        html.push('\n');
        html.push_str(DISCLAIMER);
        html
    }
}

/// Synthesize with the default per-length character budgets
pub fn synthesize_fallback_blog(
    transcript: &str,
    video: &VideoDetails,
    length: BlogLength,
    style: BlogStyle,
    rng: &mut dyn RandomSource,
) -> String {
    FallbackSynthesizer::default().synthesize(transcript, video, length, style, rng)
}

fn open_tag(tag: &str, attr: &str) -> String {
    if attr.is_empty() {
        format!("<{tag}>")
    } else {
        format!("<{tag} {attr}>")
    }
}

/// First `budget` characters of `text` (not bytes), or all of it
pub fn truncate_chars(text: &str, budget: Option<usize>) -> &str {
    match budget.and_then(|n| text.char_indices().nth(n)) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split after `.`, `?` or `!` when the next non-whitespace character is an
/// uppercase ASCII letter. The whitespace between sentences is dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if !matches!(c, '.' | '?' | '!') {
            continue;
        }

        let next_word = chars.clone().find(|ch| !ch.is_whitespace());
        if next_word.is_some_and(|ch| ch.is_ascii_uppercase()) {
            while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

/// Join every three sentences into a paragraph, dropping blank results
pub fn group_paragraphs(sentences: &[String]) -> Vec<String> {
    sentences
        .chunks(SENTENCES_PER_PARAGRAPH)
        .map(|chunk| chunk.join(" ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

pub fn group_sections(paragraphs: &[String]) -> Vec<Vec<String>> {
    paragraphs
        .chunks(PARAGRAPHS_PER_SECTION)
        .map(<[String]>::to_vec)
        .collect()
}

/// Heading for the `ordinal`th (1-based) section between Introduction and Conclusion
pub fn middle_heading(ordinal: usize, style: BlogStyle) -> String {
    let heading = format!("Key Points - Part {ordinal}");
    if style.is_animated() {
        format!("✨ {heading} ✨")
    } else {
        heading
    }
}

/// Replace a random two-word span of a long paragraph with the style's emphasis markup
pub fn emphasize_random_span(paragraph: &str, style: BlogStyle, rng: &mut dyn RandomSource) -> String {
    let mut words: Vec<String> = paragraph.split(' ').map(str::to_string).collect();
    if words.len() <= EMPHASIS_MIN_WORDS {
        return paragraph.to_string();
    }

    let start = rng.index_below(words.len() - 3);
    let phrase = words[start..start + 2].join(" ");
    words.splice(start..start + 2, [style.emphasize(&phrase)]);
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_video;

    /// Always picks the same index
    struct FixedIndex(usize);

    impl RandomSource for FixedIndex {
        fn index_below(&mut self, upper: usize) -> usize {
            self.0.min(upper - 1)
        }
    }

    fn numbered_sentences(count: usize) -> String {
        (1..=count)
            .map(|i| format!("Sentence number {i} talks about Rust."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn synth(transcript: &str, length: BlogLength, style: BlogStyle) -> String {
        synthesize_fallback_blog(transcript, &sample_video(), length, style, &mut FixedIndex(0))
    }

    #[test]
    fn test_split_sentences_on_uppercase_follow() {
        let sentences = split_sentences("Hello there. How are you? Great!  Thanks");
        assert_eq!(sentences, vec!["Hello there.", "How are you?", "Great!", "Thanks"]);
    }

    #[test]
    fn test_split_sentences_keeps_lowercase_continuation() {
        let sentences = split_sentences("We use e.g. this approach. and then more. Next one");
        assert_eq!(sentences, vec!["We use e.g. this approach. and then more.", "Next one"]);
    }

    #[test]
    fn test_split_sentences_without_space() {
        assert_eq!(split_sentences("One.Two"), vec!["One.", "Two"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", Some(2)), "hé");
        assert_eq!(truncate_chars("abc", Some(10)), "abc");
        assert_eq!(truncate_chars("abc", None), "abc");
    }

    #[test]
    fn test_few_sentences_make_one_paragraph() {
        let sentences = split_sentences("First point. Second point.");
        let paragraphs = group_paragraphs(&sentences);
        assert_eq!(paragraphs, vec!["First point. Second point."]);
    }

    #[test]
    fn test_paragraph_and_section_grouping() {
        let sentences = split_sentences(&numbered_sentences(40));
        let paragraphs = group_paragraphs(&sentences);
        assert_eq!(paragraphs.len(), 14);
        let sections = group_sections(&paragraphs);
        assert_eq!(sections.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 5, 4]);
    }

    #[test]
    fn test_empty_transcript_yields_placeholder_skeleton() {
        let html = synth("", BlogLength::Short, BlogStyle::Professional);
        assert!(html.starts_with("<h1>Rust in Production</h1>"));
        assert!(html.contains("In this article, we'll explore No transcript available for this section."));
        assert!(!html.contains("Conclusion"));
        assert!(html.contains("About this Video"));
        assert!(html.ends_with("on YouTube.</em></p>"));
        assert!(html.contains(DISCLAIMER_MARKER));
    }

    #[test]
    fn test_single_section_professional_scenario() {
        let transcript = (1..=12)
            .map(|i| format!("This is short sentence {i} of the talk."))
            .collect::<Vec<_>>()
            .join(" ");
        let html = synth(&transcript, BlogLength::Medium, BlogStyle::Professional);

        assert!(html.contains("<h2>Introduction</h2>"));
        assert!(!html.contains("Key Points"));
        assert!(!html.contains("Conclusion"));
        assert_eq!(html.matches("<p>").count(), 1 + 4 + 1 + 1);
        assert!(html.contains(DISCLAIMER_MARKER));
    }

    #[test]
    fn test_two_sections_have_conclusion_but_no_middle() {
        let html = synth(&numbered_sentences(18), BlogLength::Long, BlogStyle::Casual);
        assert!(html.starts_with("<h1>Let's Talk About Rust in Production</h1>"));
        assert!(html.contains("<h2>Conclusion</h2>\n<p>So, that's about it for Sentence number 16"));
        assert!(!html.contains("Key Points"));
    }

    #[test]
    fn test_middle_sections_numbered_from_one() {
        let html = synth(&numbered_sentences(75), BlogLength::Long, BlogStyle::Enthusiastic);
        assert!(html.contains("<h2>Key Points - Part 1</h2>"));
        assert!(html.contains("<h2>Key Points - Part 2</h2>"));
        assert!(html.contains("<h2>Key Points - Part 3</h2>"));
        assert!(!html.contains("Part 4"));
        assert!(!html.contains("Part 0"));
        let p1 = html.find("Part 1").unwrap();
        let p3 = html.find("Part 3").unwrap();
        assert!(html.find("Introduction").unwrap() < p1);
        assert!(p3 < html.find("Conclusion").unwrap());
    }

    #[test]
    fn test_non_animated_styles_leave_paragraphs_untouched() {
        let html = synth(&numbered_sentences(60), BlogLength::Long, BlogStyle::Professional);
        assert!(!html.contains("<strong>"));
        assert!(!html.contains("<style>"));
    }

    #[test]
    fn test_short_budget_caps_transcript() {
        let mut transcript = "Filler words go here. ".repeat(100);
        assert!(transcript.chars().count() > 2000);
        transcript.push_str("Unreachable marker sentence.");

        let short = synth(&transcript, BlogLength::Short, BlogStyle::Professional);
        assert!(!short.contains("Unreachable marker"));

        let long = synth(&transcript, BlogLength::Long, BlogStyle::Professional);
        assert!(long.contains("Unreachable marker"));
    }

    #[test]
    fn test_medium_budget_reads_past_short_budget() {
        let mut transcript = "Filler words go here. ".repeat(100);
        transcript.push_str("Medium marker sentence.");
        let html = synth(&transcript, BlogLength::Medium, BlogStyle::Professional);
        assert!(html.contains("Medium marker"));
    }

    #[test]
    fn test_custom_budgets() {
        let synthesizer = FallbackSynthesizer::with_budgets(CharBudgets {
            short: Some(10),
            ..CharBudgets::default()
        });
        let html = synthesizer.synthesize(
            "Tiny intro here. Rest of the transcript.",
            &sample_video(),
            BlogLength::Short,
            BlogStyle::Professional,
            &mut FixedIndex(0),
        );
        assert!(html.contains("explore Tiny intro</p>"));
    }

    #[test]
    fn test_animated_scenario() {
        let html = synth(&numbered_sentences(60), BlogLength::Long, BlogStyle::Animated);

        assert!(html.starts_with("<style>"));
        assert_eq!(html.matches("<style>").count(), 1);
        assert!(html.find("</style>").unwrap() < html.find("<h1").unwrap());
        assert!(html.contains(r#"<h1 class="animated-header">✨ Amazing Discoveries in Rust in Production</h1>"#));
        assert!(html.contains("✨ Key Points - Part 1 ✨"));
        assert!(html.contains("🏁 Conclusion 🏁"));
        assert!(html.contains("📝 About this Video 📝"));
        assert!(html.contains(r#"<span class="animated-text">"#));
        assert!(html.ends_with("on YouTube.</em></p>"));
    }

    #[test]
    fn test_animated_emphasis_only_in_middle_sections() {
        let html = synth(&numbered_sentences(60), BlogLength::Long, BlogStyle::Animated);
        let intro_end = html.find("✨ Key Points - Part 1").unwrap();
        let conclusion_start = html.find("🏁 Conclusion").unwrap();
        assert!(!html[..intro_end].contains("animated-text\">"));
        assert!(!html[conclusion_start..].contains("<span"));
        // 2 middle sections x 5 paragraphs, each long enough to emphasize
        assert_eq!(html.matches("<span class=\"animated-text\">").count(), 10);
    }

    #[test]
    fn test_animated_fixed_index_is_reproducible() {
        let transcript = numbered_sentences(60);
        let first = synth(&transcript, BlogLength::Long, BlogStyle::Animated);
        let second = synth(&transcript, BlogLength::Long, BlogStyle::Animated);
        assert_eq!(first, second);
        assert!(first.contains(r#"<span class="animated-text">Sentence number</span> 16 talks"#));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let transcript = numbered_sentences(60);
        let video = sample_video();
        let a = synthesize_fallback_blog(
            &transcript,
            &video,
            BlogLength::Long,
            BlogStyle::Animated,
            &mut RngSource::seeded(42),
        );
        let b = synthesize_fallback_blog(
            &transcript,
            &video,
            BlogLength::Long,
            BlogStyle::Animated,
            &mut RngSource::seeded(42),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_emphasize_random_span() {
        let para = "one two three four five six seven eight nine ten eleven";
        let out = emphasize_random_span(para, BlogStyle::Professional, &mut FixedIndex(3));
        assert_eq!(
            out,
            "one two three <strong>four five</strong> six seven eight nine ten eleven"
        );
    }

    #[test]
    fn test_emphasize_skips_short_paragraphs() {
        let para = "one two three four five six seven eight nine ten";
        assert_eq!(emphasize_random_span(para, BlogStyle::Animated, &mut FixedIndex(0)), para);
    }

    #[test]
    fn test_emphasis_index_stays_in_range() {
        let para = "a b c d e f g h i j k";
        let out = emphasize_random_span(para, BlogStyle::Casual, &mut FixedIndex(usize::MAX));
        assert_eq!(out, "a b c d e f g <em>h i</em> j k");
    }

    #[test]
    fn test_transcript_html_is_escaped() {
        let html = synth("Use <script> tags & more.", BlogLength::Short, BlogStyle::Professional);
        assert!(html.contains("Use &lt;script&gt; tags &amp; more."));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_no_description_no_about_section() {
        let mut video = sample_video();
        video.description.clear();
        let html = synthesize_fallback_blog(
            "Hello world.",
            &video,
            BlogLength::Short,
            BlogStyle::Humorous,
            &mut FixedIndex(0),
        );
        assert!(!html.contains("About this Video"));
        assert!(html.contains("Buckle up for a funny take on Hello world."));
    }
}
