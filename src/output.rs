use eyre::Result;

use crate::BlogGenerationResult;

/// The blog fragment exactly as generated
pub fn render_html(result: &BlogGenerationResult) -> String {
    result.blog_content.clone()
}

/// A standalone HTML page wrapping the generated fragment
pub fn render_document(result: &BlogGenerationResult) -> String {
    let video = &result.video_details;
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>{title}</title>
<meta name=\"generator\" content=\"ytblog ({style})\">
</head>
<body>
<article>
{content}
</article>
<footer><p><a href=\"https://www.youtube.com/watch?v={id}\">Watch on YouTube</a></p></footer>
</body>
</html>
",
        title = html_escape::encode_text(&video.title),
        style = result.style,
        content = result.blog_content,
        id = video.video_id,
    )
}

/// The full result as pretty JSON, in the same shape the HTTP API returns
pub fn render_json(result: &BlogGenerationResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlogStyle;
    use crate::tests::sample_video;

    fn sample_result() -> BlogGenerationResult {
        BlogGenerationResult::new(sample_video(), "<h1>Post</h1>\n<p>Body</p>".to_string(), BlogStyle::Casual)
    }

    #[test]
    fn test_render_html() {
        assert_eq!(render_html(&sample_result()), "<h1>Post</h1>\n<p>Body</p>");
    }

    #[test]
    fn test_render_document() {
        let doc = render_document(&sample_result());
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Rust in Production</title>"));
        assert!(doc.contains("<article>\n<h1>Post</h1>\n<p>Body</p>\n</article>"));
        assert!(doc.contains("watch?v=dQw4w9WgXcQ"));
        assert!(doc.contains("ytblog (casual)"));
    }

    #[test]
    fn test_render_json() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&sample_result()).unwrap()).unwrap();
        assert_eq!(json["blogContent"], "<h1>Post</h1>\n<p>Body</p>");
        assert_eq!(json["isFallbackGeneration"], false);
    }
}
