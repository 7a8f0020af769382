//! HTML scraping utilities shared by the scraping adapters
//!
//! These are deliberately small, string-level extractors: the sources in
//! question serve inconsistent markup, and we only ever pull links, meta
//! properties, and page titles out of it.

/// Phrases that mark an anti-bot interstitial rather than real results.
const CAPTCHA_TRIGGERS: [&str; 5] = [
    "captcha",
    "are you human",
    "unusual traffic",
    "bot detection",
    "verify you are",
];

/// Whether a response body is a CAPTCHA/anti-bot page.
pub fn looks_like_captcha(body: &str) -> bool {
    let lowered = body.to_lowercase();
    CAPTCHA_TRIGGERS.iter().any(|t| lowered.contains(t))
}

/// Every `href="..."` value in the document, in order.
pub fn extract_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut rest = html;

    while let Some(idx) = rest.find("href=\"") {
        rest = &rest[idx + 6..];
        if let Some(end) = rest.find('"') {
            links.push(rest[..end].to_string());
            rest = &rest[end..];
        } else {
            break;
        }
    }

    links
}

/// Absolute links whose URL contains `marker`, cleaned of query strings and
/// fragments, deduplicated, capped at `max`.
pub fn extract_profile_links(html: &str, marker: &str, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for link in extract_links(html) {
        if !link.starts_with("http") || !link.contains(marker) {
            continue;
        }
        let clean = link
            .split('?')
            .next()
            .unwrap_or("")
            .split('#')
            .next()
            .unwrap_or("")
            .to_string();
        if !clean.is_empty() && !out.contains(&clean) {
            out.push(clean);
        }
        if out.len() >= max {
            break;
        }
    }

    out
}

/// Value of a `<meta property="..." content="...">` tag, tolerating either
/// attribute order.
pub fn extract_meta_content(html: &str, property: &str) -> Option<String> {
    let needle = format!("property=\"{}\"", property);
    let idx = html.find(&needle)?;

    // bound the enclosing tag
    let tag_start = html[..idx].rfind('<')?;
    let tag_end = idx + html[idx..].find('>')?;
    let tag = &html[tag_start..tag_end];

    let content_idx = tag.find("content=\"")?;
    let value = &tag[content_idx + 9..];
    let end = value.find('"')?;

    let value = value[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Text of the document's `<title>` tag.
pub fn extract_title(html: &str) -> Option<String> {
    let start = html.find("<title")?;
    let open_end = start + html[start..].find('>')? + 1;
    let close = open_end + html[open_end..].find("</title>")?;

    let title = html[open_end..close].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// First http(s) URL embedded in free text, trailing punctuation trimmed.
pub fn find_url_in_text(text: &str) -> Option<String> {
    let idx = text.find("http://").or_else(|| text.find("https://"))?;
    let tail = &text[idx..];
    let end = tail
        .find(|c: char| c.is_whitespace() || c == '"' || c == '<')
        .unwrap_or(tail.len());

    let url = tail[..end].trim_end_matches(['.', ',', ';', ')']);
    if url.len() > "https://".len() {
        Some(url.to_string())
    } else {
        None
    }
}
