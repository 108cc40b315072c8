use axum::http::{HeaderMap, Method, header};

// User-agent fragments of crawlers, HTTP libraries and automation tools
const USER_AGENT_DENYLIST: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "curl",
    "wget",
    "python-requests",
    "python-urllib",
    "httpie",
    "postman",
    "insomnia",
    "axios",
    "node-fetch",
    "go-http-client",
    "java/",
    "okhttp",
    "libwww-perl",
    "headless",
    "phantomjs",
    "selenium",
    "puppeteer",
    "playwright",
];

// Heuristic only, trivially bypassed by a client sending browser headers.
pub fn is_likely_bot(headers: &HeaderMap, method: &Method) -> bool {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();

    let denylisted = USER_AGENT_DENYLIST
        .iter()
        .any(|needle| user_agent.contains(needle));

    let no_browser_headers =
        !headers.contains_key(header::ACCEPT) && !headers.contains_key(header::ACCEPT_LANGUAGE);
    let bare_post = *method == Method::POST && !headers.contains_key(header::REFERER);

    denylisted || (no_browser_headers && bare_post)
}
