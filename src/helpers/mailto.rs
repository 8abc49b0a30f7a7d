//! Pre-filled `mailto:` links for applications, reports, and contact

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::{ContactChannel, Job, SiteConfig};

/// Characters left unescaped by JavaScript's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a query component
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Build a `mailto:` URL; body lines are joined with newlines
pub fn mailto(to: &str, subject: &str, body: &[&str]) -> String {
    let mut url = format!("mailto:{}?subject={}", to, encode_component(subject));
    if !body.is_empty() {
        url.push_str("&body=");
        url.push_str(&encode_component(&body.join("\n")));
    }
    url
}

/// Application for an open role, addressed to the careers inbox
pub fn job_application(config: &SiteConfig, job: &Job) -> String {
    let apply = format!("I’d like to apply for the {} role.", job.title);
    let greeting = format!("Hi {} Team,", config.title);
    mailto(
        &config.careers_email,
        &format!("Application: {} — {}", job.title, job.dept),
        &[
            &greeting,
            "",
            &apply,
            "",
            "Name:",
            "Location:",
            "LinkedIn / X / Portfolio:",
            "Notice Period (if any):",
            "",
            "Brief: (2–3 lines about why you're a fit)",
            "",
            "Thanks!",
        ],
    )
}

pub fn ambassador_application(config: &SiteConfig) -> String {
    let greeting = format!("Hi {} Team,", config.title);
    let why = format!("Why {} (2–3 lines):", config.title);
    mailto(
        &config.careers_email,
        &format!("{} Ambassador Application", config.title),
        &[
            &greeting,
            "",
            "I’d like to apply for the Ambassador program.",
            "",
            "Name:",
            "X / Telegram / Discord:",
            "Region / Time zone:",
            "Links (communities or content):",
            "",
            &why,
            "",
            "Thanks!",
        ],
    )
}

/// Vulnerability report, addressed to the security inbox
pub fn security_report(config: &SiteConfig) -> String {
    mailto(
        &config.security_email,
        &format!("Security Report — {}", config.title),
        &[
            "Hi Security Team,",
            "",
            "Issue summary:",
            "-",
            "",
            "Steps to reproduce / PoC:",
            "-",
            "",
            "Impact assessment:",
            "-",
            "",
            "Your contact for follow-up:",
            "-",
        ],
    )
}

pub fn contact(config: &SiteConfig, channel: &ContactChannel) -> String {
    mailto(
        &channel.email,
        &format!("{} — {}", config.title, channel.title),
        &[],
    )
}
