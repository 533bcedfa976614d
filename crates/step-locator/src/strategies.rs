//! Ordered fallback-strategy generation.
//!
//! Pure and deterministic: the same input always yields the same ordered
//! list. Cheap, specific probes (attribute equality) come before broad,
//! expensive ones (substring text scans), which bounds both latency and the
//! chance of a false-positive match.

use crate::hint::normalize_xpath;
use crate::types::FallbackStrategy;

const EXACT_ATTRS: [&str; 5] = ["id", "class", "name", "data-testid", "aria-label"];

/// Build the fallback cascade for a primary selector or descriptive term.
pub fn generate(primary: &str) -> Vec<FallbackStrategy> {
    let primary = primary.trim();
    let mut out: Vec<FallbackStrategy> = Vec::new();

    if primary.is_empty() {
        return out;
    }

    if primary.contains("//") {
        let xpath = normalize_xpath(primary);
        push(&mut out, FallbackStrategy::xpath("explicit-xpath", &xpath));
        if let Some(text) = extract_text_predicate(&xpath) {
            if !text.contains('\'') {
                push(
                    &mut out,
                    FallbackStrategy::xpath(
                        "text-exact",
                        format!("//*[normalize-space(text())='{text}']"),
                    ),
                );
            }
        }
        return out;
    }
    if primary.contains('#') || primary.contains('.') || primary.contains('[') {
        push(&mut out, FallbackStrategy::css("explicit-css", primary));
        return out;
    }

    let token = primary;
    let lower = token.to_lowercase();

    for attr in EXACT_ATTRS {
        push(
            &mut out,
            FallbackStrategy::css(&format!("exact-{attr}"), format!("[{attr}=\"{token}\"]")),
        );
    }
    for attr in EXACT_ATTRS {
        push(
            &mut out,
            FallbackStrategy::css(
                &format!("contains-{attr}"),
                format!("[{attr}*=\"{token}\" i]"),
            ),
        );
    }
    if token.contains(' ') {
        let kebab = lower.split_whitespace().collect::<Vec<_>>().join("-");
        for attr in ["id", "class", "data-testid"] {
            push(
                &mut out,
                FallbackStrategy::css(
                    &format!("kebab-{attr}"),
                    format!("[{attr}*=\"{kebab}\" i]"),
                ),
            );
        }
    }

    // Text scans run last among the generic probes; a substring of visible
    // text is far more likely to mismatch than an attribute equality.
    if !token.contains('\'') {
        push(
            &mut out,
            FallbackStrategy::xpath(
                "text-exact",
                format!("//*[normalize-space(text())='{token}']"),
            ),
        );
        push(
            &mut out,
            FallbackStrategy::xpath("text-contains", format!("//*[contains(text(),'{token}')]")),
        );
        push(
            &mut out,
            FallbackStrategy::xpath(
                "button-text",
                format!("//button[contains(text(),'{token}')]"),
            ),
        );
        let words: Vec<&str> = token.split_whitespace().collect();
        if words.len() > 1 {
            let preds = words
                .iter()
                .map(|w| format!("contains(text(),'{w}')"))
                .collect::<Vec<_>>()
                .join(" and ");
            push(
                &mut out,
                FallbackStrategy::xpath("text-words", format!("//*[{preds}]")),
            );
        }
    }

    synonym_probes(&lower, &mut out);
    shortcut_probes(&lower, &mut out);

    out
}

/// Identity fields are labeled "username" on some forms and "email" on
/// others; a step naming one should still find the other.
fn synonym_probes(lower: &str, out: &mut Vec<FallbackStrategy>) {
    if lower.contains("user") {
        push(out, FallbackStrategy::css("synonym-email-type", "input[type=\"email\"]"));
        push(out, FallbackStrategy::css("synonym-email-id", "[id*=\"email\" i]"));
        push(out, FallbackStrategy::css("synonym-email-name", "[name*=\"email\" i]"));
    }
    if lower.contains("email") {
        push(out, FallbackStrategy::css("synonym-email-type", "input[type=\"email\"]"));
        push(out, FallbackStrategy::css("synonym-user-id", "[id*=\"user\" i]"));
        push(out, FallbackStrategy::css("synonym-user-name", "[name*=\"user\" i]"));
    }
}

fn shortcut_probes(lower: &str, out: &mut Vec<FallbackStrategy>) {
    if lower.contains("login")
        || lower.contains("log in")
        || lower.contains("sign in")
        || lower.contains("signin")
    {
        push(out, FallbackStrategy::css("login-href", "a[href*=\"login\" i]"));
        push(out, FallbackStrategy::css("login-id", "[id*=\"login\" i]"));
        push(out, FallbackStrategy::css("login-class", "[class*=\"login\" i]"));
        push(out, FallbackStrategy::css("login-href-signin", "a[href*=\"signin\" i]"));
    }
    if lower.contains("modal") || lower.contains("close") || lower.contains("dismiss") {
        push(out, FallbackStrategy::css("modal-close-class", "[class*=\"close\" i]"));
        push(out, FallbackStrategy::css("modal-close-aria", "[aria-label=\"Close\"]"));
        push(out, FallbackStrategy::css("modal-close", ".modal-close"));
        push(out, FallbackStrategy::css("modal-close-button", "button.close"));
    }
}

fn push(out: &mut Vec<FallbackStrategy>, candidate: FallbackStrategy) {
    if !out
        .iter()
        .any(|s| s.method == candidate.method && s.selector == candidate.selector)
    {
        out.push(candidate);
    }
}

/// Pull the literal out of a `text()='...'` predicate so an explicit xpath
/// hint also gets a whitespace-tolerant sibling probe.
fn extract_text_predicate(xpath: &str) -> Option<String> {
    let pos = xpath.find("text())=").map(|p| p + "text())=".len()).or_else(|| {
        xpath.find("text()=").map(|p| p + "text()=".len())
    })?;
    let rest = &xpath[pos..];
    let quote = rest.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}
