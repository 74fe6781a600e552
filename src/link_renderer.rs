//! Link rendering strategy (§4.6), grounded on the teacher's
//! `SyntaxHighlighterAdapter`-shaped plugin traits (`src/adapters.rs`): one
//! small trait, one concrete default, subclassable by callers.

use crate::html::attributes::Attributes;
use crate::nodes::{NodeLink, NodeWikiLink};

/// The href/text/attributes a link-like node resolves to at serialization
/// time.
#[derive(Debug, Clone, Default)]
pub struct Rendering {
    pub href: String,
    pub text: String,
    pub attributes: Attributes,
}

/// One overload per link node kind (§4.6). The default implementation
/// obfuscates mail addresses, percent-encodes wiki page names, and
/// HTML-encodes titles; subclass to add attributes such as `rel="nofollow"`.
pub trait LinkRenderer: Send + Sync {
    fn auto_link(&self, link: &NodeLink, text: &str) -> Rendering {
        default_link(link, text)
    }

    fn mail_link(&self, link: &NodeLink, text: &str) -> Rendering {
        let mut r = default_link(link, text);
        r.href = obfuscate_mailto(&r.href);
        r.text = obfuscate_email_text(text);
        r
    }

    fn anchor_link(&self, link: &NodeLink, text: &str) -> Rendering {
        let mut r = default_link(link, text);
        r.attributes.add("name", &r.href.clone());
        r
    }

    fn wiki_link(&self, link: &NodeWikiLink, _text: &str) -> Rendering {
        let (path, fragment) = match link.page.split_once('#') {
            Some((p, f)) => (p, Some(f)),
            None => (link.page.as_str(), None),
        };
        let mut href = crate::html::attributes::percent_encode_path(&path.replace(' ', "-"));
        href.push_str(".html");
        if let Some(fragment) = fragment {
            href.push('#');
            href.push_str(fragment);
        }
        let display = link.text.clone().unwrap_or_else(|| link.page.clone());
        Rendering {
            href,
            text: html_encode(&display),
            attributes: Attributes::default(),
        }
    }

    fn exp_link(&self, link: &NodeLink, text: &str) -> Rendering {
        default_link(link, text)
    }

    fn exp_image(&self, link: &NodeLink, text: &str) -> Rendering {
        default_link(link, text)
    }

    fn ref_link(&self, link: &NodeLink, text: &str) -> Rendering {
        default_link(link, text)
    }

    fn ref_image(&self, link: &NodeLink, text: &str) -> Rendering {
        default_link(link, text)
    }
}

/// Builds the default rendering for a leaf link (auto/mail/anchor): `text`
/// here is always the node's own literal content, never rendered HTML from
/// children, so it is HTML-encoded on the way in. `exp_link`/`ref_link`
/// wrap rich (possibly-nested) children instead and never call this.
fn default_link(link: &NodeLink, text: &str) -> Rendering {
    let mut attributes = Attributes::default();
    if !link.title.is_empty() {
        attributes.add("title", &html_encode(&link.title));
    }
    Rendering {
        href: link.url.clone(),
        text: html_encode(text),
        attributes,
    }
}

fn html_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Scrambles each character of a `mailto:` address into a mix of decimal
/// and hex numeric character references, the classic email-obfuscation
/// trick the teacher's link renderer performs on mail links.
fn obfuscate_mailto(addr: &str) -> String {
    let mut out = String::from("mailto:");
    obfuscate_into(&mut out, addr.trim_start_matches("mailto:"));
    out
}

fn obfuscate_email_text(text: &str) -> String {
    let mut out = String::new();
    obfuscate_into(&mut out, text);
    out
}

fn obfuscate_into(out: &mut String, s: &str) {
    for (i, c) in s.chars().enumerate() {
        if i % 3 == 0 {
            out.push_str(&format!("&#{};", c as u32));
        } else if i % 3 == 1 {
            out.push_str(&format!("&#x{:x};", c as u32));
        } else {
            out.push(c);
        }
    }
}

/// The default [`LinkRenderer`], with no additional attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLinkRenderer;

impl LinkRenderer for DefaultLinkRenderer {}
