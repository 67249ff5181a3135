use colored::*;
use notification::markup::{element_id, ELEMENT_ID_PREFIX};
use notification::Key;

/// Terminal stand-in for the DOM: prints what a browser would show.
#[derive(Debug, Default)]
pub struct Presenter {
    html: String,
}

impl Presenter {
    /// Remembers the latest container markup so entries can be shown by text.
    pub fn update(&mut self, html: String) {
        self.html = html;
    }

    pub fn enter(&self, key: &Key) {
        if key.is_disconnected() {
            println!("{} {}", "⚠".yellow(), "Connection lost, reconnecting…".yellow().bold());
            return;
        }
        println!("{} [{}] {}", "+".green(), short(key), self.text_of(key));
    }

    pub fn exit(&self, key: &Key) {
        if key.is_disconnected() {
            println!("{} {}", "✓".green(), "Connection restored".green());
            return;
        }
        println!("{} [{}] {}", "~".blue(), short(key), "leaving".dimmed());
    }

    pub fn removed(&self, key: &Key) {
        println!("{} [{}]", "-".red(), short(key));
    }

    pub fn stack(&self, keys: &[Key]) {
        if keys.is_empty() {
            println!("{}", "(no notifications)".dimmed());
        }
        for (i, key) in keys.iter().enumerate() {
            println!("{:>3}. [{}] {}", i + 1, short(key), self.text_of(key));
        }
    }

    /// Visible text of `key`'s element in the last render.
    pub fn text_of(&self, key: &Key) -> String {
        let marker = format!(r#"id="{}""#, element_id(key));
        let Some(start) = self.html.find(&marker) else {
            return String::new();
        };
        let rest = &self.html[start + marker.len()..];
        let next = format!(r#"id="{ELEMENT_ID_PREFIX}"#);
        let end = rest.find(&next).unwrap_or(rest.len());
        strip_tags(&rest[..end])
    }
}

fn short(key: &Key) -> &str {
    let key = key.as_str();
    key.get(..8).unwrap_or(key)
}

fn strip_tags(fragment: &str) -> String {
    let mut text = String::new();
    let mut in_tag = true;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&times;", "")
        .replace("&hellip;", "…")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
