//! Test support strategies
//!
//! `Lines` renders text and compares it line by line. `Lines::delayed`
//! and `Unproducible` exercise the engine's bounded wait and abnormal
//! completion paths.

use crate::traits::{Diffing, Rendering, Snapshotting};
use crate::types::Difference;
use std::time::Duration;

/// Line-oriented text diffing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDiffing;

impl Diffing for LineDiffing {
    type Format = String;

    fn serialize(&self, value: &String) -> Vec<u8> {
        value.as_bytes().to_vec()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String, String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
    }

    fn compare(&self, reference: &String, actual: &String) -> Option<Difference> {
        if reference == actual {
            return None;
        }
        let expected: Vec<&str> = reference.lines().collect();
        let found: Vec<&str> = actual.lines().collect();
        let mut out = Vec::new();
        for i in 0..expected.len().max(found.len()) {
            let (e, f) = (expected.get(i), found.get(i));
            if e == f {
                continue;
            }
            out.push(format!("@@ line {} @@", i + 1));
            if let Some(e) = e {
                out.push(format!("-{}", e));
            }
            if let Some(f) = f {
                out.push(format!("+{}", f));
            }
        }
        if out.is_empty() {
            // Only trailing newlines differ
            out.push("@@ trailing newline differs @@".to_string());
        }
        Some(Difference::new(out.join("\n")))
    }
}

/// Text strategy stored with a `txt` extension.
#[derive(Debug, Clone, Default)]
pub struct Lines {
    delay: Option<Duration>,
    diffing: LineDiffing,
}

impl Lines {
    /// Render immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render after sleeping for `delay` on the tokio timer.
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            diffing: LineDiffing,
        }
    }

    fn render_text(&self, text: String) -> Rendering<String> {
        match self.delay {
            None => Rendering::ready(text),
            Some(delay) => Rendering::from_future(async move {
                tokio::time::sleep(delay).await;
                text
            }),
        }
    }
}

impl Snapshotting<str> for Lines {
    type Format = String;
    type Diffing = LineDiffing;

    fn render(&self, value: &str) -> Rendering<String> {
        self.render_text(value.to_string())
    }

    fn diffing(&self) -> &LineDiffing {
        &self.diffing
    }

    fn extension(&self) -> Option<&str> {
        Some("txt")
    }
}

impl Snapshotting<String> for Lines {
    type Format = String;
    type Diffing = LineDiffing;

    fn render(&self, value: &String) -> Rendering<String> {
        self.render_text(value.clone())
    }

    fn diffing(&self) -> &LineDiffing {
        &self.diffing
    }

    fn extension(&self) -> Option<&str> {
        Some("txt")
    }
}

/// A strategy whose producer always goes away without delivering.
#[derive(Debug, Clone, Default)]
pub struct Unproducible {
    diffing: LineDiffing,
}

impl Snapshotting<str> for Unproducible {
    type Format = String;
    type Diffing = LineDiffing;

    fn render(&self, _value: &str) -> Rendering<String> {
        let (tx, rendering) = Rendering::channel();
        drop(tx);
        rendering
    }

    fn diffing(&self) -> &LineDiffing {
        &self.diffing
    }
}
