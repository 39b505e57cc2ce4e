//! Rationale composition.
//!
//! Reasons are collected while scoring, deduplicated by text and ranked by
//! the magnitude of their score impact. Pinned reasons (overrides) always
//! lead.

use crate::ordered_set::OrderedSet;

/// One line of rationale.
///
/// Two reasons are the same reason when their text matches; the first
/// recorded impact is kept.
#[derive(Debug, Clone)]
pub struct Reason {
    pub text: String,
    pub impact: i32,
    pub pinned: bool,
}

impl PartialEq for Reason {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// Final ranked rationale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub reasons: Vec<String>,
    pub text: String,
}

/// Collects reasons during one evaluation.
#[derive(Debug, Clone, Default)]
pub struct ExplanationBuilder {
    reasons: OrderedSet<Reason>,
}

impl ExplanationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason. Returns `false` when the same text was already
    /// recorded.
    pub fn add(&mut self, text: impl Into<String>, impact: i32) -> bool {
        self.reasons.insert(Reason {
            text: text.into(),
            impact,
            pinned: false,
        })
    }

    /// Record a reason that ranks ahead of every unpinned one.
    pub fn pin(&mut self, text: impl Into<String>) -> bool {
        self.reasons.insert(Reason {
            text: text.into(),
            impact: 0,
            pinned: true,
        })
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Rank and truncate to at most `max_reasons` lines.
    ///
    /// Pinned reasons come first in insertion order, then the rest by
    /// descending absolute impact; ties keep insertion order.
    pub fn compose(&self, max_reasons: usize) -> Explanation {
        let mut ranked: Vec<&Reason> = self.reasons.iter().collect();
        ranked.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.impact.abs().cmp(&a.impact.abs()))
        });

        let reasons: Vec<String> = ranked
            .into_iter()
            .take(max_reasons)
            .map(|r| r.text.clone())
            .collect();
        let text = render(&reasons);
        Explanation { reasons, text }
    }
}

/// Single-message explanation used when an override discards the rationale.
pub fn single(message: &str) -> Explanation {
    let reasons = vec![message.to_string()];
    let text = render(&reasons);
    Explanation { reasons, text }
}

fn render(reasons: &[String]) -> String {
    if reasons.is_empty() {
        return "No risk factors identified.".to_string();
    }
    let mut text = reasons.join("; ");
    if !text.ends_with('.') {
        text.push('.');
    }
    text
}
