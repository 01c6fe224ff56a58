//! Handler stack
//!
//! Handlers are searched newest-first; the first match wins. Construction-time
//! handlers form a baseline that [`HandlerStack::reset`] keeps, everything
//! installed afterwards is an override that `reset` drops.

use reqwest::{Method, Url};

use super::Handler;

/// Ordered collection of installed handlers
#[derive(Debug, Clone, Default)]
pub struct HandlerStack {
    baseline: Vec<Handler>,
    overrides: Vec<Handler>,
}

impl HandlerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack whose baseline survives [`reset`](Self::reset)
    pub fn with_baseline(baseline: Vec<Handler>) -> Self {
        Self {
            baseline,
            overrides: Vec::new(),
        }
    }

    /// Install handlers on top of everything already present
    pub fn push(&mut self, handlers: impl IntoIterator<Item = Handler>) {
        self.overrides.extend(handlers);
    }

    /// Drop all overrides
    pub fn reset(&mut self) {
        self.overrides.clear();
    }

    /// Drop everything, baseline included
    pub fn clear(&mut self) {
        self.baseline.clear();
        self.overrides.clear();
    }

    /// Most recently installed handler matching the request
    pub fn find(&self, method: &Method, url: &Url) -> Option<&Handler> {
        self.iter_newest_first()
            .find(|handler| handler.matches(method, url))
    }

    pub fn len(&self) -> usize {
        self.baseline.len() + self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter_newest_first(&self) -> impl Iterator<Item = &Handler> {
        self.overrides.iter().rev().chain(self.baseline.iter().rev())
    }
}
