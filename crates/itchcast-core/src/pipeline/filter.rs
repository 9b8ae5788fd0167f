use std::collections::BTreeSet;

use crate::protocols::itch::ItchMessage;

/// Selects decoded messages by stock symbol and/or type tag.
///
/// Stock matching is exact against the decoded `stock` field (symbols are
/// normalized to trimmed upper case when added). With a stock set active,
/// kinds that carry no stock are rejected. An empty filter accepts
/// everything.
///
/// # Examples
/// ```
/// use itchcast_core::{ItchMessage, MessageFilter};
///
/// let filter = MessageFilter::new().with_tags([b'Z']);
/// assert!(filter.matches(&ItchMessage::Unknown { tag: b'Z', length: 1 }));
/// assert!(!filter.matches(&ItchMessage::Unknown { tag: b'Y', length: 1 }));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    stocks: BTreeSet<String>,
    tags: BTreeSet<u8>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stocks<I, S>(mut self, stocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stocks.extend(
            stocks
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty()),
        );
        self
    }

    pub fn with_tags<I: IntoIterator<Item = u8>>(mut self, tags: I) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, message: &ItchMessage) -> bool {
        if !self.tags.is_empty() && !self.tags.contains(&message.tag()) {
            return false;
        }
        if self.stocks.is_empty() {
            return true;
        }
        message
            .stock()
            .is_some_and(|stock| self.stocks.contains(stock))
    }
}
