//! # Rule Resolution
//!
//! Selects the rules that apply to a document and turns them into the work
//! plan: the resize size and the list of watermarks.
//!
//! A rule matches when its collection matcher is `*` or equal to the wanted
//! collection, and likewise for the media type. Unknown document keys are
//! compared as empty strings, so they only match `*` or an empty matcher.
//! Declaration order is kept everywhere; there is no specificity ranking.

use crate::config::{ImageRule, WILDCARD};
use crate::watermark::WatermarkSpec;

/// Collection and media type read from the document's metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentKeys {
    pub collection: Option<String>,
    pub media_type: Option<String>,
}

impl DocumentKeys {
    pub fn new(collection: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            media_type: Some(media_type.into()),
        }
    }

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or("")
    }

    pub fn media_type(&self) -> &str {
        self.media_type.as_deref().unwrap_or("")
    }
}

fn matcher_accepts(matcher: &str, wanted: &str) -> bool {
    matcher == WILDCARD || matcher == wanted
}

/// All rules matching the wanted collection and media type, in declaration order
pub fn select_rules<'a>(rules: &'a [ImageRule], collection: &str, media_type: &str) -> Vec<&'a ImageRule> {
    rules
        .iter()
        .filter(|rule| {
            matcher_accepts(&rule.collection, collection) && matcher_accepts(&rule.media_type, media_type)
        })
        .collect()
}

/// Resize size of the first matching rule, 0 when nothing matches or the rule leaves it unset
pub fn resize_size(rules: &[ImageRule], keys: &DocumentKeys) -> u32 {
    select_rules(rules, keys.collection(), keys.media_type())
        .first()
        .map(|rule| rule.resize_to)
        .unwrap_or(0)
}

/// Watermarks of every matching rule, in rule order and then declaration order
pub fn build_descriptors(rules: &[&ImageRule]) -> Vec<WatermarkSpec> {
    rules
        .iter()
        .flat_map(|rule| rule.watermarks.iter().map(WatermarkSpec::from))
        .collect()
}

/// Shortcut for [`select_rules`] followed by [`build_descriptors`]
pub fn watermarks_for(rules: &[ImageRule], keys: &DocumentKeys) -> Vec<WatermarkSpec> {
    build_descriptors(&select_rules(rules, keys.collection(), keys.media_type()))
}
