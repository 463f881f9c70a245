//! mxGraph style strings
//!
//! A style is a `;`-separated list of `key=value` pairs and bare names, e.g.
//! `swimlane;fontStyle=2;html=1;`. Bare names are usually the base style.

use std::collections::BTreeMap;

/// `fontStyle` bit for italic text
const FONT_ITALIC: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    names: Vec<String>,
    values: BTreeMap<String, String>,
}

impl Style {
    pub fn parse(style: &str) -> Self {
        let mut parsed = Self::default();
        for entry in style.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((key, value)) => {
                    parsed
                        .values
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
                None => parsed.names.push(entry.to_string()),
            }
        }
        parsed
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// `key=1`
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    /// Class box: `swimlane` base style or `shape=swimlane`
    pub fn is_swimlane(&self) -> bool {
        self.has_name("swimlane") || self.get("shape") == Some("swimlane")
    }

    pub fn is_html(&self) -> bool {
        self.flag("html")
    }

    pub fn is_edge_label(&self) -> bool {
        self.has_name("edgeLabel")
    }

    pub fn is_italic(&self) -> bool {
        self.get("fontStyle")
            .and_then(|v| v.parse::<u32>().ok())
            .is_some_and(|bits| bits & FONT_ITALIC != 0)
    }
}
