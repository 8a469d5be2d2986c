//! Wiki page and its derived views.
use std::cell::OnceCell;

use lazy_static::lazy_static;
use regex::Regex;

use crate::markup::{normalize, parse_sections, NormalizeOptions, Section};

lazy_static! {
    /// Approximately identifies special pages ("Category:foo", "File:foo.jpg", "Wikipedia:something").
    static ref SPECIAL_PAGE: Regex = Regex::new(r"(?i)^[a-z]+:").unwrap();
}

const REDIRECT: &str = "#REDIRECT";

/// Level at which page sections start (`==English==`).
const TOP_SECTION_LEVEL: usize = 2;

/// A page read from a dump or an exchange file.
///
/// Plaintext and sections are computed on first access and cached.
#[derive(Debug, Clone)]
pub struct Page {
    id: Option<u64>,
    title: String,
    raw_text: String,
    options: NormalizeOptions,
    plaintext: OnceCell<String>,
    sections: OnceCell<Section>,
}

impl Page {
    pub fn new(id: Option<u64>, title: String, raw_text: String) -> Self {
        Self {
            id,
            title,
            raw_text,
            options: NormalizeOptions::default(),
            plaintext: OnceCell::new(),
            sections: OnceCell::new(),
        }
    }

    /// Create a page whose plaintext is already known (from an exchange file for example).
    /// The raw markup is unknown and left empty.
    pub fn from_plaintext(title: String, plaintext: String) -> Self {
        let page = Self::new(None, title, String::new());
        // freshly created cell, can't be set already.
        let _ = page.plaintext.set(plaintext);
        page
    }

    /// Sets normalization options used by [Page::plaintext].
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        if self.options != options && !self.raw_text.is_empty() {
            self.plaintext = OnceCell::new();
        }
        self.options = options;
        self
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The (approximately) plaintext version of the page.
    pub fn plaintext(&self) -> &str {
        self.plaintext
            .get_or_init(|| normalize(&self.raw_text, &self.options))
    }

    /// Section tree, rooted at an unnamed section holding the text before the first `==Heading==`.
    pub fn sections(&self) -> &Section {
        self.sections
            .get_or_init(|| parse_sections("", &self.raw_text, TOP_SECTION_LEVEL))
    }

    pub fn is_redirect(&self) -> bool {
        self.raw_text
            .get(..REDIRECT.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(REDIRECT))
    }

    pub fn is_special_page(&self) -> bool {
        SPECIAL_PAGE.is_match(&self.title)
    }

    pub fn is_disambiguation(&self) -> bool {
        self.title.contains("(disambiguation)")
    }

    /// true if the page is a regular article
    pub fn is_article(&self) -> bool {
        !(self.is_redirect() || self.is_special_page() || self.is_disambiguation())
    }

    /// Checks for a top-level section of that exact name (Wiktionary language sections).
    pub fn has_language(&self, language: &str) -> bool {
        self.sections()
            .children()
            .iter()
            .any(|section| section.name() == language)
    }
}
