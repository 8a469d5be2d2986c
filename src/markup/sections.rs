//! Section tree of a page.
use lazy_static::lazy_static;
use regex::Regex;

use super::normalizer::{normalize, NormalizeOptions};

lazy_static! {
    /// A heading line of any level. The level is checked by the caller,
    /// since the regex crate has no backreferences.
    static ref HEADING: Regex = Regex::new(r"(?m)^(=+)([^=\r\n]+?)(=+)[\r\n]+").unwrap();
}

/// A node of the section tree.
///
/// The root of a tree is unnamed and holds the text found before the first heading.
/// Concatenating `heading` and `content` of every node in depth-first order
/// gives back the markup the tree was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    heading: String,
    content: String,
    children: Vec<Section>,
}

impl Section {
    /// Section name, as written between the `=` markers (trimmed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw heading line, including markers and line break. Empty for the root.
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Markup between the heading and the first subsection.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn children(&self) -> &[Section] {
        &self.children
    }

    /// Plaintext of this section's own content (subsections excluded).
    pub fn plaintext(&self, options: &NormalizeOptions) -> String {
        normalize(&self.content, options)
    }

    /// Depth-first search for a section with the provided name.
    pub fn find(&self, name: &str) -> Option<&Section> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Rebuilds the markup this tree was parsed from.
    pub fn to_markup(&self) -> String {
        let mut markup = String::with_capacity(self.heading.len() + self.content.len());
        self.write_markup(&mut markup);
        markup
    }

    fn write_markup(&self, out: &mut String) {
        out.push_str(&self.heading);
        out.push_str(&self.content);
        for child in &self.children {
            child.write_markup(out);
        }
    }
}

/// Parses `markup` into a section tree, starting at headings of `level` equal signs
/// (`==History==` is level 2).
///
/// Levels below 2 are treated as 2.
pub fn parse_sections(title: &str, markup: &str, level: usize) -> Section {
    parse(title.to_string(), String::new(), markup, level.max(2))
}

fn parse(name: String, heading: String, markup: &str, level: usize) -> Section {
    let headings: Vec<_> = HEADING
        .captures_iter(markup)
        .filter(|caps| caps[1].len() == level && caps[3].len() == level)
        .collect();

    if headings.is_empty() {
        return Section {
            name,
            heading,
            content: markup.to_string(),
            children: Vec::new(),
        };
    }

    // captures_iter yields matches in order, so bounds are increasing.
    let bounds: Vec<(usize, usize)> = headings
        .iter()
        .map(|caps| {
            let m = caps.get(0).map_or(0..0, |m| m.range());
            (m.start, m.end)
        })
        .collect();

    let children = headings
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let (start, content_start) = bounds[i];
            let content_end = bounds.get(i + 1).map_or(markup.len(), |&(next, _)| next);
            parse(
                caps[2].trim().to_string(),
                markup[start..content_start].to_string(),
                &markup[content_start..content_end],
                level + 1,
            )
        })
        .collect();

    Section {
        name,
        heading,
        content: markup[..bounds[0].0].to_string(),
        children,
    }
}
