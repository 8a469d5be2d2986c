/*! MediaWiki XML dump reader.

Dumps are huge, so they are streamed line by line and only one `<page>` element is held in memory at a time.
This relies on dumps having `<page>` and `</page>` on their own lines, which is the case for every dump produced by MediaWiki.
!*/
use std::borrow::Cow;
use std::io::{BufRead, Lines};

use lazy_static::lazy_static;
use log::warn;
use regex::{Captures, Regex};

use crate::error::Error;
use crate::markup::NormalizeOptions;
use crate::page::Page;

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?s)<title>(.*?)</title>").unwrap();
    // first one is the page id, next ones belong to revisions/contributors.
    static ref ID: Regex = Regex::new(r"<id>\s*(\d+)\s*</id>").unwrap();
    static ref TEXT: Regex = Regex::new(r"(?s)<text[^>]*?(?:/>|>(.*?)</text>)").unwrap();
    static ref ENTITY: Regex =
        Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#[xX][0-9a-fA-F]+);").unwrap();
}

const PAGE_START: &str = "<page>";
const PAGE_END: &str = "</page>";

/// Replaces predefined XML entities and numeric character references.
///
/// Invalid code points are left as is.
pub fn unescape(text: &str) -> Cow<str> {
    ENTITY.replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let number = &entity[1..];
                let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Streams [Page]s out of an XML dump.
///
/// Every page is yielded, including redirects and special pages.
pub struct DumpReader<R> {
    lines: Lines<R>,
    options: NormalizeOptions,
    line_number: usize,
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            options: NormalizeOptions::default(),
            line_number: 0,
        }
    }

    /// Normalization options given to every read page.
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds a [Page] from a buffered `<page>` element.
    fn parse_page(&self, element: &str) -> Result<Page, Error> {
        let title = TITLE
            .captures(element)
            .and_then(|caps| caps.get(1))
            .map(|title| unescape(title.as_str()).trim().to_string())
            .ok_or_else(|| {
                Error::Custom(format!(
                    "page without title ending at line {}",
                    self.line_number
                ))
            })?;

        let id = ID
            .captures(element)
            .and_then(|caps| caps[1].parse::<u64>().ok());

        let text = match TEXT.captures(element).and_then(|caps| caps.get(1)) {
            Some(text) => unescape(text.as_str()).into_owned(),
            None => {
                if !TEXT.is_match(element) {
                    warn!("page {:?} has no text element", title);
                }
                String::new()
            }
        };

        Ok(Page::new(id, title, text).with_options(self.options))
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<Page, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut element = String::new();
        let mut in_page = false;

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Some(Err(e.into())),
                None if in_page => {
                    return Some(Err(Error::Custom(format!(
                        "unterminated page element at end of dump (line {})",
                        self.line_number
                    ))))
                }
                None => return None,
            };
            self.line_number += 1;

            if !in_page {
                if !line.trim_start().starts_with(PAGE_START) {
                    continue;
                }
                in_page = true;
            }

            element.push_str(&line);
            element.push('\n');

            if line.trim_end().ends_with(PAGE_END) {
                return Some(self.parse_page(&element));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/" xml:lang="en">
  <siteinfo>
    <sitename>Wikipedia</sitename>
  </siteinfo>
  <page>
    <title>Anarchism</title>
    <ns>0</ns>
    <id>12</id>
    <revision>
      <id>1001</id>
      <text bytes="95" xml:space="preserve">'''Anarchism''' is a [[political philosophy]].
&lt;ref&gt;note&lt;/ref&gt;

==History==
Tom &amp; Jerry &quot;quoted&quot;</text>
    </revision>
  </page>
  <page>
    <title>AfghanistanHistory</title>
    <id>13</id>
    <redirect title="History of Afghanistan" />
    <revision>
      <id>1002</id>
      <text xml:space="preserve">#REDIRECT [[History of Afghanistan]]</text>
    </revision>
  </page>
  <page>
    <title>Empty</title>
    <id>14</id>
    <revision>
      <id>1003</id>
      <text bytes="0" xml:space="preserve" />
    </revision>
  </page>
</mediawiki>
"#;

    fn read(dump: &str) -> Vec<Result<Page, Error>> {
        DumpReader::new(Cursor::new(dump.to_string())).collect()
    }

    #[test]
    fn reads_pages() {
        let pages: Vec<Page> = read(DUMP).into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(pages.len(), 3);

        assert_eq!(pages[0].title(), "Anarchism");
        assert_eq!(pages[0].id(), Some(12));
        assert!(pages[0].raw_text().starts_with("'''Anarchism'''"));
        assert!(pages[0].raw_text().contains("<ref>note</ref>"));
        assert!(pages[0].raw_text().ends_with("Tom & Jerry \"quoted\""));
        assert_eq!(
            pages[0].plaintext(),
            "Anarchism is a political philosophy.\n\nHistory\n\nTom & Jerry \"quoted\""
        );

        assert_eq!(pages[1].id(), Some(13));
        assert!(pages[1].is_redirect());

        assert_eq!(pages[2].title(), "Empty");
        assert_eq!(pages[2].raw_text(), "");
    }

    #[test]
    fn options_are_forwarded() {
        let dump = "<page>\n<title>T</title>\n<text>a (b) c</text>\n</page>\n";
        let page = DumpReader::new(Cursor::new(dump.to_string()))
            .with_options(NormalizeOptions::with_parentheticals_removed())
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(page.id(), None);
        assert_eq!(page.plaintext(), "a c");
    }

    #[test]
    fn truncated_dump() {
        let dump = "<page>\n<title>T</title>\n<text>abc";
        let pages = read(dump);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_err());
    }

    #[test]
    fn missing_title() {
        let dump = "<page>\n<text>abc</text>\n</page>\n";
        assert!(read(dump)[0].is_err());
    }

    #[test]
    fn entities() {
        assert_eq!(unescape("&lt;b&gt; &amp;amp;"), "<b> &amp;");
        assert_eq!(unescape("&#233;t&#xE9; &#X41;"), "été A");
        assert_eq!(unescape("&#1114112; &nbsp;"), "&#1114112; &nbsp;");
        assert_eq!(unescape("no entity"), "no entity");
    }
}
