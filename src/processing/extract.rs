/*! Page extraction commands.

[Extraction] converts a dump (or re-filters an exchange file) into an exchange file,
[ArticleLookup] extracts a single page to inspect normalization results.
!*/
use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info};

use crate::error::Error;
use crate::io::{open_pages, ExchangeWriter};
use crate::markup::NormalizeOptions;
use crate::page::Page;

/// Page selection criteria. Empty criteria keep every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    /// Keep pages that have a top-level section of that name (Wiktionary languages).
    pub language: Option<String>,
    /// Keep pages whose raw markup contains that literal string.
    pub contains: Option<String>,
}

impl PageFilter {
    pub fn keep(&self, page: &Page) -> bool {
        if let Some(language) = &self.language {
            if !page.has_language(language) {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            if !page.raw_text().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Writes every kept page into an exchange file.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub src: PathBuf,
    pub dst: PathBuf,
    /// Stop after that many written pages.
    pub articles: Option<usize>,
    pub filter: PageFilter,
    pub options: NormalizeOptions,
}

impl Extraction {
    pub fn new(src: PathBuf, dst: PathBuf) -> Self {
        Self {
            src,
            dst,
            articles: None,
            filter: PageFilter::default(),
            options: NormalizeOptions::default(),
        }
    }

    /// Returns the number of written pages.
    pub fn run(&self) -> Result<u64, Error> {
        let start = Instant::now();
        let pages = open_pages(&self.src, self.options)?;
        let mut writer = ExchangeWriter::create(&self.dst)?;
        let limit = self.articles.unwrap_or(usize::MAX);

        for page in pages
            .filter(|page| match page {
                Ok(page) => self.filter.keep(page),
                Err(_) => true,
            })
            .take(limit)
        {
            let page = page?;
            debug!("writing {:?}", page.title());
            writer.write(&page)?;
        }
        writer.flush()?;

        info!(
            "wrote {} articles to {:?}. Process took {:.2?}",
            writer.nb_written(),
            self.dst,
            start.elapsed()
        );
        Ok(writer.nb_written())
    }
}

/// Writes the plaintext (or raw markup) of the first page with a given title.
#[derive(Debug, Clone)]
pub struct ArticleLookup {
    pub src: PathBuf,
    pub dst: PathBuf,
    /// Matched case-insensitively.
    pub title: String,
    pub raw: bool,
    pub options: NormalizeOptions,
}

impl ArticleLookup {
    pub fn new(src: PathBuf, dst: PathBuf, title: String) -> Self {
        Self {
            src,
            dst,
            title,
            raw: false,
            options: NormalizeOptions::default(),
        }
    }

    pub fn run(&self) -> Result<(), Error> {
        let start = Instant::now();
        let title = self.title.to_lowercase();

        let mut found = None;
        for page in open_pages(&self.src, self.options)? {
            let page = page?;
            if page.title().to_lowercase() == title {
                found = Some(page);
                break;
            }
        }
        let page = found.ok_or_else(|| Error::ArticleNotFound(self.title.clone()))?;

        let content = if self.raw {
            page.raw_text()
        } else {
            page.plaintext()
        };
        std::fs::write(&self.dst, content)?;

        info!(
            "wrote {:?} to {:?}. Process took {:.2?}",
            page.title(),
            self.dst,
            start.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::io::reader::ExchangeReader;

    use super::*;

    const DUMP: &str = "<mediawiki>
  <page>
    <title>chat</title>
    <text>==French==
===Noun===
'''chat''' (cat)

==English==
===Verb===
To talk.</text>
  </page>
  <page>
    <title>Honda CB750</title>
    <text>{{Infobox Motorcycle
| name = CB750
}}
The '''CB750''' is a [[motorcycle]] (made by Honda).</text>
  </page>
  <page>
    <title>dog</title>
    <text>==English==
A [[dog|hound]].</text>
  </page>
</mediawiki>
";

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("dump.xml");
        std::fs::write(&src, DUMP).unwrap();
        (dir, src)
    }

    fn read_titles(path: &std::path::Path) -> Vec<String> {
        let file = std::io::BufReader::new(std::fs::File::open(path).unwrap());
        ExchangeReader::new(file)
            .map(|page| page.unwrap().title().to_string())
            .collect()
    }

    #[test]
    fn filters() {
        let filter = PageFilter {
            language: Some("English".to_string()),
            contains: None,
        };
        let page = Page::new(None, "t".to_string(), "==English==\ntext".to_string());
        assert!(filter.keep(&page));
        let page = Page::new(None, "t".to_string(), "==Englishish==\ntext".to_string());
        assert!(!filter.keep(&page));
        assert!(PageFilter::default().keep(&page));
    }

    #[test]
    fn extract_all() {
        let (dir, src) = setup();
        let extraction = Extraction::new(src, dir.path().join("pages.jsonl"));
        assert_eq!(extraction.run().unwrap(), 3);
        assert_eq!(read_titles(&extraction.dst), vec!["chat", "Honda CB750", "dog"]);
    }

    #[test]
    fn extract_filtered() {
        let (dir, src) = setup();
        let mut extraction = Extraction::new(src, dir.path().join("pages.jsonl"));

        extraction.filter.contains = Some("{{Infobox Motorcycle".to_string());
        assert_eq!(extraction.run().unwrap(), 1);
        assert_eq!(read_titles(&extraction.dst), vec!["Honda CB750"]);

        extraction.filter = PageFilter {
            language: Some("English".to_string()),
            contains: None,
        };
        extraction.articles = Some(1);
        assert_eq!(extraction.run().unwrap(), 1);
        assert_eq!(read_titles(&extraction.dst), vec!["chat"]);
    }

    #[test]
    fn lookup() {
        let (dir, src) = setup();
        let mut lookup = ArticleLookup::new(src, dir.path().join("out.txt"), "HONDA cb750".to_string());
        lookup.options = NormalizeOptions::with_parentheticals_removed();
        lookup.run().unwrap();
        assert_eq!(
            std::fs::read_to_string(&lookup.dst).unwrap(),
            "The CB750 is a motorcycle."
        );

        lookup.raw = true;
        lookup.run().unwrap();
        assert!(std::fs::read_to_string(&lookup.dst)
            .unwrap()
            .starts_with("{{Infobox Motorcycle"));

        lookup.title = "cat".to_string();
        assert!(matches!(lookup.run(), Err(Error::ArticleNotFound(_))));
    }
}
