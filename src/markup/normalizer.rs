/*! Markup normalization

Best-effort removal of wiki markup, HTML and (optionally) parenthetical text.

Normalization is a fixed sequence of [Rule]s. Each rule is applied until it stops changing the text
before the next one runs, and the whole sequence is repeated until a complete pass leaves the text untouched,
which makes [normalize] idempotent.

Every rule only ever removes characters, so each repetition either shrinks the text or ends the loop:
no input can make normalization hang.
!*/
use lazy_static::lazy_static;
use log::trace;
use regex::{Captures, Regex};

/// Normalization knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Remove `(...)` spans, innermost first.
    /// These often hold pronunciations or tangential information.
    pub remove_parentheticals: bool,
}

impl NormalizeOptions {
    pub fn with_parentheticals_removed() -> Self {
        Self {
            remove_parentheticals: true,
        }
    }
}

/// Headings after which an article only holds boilerplate.
const TRAILING_SECTIONS: [&str; 4] = ["See also", "References", "Further reading", "External links"];

/// Namespaces of internal links that point to metadata rather than article text.
const NON_CONTENT_NAMESPACES: [&str; 3] = ["category", "file", "image"];

/// A rewriting step.
enum Rule {
    /// Regex replacement, `$n` groups allowed.
    Replace(Regex, &'static str),
    /// Regex whose replacement is computed per match.
    /// Returning the match unchanged leaves it in place.
    Map(Regex, fn(&Captures) -> String),
    /// Hand-written rewrite, for patterns that need backreferences.
    Scan(fn(&str) -> String),
}

impl Rule {
    fn apply(&self, text: &str) -> String {
        match self {
            Rule::Replace(re, rep) => re.replace_all(text, *rep).into_owned(),
            Rule::Map(re, f) => re.replace_all(text, |caps: &Captures| f(caps)).into_owned(),
            Rule::Scan(f) => f(text),
        }
    }

    /// Applies the rule until the text stops shrinking.
    fn apply_until_stable(&self, mut text: String) -> String {
        loop {
            let next = self.apply(&text);
            let next = next.trim();
            if next.len() >= text.len() {
                return text;
            }
            text = next.to_string();
        }
    }
}

lazy_static! {
    static ref PARENTHETICAL: Rule = Rule::Replace(Regex::new(r"[ \t]*\([^()]*\)").unwrap(), "");
    static ref TRAILING_SECTION: Regex = Regex::new(&format!(
        r"(?i)==[ \t]*(?:{})[ \t]*==",
        TRAILING_SECTIONS.join("|")
    ))
    .unwrap();
    static ref AS_OF: Regex = Regex::new(r"(?i)\{\{as of\|(\d+)\}\}").unwrap();

    /// Ordered rewriting rules. Order matters: templates must go before links,
    /// links before the generic tag and formatting cleanups.
    static ref RULES: Vec<(&'static str, Rule)> = vec![
        // <ref>a reference</ref>, <ref name="x"/>
        (
            "references",
            Rule::Replace(Regex::new(r"(?s)<ref[^>/]*/>|<ref[^>/]*>.*?</ref>").unwrap(), ""),
        ),
        // {{l|en|target|...}}
        (
            "link templates",
            Rule::Replace(
                Regex::new(r"\{\{l\|[^|{}]+\|([^|{}]+)(?:\|[^|{}]*)*\}\}").unwrap(),
                "${1}",
            ),
        ),
        // {{cite ...}}, innermost first
        ("templates", Rule::Replace(Regex::new(r"\{\{[^{}]*\}\}").unwrap(), "")),
        ("tables", Rule::Replace(Regex::new(r"(?s)\{\|.*?\|\}").unwrap(), "")),
        // [[Awakenings (book)|Awakenings]], [[Awakenings]]
        (
            "internal links",
            Rule::Map(
                Regex::new(r"\[\[(?:([^|\[\]]+?)\|)?([^\[\]]+?)\]\]").unwrap(),
                resolve_internal_link,
            ),
        ),
        // [[File:foo.jpg|a photograph of Abraham Lincoln.]]
        (
            "metadata links",
            Rule::Replace(
                Regex::new(&format!(
                    r"\[\[(?i:{}):[^\[\]]*\]\]",
                    NON_CONTENT_NAMESPACES.join("|")
                ))
                .unwrap(),
                "",
            ),
        ),
        // [http://foo "click here for foo"]
        (
            "external links with text",
            Rule::Map(
                Regex::new(r"\[(?:[A-Za-z][A-Za-z0-9+.\-]*:|//)[^\[\]\s]*[ \t]+([^\[\]]+)\]").unwrap(),
                resolve_external_link,
            ),
        ),
        // [http://foo]
        ("bare external links", Rule::Replace(Regex::new(r"\[[^ \[\]]+\]").unwrap(), "")),
        ("comments", Rule::Replace(Regex::new(r"(?s)<!--.*?-->").unwrap(), "")),
        ("tags", Rule::Replace(Regex::new(r"<[^>]*>").unwrap(), "")),
        // ===Heading===
        (
            "headings",
            Rule::Map(Regex::new(r"(=+)([^'=\n]+)(=+)").unwrap(), collapse_heading),
        ),
        // ''italic'', '''bold'''
        ("formatting", Rule::Scan(strip_emphasis)),
        // * lists, : quotes
        (
            "list markers",
            Rule::Replace(Regex::new(r"(?m)^[ \t]*[*:]+[ \t]*(\S.*)$").unwrap(), "${1}"),
        ),
    ];
}

/// Turns raw wiki markup into approximate plaintext.
///
/// Paragraphs of the result are separated by a blank line.
/// Never fails: markup that can't be resolved is left in place.
pub fn normalize(raw: &str, options: &NormalizeOptions) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    // line based rules only see `\n`
    let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");

    if options.remove_parentheticals {
        text = PARENTHETICAL.apply_until_stable(text);
    }

    truncate_trailing_sections(&mut text);

    text = AS_OF.replace_all(&text, "as of ${1}").into_owned();

    loop {
        let before = text.len();
        for (name, rule) in RULES.iter() {
            text = rule.apply_until_stable(text);
            trace!("after {}: {} bytes", name, text.len());
        }
        if text.len() >= before {
            break;
        }
    }

    paragraphs(&text)
}

/// Cuts the text at the earliest boilerplate heading, if any.
fn truncate_trailing_sections(text: &mut String) {
    if let Some(m) = TRAILING_SECTION.find(text) {
        text.truncate(m.start());
    }
}

/// Keeps non empty lines, trimmed, separated by blank lines.
fn paragraphs(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn is_non_content(target: &str) -> bool {
    match target.split_once(':') {
        Some((namespace, _)) => NON_CONTENT_NAMESPACES
            .iter()
            .any(|ns| namespace.trim().eq_ignore_ascii_case(ns)),
        None => false,
    }
}

/// `[[target|label]]` -> `label`, `[[target]]` -> `target`.
/// Links into metadata namespaces are kept for the metadata links rule.
fn resolve_internal_link(caps: &Captures) -> String {
    let label = &caps[2];
    let target = caps.get(1).map_or(label, |m| m.as_str());
    if is_non_content(target) {
        caps[0].to_string()
    } else {
        label.to_string()
    }
}

fn resolve_external_link(caps: &Captures) -> String {
    caps[1]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// `===Heading===` -> `Heading`.
///
/// When both runs differ in length, only the common part is removed,
/// the remaining `=` stay where they were.
fn collapse_heading(caps: &Captures) -> String {
    let open = caps[1].len();
    let close = caps[3].len();
    let common = open.min(close);
    format!(
        "{}{}{}",
        "=".repeat(open - common),
        &caps[2],
        "=".repeat(close - common)
    )
}

/// Removes pairs of matching `''`+ runs on a same line, keeping the enclosed text.
fn strip_emphasis(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\'' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'\'').count();
            if run >= 2 {
                if let Some((width, close)) = closing_run(text, i, run) {
                    out.push_str(&text[copied..i]);
                    out.push_str(&text[i + width..close]);
                    i = close + width;
                    copied = i;
                    continue;
                }
            }
        }
        i += 1;
    }

    out.push_str(&text[copied..]);
    out
}

/// Looks for the run closing the one opened at `start`, widest first.
/// Returns the width of the matched runs and the offset of the closing one.
fn closing_run(text: &str, start: usize, run: usize) -> Option<(usize, usize)> {
    (2..=run).rev().find_map(|width| {
        let marker = &text[start..start + width];
        let body = start + width;
        let line_end = text[body..].find('\n').map_or(text.len(), |p| body + p);
        text[body..line_end]
            .find(marker)
            .map(|offset| (width, body + offset))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(raw: &str) -> String {
        normalize(raw, &NormalizeOptions::default())
    }

    #[test]
    fn empty_input() {
        assert_eq!(plain(""), "");
        assert_eq!(plain("  \n\t  "), "");
    }

    #[test]
    fn internal_links() {
        let text = plain("[[Dog|dogs]] bark at [[cat]]s");
        assert_eq!(text, "dogs bark at cats");
        assert!(!text.contains("Dog|dogs"));
    }

    #[test]
    fn metadata_links_are_dropped() {
        let text = plain("A [[File:foo.jpg|thumb|a photograph of [[Abraham Lincoln]].]] man.\n[[Category:Presidents]]");
        assert_eq!(text, "A  man.");
    }

    #[test]
    fn nested_templates() {
        assert_eq!(plain("{{{{nested}}}}"), "");
        assert_eq!(plain("before {{Infobox|a={{b|c}}}} after"), "before  after");
    }

    #[test]
    fn link_template() {
        assert_eq!(plain("from {{l|fr|chien|dog}} to"), "from chien to");
    }

    #[test]
    fn as_of_template() {
        assert_eq!(plain("The town, {{as of|2010}}, had"), "The town, as of 2010, had");
    }

    #[test]
    fn references_and_comments() {
        let text = plain(r#"Fact.<ref name="a">Source, p. 3</ref> Other<ref name="b"/> fact.<!-- hidden -->"#);
        assert_eq!(text, "Fact. Other fact.");
    }

    #[test]
    fn tables() {
        let text = plain("Intro\n{| class=\"wikitable\"\n|-\n| cell\n|}\nOutro");
        assert_eq!(text, "Intro\n\nOutro");
    }

    #[test]
    fn external_links() {
        assert_eq!(plain(r#"see [http://foo.org "click here"] now"#), "see click here now");
        assert_eq!(plain("see [http://foo.org the site] now"), "see the site now");
        assert_eq!(plain("see [http://foo.org] now"), "see  now");
    }

    #[test]
    fn headings_and_formatting() {
        let text = plain("==History==\nThe '''dog''' is ''old''.\n===Early===\nText");
        assert_eq!(text, "History\n\nThe dog is old.\n\nEarly\n\nText");
    }

    #[test]
    fn uneven_heading() {
        assert_eq!(plain("===Heading=="), "=Heading");
    }

    #[test]
    fn lists() {
        let text = plain("Items:\n* one\n** two\n: quoted");
        assert_eq!(text, "Items:\n\none\n\ntwo\n\nquoted");
    }

    #[test]
    fn carriage_returns() {
        assert_eq!(plain("a\r* b"), "a\n\nb");
        assert_eq!(plain("a\r: b"), "a\n\nb");
        assert_eq!(plain("Items:\r\n* one\r\n** two"), "Items:\n\none\n\ntwo");
    }

    #[test]
    fn html_tags() {
        assert_eq!(plain("a <b>bold</b> <br/> move"), "a bold  move");
    }

    #[test]
    fn trailing_sections() {
        let text = plain("Body text.\n==See also==\n* [[Other]]\n==References==\n{{reflist}}");
        assert_eq!(text, "Body text.");
    }

    #[test]
    fn trailing_sections_first_by_position() {
        let text = plain("Body.\n== External links ==\nlinks\n==See also==\nmore");
        assert_eq!(text, "Body.");
    }

    #[test]
    fn parentheticals_kept_by_default() {
        assert_eq!(plain("a (b) c"), "a (b) c");
    }

    #[test]
    fn parentheticals_nested() {
        let options = NormalizeOptions::with_parentheticals_removed();
        assert_eq!(normalize("a (b (c) d) e", &options), "a e");
    }

    #[test]
    fn unbalanced_markup_terminates() {
        let inputs = [
            "{{{{{{", "}}}}", "[[[[a|", "'''''", "<ref>never closed", "{| table", "=====",
            "[[a|[[b|[[c]]", "{{a|{{b}}", "''a'' ''b", "<!-- open",
        ];
        for input in inputs.iter() {
            let _ = plain(input);
        }
    }

    #[test]
    fn idempotent() {
        let samples = [
            "'''Anarchism''' is a [[political philosophy]] that advocates [[self-governance|self-governed]] societies.<ref>{{cite book|title=x}}</ref>\n\n==History==\n{{main|History of anarchism}}\nThe ''earliest'' roots (see [[Taoism]]).\n* item\n[[Category:Anarchism]]",
            "{{Infobox|a={{b}}}}\n[http://x.org ''Title''] and <span>text</span>\n:: quote",
            "===A==\n'''b''\n{{{{x}}}}",
            "a (b (c) d) e\n==References==\nrefs",
            "a\r* b",
            "a\r: b",
            "a\r\n** b\r:c",
        ];
        for options in [NormalizeOptions::default(), NormalizeOptions::with_parentheticals_removed()] {
            for sample in samples.iter() {
                let once = normalize(sample, &options);
                assert_eq!(normalize(&once, &options), once, "sample: {:?}", sample);
            }
        }
    }
}
