//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;
use wikigrams::frequency::StoreKind;
use wikigrams::markup::NormalizeOptions;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "wikigrams",
    about = "Wikipedia plaintext extraction and n-gram frequency counting."
)]
/// Holds every command that is callable by the `wikigrams` command.
pub enum Wikigrams {
    #[structopt(about = "Count n-gram frequencies of a dump or an exchange file")]
    Ngrams(NGrams),
    #[structopt(about = "Extract plaintext articles into an exchange file")]
    Extract(Extract),
}

#[derive(Debug, StructOpt)]
/// N-gram counting command and parameters.
///
/// ```sh
/// USAGE:
///     wikigrams ngrams [FLAGS] [OPTIONS] <src> <dst>
///
/// FLAGS:
///         --remove-parens    remove parenthesized text
///         --trie             count in a prefix tree instead of a hash map
///
/// OPTIONS:
///         --articles <articles>        only count that many articles
///         --batch-size <batch-size>    pages between two checkpoints [default: 10000]
///     -c, --cutoff <cutoff>            minimum count of written n-grams [default: 10]
///     -n, --ngram-size <ngram-size>    number of tokens per n-gram [default: 1]
///         --store <store>              resumable on-disk store location
///
/// ARGS:
///     <src>    source dump (.xml, .xml.gz) or exchange file (.jsonl)
///     <dst>    frequency list destination
/// ```
pub struct NGrams {
    #[structopt(
        parse(from_os_str),
        help = "source dump (.xml, .xml.gz) or exchange file (.jsonl)"
    )]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "frequency list destination")]
    pub dst: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "store",
        help = "resumable on-disk store location"
    )]
    pub store: Option<PathBuf>,
    #[structopt(long = "articles", help = "only count that many articles")]
    pub articles: Option<usize>,
    #[structopt(
        short = "n",
        long = "ngram-size",
        default_value = "1",
        help = "number of tokens per n-gram"
    )]
    pub ngram_size: usize,
    #[structopt(
        short = "c",
        long = "cutoff",
        default_value = "10",
        help = "minimum count of written n-grams"
    )]
    pub cutoff: u64,
    #[structopt(
        long = "batch-size",
        default_value = "10000",
        help = "pages between two checkpoints"
    )]
    pub batch_size: usize,
    #[structopt(
        long = "trie",
        conflicts_with = "store",
        help = "count in a prefix tree instead of a hash map"
    )]
    pub trie: bool,
    #[structopt(long = "remove-parens", help = "remove parenthesized text")]
    pub remove_parens: bool,
}

impl NGrams {
    pub fn store_kind(&self) -> StoreKind {
        match (&self.store, self.trie) {
            (Some(dir), _) => StoreKind::Disk(dir.clone()),
            (None, true) => StoreKind::Trie,
            (None, false) => StoreKind::Memory,
        }
    }

    pub fn options(&self) -> NormalizeOptions {
        normalize_options(self.remove_parens)
    }
}

#[derive(Debug, StructOpt)]
/// Extraction command and parameters.
///
/// Without `--title`, every (filtered) article is written into an exchange file.
/// With `--title`, only the plaintext (or markup, with `--raw`) of that article is written.
pub struct Extract {
    #[structopt(
        parse(from_os_str),
        help = "source dump (.xml, .xml.gz) or exchange file (.jsonl)"
    )]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination file")]
    pub dst: PathBuf,
    #[structopt(long = "articles", help = "only write that many articles")]
    pub articles: Option<usize>,
    #[structopt(long = "remove-parens", help = "remove parenthesized text")]
    pub remove_parens: bool,
    #[structopt(long = "title", help = "only write the article with that title")]
    pub title: Option<String>,
    #[structopt(
        long = "raw",
        requires = "title",
        help = "write raw markup instead of plaintext"
    )]
    pub raw: bool,
    #[structopt(
        long = "language",
        help = "only keep pages with that language section (Wiktionary)"
    )]
    pub language: Option<String>,
    #[structopt(
        long = "contains",
        help = "only keep pages whose markup contains that string"
    )]
    pub contains: Option<String>,
}

impl Extract {
    pub fn options(&self) -> NormalizeOptions {
        normalize_options(self.remove_parens)
    }
}

fn normalize_options(remove_parens: bool) -> NormalizeOptions {
    if remove_parens {
        NormalizeOptions::with_parentheticals_removed()
    } else {
        NormalizeOptions::default()
    }
}
