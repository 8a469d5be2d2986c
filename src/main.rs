//! # Wikigrams
//!
//! Turns MediaWiki dumps into approximately-plaintext articles and n-gram frequency lists.
//!
//! ## Getting started
//!
//! ```sh
//! wikigrams 0.1.0
//! Wikipedia plaintext extraction and n-gram frequency counting.
//!
//! USAGE:
//!     wikigrams <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     extract    Extract plaintext articles into an exchange file
//!     help       Prints this message or the help of the given subcommand(s)
//!     ngrams     Count n-gram frequencies of a dump or an exchange file
//! ```
//!
//! Verbosity is set with `RUST_LOG` (`RUST_LOG=info wikigrams ngrams ...`).
use structopt::StructOpt;
use wikigrams::error::Error;
use wikigrams::frequency::AggregateConfig;
use wikigrams::processing::{ArticleLookup, Extraction, NGramCounting, PageFilter};

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Wikigrams::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Wikigrams::Ngrams(n) => {
            let counting = NGramCounting {
                store: n.store_kind(),
                options: n.options(),
                config: AggregateConfig::new(n.ngram_size, n.batch_size)?,
                src: n.src,
                dst: n.dst,
                articles: n.articles,
                cutoff: n.cutoff,
            };
            counting.run()?;
        }

        cli::Wikigrams::Extract(e) => {
            let options = e.options();
            match e.title {
                Some(title) => {
                    let mut lookup = ArticleLookup::new(e.src, e.dst, title);
                    lookup.raw = e.raw;
                    lookup.options = options;
                    lookup.run()?;
                }
                None => {
                    let extraction = Extraction {
                        src: e.src,
                        dst: e.dst,
                        articles: e.articles,
                        filter: PageFilter {
                            language: e.language,
                            contains: e.contains,
                        },
                        options,
                    };
                    extraction.run()?;
                }
            }
        }
    };
    Ok(())
}
