use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wikigrams::frequency::{Accumulator, Trie};
use wikigrams::markup::{normalize, parse_sections, NormalizeOptions};
use wikigrams::page::Page;

const ARTICLE: &str = r#"{{Infobox motorcycle
| name = Honda CB750
| manufacturer = [[Honda]]
| production = 1969–2003
}}
The '''Honda CB750''' is an [[air-cooled engine|air-cooled]], [[Straight-four engine|inline four-cylinder]] motorcycle (made by [[Honda]] over several generations) for {{as of|2003}} sale.<ref name="cycleworld">{{cite web |title=CB750 |url=http://example.com}}</ref>
It is often called the original '''[[superbike]]'''.<!-- citation needed -->

== History ==
=== Development ===
Honda had been [[motorcycle racing|racing]] since 1959.
* first [[disc brake]] on a mass-market motorcycle
* four exhaust pipes
: an indented remark with a [http://www.example.com link text]

{| class="wikitable"
|-
! Year !! Model
|-
| 1969 || CB750 K0
|}

== See also ==
* [[Kawasaki Z1]]

== References ==
{{reflist}}
[[Category:Honda motorcycles]]
"#;

fn article(times: usize) -> String {
    ARTICLE.repeat(times)
}

pub fn normalize_article(c: &mut Criterion) {
    let raw = article(1);
    let options = NormalizeOptions::default();
    c.bench_function("normalize article", |b| {
        b.iter(|| normalize(black_box(&raw), &options))
    });

    let options = NormalizeOptions::with_parentheticals_removed();
    c.bench_function("normalize article, no parens", |b| {
        b.iter(|| normalize(black_box(&raw), &options))
    });
}

pub fn sections(c: &mut Criterion) {
    let raw = article(20);
    c.bench_function("parse sections x20", |b| {
        b.iter(|| parse_sections("", black_box(&raw), 2))
    });
}

pub fn counting(c: &mut Criterion) {
    let pages: Vec<Page> = (0..50)
        .map(|i| Page::new(Some(i), format!("page {}", i), article(1)))
        .collect();
    // warm plaintext caches so only counting is measured
    for page in &pages {
        page.plaintext();
    }

    c.bench_function("accumulate bigrams x50", |b| {
        b.iter(|| {
            let mut acc = Accumulator::default();
            for page in &pages {
                acc.add_page(page, 2);
            }
            black_box(acc.len())
        })
    });

    let terms: Vec<String> = pages[0]
        .plaintext()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    c.bench_function("trie insert x50", |b| {
        b.iter(|| {
            let mut trie = Trie::new();
            for _ in 0..50 {
                for term in &terms {
                    trie.insert(term);
                }
            }
            black_box(trie.query(10))
        })
    });
}

criterion_group!(benches, normalize_article, sections, counting);
criterion_main!(benches);
