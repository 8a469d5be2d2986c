/*! Persistent frequency store.

The store is a directory holding:

- `manifest.json`: current generation and [Progress] record,
- `terms-<generation>.jsonl`: the term table, one `{"term", "count"}` object per line, sorted by term.

A commit merges the sorted batch with the current term table into a new generation file,
then replaces the manifest. Both files are written in a temporary file first, synced then renamed,
so the manifest rename is the single commit point: a failure before it leaves the previous generation untouched.

Commits stream the term table, memory use only depends on the batch size.
The price is I/O: every commit rewrites the whole table, and [DiskStore::get] scans it from the start,
so both grow linearly with the number of stored terms. Larger batches mean fewer rewrites.

On open, only files named like the ones above (`manifest.json.tmp`, `terms-<generation>.jsonl`
and `terms-<generation>.jsonl.tmp`) are considered for cleanup: the directory can be shared with other files.
!*/
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use itertools::{EitherOrBoth, Itertools};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::{FrequencyStore, Progress};

const MANIFEST: &str = "manifest.json";
const TERMS_PREFIX: &str = "terms-";
const TERMS_SUFFIX: &str = ".jsonl";
const TMP_SUFFIX: &str = ".tmp";
/// Minimum width of the generation in term table names.
const GENERATION_WIDTH: usize = 8;

/// Tells whether `name` is a term table name, temporary or not.
fn is_terms_file(name: &str) -> bool {
    let name = name.strip_suffix(TMP_SUFFIX).unwrap_or(name);
    name.strip_prefix(TERMS_PREFIX)
        .and_then(|rest| rest.strip_suffix(TERMS_SUFFIX))
        .map_or(false, |generation| {
            generation.len() >= GENERATION_WIDTH && generation.bytes().all(|b| b.is_ascii_digit())
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Manifest {
    /// 0 means that nothing has been committed yet.
    generation: u64,
    progress: Option<Progress>,
}

#[derive(Debug, Serialize)]
struct TermRecordRef<'a> {
    term: &'a str,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct TermRecord {
    term: String,
    count: u64,
}

/// Line by line reader of a term table.
struct TermReader {
    lines: Option<Lines<BufReader<File>>>,
}

impl TermReader {
    fn open(path: Option<PathBuf>) -> Result<Self, Error> {
        let lines = match path {
            Some(path) => Some(BufReader::new(File::open(path)?).lines()),
            None => None,
        };
        Ok(Self { lines })
    }
}

impl Iterator for TermReader {
    type Item = Result<(String, u64), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.as_mut()?.next()?;
        Some(
            line.map_err(Error::Io)
                .and_then(|line| serde_json::from_str::<TermRecord>(&line).map_err(Error::Serde))
                .map(|record| (record.term, record.count)),
        )
    }
}

/// Directory backed, resumable store.
///
/// Only one process should use a given directory at a time.
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    manifest: Manifest,
}

impl DiskStore {
    /// Opens (or creates) the store in `dir`.
    ///
    /// Leftovers of interrupted commits are removed.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        fs::create_dir_all(dir)?;

        let manifest_path = dir.join(MANIFEST);
        let manifest = if manifest_path.exists() {
            let reader = BufReader::new(File::open(&manifest_path)?);
            serde_json::from_reader(reader)?
        } else {
            Manifest::default()
        };
        debug!("opened store {:?} at {:?}", dir, manifest);

        let store = Self {
            dir: dir.to_path_buf(),
            manifest,
        };
        store.remove_stale_files()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn terms_path(&self, generation: u64) -> PathBuf {
        self.dir
            .join(format!(
                "{}{:0width$}{}",
                TERMS_PREFIX,
                generation,
                TERMS_SUFFIX,
                width = GENERATION_WIDTH
            ))
    }

    fn current_terms(&self) -> Option<PathBuf> {
        match self.manifest.generation {
            0 => None,
            generation => Some(self.terms_path(generation)),
        }
    }

    fn records(&self) -> Result<TermReader, Error> {
        TermReader::open(self.current_terms())
    }

    fn remove_stale_files(&self) -> Result<(), Error> {
        let current = self.current_terms();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name,
                None => continue,
            };
            let manifest_tmp = name.strip_suffix(TMP_SUFFIX) == Some(MANIFEST);
            let stale =
                manifest_tmp || (is_terms_file(name) && current.as_ref() != Some(&path));
            if stale {
                debug!("removing stale store file {:?}", path);
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Writes the merge of the current term table and `batch` (sorted, unique keys) into `dst`.
    fn write_merged<I>(&self, dst: &Path, batch: I) -> Result<u64, Error>
    where
        I: Iterator<Item = (String, u64)>,
    {
        let mut writer = BufWriter::new(File::create(dst)?);

        let written = itertools::process_results(self.records()?, |stored| {
            let mut written = 0u64;
            for entry in stored.merge_join_by(batch, |(a, _), (b, _)| a.cmp(b)) {
                let (term, count) = match entry {
                    EitherOrBoth::Both((term, old), (_, new)) => (term, old.saturating_add(new)),
                    EitherOrBoth::Left(entry) | EitherOrBoth::Right(entry) => entry,
                };
                serde_json::to_writer(&mut writer, &TermRecordRef { term: &term, count })?;
                writer.write_all(b"\n")?;
                written += 1;
            }
            Ok::<u64, Error>(written)
        })??;

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(written)
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), Error> {
        let tmp = self.dir.join(format!("{}{}", MANIFEST, TMP_SUFFIX));
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, manifest)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, self.dir.join(MANIFEST))?;
        Ok(())
    }

    fn try_commit(&self, batch: Vec<(String, u64)>, manifest: &Manifest) -> Result<u64, Error> {
        let mut batch = batch;
        batch.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        let batch = batch.into_iter().coalesce(|a, b| {
            if a.0 == b.0 {
                Ok((a.0, a.1.saturating_add(b.1)))
            } else {
                Err((a, b))
            }
        });

        let terms = self.terms_path(manifest.generation);
        let tmp = PathBuf::from(format!("{}{}", terms.display(), TMP_SUFFIX));
        let written = self.write_merged(&tmp, batch)?;
        fs::rename(&tmp, &terms)?;

        self.write_manifest(manifest)?;
        Ok(written)
    }

    /// Best effort cleanup after a failed commit.
    /// Anything left behind is removed on next open.
    fn discard(&self, generation: u64) {
        let terms = self.terms_path(generation);
        let tmp = PathBuf::from(format!("{}{}", terms.display(), TMP_SUFFIX));
        for path in [tmp, terms] {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("could not remove {:?}: {}", path, e);
                }
            }
        }
    }
}

impl FrequencyStore for DiskStore {
    fn progress(&self) -> Result<Option<Progress>, Error> {
        Ok(self.manifest.progress.clone())
    }

    fn get(&self, key: &str) -> Result<Option<u64>, Error> {
        for record in self.records()? {
            let (term, count) = record?;
            match term.as_str().cmp(key) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => return Ok(Some(count)),
                std::cmp::Ordering::Greater => break,
            }
        }
        Ok(None)
    }

    fn commit(&mut self, batch: Vec<(String, u64)>, progress: Progress) -> Result<(), Error> {
        let previous = self.current_terms();
        let manifest = Manifest {
            generation: self.manifest.generation + 1,
            progress: Some(progress),
        };

        match self.try_commit(batch, &manifest) {
            Ok(written) => {
                debug!(
                    "store generation {} written ({} terms)",
                    manifest.generation, written
                );
                self.manifest = manifest;
                if let Some(previous) = previous {
                    if let Err(e) = fs::remove_file(&previous) {
                        warn!("could not remove previous generation {:?}: {}", previous, e);
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.discard(manifest.generation);
                Err(e)
            }
        }
    }

    fn scan(&self, cutoff: u64) -> Result<Vec<(String, u64)>, Error> {
        self.records()?
            .filter_ok(|(_, count)| *count >= cutoff)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(entries: &[(&str, u64)]) -> Vec<(String, u64)> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        assert_eq!(store.progress().unwrap(), None);
        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.scan(0).unwrap().is_empty());
    }

    #[test]
    fn merge_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = DiskStore::open(dir.path()).unwrap();
            store
                .commit(
                    batch(&[("b", 2), ("a", 1), ("d", 4)]),
                    Progress::new(10, "ten".to_string()),
                )
                .unwrap();
            store
                .commit(
                    batch(&[("c", 3), ("b", 5), ("e", 1)]),
                    Progress::new(20, "twenty".to_string()),
                )
                .unwrap();
        }

        let store = DiskStore::open(dir.path()).unwrap();
        assert_eq!(
            store.progress().unwrap(),
            Some(Progress::new(20, "twenty".to_string()))
        );
        assert_eq!(store.get("b").unwrap(), Some(7));
        assert_eq!(store.get("e").unwrap(), Some(1));
        assert_eq!(store.get("f").unwrap(), None);
        assert_eq!(store.get("0").unwrap(), None);

        let all = store.scan(0).unwrap();
        let keys: Vec<&str> = all.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(store.scan(4).unwrap(), batch(&[("b", 7), ("d", 4)]));

        // only the current generation is kept
        let term_files = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with(TERMS_PREFIX)
            })
            .count();
        assert_eq!(term_files, 1);
    }

    #[test]
    fn duplicate_keys_in_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DiskStore::open(dir.path()).unwrap();
        store
            .commit(
                batch(&[("a", 1), ("a", 2)]),
                Progress::new(1, "one".to_string()),
            )
            .unwrap();
        assert_eq!(store.scan(0).unwrap(), batch(&[("a", 3)]));
    }

    #[test]
    fn interrupted_commit_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = DiskStore::open(dir.path()).unwrap();
            store
                .commit(batch(&[("a", 1)]), Progress::new(1, "one".to_string()))
                .unwrap();
        }
        // a crash between the term table rename and the manifest rename
        fs::write(dir.path().join("terms-00000002.jsonl"), "{\"term\":\"a\",\"count\":99}\n").unwrap();
        fs::write(dir.path().join("manifest.json.tmp"), "{").unwrap();

        let store = DiskStore::open(dir.path()).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(1));
        assert_eq!(store.progress().unwrap().unwrap().page_index, 1);
        assert!(!dir.path().join("terms-00000002.jsonl").exists());
        assert!(!dir.path().join("manifest.json.tmp").exists());
    }

    #[test]
    fn foreign_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let foreign = [
            "my-notes.tmp",
            "terms-of-service.txt",
            "terms-1.jsonl",
            "terms-0000000x.jsonl",
            "terms-00000001.json",
            "manifest.json.bak",
        ];
        for name in foreign.iter() {
            fs::write(dir.path().join(name), "keep me").unwrap();
        }
        fs::write(dir.path().join("terms-00000003.jsonl.tmp"), "").unwrap();

        let mut store = DiskStore::open(dir.path()).unwrap();
        store
            .commit(batch(&[("a", 1)]), Progress::new(1, "one".to_string()))
            .unwrap();
        let store = DiskStore::open(dir.path()).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(1));

        for name in foreign.iter() {
            assert_eq!(
                fs::read_to_string(dir.path().join(name)).unwrap(),
                "keep me",
                "{}",
                name
            );
        }
        assert!(!dir.path().join("terms-00000003.jsonl.tmp").exists());
    }

    #[test]
    fn terms_file_names() {
        assert!(is_terms_file("terms-00000001.jsonl"));
        assert!(is_terms_file("terms-00000001.jsonl.tmp"));
        assert!(is_terms_file("terms-123456789.jsonl"));
        assert!(!is_terms_file("terms-of-service.txt"));
        assert!(!is_terms_file("terms-.jsonl"));
        assert!(!is_terms_file("terms-00000001.jsonl.bak"));
        assert!(!is_terms_file("my-notes.tmp"));
    }

    #[test]
    fn special_characters_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DiskStore::open(dir.path()).unwrap();
        let keys = batch(&[("\"quoted\"", 1), ("tab\there", 2), ("ünïcode ✓", 3)]);
        store
            .commit(keys.clone(), Progress::new(1, "line\nbreak".to_string()))
            .unwrap();

        let store = DiskStore::open(dir.path()).unwrap();
        let mut all = store.scan(0).unwrap();
        all.sort();
        let mut expected = keys;
        expected.sort();
        assert_eq!(all, expected);
        assert_eq!(store.progress().unwrap().unwrap().title, "line\nbreak");
    }
}
