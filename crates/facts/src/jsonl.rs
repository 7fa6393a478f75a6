use crate::error::{FactsError, Result};
use crate::store::FactStore;
use crate::types::Fact;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const FACTS_FILE_NAME: &str = "facts.jsonl";

impl FactStore {
    /// Write every fact as one JSON object per line, in insertion order.
    ///
    /// Takes a snapshot first; the dump is not protected against concurrent `add`.
    /// A NaN or infinite prop fails the whole write before any line is emitted.
    pub fn write_jsonl<W: Write>(&self, writer: &mut W) -> Result<()> {
        let facts = self.all();
        for fact in &facts {
            if let Some((key, _)) = fact.props.iter().find(|(_, v)| !v.is_encodable()) {
                return Err(FactsError::NonFiniteProp {
                    fact: fact.name.clone(),
                    key: key.clone(),
                });
            }
        }
        for fact in &facts {
            serde_json::to_writer(&mut *writer, &fact)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Build a fresh store from a JSONL stream.
    pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Self> {
        let store = Self::new();
        store.extend_from_jsonl(reader)?;
        Ok(store)
    }

    /// Append every fact in a JSONL stream to this store. Returns how many were added.
    ///
    /// The stream is fully parsed before anything is appended, so a malformed
    /// line leaves the store untouched.
    pub fn extend_from_jsonl<R: BufRead>(&self, reader: R) -> Result<usize> {
        let facts = parse_lines(reader)?;
        let added = facts.len();
        self.add(facts);
        Ok(added)
    }

    /// Persist to `path`, replacing it atomically via a temporary sibling file.
    pub fn save_jsonl(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("jsonl.tmp");
        let written = File::create(&tmp)
            .map_err(FactsError::from)
            .and_then(|file| self.write_jsonl(&mut BufWriter::new(file)));
        if let Err(err) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(err);
        }
        std::fs::rename(&tmp, path)?;
        log::debug!("Saved {} facts to {}", self.count(), path.display());
        Ok(())
    }

    pub fn load_jsonl(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(FactsError::InvalidPath(format!(
                "{} is a directory",
                path.display()
            )));
        }
        let store = Self::read_jsonl(BufReader::new(File::open(path)?))?;
        log::debug!("Loaded {} facts from {}", store.count(), path.display());
        Ok(store)
    }
}

fn parse_lines<R: BufRead>(reader: R) -> Result<Vec<Fact>> {
    let mut facts = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fact = serde_json::from_str(&line).map_err(|source| FactsError::Json {
            line: idx + 1,
            source,
        })?;
        facts.push(fact);
    }
    Ok(facts)
}
