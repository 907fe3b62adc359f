//! Snapshot files in JSON Lines form.
//!
//! Every non-blank line holds one tagged [`Record`]; a line whose first
//! non-space character is `#` is a comment. Saving stages the new content in
//! a sibling file, syncs it and renames it over the target.

use crate::record::Record;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use stylehub_kernel::EntityKind;

#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {message}")]
    Line { line: usize, message: String },

    #[error("cannot encode {entity} record '{id}': {message}")]
    Encode {
        entity: EntityKind,
        id: String,
        message: String,
    },

    #[error("write failed: {0}")]
    Stream(#[from] io::Error),

    #[error("corrupted snapshot {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

fn file_error(path: &Path) -> impl Fn(io::Error) -> JsonlError + '_ {
    move |source| JsonlError::File {
        path: path.to_path_buf(),
        source,
    }
}

/// `None` for blank and comment lines. `number` is one-based.
fn parse_line(number: usize, text: &str) -> Result<Option<Record>, JsonlError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| JsonlError::Line {
            line: number,
            message: e.to_string(),
        })
}

pub fn read_records(reader: impl BufRead) -> Result<Vec<Record>, JsonlError> {
    let mut records = Vec::new();
    for (index, text) in reader.lines().enumerate() {
        let number = index + 1;
        let text = text.map_err(|e| JsonlError::Line {
            line: number,
            message: e.to_string(),
        })?;
        records.extend(parse_line(number, &text)?);
    }
    Ok(records)
}

pub fn write_records(writer: &mut impl Write, records: &[Record]) -> Result<(), JsonlError> {
    for record in records {
        serde_json::to_writer(&mut *writer, record).map_err(|e| JsonlError::Encode {
            entity: record.entity(),
            id: record.id().to_string(),
            message: e.to_string(),
        })?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// The whole file must be NUL-free UTF-8 before any line is parsed.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<Record>, JsonlError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(file_error(path))?;
    let corrupt = |reason: String| JsonlError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };
    if let Some(offset) = bytes.iter().position(|byte| *byte == 0) {
        return Err(corrupt(format!("NUL byte at offset {offset}")));
    }
    let text = String::from_utf8(bytes).map_err(|e| {
        corrupt(format!(
            "invalid UTF-8 after byte {}",
            e.utf8_error().valid_up_to()
        ))
    })?;
    read_records(text.as_bytes())
}

pub fn write_records_to_path(path: impl AsRef<Path>, records: &[Record]) -> Result<(), JsonlError> {
    let target = path.as_ref();
    let dir = target.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir).map_err(file_error(dir))?;
    }

    let staged = StagedFile::beside(target);
    let file = File::create(&staged.path).map_err(file_error(&staged.path))?;
    let mut out = BufWriter::new(file);
    write_records(&mut out, records)?;
    let file = out
        .into_inner()
        .map_err(|e| file_error(&staged.path)(e.into_error()))?;
    file.sync_all().map_err(file_error(&staged.path))?;
    staged.persist(target)?;

    // Make the rename itself durable.
    if let Some(dir) = dir {
        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(file_error(dir))?;
    }
    Ok(())
}

/// Sibling of a snapshot that receives the next content. Removed on drop
/// unless it was renamed into place.
struct StagedFile {
    path: PathBuf,
    persisted: bool,
}

impl StagedFile {
    fn beside(target: &Path) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let mut name = OsString::from(target.as_os_str());
        name.push(format!(".{}-{nanos}.staged", std::process::id()));
        Self {
            path: PathBuf::from(name),
            persisted: false,
        }
    }

    fn persist(mut self, target: &Path) -> Result<(), JsonlError> {
        fs::rename(&self.path, target).map_err(file_error(target))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}
