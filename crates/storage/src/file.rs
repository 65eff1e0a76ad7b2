//! Directory-backed slot store
//!
//! Each slot is one `<name>.json` file in the data directory. Writes go to a
//! `<name>.json.tmp` sibling first and are renamed into place, so a crash
//! mid-write leaves the previous text intact.

use crate::slots::{validate_slot_name, Quota, SlotStore, StorageError};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const SLOT_EXTENSION: &str = "json";

/// Slot store persisting each slot as a file
#[derive(Debug)]
pub struct FileSlots {
    dir: PathBuf,
    quota: Quota,
    /// Serializes writers so quota accounting sees a stable directory
    write_lock: Mutex<()>,
}

impl FileSlots {
    /// Open (creating if needed) a slot directory
    pub fn open(dir: impl AsRef<Path>, quota: Quota) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened file slot store");
        Ok(FileSlots {
            dir,
            quota,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `slot`
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", slot, SLOT_EXTENSION))
    }

    fn file_len(path: &Path) -> Result<u64, StorageError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn slot_files(&self) -> Result<Vec<(String, PathBuf)>, StorageError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_slot_name(stem).is_ok() {
                    out.push((stem.to_string(), path));
                }
            }
        }
        out.sort();
        Ok(out)
    }
}

impl SlotStore for FileSlots {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        validate_slot_name(slot)?;
        match fs::read(self.slot_path(slot)) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::NotUtf8(slot.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        validate_slot_name(slot)?;
        let _guard = self.write_lock.lock();

        let path = self.slot_path(slot);
        if self.quota.limit().is_some() {
            let used = self.used_bytes()?;
            let old_len = Self::file_len(&path)?;
            self.quota.check(slot, used, old_len, value.len() as u64)?;
        }

        let tmp = path.with_extension(format!("{}.tmp", SLOT_EXTENSION));
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        validate_slot_name(slot)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn slots(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.slot_files()?.into_iter().map(|(name, _)| name).collect())
    }

    fn used_bytes(&self) -> Result<u64, StorageError> {
        let mut total = 0;
        for (_, path) in self.slot_files()? {
            total += Self::file_len(&path)?;
        }
        Ok(total)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
