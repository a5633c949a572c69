//! One-JSON-file-per-invoice storage, with rendered PDFs in a sibling
//! subdirectory. The file name is the record's identity; nothing inside the
//! JSON is used for lookup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::Error;
use crate::model::Invoice;

pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open the data directory, creating it and the `PDFs/` subdirectory on
    /// first use.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        fs::create_dir_all(root.join("PDFs"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn pdf_path(&self, base: &str) -> PathBuf {
        self.root.join("PDFs").join(format!("{base}.pdf"))
    }

    /// Names of all stored records.
    pub fn list(&self) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_file() && name.ends_with(".json") {
                names.push(name);
            }
        }
        // Timestamped names, so lexicographic order is chronological.
        names.sort();
        Ok(names)
    }

    /// Load one record and tag it with its backing file name.
    pub fn load(&self, name: &str) -> Result<Invoice, Error> {
        let data = fs::read_to_string(self.record_path(name))?;
        let mut invoice: Invoice = serde_json::from_str(&data)?;
        invoice.file_name = Some(name.to_string());
        Ok(invoice)
    }

    /// Persist the record. An invoice that already has a backing file is
    /// rewritten in place; a fresh one gets a timestamped name, which is
    /// recorded on the invoice and returned.
    pub fn save(&self, invoice: &mut Invoice) -> Result<String, Error> {
        let name = match &invoice.file_name {
            Some(name) => name.clone(),
            None => {
                let stamp = Utc::now().format("%Y-%m-%dT%H%M%S%3fZ");
                format!("Invoice_{stamp}.json")
            }
        };
        invoice.file_name = Some(name.clone());
        let json = serde_json::to_string_pretty(invoice)?;
        fs::write(self.record_path(&name), json)?;
        log::info!("saved record {name}");
        Ok(name)
    }

    /// Write the rendered PDF next to its record, named after the record's
    /// base name.
    pub fn save_pdf(&self, record_name: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
        let base = record_name.trim_end_matches(".json");
        let path = self.pdf_path(base);
        fs::write(&path, bytes)?;
        log::info!("saved PDF {}", path.display());
        Ok(path)
    }

    /// Remove a record and its paired PDF. A missing PDF is fine; a missing
    /// record is an I/O error.
    pub fn delete(&self, name: &str) -> Result<(), Error> {
        fs::remove_file(self.record_path(name))?;
        let pdf = self.pdf_path(name.trim_end_matches(".json"));
        match fs::remove_file(&pdf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        log::info!("deleted record {name}");
        Ok(())
    }
}
