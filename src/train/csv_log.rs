//! Append-only CSV metrics logs
//!
//! Each loop owns one log with a fixed column schema. The header is written
//! when the log is created, every epoch appends and flushes one row, and the
//! end-of-run backup is built by reading the flushed file back.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A fixed-schema row; `HEADER` lists the serialized field names in order
pub trait MetricsRow: Serialize + DeserializeOwned {
    const HEADER: &'static [&'static str];
}

/// One pretraining epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PretrainRow {
    pub epoch: usize,
    pub generator_loss: f32,
    pub reconstruction_loss: f32,
    pub discriminator_loss: f32,
    /// Percent
    pub discriminator_accuracy: f32,
}

impl MetricsRow for PretrainRow {
    const HEADER: &'static [&'static str] = &[
        "epoch",
        "generator_loss",
        "reconstruction_loss",
        "discriminator_loss",
        "discriminator_accuracy",
    ];
}

/// One combined-training epoch; losses are empty on the epoch-0 baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub epoch: usize,
    pub generator_loss: Option<f32>,
    pub discriminator_loss: Option<f32>,
    pub classifier_loss: Option<f32>,
    pub train_accuracy: f32,
    pub train_f1: f32,
    pub val_accuracy: f32,
    pub val_f1: f32,
    pub test_accuracy: f32,
    pub test_f1: f32,
}

impl MetricsRow for CombinedRow {
    const HEADER: &'static [&'static str] = &[
        "epoch",
        "generator_loss",
        "discriminator_loss",
        "classifier_loss",
        "train_accuracy",
        "train_f1",
        "val_accuracy",
        "val_f1",
        "test_accuracy",
        "test_f1",
    ];
}

/// CSV file receiving one row per epoch
pub struct MetricsLog<R> {
    path: PathBuf,
    _row: PhantomData<R>,
}

impl<R: MetricsRow> MetricsLog<R> {
    /// Create (or truncate) the log and write its header
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut w = csv::Writer::from_path(&path)?;
        w.write_record(R::HEADER)?;
        w.flush()
            .map_err(|e| Error::io(format!("flushing {}", path.display()), e))?;
        Ok(Self {
            path,
            _row: PhantomData,
        })
    }

    /// Append one row and flush it to disk
    pub fn append(&mut self, row: &R) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(format!("opening {}", self.path.display()), e))?;
        let mut w = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        w.serialize(row)?;
        w.flush()
            .map_err(|e| Error::io(format!("flushing {}", self.path.display()), e))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every row currently on disk
    pub fn read_back(&self) -> Result<Vec<R>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        reader
            .deserialize::<R>()
            .map(|row| row.map_err(Error::from))
            .collect()
    }

    /// Write the on-disk history as JSON, one array per column
    ///
    /// Returns the number of rows backed up.
    pub fn write_backup(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let rows = self.read_back()?;
        let mut columns = serde_json::Map::new();
        for name in R::HEADER {
            columns.insert((*name).to_string(), serde_json::Value::Array(Vec::new()));
        }
        for row in &rows {
            if let serde_json::Value::Object(fields) = serde_json::to_value(row)? {
                for (name, value) in fields {
                    if let Some(serde_json::Value::Array(column)) = columns.get_mut(&name) {
                        column.push(value);
                    }
                }
            }
        }
        let json = serde_json::to_string_pretty(&serde_json::Value::Object(columns))?;
        fs::write(path, json).map_err(|e| Error::io(format!("writing {}", path.display()), e))?;
        Ok(rows.len())
    }
}
