//! User-visible notification log shown in the bottom panel.
//!
//! Every entry is mirrored to the `log` facade.

use crate::error::{FlowError, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_NOTICES: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub time: DateTime<Local>,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn formatted(&self) -> String {
        let tag = match self.level {
            NoticeLevel::Info => "System",
            NoticeLevel::Success => "OK",
            NoticeLevel::Warning => "Warn",
            NoticeLevel::Error => "Error",
        };
        format!("[{}] [{}] {}", self.time.format("%H:%M:%S"), tag, self.message)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Notifications {
    entries: Vec<Notice>,
}

impl Notifications {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", message),
            NoticeLevel::Warning => log::warn!("{}", message),
            NoticeLevel::Error => log::error!("{}", message),
        }
        self.entries.push(Notice {
            time: Local::now(),
            level,
            message,
        });
        if self.entries.len() > MAX_NOTICES {
            let overflow = self.entries.len() - MAX_NOTICES;
            self.entries.drain(..overflow);
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Notice> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write the log to `{dir}/log_{timestamp}.txt`.
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| FlowError::io(dir, e))?;
        let path = dir.join(format!("log_{}.txt", Local::now().format("%Y%m%d_%H%M%S")));
        let content: Vec<String> = self.entries.iter().map(Notice::formatted).collect();
        fs::write(&path, content.join("\n")).map_err(|e| FlowError::io(&path, e))?;
        Ok(path)
    }
}
