use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownModel;

/// Creation ordinal of a session. Never reused, even after eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// `None` once the ordinal space is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(SessionId)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Ai,
}

/// Verdict for one uploaded file, as returned by the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub filename: String,
    pub vulnerable: bool,
}

/// A file as it appears in the transcript. The bytes themselves are never kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum EntryBody {
    Text(String),
    Status(String),
    Results(Vec<Verdict>),
    Files(Vec<FileRef>),
}

/// One transcript item. Entries are never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sender: Origin,
    pub body: EntryBody,
}

impl Entry {
    pub fn user_files(files: Vec<FileRef>) -> Self {
        Self {
            sender: Origin::User,
            body: EntryBody::Files(files),
        }
    }

    /// The model notice is attributed to the user, matching what the chat has always shown.
    pub fn user_status(model: ScanModel) -> Self {
        Self {
            sender: Origin::User,
            body: EntryBody::Status(model.as_str().to_string()),
        }
    }

    pub fn ai_text(text: impl Into<String>) -> Self {
        Self {
            sender: Origin::Ai,
            body: EntryBody::Text(text.into()),
        }
    }

    pub fn ai_results(results: Vec<Verdict>) -> Self {
        Self {
            sender: Origin::Ai,
            body: EntryBody::Results(results),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub formatted_date: String,
    #[serde(rename = "messages", default)]
    transcript: Vec<Entry>,
}

impl Session {
    pub fn new(id: SessionId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: format!("Conversation {}", u128::from(id.0) + 1),
            created_at,
            formatted_date: crate::parser::format_created_at(&created_at.with_timezone(&Local)),
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[Entry] {
        &self.transcript
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.transcript.push(entry);
    }
}

/// Detection models the prediction service accepts in the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScanModel {
    #[default]
    #[serde(rename = "GCN+CNN+DROPOUT+RF")]
    GcnCnnDropoutRf,
    #[serde(rename = "GCN+DROPOUT+RF")]
    GcnDropoutRf,
    #[serde(rename = "SAGEConv+CNN+DROPOUT+MLP")]
    SageConvCnnDropoutMlp,
}

impl ScanModel {
    pub const ALL: [ScanModel; 3] = [
        ScanModel::GcnCnnDropoutRf,
        ScanModel::GcnDropoutRf,
        ScanModel::SageConvCnnDropoutMlp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScanModel::GcnCnnDropoutRf => "GCN+CNN+DROPOUT+RF",
            ScanModel::GcnDropoutRf => "GCN+DROPOUT+RF",
            ScanModel::SageConvCnnDropoutMlp => "SAGEConv+CNN+DROPOUT+MLP",
        }
    }
}

impl fmt::Display for ScanModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScanModel::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
