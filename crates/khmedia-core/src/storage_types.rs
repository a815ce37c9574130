use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Order in which an owner's local file and remote URL are considered when
/// resolving the image to display.
///
/// Chosen per deployment through configuration and handed to the resolver at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoragePriority {
    /// Local file first, remote URL second.
    #[default]
    #[serde(rename = "local")]
    PreferLocal,
    /// Remote URL first, local file second.
    #[serde(rename = "remote")]
    PreferRemote,
}

/// One of the two places an owner's image can live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSource {
    Local,
    Remote,
}

impl StoragePriority {
    /// The total order over storage sources for this priority.
    pub fn order(self) -> [StorageSource; 2] {
        match self {
            StoragePriority::PreferLocal => [StorageSource::Local, StorageSource::Remote],
            StoragePriority::PreferRemote => [StorageSource::Remote, StorageSource::Local],
        }
    }
}

impl FromStr for StoragePriority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "prefer_local" => Ok(StoragePriority::PreferLocal),
            "remote" | "prefer_remote" | "supabase" => Ok(StoragePriority::PreferRemote),
            _ => Err(anyhow::anyhow!("Invalid storage priority: {}", s)),
        }
    }
}

impl Display for StoragePriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoragePriority::PreferLocal => write!(f, "local"),
            StoragePriority::PreferRemote => write!(f, "remote"),
        }
    }
}
