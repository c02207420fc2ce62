//! Character persistence for save/load functionality.
//!
//! Characters are stored one per file as pretty-printed JSON with a small
//! metadata block, so save lists can be shown without loading every record.

use crate::inventory::MAX_INVENTORY_SIZE;
use crate::world::Character;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("No save found for '{0}'")]
    NotFound(String),

    #[error("Invalid character data: {0}")]
    InvalidData(String),

    #[error("Save file for '{name}' already holds '{existing}'")]
    NameCollision { name: String, existing: String },
}

/// Current character save file version.
const CHARACTER_SAVE_VERSION: u32 = 1;

/// A saved character that can be resumed in a later session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the character was saved, as seconds since the Unix epoch.
    pub saved_at: String,

    /// The complete character data.
    pub character: Character,

    /// Quick-access metadata about the character.
    pub metadata: CharacterMetadata,
}

/// Metadata about a saved character for quick display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub gold: u32,

    /// When the save was created (duplicated from parent for peek access).
    #[serde(default)]
    pub saved_at: String,
}

impl SavedCharacter {
    /// Create a new saved character from a Character.
    pub fn new(character: Character) -> Self {
        let saved_at = timestamp_now();
        let metadata = CharacterMetadata {
            name: character.name.clone(),
            class: character.class.name().to_string(),
            level: character.level,
            gold: character.gold,
            saved_at: saved_at.clone(),
        };

        Self {
            version: CHARACTER_SAVE_VERSION,
            saved_at,
            character,
            metadata,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file, rejecting records that break the character invariants.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != CHARACTER_SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CHARACTER_SAVE_VERSION,
                found: saved.version,
            });
        }
        validate_character(&saved.character)?;

        Ok(saved)
    }

    /// Get metadata without loading the full character.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<CharacterMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: CharacterMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != CHARACTER_SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CHARACTER_SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Check the invariants a loaded record must satisfy.
pub fn validate_character(character: &Character) -> Result<(), PersistError> {
    if character.name.trim().is_empty() {
        return Err(PersistError::InvalidData("empty name".to_string()));
    }
    if character.level < 1 {
        return Err(PersistError::InvalidData("level must be at least 1".to_string()));
    }
    if character.max_health < 1 {
        return Err(PersistError::InvalidData(format!(
            "max_health {} must be positive",
            character.max_health
        )));
    }
    if character.health < 0 || character.health > character.max_health {
        return Err(PersistError::InvalidData(format!(
            "health {} outside 0..={}",
            character.health, character.max_health
        )));
    }
    if character.inventory.len() > MAX_INVENTORY_SIZE {
        return Err(PersistError::InvalidData(format!(
            "{} items exceeds capacity {MAX_INVENTORY_SIZE}",
            character.inventory.len()
        )));
    }
    Ok(())
}

/// Information about a character save file.
#[derive(Debug, Clone)]
pub struct CharacterSaveInfo {
    /// Path to the save file.
    pub path: String,

    /// Character metadata.
    pub metadata: CharacterMetadata,
}

/// List all character save files in a directory.
pub async fn list_character_saves(
    dir: impl AsRef<Path>,
) -> Result<Vec<CharacterSaveInfo>, PersistError> {
    let mut saves = Vec::new();

    let dir_path = dir.as_ref();
    if !dir_path.exists() {
        fs::create_dir_all(dir_path).await?;
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir_path).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            match SavedCharacter::peek_metadata(&path).await {
                Ok(metadata) => saves.push(CharacterSaveInfo {
                    path: path.to_string_lossy().to_string(),
                    metadata,
                }),
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable save");
                }
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(saves)
}

/// Generate a save path for a character.
///
/// Non-alphanumeric characters become `_`, so distinct names can share a
/// path ("Bob!" and "Bob?"). Saving, loading and deleting compare the stored
/// name and refuse to act on somebody else's file.
pub fn character_save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.json"))
}

/// Save a character into `dir`, creating it if needed. Returns the file path.
pub async fn save_character(
    dir: impl AsRef<Path>,
    character: &Character,
) -> Result<PathBuf, PersistError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;
    let path = character_save_path(dir, &character.name);
    if let Some(existing) = saved_name_at(&path).await {
        if existing != character.name {
            return Err(PersistError::NameCollision {
                name: character.name.clone(),
                existing,
            });
        }
    }
    SavedCharacter::new(character.clone()).save_json(&path).await?;
    tracing::debug!(path = %path.display(), character = %character.name, "character saved");
    Ok(path)
}

/// Load the character saved under `name` in `dir`.
pub async fn load_character(dir: impl AsRef<Path>, name: &str) -> Result<Character, PersistError> {
    let path = character_save_path(dir, name);
    if !fs::try_exists(&path).await? {
        return Err(PersistError::NotFound(name.to_string()));
    }
    let character = SavedCharacter::load_json(&path).await?.character;
    if character.name != name {
        return Err(PersistError::NotFound(name.to_string()));
    }
    Ok(character)
}

/// Delete the save for `name`.
pub async fn delete_character_save(dir: impl AsRef<Path>, name: &str) -> Result<(), PersistError> {
    let path = character_save_path(dir, name);
    if saved_name_at(&path).await.is_some_and(|existing| existing != name) {
        return Err(PersistError::NotFound(name.to_string()));
    }
    match fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(PersistError::NotFound(name.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Name of the character stored at `path`, if it holds a readable save.
async fn saved_name_at(path: &Path) -> Option<String> {
    SavedCharacter::peek_metadata(path)
        .await
        .ok()
        .map(|metadata| metadata.name)
}

/// Get current timestamp as seconds since the Unix epoch.
fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}
