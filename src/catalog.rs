//! Puzzle catalog: schemas and assets
//!
//! Loaded once at startup and never mutated. The document shape is
//! `{ "puzzleSchemas": [{ "type", "instruction" }], "assets": [{ "id", "type", "icon" }] }`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::OPTION_COUNT;
use crate::error::{GameError, Result};

/// Asset category tag that marks colour swatches
pub const COLOR_TAG: &str = "color";

/// Asset identifier (catalogs use both strings and integers, normalised to text)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawAssetId", into = "String")]
pub struct AssetId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAssetId {
    Text(String),
    Number(i64),
}

impl From<RawAssetId> for AssetId {
    fn from(raw: RawAssetId) -> Self {
        match raw {
            RawAssetId::Text(s) => AssetId(s),
            RawAssetId::Number(n) => AssetId(n.to_string()),
        }
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        AssetId(s.to_string())
    }
}

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pickable item (colour swatch, animal, shape...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// Category tag (`"color"` or anything else)
    #[serde(rename = "type")]
    pub kind: String,
    /// Display symbol (usually an emoji)
    pub icon: String,
}

impl Asset {
    pub fn is_color(&self) -> bool {
        self.kind == COLOR_TAG
    }
}

/// Puzzle type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PuzzleKind {
    /// 2x2 colour grid with one missing cell
    Sudoku,
    /// Find the other half of a mirrored picture
    Symmetry,
    /// Match a silhouette (generated like a generic puzzle)
    Shadow,
    /// Any other tag; generated as a generic pick-the-target puzzle
    Other(String),
}

impl PuzzleKind {
    pub fn as_str(&self) -> &str {
        match self {
            PuzzleKind::Sudoku => "phi_sudoku",
            PuzzleKind::Symmetry => "phi_symmetry",
            PuzzleKind::Shadow => "phi_shadow",
            PuzzleKind::Other(tag) => tag,
        }
    }
}

impl From<String> for PuzzleKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "phi_sudoku" => PuzzleKind::Sudoku,
            "phi_symmetry" => PuzzleKind::Symmetry,
            "phi_shadow" => PuzzleKind::Shadow,
            _ => PuzzleKind::Other(tag),
        }
    }
}

impl From<PuzzleKind> for String {
    fn from(kind: PuzzleKind) -> Self {
        match kind {
            PuzzleKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSchema {
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    /// Prompt read aloud when the puzzle starts
    pub instruction: String,
}

/// Immutable puzzle catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "puzzleSchemas")]
    pub schemas: Vec<PuzzleSchema>,
    pub assets: Vec<Asset>,
}

impl Catalog {
    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GameError::CatalogLoad(e.to_string()))
    }

    /// Read and parse a catalog file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| GameError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;
        log::info!(
            "Loaded catalog from {} ({} schemas, {} assets)",
            path.display(),
            catalog.schemas.len(),
            catalog.assets.len()
        );
        Ok(catalog)
    }

    /// Colour assets in catalog order
    pub fn color_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(|a| a.is_color())
    }

    /// Non-colour assets in catalog order
    pub fn other_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(|a| !a.is_color())
    }

    /// Verify the generator's preconditions hold for every puzzle type
    /// except symmetry, whose extra requirement is checked per round.
    pub fn check(&self) -> Result<()> {
        if self.schemas.is_empty() {
            return Err(GameError::InsufficientCatalog(
                "no puzzle schemas".to_string(),
            ));
        }

        let colors = self.color_assets().count();
        if colors < 2 {
            return Err(GameError::InsufficientCatalog(format!(
                "need at least 2 color assets, found {}",
                colors
            )));
        }

        if self.assets.len() < OPTION_COUNT {
            return Err(GameError::InsufficientCatalog(format!(
                "need at least {} assets, found {}",
                OPTION_COUNT,
                self.assets.len()
            )));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(&asset.id) {
                return Err(GameError::InsufficientCatalog(format!(
                    "duplicate asset id {}",
                    asset.id
                )));
            }
        }

        Ok(())
    }
}
