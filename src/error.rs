use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The catalog defines no tools.")]
    EmptyCatalog,

    #[error("Found a non-unique tool name: `{}`", .0)]
    DuplicateTool(String),

    #[error("Found a non-unique flag on tool {}: `{}`", .tool, .flag)]
    DuplicateFlag { tool: String, flag: String },

    #[error("Found a non-unique preset label: `{}`", .0)]
    DuplicatePreset(String),

    #[error("Preset `{}` refers to unknown tool `{}`", .preset, .tool)]
    UnknownPresetTool { preset: String, tool: String },

    #[error("Preset `{}` refers to flag `{}`, which tool {} does not define", .preset, .flag, .tool)]
    UnknownPresetFlag {
        preset: String,
        tool: String,
        flag: String,
    },

    #[error("Preset `{}` lists flag `{}` more than once", .preset, .flag)]
    DuplicatePresetFlag { preset: String, flag: String },

    #[error("Unknown tool: `{}`", .0)]
    UnknownTool(String),

    #[error("Unknown preset: `{}`", .0)]
    UnknownPreset(String),

    #[error("Tool {} has no flag `{}`", .tool, .flag)]
    UnknownFlag { tool: String, flag: String },

    #[error("Catalog file not found at `{}`", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("IO error with catalog file at path `{}`: {}", .path.display(), .original)]
    Io {
        path: PathBuf,
        original: std::io::Error,
    },

    #[error("Error parsing {}: {}", .origin, .original)]
    Json {
        origin: String,
        original: serde_json::Error,
    },

    #[error("Clipboard error: {}", .0)]
    Clipboard(#[from] arboard::Error),

    #[error("Terminal error: {}", .0)]
    Terminal(#[from] std::io::Error),
}

impl Error {
    pub fn io_error(path: PathBuf, original: std::io::Error) -> Self {
        Self::Io { path, original }
    }

    pub fn json_error(origin: String, original: serde_json::Error) -> Self {
        Self::Json { origin, original }
    }
}
