use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::flag::Flag;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub default_flags: Vec<String>,
}

impl Tool {
    pub fn flag(&self, value: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.value == value)
    }

    /// The flags pre-selected when this tool becomes active, in catalog order.
    pub fn default_selection(&self) -> Vec<Flag> {
        self.flags
            .iter()
            .filter(|f| self.default_flags.iter().any(|d| d == &f.value))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub label: String,
    pub tool: String,
    #[serde(default)]
    pub flags: Vec<PresetFlag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetFlag {
    pub value: String,
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tools: Vec<Tool>,
    #[serde(default)]
    presets: Vec<Preset>,
}

/// Validated set of tools and presets.
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: Vec<Tool>,
    presets: Vec<Preset>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(mut tools: Vec<Tool>, presets: Vec<Preset>) -> Result<Catalog> {
        if tools.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut index = HashMap::new();
        for (i, tool) in tools.iter_mut().enumerate() {
            if index.insert(tool.name.clone(), i).is_some() {
                return Err(Error::DuplicateTool(tool.name.clone()));
            }

            let mut seen = HashSet::new();
            for flag in &tool.flags {
                if !seen.insert(flag.value.as_str()) {
                    return Err(Error::DuplicateFlag {
                        tool: tool.name.clone(),
                        flag: flag.value.clone(),
                    });
                }
            }

            let name = tool.name.clone();
            let known: Vec<String> = tool.flags.iter().map(|f| f.value.clone()).collect();
            tool.default_flags.retain(|d| {
                let found = known.contains(d);
                if !found {
                    warn!("Ignoring default flag `{}` of {}: not in its flag list", d, name);
                }
                found
            });
        }

        let catalog = Catalog {
            tools,
            presets,
            index,
        };
        catalog.validate_presets()?;
        Ok(catalog)
    }

    fn validate_presets(&self) -> Result<()> {
        let mut labels = HashSet::new();
        for preset in &self.presets {
            if !labels.insert(preset.label.as_str()) {
                return Err(Error::DuplicatePreset(preset.label.clone()));
            }

            let tool = self.tool(&preset.tool).ok_or_else(|| Error::UnknownPresetTool {
                preset: preset.label.clone(),
                tool: preset.tool.clone(),
            })?;

            let mut seen = HashSet::new();
            for flag in &preset.flags {
                if tool.flag(&flag.value).is_none() {
                    return Err(Error::UnknownPresetFlag {
                        preset: preset.label.clone(),
                        tool: tool.name.clone(),
                        flag: flag.value.clone(),
                    });
                }
                if !seen.insert(flag.value.as_str()) {
                    return Err(Error::DuplicatePresetFlag {
                        preset: preset.label.clone(),
                        flag: flag.value.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Catalog> {
        Self::parse(json, "catalog")
    }

    fn parse(json: &str, origin: &str) -> Result<Catalog> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| Error::json_error(origin.to_string(), e))?;
        Catalog::new(file.tools, file.presets)
    }

    pub fn builtin() -> Result<Catalog> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_file(path: &Path) -> Result<Catalog> {
        let content =
            fs::read_to_string(path).map_err(|e| Error::io_error(path.to_path_buf(), e))?;
        Self::parse(&content, &format!("catalog file `{}`", path.display()))
    }

    /// Loads an explicit catalog file, else the first catalog found on the
    /// search path, else the built-in one.
    pub fn load(explicit: Option<&Path>) -> Result<Catalog> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::CatalogNotFound(path.to_path_buf()));
            }
            info!("Using catalog `{}`", path.display());
            return Self::from_file(path);
        }

        for path in catalog_paths() {
            debug!("Looking for catalog at `{}`", path.display());
            if path.exists() {
                info!("Using catalog `{}`", path.display());
                return Self::from_file(&path);
            }
        }

        info!("Using built-in catalog");
        Self::builtin()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn tool_position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn preset(&self, label: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.label == label)
    }

    /// Resolves a preset into its tool and the flags it turns on. Preset
    /// inputs override the catalog's declared defaults.
    pub fn resolve_preset(&self, preset: &Preset) -> Option<(&Tool, Vec<Flag>)> {
        let tool = self.tool(&preset.tool)?;
        let flags = preset
            .flags
            .iter()
            .map(|pf| {
                let mut flag = tool.flag(&pf.value)?.clone();
                if let Some(input) = &pf.input {
                    flag.input = Some(input.clone());
                }
                Some(flag)
            })
            .collect::<Option<Vec<_>>>()?;
        Some((tool, flags))
    }
}

fn catalog_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Project-local: ./.scancmd/catalog.json
    paths.push(PathBuf::from(".scancmd/catalog.json"));

    // 2. User config: ~/.config/scancmd/catalog.json
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("scancmd").join("catalog.json"));
    }

    paths
}
