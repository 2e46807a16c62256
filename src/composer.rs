use log::{debug, warn};

use crate::catalog::{Catalog, Preset};
use crate::flag::Flag;

pub const DEFAULT_TARGET: &str = "10.10.10.10";

/// Joins the tool name, the active flags in order, and the target.
pub fn compose(tool: &str, active_flags: &[Flag], target: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(active_flags.len() + 2);
    parts.push(tool.to_string());

    for flag in active_flags {
        parts.push(flag.to_token());
    }

    parts.push(target.to_string());
    parts.join(" ")
}

/// Returns the tool's flag catalog and its default selection, or `None` when
/// the catalog has no such tool.
pub fn select_tool<'a>(catalog: &'a Catalog, name: &str) -> Option<(&'a [Flag], Vec<Flag>)> {
    let tool = catalog.tool(name)?;
    Some((&tool.flags, tool.default_selection()))
}

pub fn toggle_flag(active_flags: &[Flag], flag: &Flag, on: bool) -> Vec<Flag> {
    let present = active_flags.iter().any(|f| f.value == flag.value);

    if on {
        let mut flags = active_flags.to_vec();
        if !present {
            flags.push(flag.clone());
        }
        flags
    } else {
        active_flags
            .iter()
            .filter(|f| f.value != flag.value)
            .cloned()
            .collect()
    }
}

pub fn set_flag_input(active_flags: &[Flag], value: &str, input: &str) -> Vec<Flag> {
    active_flags
        .iter()
        .map(|f| {
            if f.value == value {
                Flag {
                    input: Some(input.to_string()),
                    ..f.clone()
                }
            } else {
                f.clone()
            }
        })
        .collect()
}

/// Resolves a preset into the tool it selects and the flags it activates.
/// The tool's default flags play no part.
pub fn apply_preset(catalog: &Catalog, preset: &Preset) -> Option<(String, Vec<Flag>)> {
    let (tool, flags) = catalog.resolve_preset(preset)?;
    Some((tool.name.clone(), flags))
}

/// The user's current choices for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    tool: String,
    allowed_flags: Vec<Flag>,
    active_flags: Vec<Flag>,
    target: String,
}

impl Selection {
    /// Starts on `initial_tool` (or the first catalog tool) with its default
    /// flags. Returns `None` if `initial_tool` is not in the catalog.
    pub fn new(catalog: &Catalog, initial_tool: Option<&str>, target: &str) -> Option<Self> {
        let name = match initial_tool {
            Some(name) => name,
            None => catalog.tools().first()?.name.as_str(),
        };
        let (allowed, active) = select_tool(catalog, name)?;

        Some(Self {
            tool: name.to_string(),
            allowed_flags: allowed.to_vec(),
            active_flags: active,
            target: target.to_string(),
        })
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn allowed_flags(&self) -> &[Flag] {
        &self.allowed_flags
    }

    pub fn active_flags(&self) -> &[Flag] {
        &self.active_flags
    }

    pub fn is_active(&self, value: &str) -> bool {
        self.active_flags.iter().any(|f| f.value == value)
    }

    /// Current input of an active flag.
    pub fn input_of(&self, value: &str) -> Option<&str> {
        self.active_flags
            .iter()
            .find(|f| f.value == value)
            .and_then(|f| f.input.as_deref())
    }

    /// The composed command. Always derived from the current state.
    pub fn command(&self) -> String {
        compose(&self.tool, &self.active_flags, &self.target)
    }

    /// Switches tool and resets the active flags to its defaults. Unknown
    /// names leave the selection untouched; returns whether it changed.
    pub fn select_tool(&mut self, catalog: &Catalog, name: &str) -> bool {
        let Some((allowed, active)) = select_tool(catalog, name) else {
            warn!("Tool `{}` is not in the catalog, keeping {}", name, self.tool);
            return false;
        };

        debug!("Selected {} with {} default flag(s)", name, active.len());
        self.tool = name.to_string();
        self.allowed_flags = allowed.to_vec();
        self.active_flags = active;
        true
    }

    /// Toggles a flag of the current tool by value. Values the tool does not
    /// define are ignored; returns whether the value was recognised.
    pub fn toggle_flag(&mut self, value: &str, on: bool) -> bool {
        let Some(flag) = self.allowed_flags.iter().find(|f| f.value == value) else {
            return false;
        };

        self.active_flags = toggle_flag(&self.active_flags, flag, on);
        true
    }

    pub fn set_flag_input(&mut self, value: &str, input: &str) {
        self.active_flags = set_flag_input(&self.active_flags, value, input);
    }

    pub fn set_target(&mut self, target: &str) {
        self.target = target.to_string();
    }

    /// Replaces tool and flags with the preset's. The target is kept.
    pub fn apply_preset(&mut self, catalog: &Catalog, preset: &Preset) -> bool {
        let Some((tool, flags)) = apply_preset(catalog, preset) else {
            warn!("Preset `{}` does not match the catalog", preset.label);
            return false;
        };
        let Some(allowed) = catalog.tool(&tool).map(|t| t.flags.clone()) else {
            return false;
        };

        debug!("Applied preset `{}`", preset.label);
        self.tool = tool;
        self.allowed_flags = allowed;
        self.active_flags = flags;
        true
    }
}
