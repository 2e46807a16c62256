use serde::Deserialize;

/// A toggle-able command-line option of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "requireInput")]
    pub requires_input: bool,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default, alias = "noSpace")]
    pub no_space_before_input: bool,
}

impl Flag {
    pub fn input_str(&self) -> &str {
        self.input.as_deref().unwrap_or("")
    }

    /// Renders the flag as it appears in the composed command.
    pub fn to_token(&self) -> String {
        if !self.requires_input {
            return self.value.clone();
        }

        let sep = if self.no_space_before_input { "" } else { " " };
        format!("{}{}{}", self.value, sep, self.input_str())
    }

    pub fn display_label(&self) -> String {
        match &self.description {
            Some(desc) if self.requires_input => format!("{}: {} (requires input)", self.value, desc),
            Some(desc) => format!("{}: {}", self.value, desc),
            None if self.requires_input => format!("{} (requires input)", self.value),
            None => self.value.clone(),
        }
    }
}

#[cfg(test)]
impl Flag {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            requires_input: false,
            input: None,
            no_space_before_input: false,
        }
    }

    pub fn with_input(value: impl Into<String>, input: Option<&str>, no_space: bool) -> Self {
        Self {
            value: value.into(),
            description: None,
            requires_input: true,
            input: input.map(str::to_string),
            no_space_before_input: no_space,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_flag_token() {
        assert_eq!(Flag::new("-sC").to_token(), "-sC");
    }

    #[test]
    fn test_input_flag_with_space() {
        let flag = Flag::with_input("-o", Some("output.nmap"), false);
        assert_eq!(flag.to_token(), "-o output.nmap");
    }

    #[test]
    fn test_input_flag_without_space() {
        let flag = Flag::with_input("-p", Some("80,443"), true);
        assert_eq!(flag.to_token(), "-p80,443");
    }

    #[test]
    fn test_missing_input_renders_empty() {
        assert_eq!(Flag::with_input("-T", None, false).to_token(), "-T ");
        assert_eq!(Flag::with_input("-p", None, true).to_token(), "-p");
    }

    #[test]
    fn test_input_ignored_when_not_required() {
        let mut flag = Flag::new("-A");
        flag.input = Some("stale".to_string());
        assert_eq!(flag.to_token(), "-A");
    }

    #[test]
    fn test_deserialize_aliases() {
        let json = r#"{ "value": "-p", "requireInput": true, "input": "-", "noSpace": true }"#;
        let flag: Flag = serde_json::from_str(json).unwrap();
        assert!(flag.requires_input);
        assert!(flag.no_space_before_input);
        assert_eq!(flag.input.as_deref(), Some("-"));

        let json = r#"{ "value": "-o", "requiresInput": true, "noSpaceBeforeInput": false }"#;
        let flag: Flag = serde_json::from_str(json).unwrap();
        assert!(flag.requires_input);
        assert!(!flag.no_space_before_input);
        assert_eq!(flag.input, None);
    }

    #[test]
    fn test_display_label() {
        let flag = Flag::with_input("-p", None, true).described("Specify ports");
        assert_eq!(flag.display_label(), "-p: Specify ports (requires input)");
        assert_eq!(Flag::new("-O").display_label(), "-O");
    }
}
