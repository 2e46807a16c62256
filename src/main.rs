mod catalog;
mod composer;
mod error;
mod flag;
mod output;
mod tui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use crate::catalog::Catalog;
use crate::composer::{Selection, DEFAULT_TARGET};
use crate::error::{Error, Result};
use crate::output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "scancmd")]
#[command(about = "Compose security-scanner command lines without typing them out")]
struct Args {
    /// Catalog file describing tools, flags and presets
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Tool to start with (defaults to the first one in the catalog)
    #[arg(short, long)]
    tool: Option<String>,

    /// Target appended to the command
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: String,

    /// Preset to apply, by label (replaces --tool)
    #[arg(short, long)]
    preset: Option<String>,

    /// Flag to turn on, optionally with its input (e.g. -f=-sS or -f -p=1-1000)
    #[arg(short, long = "flag", value_name = "FLAG[=INPUT]", allow_hyphen_values = true, value_parser = parse_flag_arg)]
    flags: Vec<FlagArg>,

    /// Print the command without starting the interface
    #[arg(long, conflicts_with = "copy")]
    print: bool,

    /// Copy the command to the clipboard without starting the interface
    #[arg(long)]
    copy: bool,

    /// List tools, flags and presets, then exit
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FlagArg {
    value: String,
    input: Option<String>,
}

fn parse_flag_arg(arg: &str) -> std::result::Result<FlagArg, String> {
    let (value, input) = match arg.split_once('=') {
        Some((value, input)) => (value, Some(input.to_string())),
        None => (arg, None),
    };

    if value.is_empty() {
        return Err(format!("missing flag before `=` in `{}`", arg));
    }

    Ok(FlagArg {
        value: value.to_string(),
        input,
    })
}

fn build_selection(catalog: &Catalog, args: &Args) -> Result<Selection> {
    let tool = args.tool.as_deref();
    let mut selection = Selection::new(catalog, tool, &args.target)
        .ok_or_else(|| Error::UnknownTool(tool.unwrap_or_default().to_string()))?;

    if let Some(label) = &args.preset {
        let preset = catalog
            .preset(label)
            .ok_or_else(|| Error::UnknownPreset(label.clone()))?;
        selection.apply_preset(catalog, preset);
    }

    for flag in &args.flags {
        if !selection.toggle_flag(&flag.value, true) {
            return Err(Error::UnknownFlag {
                tool: selection.tool().to_string(),
                flag: flag.value.clone(),
            });
        }
        if let Some(input) = &flag.input {
            selection.set_flag_input(&flag.value, input);
        }
    }

    debug!("Initial command: {}", selection.command());
    Ok(selection)
}

fn print_catalog(catalog: &Catalog) {
    for tool in catalog.tools() {
        match &tool.description {
            Some(desc) => println!("{} - {}", tool.name, desc),
            None => println!("{}", tool.name),
        }
        for flag in &tool.flags {
            let default = if tool.default_flags.contains(&flag.value) {
                " [default]"
            } else {
                ""
            };
            println!("    {}{}", flag.display_label(), default);
        }
    }

    if !catalog.presets().is_empty() {
        println!();
        println!("Presets:");
        for preset in catalog.presets() {
            let line = catalog
                .resolve_preset(preset)
                .map(|(tool, flags)| composer::compose(&tool.name, &flags, "<target>"))
                .unwrap_or_default();
            println!("    {}: {}", preset.label, line);
        }
    }
}

fn execute(args: Args) -> Result<()> {
    let catalog = Catalog::load(args.catalog.as_deref())?;

    if args.list {
        print_catalog(&catalog);
        return Ok(());
    }

    let selection = build_selection(&catalog, &args)?;

    let headless = if args.copy {
        Some(OutputMode::Clipboard)
    } else if args.print {
        Some(OutputMode::Print)
    } else {
        None
    };

    if let Some(mode) = headless {
        return output::handle_output(&selection.command(), mode);
    }

    match tui::run(catalog, selection)? {
        Some((command, mode)) => {
            info!("Composed: {}", command);
            output::handle_output(&command, mode)
        }
        None => {
            // User quit without composing
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match execute(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("scancmd").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_flag_arg() {
        assert_eq!(
            parse_flag_arg("-p=1-65535").unwrap(),
            FlagArg {
                value: "-p".to_string(),
                input: Some("1-65535".to_string())
            }
        );
        assert_eq!(parse_flag_arg("-O").unwrap().input, None);
        assert_eq!(parse_flag_arg("-o=").unwrap().input.as_deref(), Some(""));
        assert!(parse_flag_arg("=x").is_err());
    }

    #[test]
    fn test_defaults() {
        let catalog = Catalog::builtin().unwrap();
        let selection = build_selection(&catalog, &args(&[])).unwrap();
        assert_eq!(selection.command(), "nmap -sC -sV 10.10.10.10");
    }

    #[test]
    fn test_flags_and_inputs() {
        let catalog = Catalog::builtin().unwrap();
        let args = args(&["--target", "scanme.nmap.org", "-f", "-Pn", "--flag=-p=22", "-f", "-o"]);
        let selection = build_selection(&catalog, &args).unwrap();
        assert_eq!(
            selection.command(),
            "nmap -sC -sV -Pn -p22 -o output.nmap scanme.nmap.org"
        );
    }

    #[test]
    fn test_preset_then_flags() {
        let catalog = Catalog::builtin().unwrap();
        let args = args(&["--tool", "masscan", "--preset", "Nmap Default", "-f", "--open"]);
        let selection = build_selection(&catalog, &args).unwrap();
        assert_eq!(selection.command(), "nmap -sC -sV --open 10.10.10.10");
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let catalog = Catalog::builtin().unwrap();

        let err = build_selection(&catalog, &args(&["--tool", "zmap"])).unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "zmap"));

        let err = build_selection(&catalog, &args(&["--preset", "Stealth"])).unwrap_err();
        assert!(matches!(err, Error::UnknownPreset(_)));

        let err = build_selection(&catalog, &args(&["--tool", "rustscan", "-f", "-sC"])).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag { tool, .. } if tool == "rustscan"));
    }

    #[test]
    fn test_print_conflicts_with_copy() {
        let result = Args::try_parse_from(["scancmd", "--print", "--copy"]);
        assert!(result.is_err());
    }
}
