use log::info;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Print,
    Clipboard,
}

pub fn handle_output(command: &str, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Print => {
            println!("{}", command);
        }
        OutputMode::Clipboard => {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(command)?;
            info!("Copied {} bytes to clipboard", command.len());
            eprintln!("Command copied to clipboard");
        }
    }
    Ok(())
}
