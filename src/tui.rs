use std::io::stdout;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::catalog::Catalog;
use crate::composer::Selection;
use crate::error::Result;
use crate::output::OutputMode;

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    FlagInput(String),
    Target,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Quit,
    Output(String, OutputMode),
}

pub struct App {
    catalog: Catalog,
    selection: Selection,
    list_state: ListState,
    mode: Mode,
    input_buffer: String,
}

impl App {
    pub fn new(catalog: Catalog, selection: Selection) -> Self {
        let mut app = Self {
            catalog,
            selection,
            list_state: ListState::default(),
            mode: Mode::Normal,
            input_buffer: String::new(),
        };
        app.reset_cursor();
        app
    }

    fn reset_cursor(&mut self) {
        let first = if self.selection.allowed_flags().is_empty() {
            None
        } else {
            Some(0)
        };
        self.list_state.select(first);
    }

    fn selected_value(&self) -> Option<String> {
        self.list_state
            .selected()
            .and_then(|i| self.selection.allowed_flags().get(i))
            .map(|f| f.value.clone())
    }

    fn move_up(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i > 0 {
                self.list_state.select(Some(i - 1));
            }
        }
    }

    fn move_down(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i < self.selection.allowed_flags().len().saturating_sub(1) {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    fn cycle_tool(&mut self, forward: bool) {
        let count = self.catalog.tools().len();
        let current = self.catalog.tool_position(self.selection.tool()).unwrap_or(0);
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        let name = self.catalog.tools()[next].name.clone();
        if self.selection.select_tool(&self.catalog, &name) {
            self.reset_cursor();
        }
    }

    fn apply_preset(&mut self, index: usize) {
        let Some(preset) = self.catalog.presets().get(index).cloned() else {
            return;
        };
        if self.selection.apply_preset(&self.catalog, &preset) {
            self.reset_cursor();
        }
    }

    fn toggle_selected(&mut self) {
        let Some(value) = self.selected_value() else {
            return;
        };
        let on = !self.selection.is_active(&value);
        self.selection.toggle_flag(&value, on);

        let needs_input = on
            && self
                .selection
                .allowed_flags()
                .iter()
                .any(|f| f.value == value && f.requires_input);
        if needs_input {
            self.edit_input(value);
        }
    }

    fn edit_input(&mut self, value: String) {
        self.input_buffer = self.selection.input_of(&value).unwrap_or("").to_string();
        self.mode = Mode::FlagInput(value);
    }

    fn edit_selected(&mut self) {
        let Some(value) = self.selected_value() else {
            return;
        };
        let editable = self.selection.is_active(&value)
            && self
                .selection
                .allowed_flags()
                .iter()
                .any(|f| f.value == value && f.requires_input);
        if editable {
            self.edit_input(value);
        }
    }

    fn handle_editor_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                match std::mem::replace(&mut self.mode, Mode::Normal) {
                    Mode::FlagInput(value) => self.selection.set_flag_input(&value, &text),
                    Mode::Target => self.selection.set_target(&text),
                    Mode::Normal => {}
                }
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        if self.mode != Mode::Normal {
            self.handle_editor_key(key.code);
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(Outcome::Output(self.selection.command(), OutputMode::Clipboard));
            }
            KeyCode::Char('q') | KeyCode::Esc => return Some(Outcome::Quit),
            KeyCode::Enter => {
                return Some(Outcome::Output(self.selection.command(), OutputMode::Print));
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Tab => self.cycle_tool(true),
            KeyCode::BackTab => self.cycle_tool(false),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Char('t') => {
                self.input_buffer = self.selection.target().to_string();
                self.mode = Mode::Target;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.apply_preset(index);
            }
            _ => {}
        }
        None
    }
}

pub fn run(catalog: Catalog, selection: Selection) -> Result<Option<(String, OutputMode)>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = event_loop(App::new(catalog, selection));

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    match result? {
        Outcome::Quit => Ok(None),
        Outcome::Output(command, mode) => Ok(Some((command, mode))),
    }
}

fn event_loop(mut app: App) -> Result<Outcome> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(outcome) = app.handle_key(key) {
                return Ok(outcome);
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    // Tool bar
    let mut tools: Vec<Span> = Vec::new();
    for tool in app.catalog.tools() {
        let style = if tool.name == app.selection.tool() {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tools.push(Span::styled(format!(" {} ", tool.name), style));
    }
    let description = app
        .catalog
        .tool(app.selection.tool())
        .and_then(|t| t.description.clone())
        .unwrap_or_default();
    tools.push(Span::styled(format!("  {}", description), Style::default().fg(Color::DarkGray)));
    let tool_bar = Paragraph::new(Line::from(tools))
        .block(Block::default().borders(Borders::ALL).title("Tool"));
    f.render_widget(tool_bar, chunks[0]);

    // Target and presets
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    let target = Paragraph::new(app.selection.target().to_string())
        .block(Block::default().borders(Borders::ALL).title("Target"));
    f.render_widget(target, row[0]);

    let presets: Vec<Span> = app
        .catalog
        .presets()
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, p)| Span::raw(format!("{} {}  ", i + 1, p.label)))
        .collect();
    let presets = Paragraph::new(Line::from(presets))
        .block(Block::default().borders(Borders::ALL).title("Presets"));
    f.render_widget(presets, row[1]);

    // Flags
    let cursor = app.list_state.selected();
    let items: Vec<ListItem> = app
        .selection
        .allowed_flags()
        .iter()
        .enumerate()
        .map(|(i, flag)| {
            let active = app.selection.is_active(&flag.value);
            let checkbox = if active { "[x]" } else { "[ ]" };

            let input = if flag.requires_input && active {
                format!(" = {}", app.selection.input_of(&flag.value).unwrap_or(""))
            } else if flag.requires_input {
                " <input>".to_string()
            } else {
                String::new()
            };

            let style = if cursor == Some(i) {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if active {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {}{}", checkbox, flag.value, input), style),
                Span::styled(
                    format!("  {}", flag.description.as_deref().unwrap_or("")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = if items.is_empty() {
        "Flags (none defined)"
    } else {
        "Flags"
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_stateful_widget(list, chunks[2], &mut app.list_state);

    // Command preview
    let preview = Paragraph::new(format!("$ {}", app.selection.command()))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title("Command"));
    f.render_widget(preview, chunks[3]);

    // Help / editor
    let bottom = match &app.mode {
        Mode::Normal => Paragraph::new(
            "Space: toggle  e: edit  t: target  Tab: tool  1-9: preset  Enter: print  Ctrl+C: copy  q: quit",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title("Help")),
        Mode::FlagInput(value) => Paragraph::new(format!("{}: {}█", value, app.input_buffer)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Flag input (Enter to confirm, Esc to cancel)"),
        ),
        Mode::Target => Paragraph::new(format!("Target: {}█", app.input_buffer)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Target (Enter to confirm, Esc to cancel)"),
        ),
    };
    f.render_widget(bottom, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::DEFAULT_TARGET;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        let catalog = Catalog::builtin().unwrap();
        let selection = Selection::new(&catalog, None, DEFAULT_TARGET).unwrap();
        App::new(catalog, selection)
    }

    fn press(app: &mut App, code: KeyCode) -> Option<Outcome> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_prints_command() {
        let mut app = app();
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            Some(Outcome::Output("nmap -sC -sV 10.10.10.10".to_string(), OutputMode::Print))
        );
    }

    #[test]
    fn test_ctrl_c_copies() {
        let mut app = app();
        let outcome = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(outcome, Some(Outcome::Output(_, OutputMode::Clipboard))));
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(Outcome::Quit));
    }

    #[test]
    fn test_space_toggles_highlighted_flag() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.selection.is_active("-sC"));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.selection.is_active("-sC"));
        assert_eq!(app.selection.command(), "nmap -sV -sC 10.10.10.10");
    }

    #[test]
    fn test_toggling_input_flag_opens_editor() {
        let mut app = app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.mode, Mode::FlagInput("-p".to_string()));
        assert_eq!(app.input_buffer, "-");

        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "22,80");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.selection.command(), "nmap -sC -sV -p22,80 10.10.10.10");
    }

    #[test]
    fn test_escape_cancels_edit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "junk");
        assert_eq!(press(&mut app, KeyCode::Esc), None);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.selection.target(), DEFAULT_TARGET);
    }

    #[test]
    fn test_edit_target() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        for _ in 0..DEFAULT_TARGET.len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "scanme.nmap.org");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.selection.target(), "scanme.nmap.org");
    }

    #[test]
    fn test_editor_captures_command_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(press(&mut app, KeyCode::Char('q')), None);
        assert_eq!(app.input_buffer, format!("{}q", DEFAULT_TARGET));
    }

    #[test]
    fn test_tab_cycles_tools_and_resets_flags() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selection.tool(), "masscan");
        assert!(app.selection.active_flags().is_empty());
        assert_eq!(app.list_state.selected(), None);

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.selection.tool(), "ffuf");
    }

    #[test]
    fn test_number_applies_preset() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.selection.command(), "nmap -A -p1-65535 10.10.10.10");
        assert_eq!(app.list_state.selected(), Some(0));

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.selection.command(), "nmap -A -p1-65535 10.10.10.10");
    }

    #[test]
    fn test_edit_requires_active_input_flag() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Normal);

        for _ in 0..8 {
            press(&mut app, KeyCode::Char('j'));
        }
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Normal);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::FlagInput("-o".to_string()));
        assert_eq!(app.input_buffer, "output.nmap");
    }
}
