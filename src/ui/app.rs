//! Main TUI application state and logic

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::ui::panes::{
    render_memory_pane, render_source_pane, render_status_bar, render_terminal_pane,
    render_variables_pane, ListScrollState, MemoryRenderData, SourceRenderData,
    SourceScrollState, StatusRenderData, VariablesRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Output,
    Variables,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> output -> variables -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The interpreter, already run with history recording on
    pub interpreter: Interpreter,

    /// The program text being inspected
    pub source_code: String,

    /// The error that stopped execution, shown at the last step
    pub error: Option<RuntimeError>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub variables_scroll: ListScrollState,
    pub memory_scroll: ListScrollState,
    pub terminal_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(interpreter: Interpreter, source_code: String, error: Option<RuntimeError>) -> Self {
        let status_message = match &error {
            Some(_) => "Execution stopped with an error, press Enter to jump to it".to_string(),
            None => String::from("Ready!"),
        };
        let long_ago = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        App {
            interpreter,
            source_code,
            error,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: ListScrollState::default(),
            memory_scroll: ListScrollState::default(),
            terminal_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: long_ago,
            last_space_press: long_ago,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if self.interpreter.step_forward().is_ok() {
                    self.terminal_scroll = usize::MAX;
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps moving
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn at_last_step(&self) -> bool {
        self.interpreter.history_position() + 1 >= self.interpreter.total_snapshots()
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Variables (top) | Memory (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(columns[1]);

        let snapshot = self.interpreter.current_snapshot();
        let error_location = self
            .error
            .as_ref()
            .and_then(|e| e.location().copied())
            .filter(|_| self.at_last_step());

        let current_line = error_location
            .or(snapshot.map(|s| s.location))
            .map_or(0, |l| l.line);
        render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source_code: &self.source_code,
                current_line,
                is_error: error_location.is_some(),
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let full_output = self.interpreter.terminal().as_str();
        let output = snapshot
            .and_then(|s| full_output.get(..s.output_len))
            .unwrap_or("");
        render_terminal_pane(
            frame,
            left_rows[1],
            output,
            self.focused_pane == FocusedPane::Output,
            &mut self.terminal_scroll,
        );

        render_variables_pane(
            frame,
            right_rows[0],
            VariablesRenderData {
                frames: snapshot.map(|s| s.frames.as_slice()).unwrap_or_default(),
                variables: snapshot.map(|s| s.variables.as_slice()).unwrap_or_default(),
                call_depth: snapshot.map_or(0, |s| s.call_depth),
            },
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        render_memory_pane(
            frame,
            right_rows[1],
            MemoryRenderData {
                buckets: snapshot.map(|s| s.buckets.as_slice()).unwrap_or_default(),
                high_water: snapshot.map_or(0, |s| s.high_water),
                capacity: snapshot.map_or(0, |s| s.capacity),
            },
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        let message = match (&self.error, error_location) {
            (Some(error), Some(_)) => error.to_string(),
            _ => self.status_message.clone(),
        };
        render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &message,
                current_step: self.interpreter.history_position(),
                total_steps: self.interpreter.total_snapshots(),
                has_error: self.error.is_some(),
                is_playing: self.is_playing,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up moves the current line down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll.offset = self.variables_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Memory => {
                    self.memory_scroll.offset = self.memory_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Output => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll.offset = self.variables_scroll.offset.saturating_add(1);
                }
                FocusedPane::Memory => {
                    self.memory_scroll.offset = self.memory_scroll.offset.saturating_add(1);
                }
                FocusedPane::Output => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play, debounced against key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    self.status_message = if self.is_playing {
                        "Playing...".to_string()
                    } else {
                        "Paused".to_string()
                    };
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.interpreter.seek_to_end();
                self.status_message = "Jumped to end".to_string();
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                match self.interpreter.rewind_to_start() {
                    Ok(()) => self.status_message = "Jumped to start".to_string(),
                    Err(e) => self.status_message = e.to_string(),
                }
                self.terminal_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    /// Step forward in execution
    fn step_forward(&mut self) {
        match self.interpreter.step_forward() {
            Ok(()) => {
                self.status_message = "Stepped forward".to_string();
                self.terminal_scroll = usize::MAX;
            }
            Err(e) => {
                self.status_message = format!("Cannot step forward: {}", e);
            }
        }
    }

    /// Step backward in execution
    fn step_backward(&mut self) {
        match self.interpreter.step_backward() {
            Ok(()) => {
                self.status_message = "Stepped backward".to_string();
                self.terminal_scroll = usize::MAX;
            }
            Err(e) => {
                self.status_message = format!("Cannot step backward: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterpreterConfig;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn recorded(source: &str) -> App {
        let config = InterpreterConfig {
            record_history: true,
            ..InterpreterConfig::default()
        };
        let mut interpreter = Interpreter::new(source, config).unwrap();
        let error = interpreter.run().err();
        interpreter.rewind_to_start().unwrap();
        App::new(interpreter, source.to_string(), error)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    const PROGRAM: &str = "program [\n  command start()\n  [\n    integer x = 1\n    outputNL x\n    x = x + 1\n  ]\n]";

    #[test]
    fn test_focus_cycles_through_all_panes() {
        let mut pane = FocusedPane::Source;
        for _ in 0..4 {
            pane = pane.next();
        }
        assert_eq!(pane, FocusedPane::Source);
    }

    #[test]
    fn test_keys_move_through_history() {
        let mut app = recorded(PROGRAM);
        assert_eq!(app.interpreter.history_position(), 0);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.interpreter.history_position(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.interpreter.history_position() + 1,
            app.interpreter.total_snapshots()
        );

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.interpreter.history_position(), 0);

        press(&mut app, KeyCode::Left);
        assert!(app.status_message.starts_with("Cannot step backward"));

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_renders_every_step() {
        let mut app = recorded(PROGRAM);
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        loop {
            terminal.draw(|f| app.render(f)).unwrap();
            if app.interpreter.step_forward().is_err() {
                break;
            }
        }
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Output"));
        assert!(text.contains("Memory"));
    }

    #[test]
    fn test_error_is_reported_at_last_step() {
        let source = "program [\n  command start()\n  [\n    integer x = 1 / 0\n  ]\n]";
        let mut app = recorded(source);
        assert!(app.error.is_some());
        press(&mut app, KeyCode::Enter);
        assert!(app.at_last_step());

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("division by zero"));
    }
}
