//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Synchronous prediction on submit

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::artifacts::RandomForest;
use crate::application::PredictionService;
use crate::domain::{Locale, Prediction};

use super::ui::{
    form::{render_form, FormState},
    render_disclaimer,
    result::render_result,
};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Form,
    Result(Prediction),
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    locale: Locale,
    service: PredictionService<RandomForest>,
    form_state: FormState,
}

impl App {
    #[must_use]
    pub fn new(service: PredictionService<RandomForest>, locale: Locale) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            locale,
            service,
            form_state: FormState::new(locale),
        }
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(f.area());

                match &self.screen {
                    Screen::Form => render_form(f, chunks[0], &self.form_state),
                    Screen::Result(prediction) => {
                        render_result(f, chunks[0], prediction, self.locale);
                    }
                }
                render_disclaimer(f, chunks[1], self.locale);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if matches!(key, KeyCode::Char('l' | 'L')) {
            self.toggle_locale();
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result(_) => self.handle_result_key(key),
        }
    }

    fn toggle_locale(&mut self) {
        self.locale = match self.locale {
            Locale::Indonesian => Locale::English,
            Locale::English => Locale::Indonesian,
        };
        self.form_state.locale = self.locale;
        tracing::debug!("Locale switched to {}", self.locale);
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        let form = &mut self.form_state;
        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right | KeyCode::Char(' ') => form.cycle(true),
            KeyCode::Char('s' | 'S') => form.load_sample_data(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n' | 'N') => {
                self.screen = Screen::Form;
            }
            KeyCode::Char('q' | 'Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let record = match self.form_state.to_input_record() {
            Ok(record) => record,
            Err(message) => {
                self.form_state.error_message = Some(message);
                return;
            }
        };

        match self.service.predict(&record) {
            Ok(prediction) => {
                tracing::info!("Prediction complete: {}", prediction.level);
                // Measurements do not outlive the submission.
                self.form_state.clear_sensitive();
                self.screen = Screen::Result(prediction);
            }
            Err(e) => {
                tracing::warn!("Prediction rejected: {}", e);
                self.form_state.error_message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::tests::{encoders_json, model_json, scaler_json, write_artifacts};
    use crate::adapters::artifacts::{ArtifactBundle, IntegrityPolicy};
    use crate::domain::InputRecord;
    use tempfile::tempdir;

    fn app() -> App {
        let dir = tempdir().expect("tempdir");
        write_artifacts(dir.path(), &model_json(), &scaler_json(), &encoders_json());
        let bundle = ArtifactBundle::load(dir.path(), &IntegrityPolicy::default()).expect("load");
        App::new(PredictionService::from_bundle(bundle), Locale::Indonesian)
    }

    #[test]
    fn test_submit_sample_shows_result() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        match app.screen() {
            Screen::Result(prediction) => {
                assert_eq!(prediction.bmi.display_value(), "24.2");
            }
            Screen::Form => panic!("expected result, got error {:?}", app.form_state.error_message),
        }

        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.screen(), &Screen::Form);
    }

    #[test]
    fn test_successful_submit_wipes_form() {
        let mut app = app();
        app.handle_key(KeyCode::Down, KeyModifiers::NONE); // Age
        app.handle_key(KeyCode::Delete, KeyModifiers::NONE);
        for c in "41".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(app.screen(), Screen::Result(_)));
        assert_eq!(app.form_state.to_input_record(), Ok(InputRecord::default()));

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen(), &Screen::Form);
        assert_eq!(app.form_state.selected_field, 0);
    }

    #[test]
    fn test_invalid_form_stays_on_form() {
        let mut app = app();
        app.handle_key(KeyCode::Down, KeyModifiers::NONE); // Age
        app.handle_key(KeyCode::Delete, KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.screen(), &Screen::Form);
        assert!(app.form_state.error_message.is_some());
    }

    #[test]
    fn test_locale_toggle_and_quit() {
        let mut app = app();
        app.handle_key(KeyCode::Char('L'), KeyModifiers::NONE);
        assert_eq!(app.locale, Locale::English);
        assert_eq!(app.form_state.locale, Locale::English);

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
