//! Main application logic for the task list screen.
//!
//! This module contains the `App` struct which owns the in-memory task list
//! (a mirror of what the store persists), routes key events to either the
//! list or the modal prompt, renders the interface, and applies every
//! confirmed mutation to both the visible rows and the injected store.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tracing::error;

use crate::prompt::{Prompt, PromptIntent};
use crate::storage::TaskStore;
use crate::task::Task;
use crate::tui::colors::MILK_BLUE;
use crate::tui::utils::centered_rect;

/// The single-screen task list.
///
/// The store is injected at construction and the screen is its only writer.
/// Every store call runs synchronously on the UI thread, so a mutation can
/// never interleave with an in-flight fetch.
pub struct App<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
    list_state: TableState,
    prompt: Option<Prompt>,
    /// Id of the task being edited while an edit prompt is open.
    editing: Option<u64>,
    status_message: String,
}

impl<S: TaskStore> App<S> {
    /// Create the screen over an injected store and load the persisted
    /// tasks.
    ///
    /// A fetch failure is logged and leaves the list empty; the screen
    /// still comes up.
    pub fn new(store: S) -> Self {
        let mut app = App {
            store,
            tasks: Vec::new(),
            list_state: TableState::default(),
            prompt: None,
            editing: None,
            status_message: String::new(),
        };
        app.fetch_tasks();
        app
    }

    /// The in-memory task list, in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn fetch_tasks(&mut self) {
        match self.store.fetch_all() {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => error!("failed to fetch tasks: {e}"),
        }
        self.list_state.select(if self.tasks.is_empty() {
            None
        } else {
            Some(0)
        });
    }

    fn selected_index(&self) -> Option<usize> {
        self.list_state.selected().filter(|&i| i < self.tasks.len())
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Flush staged store mutations. A failed commit is logged only; the
    /// rows already shown are not rolled back.
    fn commit_store(&mut self) {
        if let Err(e) = self.store.commit() {
            error!("failed to commit task changes: {e}");
        }
    }

    fn open_add_prompt(&mut self) {
        self.editing = None;
        self.prompt = Some(Prompt::new(PromptIntent::Add, None));
    }

    fn open_edit_prompt(&mut self) {
        if let Some(i) = self.selected_index() {
            let task = &self.tasks[i];
            self.editing = Some(task.id);
            self.prompt = Some(Prompt::new(PromptIntent::Edit, Some(&task.title)));
        }
    }

    /// Apply a saved prompt value to the list and the store.
    fn apply_prompt(&mut self, intent: PromptIntent, title: String) {
        match intent {
            PromptIntent::Add => {
                let task = self.store.create(&title);
                self.set_status_message(format!("Added '{}'", task.title));
                self.tasks.push(task);
                self.list_state.select(Some(self.tasks.len() - 1));
                self.commit_store();
            }
            PromptIntent::Edit => {
                let Some(id) = self.editing.take() else { return };
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.title = title.clone();
                    self.store.update(id, &title);
                    self.set_status_message("Task renamed".to_string());
                    self.commit_store();
                }
            }
        }
    }

    /// Remove the selected row, then tell the store. The list mutates
    /// first; a failed commit is logged and the row stays gone.
    fn delete_selected(&mut self) {
        if let Some(i) = self.selected_index() {
            let task = self.tasks.remove(i);
            self.list_state.select(if self.tasks.is_empty() {
                None
            } else {
                Some(i.min(self.tasks.len() - 1))
            });
            self.store.delete(task.id);
            self.set_status_message(format!("Deleted '{}'", task.title));
            self.commit_store();
        }
    }

    fn select_previous(&mut self) {
        if let Some(selected) = self.list_state.selected() {
            if selected > 0 {
                self.list_state.select(Some(selected - 1));
            }
        } else if !self.tasks.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn select_next(&mut self) {
        if let Some(selected) = self.list_state.selected() {
            if selected + 1 < self.tasks.len() {
                self.list_state.select(Some(selected + 1));
            }
        } else if !self.tasks.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn handle_prompt_input(&mut self, key: KeyCode) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key {
            // Cancel: dismiss with no side effect.
            KeyCode::Esc => {
                self.prompt = None;
                self.editing = None;
            }
            // Save: blank input closes the prompt and nothing else happens.
            KeyCode::Enter => {
                let intent = prompt.intent;
                let saved = prompt.save();
                self.prompt = None;
                match saved {
                    Some(title) => self.apply_prompt(intent, title),
                    None => self.editing = None,
                }
            }
            KeyCode::Char(c) => prompt.field.insert_char(c),
            KeyCode::Backspace => prompt.field.backspace(),
            KeyCode::Delete => prompt.field.delete(),
            KeyCode::Left => prompt.field.move_left(),
            KeyCode::Right => prompt.field.move_right(),
            KeyCode::Home => prompt.field.move_home(),
            KeyCode::End => prompt.field.move_end(),
            _ => {}
        }
    }

    /// Handle a single key event. Returns true if the application should
    /// quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();

        // The prompt is modal: it consumes every key until saved or
        // cancelled.
        if self.prompt.is_some() {
            self.handle_prompt_input(key);
            return false;
        }

        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Char('a') => self.open_add_prompt(),
            KeyCode::Enter => self.open_edit_prompt(),
            KeyCode::Char('d') => self.delete_selected(),
            _ => {}
        }
        false
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && self.handle_key(key.code, key.modifiers) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header_text = vec![Line::from(vec![
            Span::styled("TASK LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} task(s)", self.tasks.len()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];

        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_task_table(&mut self, f: &mut Frame, area: Rect) {
        let header_cells = ["ID", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(MILK_BLUE).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .tasks
            .iter()
            .map(|task| {
                Row::new(vec![
                    Cell::from(task.id.to_string()),
                    Cell::from(task.title.clone()),
                ])
            })
            .collect();

        let widths = [Constraint::Length(5), Constraint::Min(25)];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.list_state);
    }

    /// Render the modal prompt as a centered popup over the list.
    fn render_prompt(&self, f: &mut Frame, area: Rect) {
        let Some(prompt) = self.prompt.as_ref() else {
            return;
        };

        let popup = centered_rect(55, 25, area);
        f.render_widget(Clear, popup);

        let block = Block::default()
            .title(prompt.intent.title())
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White).bg(MILK_BLUE));
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // message
                Constraint::Length(3), // text field
                Constraint::Min(1),    // key hints
            ])
            .split(inner);

        let message = Paragraph::new(prompt.intent.message()).alignment(Alignment::Center);
        f.render_widget(message, chunks[0]);

        let field_block = Block::default().borders(Borders::ALL).title("Task");
        let field_inner = field_block.inner(chunks[1]);
        let field = Paragraph::new(prompt.field.value.as_str())
            .block(field_block)
            .style(Style::default().fg(Color::White));
        f.render_widget(field, chunks[1]);

        let cursor_x = prompt.field.cursor_chars().min(field_inner.width as usize);
        f.set_cursor_position((field_inner.x + cursor_x as u16, field_inner.y));

        let hints = Paragraph::new("Enter to save  Esc to cancel").alignment(Alignment::Center);
        f.render_widget(hints, chunks[2]);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.prompt.is_some() {
            "Enter to save  Esc to cancel".to_string()
        } else {
            "a: add  Enter: edit  d: delete  q: quit".to_string()
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(MILK_BLUE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Render the whole screen: header, task table, status bar, and the
    /// prompt popup when one is open.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_task_table(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        if self.prompt.is_some() {
            self.render_prompt(f, chunks[1]);
        }
    }

    /// Main event loop: render and process input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    /// In-memory store double with injectable fetch failure.
    #[derive(Default)]
    struct MemStore {
        tasks: Vec<Task>,
        fail_fetch: bool,
        commits: usize,
    }

    impl MemStore {
        fn with_titles(titles: &[&str]) -> Self {
            let tasks = titles
                .iter()
                .enumerate()
                .map(|(i, t)| Task {
                    id: i as u64 + 1,
                    title: t.to_string(),
                })
                .collect();
            MemStore {
                tasks,
                ..MemStore::default()
            }
        }
    }

    impl TaskStore for MemStore {
        fn fetch_all(&mut self) -> Result<Vec<Task>, StoreError> {
            if self.fail_fetch {
                return Err(StoreError::Io(io::Error::other("disk unplugged")));
            }
            Ok(self.tasks.clone())
        }

        fn create(&mut self, title: &str) -> Task {
            let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let task = Task {
                id,
                title: title.to_string(),
            };
            self.tasks.push(task.clone());
            task
        }

        fn update(&mut self, id: u64, new_title: &str) {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                task.title = new_title.to_string();
            }
        }

        fn delete(&mut self, id: u64) {
            self.tasks.retain(|t| t.id != id);
        }

        fn commit(&mut self) -> Result<(), StoreError> {
            self.commits += 1;
            Ok(())
        }
    }

    fn titles<S: TaskStore>(app: &App<S>) -> Vec<&str> {
        app.tasks().iter().map(|t| t.title.as_str()).collect()
    }

    fn type_text<S: TaskStore>(app: &mut App<S>, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    fn select_row<S: TaskStore>(app: &mut App<S>, index: usize) {
        app.list_state.select(Some(index));
    }

    #[test]
    fn load_mirrors_the_store_in_order() {
        let app = App::new(MemStore::with_titles(&["Buy milk", "Walk dog"]));
        assert_eq!(titles(&app), ["Buy milk", "Walk dog"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn fetch_failure_leaves_the_list_empty_and_usable() {
        let store = MemStore {
            fail_fetch: true,
            ..MemStore::default()
        };
        let mut app = App::new(store);
        assert!(app.tasks().is_empty());

        // The screen still accepts gestures after the failed load.
        app.store.fail_fetch = false;
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "Buy milk");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(titles(&app), ["Buy milk"]);
    }

    #[test]
    fn add_appends_exactly_one_task_at_the_tail() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk"]));
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "Walk dog");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(titles(&app), ["Buy milk", "Walk dog"]);
        assert_eq!(app.store.tasks.len(), 2);
        assert_eq!(app.list_state.selected(), Some(1));
        assert_eq!(app.store.commits, 1);
    }

    #[test]
    fn blank_save_is_a_no_op() {
        let mut app = App::new(MemStore::default());
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "   ");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert!(app.tasks().is_empty());
        assert!(app.store.tasks.is_empty());
        assert!(app.prompt.is_none());
        assert_eq!(app.store.commits, 0);
    }

    #[test]
    fn cancel_discards_typed_input() {
        let mut app = App::new(MemStore::default());
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "Buy milk");
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);

        assert!(app.tasks().is_empty());
        assert!(app.store.tasks.is_empty());
        assert!(app.prompt.is_none());
    }

    #[test]
    fn edit_prompt_is_prefilled_with_the_selected_title() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk", "Walk dog"]));
        select_row(&mut app, 1);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        let prompt = app.prompt.as_ref().expect("edit prompt open");
        assert_eq!(prompt.intent, PromptIntent::Edit);
        assert_eq!(prompt.field.value, "Walk dog");
    }

    #[test]
    fn edit_mutates_the_title_in_place() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk", "Walk dog"]));
        select_row(&mut app, 0);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.prompt.as_mut().unwrap().field = crate::tui::input::InputField::with_value("Buy bread");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(titles(&app), ["Buy bread", "Walk dog"]);
        assert_eq!(app.store.tasks[0].title, "Buy bread");
        assert_eq!(app.store.commits, 1);
    }

    #[test]
    fn delete_removes_the_row_and_shifts_later_tasks_down() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk", "Walk dog", "Call mom"]));
        select_row(&mut app, 1);
        app.handle_key(KeyCode::Char('d'), KeyModifiers::NONE);

        assert_eq!(titles(&app), ["Buy milk", "Call mom"]);
        assert_eq!(app.store.tasks.len(), 2);
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn deleting_the_last_row_clears_the_selection() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk"]));
        app.handle_key(KeyCode::Char('d'), KeyModifiers::NONE);

        assert!(app.tasks().is_empty());
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn open_prompt_consumes_list_keys() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk"]));
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);

        // 'd' and 'a' are typed into the field, not routed to the list.
        app.handle_key(KeyCode::Char('d'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(app.prompt.as_ref().unwrap().field.value, "da");
        assert_eq!(titles(&app), ["Buy milk"]);
    }

    #[test]
    fn edit_then_delete_then_add_scenario() {
        let mut app = App::new(MemStore::with_titles(&["Buy milk", "Walk dog"]));

        select_row(&mut app, 0);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.prompt.as_mut().unwrap().field = crate::tui::input::InputField::with_value("Buy bread");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(titles(&app), ["Buy bread", "Walk dog"]);

        select_row(&mut app, 1);
        app.handle_key(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(titles(&app), ["Buy bread"]);

        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        type_text(&mut app, "Call mom");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(titles(&app), ["Buy bread", "Call mom"]);
        assert_eq!(
            app.store
                .tasks
                .iter()
                .map(|t| t.title.as_str())
                .collect::<Vec<_>>(),
            ["Buy bread", "Call mom"]
        );
    }

    #[test]
    fn quit_keys_exit_the_list_but_not_the_prompt() {
        let mut app = App::new(MemStore::default());
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));

        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(!app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(app.prompt.as_ref().unwrap().field.value, "q");
    }
}
