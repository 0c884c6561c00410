use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use crate::analyzer::{Analyzer, Prompt, TableSample};
use crate::clipboard::Clipboard;
use crate::config::Preferences;
use crate::decode::TableDecoder;
use crate::document::DocumentId;
use crate::grid::GridState;
use crate::intake::{Intake, IntakeEvent};
use crate::mode::Mode;
use crate::style::Theme;
use crate::ui;
use crate::view::derive_view;
use crate::workspace::Workspace;

/// Geometry of the visible grid columns, captured during render so
/// mouse events can be mapped back onto columns
#[derive(Debug, Default, Clone)]
pub struct GridLayout {
    pub header_y: u16,
    pub columns: Vec<ColumnSpan>,
}

#[derive(Debug, Clone)]
pub struct ColumnSpan {
    pub name: String,
    pub x: u16,
    pub width: u16,
}

impl GridLayout {
    pub fn column_at(&self, x: u16) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| x >= c.x && x < c.x + c.width)
            .map(|c| c.name.as_str())
    }

    /// The resize handle: the spacing cell after a column plus the last
    /// cell of the column itself
    pub fn boundary_at(&self, x: u16) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| {
                let end = c.x + c.width;
                x == end || x + 1 == end
            })
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TabHit {
    pub id: DocumentId,
    pub y: u16,
    pub x_start: u16,
    pub x_end: u16,
}

#[derive(Debug, Clone)]
pub struct SidebarHit {
    pub table_id: String,
    pub y: u16,
    pub x_start: u16,
    pub x_end: u16,
}

pub struct App {
    pub workspace: Workspace,
    pub grid: GridState,
    /// Derived row indices for the active table
    pub view: Vec<usize>,
    pub mode: Mode,
    pub theme: Theme,
    pub message: Option<String>,
    pub should_quit: bool,
    pub panel_open: bool,
    pub ask_buffer: String,
    pub open_buffer: String,
    pub analyzer: Analyzer,
    // Hit-test data captured during render
    pub grid_layout: GridLayout,
    pub tab_hits: Vec<TabHit>,
    pub sidebar_hits: Vec<SidebarHit>,
    intake: Intake,
    clipboard: Clipboard,
    prefs: Preferences,
    active_key: Option<(DocumentId, String)>,
}

impl App {
    pub fn new(decoder: Arc<dyn TableDecoder>) -> Self {
        let prefs = Preferences::load();
        Self {
            workspace: Workspace::new(),
            grid: GridState::new(),
            view: Vec::new(),
            mode: Mode::Normal,
            theme: prefs.theme,
            message: None,
            should_quit: false,
            panel_open: false,
            ask_buffer: String::new(),
            open_buffer: String::new(),
            analyzer: Analyzer::new(),
            grid_layout: GridLayout::default(),
            tab_hits: Vec::new(),
            sidebar_hits: Vec::new(),
            intake: Intake::new(decoder),
            clipboard: Clipboard::new(),
            prefs,
            active_key: None,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            self.poll_background();

            terminal.draw(|f| ui::render(f, self))?;

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.message = None;
                        self.handle_key(key);
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    // a gesture must not survive losing the surface
                    Event::FocusLost => self.grid.end_resize(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Drain completed intakes and analysis results. Documents append
    /// in completion order, whatever order the workers finish in.
    fn poll_background(&mut self) {
        while let Some(event) = self.intake.poll() {
            match event {
                IntakeEvent::Loaded(document) => {
                    self.message = Some(format!("Loaded {}", document.file_name));
                    self.workspace.open(document);
                    self.sync();
                }
                IntakeEvent::Failed { file_name, error } => {
                    self.message = Some(format!("Failed to open {file_name}: {error}"));
                }
            }
        }
        self.analyzer.poll();
    }

    pub fn pending_intakes(&self) -> usize {
        self.intake.pending()
    }

    /// Gate and start loading a file. A rejected path produces exactly
    /// one alert message and no other state change.
    pub fn open_path(&mut self, path: PathBuf) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match self.intake.begin(path) {
            Ok(()) => self.message = Some(format!("Loading {name} ...")),
            Err(e) => {
                warn!(file = %name, %e, "intake rejected");
                self.message = Some(format!("{name}: {e}"));
            }
        }
    }

    /// Re-derive the visible rows from the active table and the current
    /// filter/sort, then keep the cursor in bounds
    fn refresh_view(&mut self) {
        let (view, col_count) = match self
            .workspace
            .active_document()
            .and_then(|d| d.active_table())
        {
            Some(table) => (
                derive_view(table, &self.grid.filter, &self.grid.sort),
                table.columns.len(),
            ),
            None => (Vec::new(), 0),
        };
        self.view = view;
        self.grid.clamp(self.view.len(), col_count);
    }

    /// Detect an active-table change and reset the per-table grid state
    /// (widths, sort, gesture) when it happens
    fn sync(&mut self) {
        let key = self
            .workspace
            .active_document()
            .and_then(|d| d.active_table().map(|t| (d.id, t.id.clone())));
        if key != self.active_key {
            self.active_key = key;
            if let Some(table) = self
                .workspace
                .active_document()
                .and_then(|d| d.active_table())
            {
                self.grid.activate_table(table);
            } else {
                self.grid.end_resize();
            }
            self.analyzer.reset();
        }
        self.refresh_view();
    }

    fn active_column(&self) -> Option<String> {
        self.workspace
            .active_document()
            .and_then(|d| d.active_table())
            .and_then(|t| t.columns.get(self.grid.cursor_col).cloned())
    }

    fn select_table_offset(&mut self, step: isize) {
        let Some(doc) = self.workspace.active_document() else {
            return;
        };
        if doc.tables.is_empty() {
            return;
        }
        let current = doc
            .active_table()
            .and_then(|t| doc.tables.iter().position(|x| x.id == t.id))
            .unwrap_or(0);
        let len = doc.tables.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        let table_id = doc.tables[next].id.clone();
        self.workspace.select_table(&table_id);
        self.sync();
    }

    // === Key handling ===

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Filter => self.handle_filter_key(key),
            Mode::Ask => self.handle_ask_key(key),
            Mode::Open => self.handle_open_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            // document tabs
            KeyCode::Tab | KeyCode::Char(']') => {
                self.workspace.activate_next();
                self.sync();
            }
            KeyCode::BackTab | KeyCode::Char('[') => {
                self.workspace.activate_prev();
                self.sync();
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.workspace.active_id() {
                    self.workspace.close(id);
                    self.sync();
                }
            }
            KeyCode::Char('o') => {
                self.open_buffer.clear();
                self.mode = Mode::Open;
            }

            // table list
            KeyCode::Char('J') => self.select_table_offset(1),
            KeyCode::Char('K') => self.select_table_offset(-1),

            // grid cursor
            KeyCode::Char('j') | KeyCode::Down => self.grid.move_down(1, self.view.len()),
            KeyCode::Char('k') | KeyCode::Up => self.grid.move_up(1),
            KeyCode::Char('h') | KeyCode::Left => self.grid.move_left(),
            KeyCode::Char('l') | KeyCode::Right => {
                let cols = self.active_column_count();
                self.grid.move_right(cols);
            }
            KeyCode::PageDown => self.grid.page_down(self.view.len()),
            KeyCode::PageUp => self.grid.page_up(),
            KeyCode::Char('g') | KeyCode::Home => self.grid.move_to_top(),
            KeyCode::Char('G') | KeyCode::End => {
                let len = self.view.len();
                self.grid.move_to_bottom(len);
            }

            // filter and sort
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Char('s') => {
                if let Some(column) = self.active_column() {
                    self.grid.sort.cycle(&column);
                    self.refresh_view();
                }
            }

            // analysis panel
            KeyCode::Char('a') => self.panel_open = !self.panel_open,
            KeyCode::Char('i') => self.request_analysis(Prompt::QuickInsights),
            KeyCode::Char('?') => {
                self.ask_buffer.clear();
                self.panel_open = true;
                self.mode = Mode::Ask;
            }
            KeyCode::Esc => {
                if self.grid.is_resizing() {
                    self.grid.end_resize();
                } else {
                    self.panel_open = false;
                }
            }

            // theme
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
                self.prefs.theme = self.theme;
                if let Err(e) = self.prefs.save() {
                    warn!(%e, "could not save preferences");
                    self.message = Some(format!("Could not save preferences: {e}"));
                } else {
                    self.message = Some(format!("Theme: {}", self.theme.name()));
                }
            }

            // clipboard
            KeyCode::Char('y') => self.copy_cell(),
            KeyCode::Char('Y') => self.copy_row(),

            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.grid.filter.clear();
                self.mode = Mode::Normal;
                self.refresh_view();
            }
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                self.grid.filter.pop();
                self.refresh_view();
            }
            KeyCode::Char(c) => {
                self.grid.filter.push(c);
                self.refresh_view();
            }
            _ => {}
        }
    }

    fn handle_ask_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ask_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                if !self.ask_buffer.trim().is_empty() {
                    let question = self.ask_buffer.trim().to_string();
                    self.request_analysis(Prompt::Question(question));
                }
                self.ask_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.ask_buffer.pop();
            }
            KeyCode::Char(c) => self.ask_buffer.push(c),
            _ => {}
        }
    }

    fn handle_open_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.open_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let path = self.open_buffer.trim().to_string();
                self.open_buffer.clear();
                self.mode = Mode::Normal;
                if !path.is_empty() {
                    self.open_path(PathBuf::from(path));
                }
            }
            KeyCode::Backspace => {
                self.open_buffer.pop();
            }
            KeyCode::Char(c) => self.open_buffer.push(c),
            _ => {}
        }
    }

    // === Mouse handling ===

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.grid.drag_resize(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => self.grid.end_resize(),
            MouseEventKind::ScrollDown => self.grid.move_down(3, self.view.len()),
            MouseEventKind::ScrollUp => self.grid.move_up(3),
            _ => {}
        }
    }

    fn mouse_down(&mut self, x: u16, y: u16) {
        if let Some(hit) = self
            .tab_hits
            .iter()
            .find(|t| t.y == y && x >= t.x_start && x < t.x_end)
        {
            let id = hit.id;
            self.workspace.set_active(id);
            self.sync();
            return;
        }

        if let Some(hit) = self
            .sidebar_hits
            .iter()
            .find(|s| s.y == y && x >= s.x_start && x < s.x_end)
        {
            let table_id = hit.table_id.clone();
            self.workspace.select_table(&table_id);
            self.sync();
            return;
        }

        if y == self.grid_layout.header_y {
            // a boundary hit starts a resize, anywhere else on the
            // header cycles the sort for that column
            if let Some(column) = self.grid_layout.boundary_at(x).map(str::to_string) {
                self.grid.begin_resize(&column, x);
            } else if let Some(column) = self.grid_layout.column_at(x).map(str::to_string) {
                self.grid.sort.cycle(&column);
                self.refresh_view();
            }
        }
    }

    // === Helpers ===

    fn active_column_count(&self) -> usize {
        self.workspace
            .active_document()
            .and_then(|d| d.active_table())
            .map(|t| t.columns.len())
            .unwrap_or(0)
    }

    fn request_analysis(&mut self, prompt: Prompt) {
        let Some(table) = self
            .workspace
            .active_document()
            .and_then(|d| d.active_table())
        else {
            self.message = Some("No table to analyze".to_string());
            return;
        };
        if self.analyzer.is_running() {
            self.message = Some("Analysis already in progress".to_string());
            return;
        }
        let sample = TableSample::from_table(table);
        self.panel_open = true;
        self.analyzer.request(sample, prompt);
    }

    fn copy_cell(&mut self) {
        let Some(column) = self.active_column() else {
            return;
        };
        let Some(&row) = self.view.get(self.grid.cursor_row) else {
            return;
        };
        let result = match self
            .workspace
            .active_document()
            .and_then(|d| d.active_table())
        {
            Some(table) => self.clipboard.copy_cell(table, row, &column),
            None => return,
        };
        self.message = Some(result.unwrap_or_else(|e| e));
    }

    fn copy_row(&mut self) {
        let Some(&row) = self.view.get(self.grid.cursor_row) else {
            return;
        };
        let result = match self
            .workspace
            .active_document()
            .and_then(|d| d.active_table())
        {
            Some(table) => self.clipboard.copy_row(table, row),
            None => return,
        };
        self.message = Some(result.unwrap_or_else(|e| e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PlaceholderDecoder;
    use std::io::Write;
    use std::thread;
    use tempfile::NamedTempFile;

    fn make_app() -> App {
        App::new(Arc::new(PlaceholderDecoder))
    }

    fn drain_intake(app: &mut App) {
        for _ in 0..200 {
            app.poll_background();
            if app.pending_intakes() == 0 {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("intake never completed");
    }

    fn open_demo_file(app: &mut App) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".mdb").unwrap();
        write!(file, "demo").unwrap();
        app.open_path(file.path().to_path_buf());
        drain_intake(app);
        file
    }

    #[test]
    fn rejected_path_alerts_once_and_creates_no_document() {
        let mut app = make_app();
        app.open_path(PathBuf::from("report.pdf"));

        let alert = app.message.clone().expect("an alert message");
        assert!(alert.contains("report.pdf"));
        assert!(alert.contains("unsupported file format"));
        assert_eq!(app.pending_intakes(), 0);

        // nothing arrives later either
        app.poll_background();
        assert!(app.workspace.is_empty());
    }

    #[test]
    fn loaded_document_becomes_active_with_a_derived_view() {
        let mut app = make_app();
        let _file = open_demo_file(&mut app);

        assert_eq!(app.workspace.len(), 1);
        let table = app
            .workspace
            .active_document()
            .and_then(|d| d.active_table())
            .expect("active table");
        assert_eq!(table.name, "Inventory");
        assert_eq!(app.view.len(), table.row_count());
    }

    #[test]
    fn sort_key_cycles_the_cursor_column() {
        let mut app = make_app();
        let _file = open_demo_file(&mut app);

        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        assert!(app.grid.sort.is_active());
        let sorted_on = app.grid.sort.column.clone().unwrap();

        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        assert!(!app.grid.sort.is_active());
        assert_eq!(
            sorted_on,
            app.workspace
                .active_document()
                .unwrap()
                .active_table()
                .unwrap()
                .columns[0]
        );
    }

    #[test]
    fn switching_tables_resets_sort_but_keeps_filter() {
        let mut app = make_app();
        let _file = open_demo_file(&mut app);

        app.handle_key(KeyEvent::from(KeyCode::Char('s')));
        app.grid.filter = "a".to_string();
        app.refresh_view();

        app.select_table_offset(1);
        assert!(!app.grid.sort.is_active());
        assert_eq!(app.grid.filter, "a");
        assert_eq!(
            app.workspace
                .active_document()
                .unwrap()
                .active_table()
                .unwrap()
                .name,
            "Employees"
        );
    }

    #[test]
    fn filter_mode_edits_the_filter_and_escape_clears_it() {
        let mut app = make_app();
        let _file = open_demo_file(&mut app);
        let total = app.view.len();

        app.handle_key(KeyEvent::from(KeyCode::Char('/')));
        assert_eq!(app.mode, Mode::Filter);
        app.handle_key(KeyEvent::from(KeyCode::Char('z')));
        app.handle_key(KeyEvent::from(KeyCode::Char('z')));
        assert_eq!(app.grid.filter, "zz");
        assert!(app.view.len() < total);

        app.handle_key(KeyEvent::from(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.grid.filter.is_empty());
        assert_eq!(app.view.len(), total);
    }

    #[test]
    fn closing_the_last_document_empties_the_view() {
        let mut app = make_app();
        let _file = open_demo_file(&mut app);

        app.handle_key(KeyEvent::from(KeyCode::Char('x')));
        assert!(app.workspace.is_empty());
        assert!(app.view.is_empty());
    }

    #[test]
    fn header_click_cycles_sort_and_boundary_click_resizes() {
        let mut app = make_app();
        let _file = open_demo_file(&mut app);
        app.grid_layout = GridLayout {
            header_y: 2,
            columns: vec![
                ColumnSpan {
                    name: "SKU".to_string(),
                    x: 1,
                    width: 10,
                },
                ColumnSpan {
                    name: "ProductName".to_string(),
                    x: 12,
                    width: 10,
                },
            ],
        };

        // middle of the first header cell: sort
        app.mouse_down(4, 2);
        assert_eq!(app.grid.sort.column.as_deref(), Some("SKU"));

        // the spacing cell after the first column: resize capture
        app.mouse_down(11, 2);
        assert!(app.grid.is_resizing());
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 17,
            row: 2,
            modifiers: crossterm::event::KeyModifiers::NONE,
        });
        assert_eq!(app.grid.widths.get("SKU"), crate::grid::DEFAULT_COLUMN_WIDTH + 6);
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 17,
            row: 2,
            modifiers: crossterm::event::KeyModifiers::NONE,
        });
        assert!(!app.grid.is_resizing());
    }
}
