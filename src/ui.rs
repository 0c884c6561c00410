use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as RatatuiTable, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::analyzer::AnalysisState;
use crate::app::{App, ColumnSpan, GridLayout, SidebarHit, TabHit};
use crate::mode::Mode;
use crate::view::SortDirection;

const SIDEBAR_WIDTH: u16 = 24;
const PANEL_WIDTH: u16 = 42;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    frame.render_widget(Block::default().style(app.theme.base()), frame.size());

    render_tabs(frame, app, chunks[0]);

    if app.workspace.is_empty() {
        app.sidebar_hits.clear();
        app.grid_layout = GridLayout::default();
        render_welcome(frame, app, chunks[1]);
    } else {
        let mut constraints = vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)];
        if app.panel_open {
            constraints.push(Constraint::Length(PANEL_WIDTH));
        }
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(chunks[1]);

        render_sidebar(frame, app, main[0]);
        render_grid(frame, app, main[1]);
        if app.panel_open {
            render_panel(frame, app, main[2]);
        }
    }

    render_status_bar(frame, app, chunks[2]);
    render_input_line(frame, app, chunks[3]);
}

fn render_tabs(frame: &mut Frame, app: &mut App, area: Rect) {
    app.tab_hits.clear();

    let mut spans: Vec<Span> = Vec::new();
    let mut x = area.x;
    let active = app.workspace.active_id();

    for document in app.workspace.documents() {
        let label = format!(" {} ", document.file_name);
        let width = label.width() as u16;
        let style = if Some(document.id) == active {
            app.theme.tab_active()
        } else {
            app.theme.tab_inactive()
        };
        app.tab_hits.push(TabHit {
            id: document.id,
            y: area.y,
            x_start: x,
            x_end: x + width,
        });
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("│"));
        x += width + 1;
    }

    if spans.is_empty() {
        spans.push(Span::styled(" mdview ", app.theme.tab_inactive()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Access Database Viewer", app.theme.grid_header())),
        Line::from(""),
        Line::from("Open Access database files without leaving the terminal."),
        Line::from("No data leaves your machine."),
        Line::from(""),
        Line::from(Span::styled(
            "o  open a file (.mdb / .accdb)",
            app.theme.dim(),
        )),
        Line::from(Span::styled("q  quit", app.theme.dim())),
    ];
    let welcome = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(welcome, area);
}

fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    app.sidebar_hits.clear();

    let Some(document) = app.workspace.active_document() else {
        return;
    };

    let title = format!("Tables ({})", document.tables.len());
    let active_id = document.active_table().map(|t| t.id.clone());

    let mut lines = Vec::new();
    let mut hits = Vec::new();
    for (i, table) in document.tables.iter().enumerate() {
        let selected = Some(&table.id) == active_id.as_ref();
        let marker = if selected { "▸ " } else { "  " };
        let style = if selected {
            app.theme.sidebar_selected()
        } else {
            app.theme.tab_inactive()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", table.name),
            style,
        )));
        hits.push(SidebarHit {
            table_id: table.id.clone(),
            y: area.y + 1 + i as u16,
            x_start: area.x + 1,
            x_end: area.x + area.width.saturating_sub(1),
        });
    }
    app.sidebar_hits = hits;

    let sidebar =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(sidebar, area);
}

fn render_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(table) = app
        .workspace
        .active_document()
        .and_then(|d| d.active_table())
    else {
        app.grid_layout = GridLayout::default();
        return;
    };

    let inner_height = area.height.saturating_sub(3); // borders + header
    app.grid.viewport_height = inner_height as usize;
    app.grid.scroll_to_cursor();

    // visible columns from the horizontal offset, last one may be partial
    let inner_width = area.width.saturating_sub(2);
    let mut spans: Vec<ColumnSpan> = Vec::new();
    let mut used: u16 = 0;
    for name in table.columns.iter().skip(app.grid.viewport_col) {
        if used >= inner_width {
            break;
        }
        let width = app.grid.widths.get(name).min(inner_width - used);
        spans.push(ColumnSpan {
            name: name.clone(),
            x: area.x + 1 + used,
            width,
        });
        used += width + 1;
    }
    app.grid.visible_cols = spans.len().max(1);

    let header_cells: Vec<Cell> = spans
        .iter()
        .map(|span| {
            let sorted = app.grid.sort.column.as_deref() == Some(span.name.as_str());
            let indicator = match (sorted, app.grid.sort.direction) {
                (true, Some(SortDirection::Ascending)) => " ▲",
                (true, Some(SortDirection::Descending)) => " ▼",
                _ => "",
            };
            let style = if sorted {
                app.theme.sorted_header()
            } else {
                app.theme.grid_header()
            };
            Cell::from(format!("{}{indicator}", span.name)).style(style)
        })
        .collect();
    let header = Row::new(header_cells);

    let begin = app.grid.viewport_row.min(app.view.len());
    let end = (begin + inner_height as usize).min(app.view.len());

    let rows: Vec<Row> = if app.view.is_empty() {
        let notice = if app.grid.filter.is_empty() {
            "No records."
        } else {
            "No matching records found."
        };
        vec![Row::new(vec![Cell::from(notice).style(app.theme.dim())])]
    } else {
        app.view[begin..end]
            .iter()
            .enumerate()
            .map(|(offset, &row_idx)| {
                let selected = begin + offset == app.grid.cursor_row;
                let cells: Vec<Cell> = spans
                    .iter()
                    .map(|span| {
                        let text = table
                            .cell(row_idx, &span.name)
                            .map(|v| v.display())
                            .unwrap_or_default();
                        Cell::from(text)
                    })
                    .collect();
                let row = Row::new(cells);
                if selected {
                    row.style(app.theme.selected_row())
                } else {
                    row
                }
            })
            .collect()
    };

    let widths: Vec<Constraint> = spans
        .iter()
        .map(|s| Constraint::Length(s.width))
        .collect();

    let title = format!(
        "{} ({} records)",
        table.name,
        table.row_count()
    );
    let grid = RatatuiTable::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(grid, area);

    app.grid_layout = GridLayout {
        header_y: area.y + 1,
        columns: spans,
    };
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.analyzer.state() {
        AnalysisState::Idle => vec![
            Line::from(""),
            Line::from(Span::styled("Ready for analysis", app.theme.accent())),
            Line::from(""),
            Line::from(Span::styled("i  quick insights", app.theme.dim())),
            Line::from(Span::styled("?  ask a question", app.theme.dim())),
        ],
        AnalysisState::Running => vec![
            Line::from(""),
            Line::from(Span::styled("Analyzing ...", app.theme.accent())),
        ],
        AnalysisState::Done(text) => text.lines().map(|l| Line::from(l.to_string())).collect(),
        AnalysisState::Failed(message) => vec![
            Line::from(""),
            Line::from(Span::styled(message.clone(), app.theme.error())),
        ],
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("AI Analysis"));
    frame.render_widget(panel, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.mode.display_name()),
        app.theme.status_bar(),
    )];

    let engine = if app.workspace.is_empty() {
        "System Ready"
    } else {
        "Engine Online"
    };
    spans.push(Span::raw(format!(" {engine}")));

    if let Some(document) = app.workspace.active_document() {
        spans.push(Span::raw(format!(
            " │ {} tables │ {:.2} MB",
            document.tables.len(),
            document.file_size as f64 / 1024.0 / 1024.0
        )));
        if let Some(table) = document.active_table() {
            spans.push(Span::raw(format!(
                " │ {}: row {}/{}",
                table.name,
                if app.view.is_empty() {
                    0
                } else {
                    app.grid.cursor_row + 1
                },
                app.view.len()
            )));
        }
    }

    if app.pending_intakes() > 0 {
        spans.push(Span::styled(
            format!(" │ loading {} file(s)", app.pending_intakes()),
            app.theme.accent(),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(app.theme.status_bar()),
        area,
    );
}

fn render_input_line(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.mode {
        Mode::Filter => Line::from(format!("/{}", app.grid.filter)),
        Mode::Ask => Line::from(format!("?{}", app.ask_buffer)),
        Mode::Open => Line::from(format!("open: {}", app.open_buffer)),
        Mode::Normal => match &app.message {
            Some(message) => Line::from(Span::styled(message.clone(), app.theme.accent())),
            None => Line::from(""),
        },
    };
    frame.render_widget(Paragraph::new(content), area);
}
