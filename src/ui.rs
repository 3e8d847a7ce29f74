// Terminal front end: form fields, status line, question list.
// All view state lives in the Session; this module only maps keys and draws.

use std::{path::PathBuf, sync::Arc, thread};

use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tui_textarea::TextArea;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use qbank::{
    config::{Settings, SortMode, ThemeKind, Variant},
    render::{DisplayRow, ImageCell, RenderTarget, NO_IMAGE_GLYPH},
    session::{LoadJob, LoadOutcome, Session},
    view::{Controls, SearchControls, LIMIT_CHOICES},
    Fetcher,
};

// ---------------- list panel ----------------
/// The list widget's backing rows. Replaced wholesale on every redraw.
#[derive(Debug, Default)]
pub struct ListPanel {
    pub rows: Vec<DisplayRow>,
    pub state: ListState,
}

impl RenderTarget for ListPanel {
    fn replace_rows(&mut self, rows: Vec<DisplayRow>) {
        let has_questions = rows
            .iter()
            .any(|r| matches!(r, DisplayRow::Question { .. }));
        self.rows = rows;
        if has_questions {
            let sel = self.state.selected().unwrap_or(0).min(self.rows.len() - 1);
            self.state.select(Some(sel));
        } else {
            self.state.select(None);
        }
    }
}

impl ListPanel {
    fn move_selection(&mut self, delta: isize) {
        let Some(sel) = self.state.selected() else {
            return;
        };
        let last = self.rows.len().saturating_sub(1) as isize;
        let next = (sel as isize + delta).clamp(0, last);
        self.state.select(Some(next as usize));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Repo,
    File,
    Token,
    Filter,
    List,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Repo => Self::File,
            Self::File => Self::Token,
            Self::Token => Self::Filter,
            Self::Filter => Self::List,
            Self::List => Self::Repo,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Repo => Self::List,
            Self::File => Self::Repo,
            Self::Token => Self::File,
            Self::Filter => Self::Token,
            Self::List => Self::Filter,
        }
    }
}

pub struct App {
    pub session: Session<ListPanel>,
    repo: TextArea<'static>,
    file: TextArea<'static>,
    token: TextArea<'static>,
    /// Search text for cards, start index for gallery.
    filter: TextArea<'static>,
    sort: SortMode,
    limit: usize,
    focus: Focus,
    theme: Theme,
    sample_path: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    tx: Sender<LoadOutcome>,
}

impl App {
    pub fn new(settings: &Settings, fetcher: Arc<dyn Fetcher>, tx: Sender<LoadOutcome>) -> Self {
        let controls = match settings.variant {
            Variant::Cards => Controls::Search(SearchControls {
                query: String::new(),
                sort: settings.sort,
                limit: settings.limit,
            }),
            Variant::Gallery => Controls::Threshold(0),
        };
        let session = Session::new(
            settings.variant,
            controls,
            settings.host.clone(),
            ListPanel::default(),
        );
        let mut token = single_line(settings.token.as_deref().unwrap_or(""));
        token.set_mask_char('•');
        let filter_placeholder = match settings.variant {
            Variant::Cards => "type to filter",
            Variant::Gallery => "0",
        };
        let mut filter = single_line("");
        filter.set_placeholder_text(filter_placeholder);
        let mut app = Self {
            session,
            repo: single_line(&settings.repo_id),
            file: single_line(&settings.file_path),
            token,
            filter,
            sort: settings.sort,
            limit: settings.limit,
            focus: Focus::Repo,
            theme: theme_of(settings.theme),
            sample_path: settings.sample_path.clone(),
            fetcher,
            tx,
        };
        app.repo.set_placeholder_text("org/dataset");
        app.file.set_placeholder_text("path/to/file.jsonl");
        app.token.set_placeholder_text("optional");
        app
    }

    pub fn load_sample(&mut self) {
        let job = self.session.begin_sample(self.sample_path.clone());
        self.dispatch(job);
    }

    fn load_remote(&mut self) {
        let token = field_text(&self.token);
        let token = (!token.trim().is_empty()).then_some(token);
        let job = self.session.begin_remote(
            &field_text(&self.repo),
            &field_text(&self.file),
            token.as_deref(),
        );
        if let Some(job) = job {
            self.dispatch(job);
        }
    }

    fn dispatch(&self, job: LoadJob) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = job.run(fetcher.as_ref());
            let _ = tx.send(outcome);
        });
    }

    fn controls(&self) -> Controls {
        match self.session.variant() {
            Variant::Cards => Controls::Search(SearchControls {
                query: field_text(&self.filter),
                sort: self.sort,
                limit: self.limit,
            }),
            Variant::Gallery => Controls::Threshold(parse_threshold(&field_text(&self.filter))),
        }
    }

    fn refresh(&mut self) {
        let controls = self.controls();
        self.session.update_controls(controls);
    }

    fn cycle_sort(&mut self) {
        if self.session.variant() == Variant::Cards {
            self.sort = self.sort.next();
            self.refresh();
        }
    }

    fn cycle_limit(&mut self) {
        if self.session.variant() == Variant::Cards {
            let pos = LIMIT_CHOICES.iter().position(|&l| l == self.limit);
            self.limit = match pos {
                Some(i) => LIMIT_CHOICES[(i + 1) % LIMIT_CHOICES.len()],
                None => LIMIT_CHOICES[0],
            };
            self.refresh();
        }
    }

    fn focused_field(&mut self) -> Option<&mut TextArea<'static>> {
        match self.focus {
            Focus::Repo => Some(&mut self.repo),
            Focus::File => Some(&mut self.file),
            Focus::Token => Some(&mut self.token),
            Focus::Filter => Some(&mut self.filter),
            Focus::List => None,
        }
    }
}

fn single_line(text: &str) -> TextArea<'static> {
    let mut ta = TextArea::from(vec![text.to_string()]);
    ta.set_cursor_line_style(Style::default());
    ta
}

fn field_text(ta: &TextArea<'_>) -> String {
    ta.lines().first().cloned().unwrap_or_default()
}

/// Non-numeric input counts as 0, i.e. show everything.
fn parse_threshold(s: &str) -> usize {
    s.trim().parse().unwrap_or(0)
}

// ---------------- keys ----------------
/// Returns `true` when the app should exit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::F(5) => app.load_remote(),
        KeyCode::Char('r') if ctrl => app.load_remote(),
        KeyCode::F(6) => app.load_sample(),
        KeyCode::Char('l') if ctrl => app.load_sample(),
        KeyCode::F(2) => app.cycle_sort(),
        KeyCode::F(3) => app.cycle_limit(),
        _ if app.focus == Focus::List => return handle_list_key(app, code),
        KeyCode::Esc => app.focus = Focus::List,
        KeyCode::Enter => match app.focus {
            Focus::Repo | Focus::File | Focus::Token => app.load_remote(),
            _ => app.focus = Focus::List,
        },
        _ => {
            let is_filter = app.focus == Focus::Filter;
            let changed = app
                .focused_field()
                .map(|ta| ta.input(key))
                .unwrap_or(false);
            if changed && is_filter {
                app.refresh();
            }
        }
    }
    false
}

fn handle_list_key(app: &mut App, code: KeyCode) -> bool {
    let step = match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Down | KeyCode::Char('j') => 1,
        KeyCode::Up | KeyCode::Char('k') => -1,
        KeyCode::PageDown => 10,
        KeyCode::PageUp => -10,
        KeyCode::Home | KeyCode::Char('g') => isize::MIN / 2,
        KeyCode::End | KeyCode::Char('G') => isize::MAX / 2,
        KeyCode::Char('s') => {
            app.cycle_sort();
            0
        }
        KeyCode::Char('l') => {
            app.cycle_limit();
            0
        }
        KeyCode::Char('/') => {
            app.focus = Focus::Filter;
            0
        }
        _ => 0,
    };
    if step != 0 {
        app.session.target_mut().move_selection(step);
    }
    false
}

// ---------------- drawing ----------------
pub fn draw(f: &mut Frame, app: &mut App) {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());
    let form = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ])
        .split(v[1]);

    draw_header(f, v[0], app);
    let filter_title = match app.session.variant() {
        Variant::Cards => " Search ",
        Variant::Gallery => " Start after index ",
    };
    let th = app.theme;
    let focus = app.focus;
    draw_field(f, form[0], &mut app.repo, " Repo id ", focus == Focus::Repo, th);
    draw_field(f, form[1], &mut app.file, " File path ", focus == Focus::File, th);
    draw_field(f, form[2], &mut app.token, " Token ", focus == Focus::Token, th);
    draw_field(f, v[2], &mut app.filter, filter_title, focus == Focus::Filter, th);
    draw_status(f, v[3], app);
    draw_list(f, v[4], app);
    draw_footer(f, v[5], app);
}

fn draw_field(
    f: &mut Frame,
    area: Rect,
    ta: &mut TextArea<'static>,
    title: &'static str,
    focused: bool,
    th: Theme,
) {
    let border = if focused { th.accent } else { th.muted };
    ta.set_block(
        Block::default()
            .title(Span::styled(title, Style::default().fg(th.accent)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    ta.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    f.render_widget(&*ta, area);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let view = app.session.view();
    let variant = match app.session.variant() {
        Variant::Cards => "cards",
        Variant::Gallery => "gallery",
    };
    let loaded = app
        .session
        .loaded_at()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into());
    let mut segs = vec![
        Span::styled(
            " qbank ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("· {} ", variant), Style::default().fg(th.fg)),
        Span::styled(" | questions:", Style::default().fg(th.muted)),
        Span::styled(format!("{}", view.dataset().len()), Style::default().fg(th.fg)),
        Span::styled(" | shown:", Style::default().fg(th.muted)),
        Span::styled(format!("{}", view.projection_len()), Style::default().fg(th.fg)),
    ];
    if app.session.variant() == Variant::Cards {
        let limit = if app.limit == 0 {
            "all".to_string()
        } else {
            app.limit.to_string()
        };
        segs.push(Span::styled(" | sort:", Style::default().fg(th.muted)));
        segs.push(Span::styled(app.sort.as_str(), Style::default().fg(th.fg)));
        segs.push(Span::styled(" | limit:", Style::default().fg(th.muted)));
        segs.push(Span::styled(limit, Style::default().fg(th.fg)));
    }
    segs.push(Span::styled(" | loaded:", Style::default().fg(th.muted)));
    segs.push(Span::styled(loaded, Style::default().fg(th.fg)));
    let para = Paragraph::new(Line::from(segs)).style(Style::default().bg(th.bar_bg).fg(th.fg));
    f.render_widget(para, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let status = app.session.status();
    let style = if status.is_error {
        Style::default().fg(th.error).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(th.info)
    };
    let text = truncate_to_width(&status.text, area.width as usize);
    f.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), area);
}

fn draw_list(f: &mut Frame, area: Rect, app: &mut App) {
    let th = app.theme;
    let focused = app.focus == Focus::List;
    // borders + "Q12345  " label
    let text_width = (area.width as usize).saturating_sub(12);
    let panel = app.session.target_mut();
    let items: Vec<ListItem> = panel
        .rows
        .iter()
        .map(|row| row_item(row, text_width, th))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(" Questions ", Style::default().fg(th.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { th.accent } else { th.muted })),
        )
        .highlight_style(
            Style::default()
                .bg(th.selection_bg)
                .fg(th.fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    f.render_stateful_widget(list, area, &mut panel.state);
}

fn row_item(row: &DisplayRow, text_width: usize, th: Theme) -> ListItem<'static> {
    match row {
        DisplayRow::Empty(msg) => ListItem::new(Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(th.muted).add_modifier(Modifier::ITALIC),
        ))),
        DisplayRow::Question {
            label, text, image, ..
        } => {
            let mut spans = vec![Span::styled(
                format!("{:<7}", label),
                Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
            )];
            match image {
                Some(ImageCell::Reference(_)) => {
                    spans.push(Span::styled("▣ ", Style::default().fg(th.good)))
                }
                Some(ImageCell::Placeholder) => spans.push(Span::styled(
                    format!("{} ", NO_IMAGE_GLYPH),
                    Style::default().fg(th.muted),
                )),
                None => {}
            }
            spans.push(Span::styled(
                truncate_to_width(text, text_width),
                Style::default().fg(th.fg),
            ));
            let mut lines = vec![Line::from(spans)];
            if let Some(ImageCell::Reference(src)) = image {
                lines.push(Line::from(Span::styled(
                    format!("         ↳ {}", truncate_to_width(src, text_width)),
                    Style::default().fg(th.info),
                )));
            }
            ListItem::new(lines)
        }
    }
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let th = app.theme;
    let mut tips = String::from(" [Tab]focus  [Enter/F5]load remote  [F6]load sample ");
    if app.session.variant() == Variant::Cards {
        tips.push_str(" [F2/s]sort  [F3/l]limit ");
    }
    tips.push_str(" | list: [j/k]move  [/]filter  [q]quit ");
    let help = Paragraph::new(Line::from(Span::styled(tips, Style::default().fg(th.muted))))
        .style(Style::default().bg(th.bar_bg));
    f.render_widget(help, area);
}

/// Cuts `s` to at most `maxw` display columns, ending with `…` when cut.
pub fn truncate_to_width(s: &str, maxw: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if UnicodeWidthStr::width(flat.as_str()) <= maxw {
        return flat;
    }
    if maxw == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut w = 0;
    for ch in flat.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw + 1 > maxw {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push('…');
    out
}

// ---------------- theme ----------------
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    fg: Color,
    muted: Color,
    accent: Color,
    bar_bg: Color,
    selection_bg: Color,
    good: Color,
    error: Color,
    info: Color,
}

pub fn theme_of(kind: ThemeKind) -> Theme {
    match kind {
        ThemeKind::Dark => Theme {
            fg: Color::Rgb(235, 219, 178),
            muted: Color::Rgb(146, 131, 116),
            accent: Color::Rgb(250, 189, 47),
            bar_bg: Color::Rgb(40, 40, 40),
            selection_bg: Color::Rgb(80, 73, 69),
            good: Color::Rgb(184, 187, 38),
            error: Color::Rgb(251, 73, 52),
            info: Color::Rgb(131, 165, 152),
        },
        ThemeKind::Light => Theme {
            fg: Color::Rgb(60, 56, 54),
            muted: Color::Rgb(124, 111, 100),
            accent: Color::Rgb(175, 58, 3),
            bar_bg: Color::Rgb(242, 229, 188),
            selection_bg: Color::Rgb(213, 196, 161),
            good: Color::Rgb(121, 116, 14),
            error: Color::Rgb(157, 0, 6),
            info: Color::Rgb(7, 102, 120),
        },
    }
}
