//! Main application logic for the terminal user interface.
//!
//! Three screens cycled with Tab: the cue (ranked, filtered view with the
//! top task called out), the bucket shelf, and the tag urgency table. The
//! cue is recomputed from current store state on every frame; tasks
//! completed during the session join an exclusion set so they stay hidden
//! even while a recurring successor is already back in the store.

use std::collections::HashSet;
use std::io;
use std::time::Duration;

use chrono::{Local, Timelike};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use crate::cue::{urgency_score, urgency_table};
use crate::fields::format_recurrence;
use crate::notify::greeting;
use crate::store::{remove_bucket_with_tasks, BucketStore, Storage, TagStore, TaskStore};
use crate::tag::{clamp_urgency, TagPatch};
use crate::tui::colors::{tag_color, urgency_color, GOLD};

/// Which screen is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Cue,
    Buckets,
    Tags,
}

/// Main application state for the terminal user interface.
pub struct App {
    storage: Storage,
    tasks: TaskStore,
    tags: TagStore,
    buckets: BucketStore,
    screen: Screen,
    cue_state: ListState,
    bucket_state: TableState,
    tag_state: TableState,
    /// Task ids completed this session; hidden from the cue regardless of
    /// their due window.
    session_completed: HashSet<String>,
    /// Bucket id awaiting y/n delete confirmation.
    pending_bucket_delete: Option<String>,
    status_message: String,
    should_quit: bool,
}

impl App {
    pub fn new(storage: &Storage) -> Self {
        let mut app = App {
            storage: storage.clone(),
            tasks: TaskStore::load(storage),
            tags: TagStore::load(storage),
            buckets: BucketStore::load(storage),
            screen: Screen::Cue,
            cue_state: ListState::default(),
            bucket_state: TableState::default(),
            tag_state: TableState::default(),
            session_completed: HashSet::new(),
            pending_bucket_delete: None,
            status_message: String::new(),
            should_quit: false,
        };
        app.cue_state.select(Some(0));
        app.bucket_state.select(Some(0));
        app.tag_state.select(Some(0));
        app
    }

    /// Event loop: draw, poll, dispatch until quit.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// The ranked cue ids for the current session, top task first.
    fn cue_ids(&self) -> Vec<String> {
        self.tasks
            .ranked(self.tags.all(), &self.session_completed, Local::now())
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    fn handle_key(&mut self, code: KeyCode) {
        // A pending bucket deletion swallows everything except y/n.
        if let Some(bucket_id) = self.pending_bucket_delete.clone() {
            match code {
                KeyCode::Char('y') => {
                    let removed =
                        remove_bucket_with_tasks(&mut self.buckets, &mut self.tasks, &bucket_id);
                    self.tasks.save(&self.storage);
                    self.buckets.save(&self.storage);
                    self.status_message = format!("Deleted bucket and {removed} task(s)");
                }
                _ => self.status_message = "Delete cancelled".into(),
            }
            self.pending_bucket_delete = None;
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.screen = match self.screen {
                    Screen::Cue => Screen::Buckets,
                    Screen::Buckets => Screen::Tags,
                    Screen::Tags => Screen::Cue,
                };
                self.status_message.clear();
            }
            KeyCode::Char('r') => {
                self.tasks = TaskStore::load(&self.storage);
                self.tags = TagStore::load(&self.storage);
                self.buckets = BucketStore::load(&self.storage);
                self.status_message = "Reloaded from disk".into();
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            _ => match self.screen {
                Screen::Cue => self.handle_cue_key(code),
                Screen::Buckets => self.handle_buckets_key(code),
                Screen::Tags => self.handle_tags_key(code),
            },
        }
    }

    fn move_selection(&mut self, delta: i64) {
        let len = match self.screen {
            Screen::Cue => self.cue_ids().len(),
            Screen::Buckets => self.buckets.all().len(),
            Screen::Tags => self.tags.all().len(),
        };
        let current = match self.screen {
            Screen::Cue => self.cue_state.selected(),
            Screen::Buckets => self.bucket_state.selected(),
            Screen::Tags => self.tag_state.selected(),
        };
        let next = if len == 0 {
            None
        } else {
            let current = current.unwrap_or(0) as i64;
            Some((current + delta).clamp(0, len as i64 - 1) as usize)
        };
        match self.screen {
            Screen::Cue => self.cue_state.select(next),
            Screen::Buckets => self.bucket_state.select(next),
            Screen::Tags => self.tag_state.select(next),
        }
    }

    fn selected_cue_id(&self) -> Option<String> {
        let ids = self.cue_ids();
        let idx = self.cue_state.selected()?;
        ids.get(idx).cloned()
    }

    fn handle_cue_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('c') => {
                if let Some(id) = self.selected_cue_id() {
                    if self.session_completed.insert(id.clone()) {
                        self.tasks.complete(&id);
                        self.tasks.save(&self.storage);
                        self.status_message = "Completed".into();
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_cue_id() {
                    self.session_completed.insert(id.clone());
                    self.tasks.remove(&id);
                    self.tasks.save(&self.storage);
                    self.status_message = "Deleted".into();
                }
            }
            // Shift-J/K nudge the task within the stored collection. Ranked
            // order ignores this except for equal scores, where stored order
            // is the tie-break.
            KeyCode::Char('J') => self.nudge_task(1),
            KeyCode::Char('K') => self.nudge_task(-1),
            _ => {}
        }
    }

    fn nudge_task(&mut self, delta: i64) {
        let Some(id) = self.selected_cue_id() else {
            return;
        };
        let mut order: Vec<_> = self.tasks.all().to_vec();
        let Some(pos) = order.iter().position(|t| t.id == id) else {
            return;
        };
        let target = pos as i64 + delta;
        if target < 0 || target >= order.len() as i64 {
            return;
        }
        order.swap(pos, target as usize);
        self.tasks.reorder(order);
        self.tasks.save(&self.storage);
        self.status_message = "Reordered".into();
    }

    fn handle_buckets_key(&mut self, code: KeyCode) {
        if code == KeyCode::Char('d') {
            if let Some(idx) = self.bucket_state.selected() {
                if let Some(bucket) = self.buckets.all().get(idx) {
                    let count = self.tasks.in_bucket(&bucket.id).len();
                    self.status_message =
                        format!("Delete '{}' and its {count} task(s)? y/n", bucket.name);
                    self.pending_bucket_delete = Some(bucket.id.clone());
                }
            }
        }
    }

    fn handle_tags_key(&mut self, code: KeyCode) {
        let Some(idx) = self.tag_state.selected() else {
            return;
        };
        let Some(tag) = self.tags.all().get(idx).cloned() else {
            return;
        };
        match code {
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.tags.update(TagPatch {
                    id: tag.id,
                    urgency: Some(clamp_urgency(tag.urgency.saturating_add(1))),
                    ..Default::default()
                });
                self.tags.save(&self.storage);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.tags.update(TagPatch {
                    id: tag.id,
                    urgency: Some(clamp_urgency(tag.urgency.saturating_sub(1))),
                    ..Default::default()
                });
                self.tags.save(&self.storage);
            }
            KeyCode::Char('d') => {
                self.tags.remove(&tag.id);
                self.tags.save(&self.storage);
                self.status_message = format!("Removed tag '{}'", tag.name);
            }
            _ => {}
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(f.area());

        match self.screen {
            Screen::Cue => self.draw_cue(f, chunks[0]),
            Screen::Buckets => self.draw_buckets(f, chunks[0]),
            Screen::Tags => self.draw_tags(f, chunks[0]),
        }
        self.draw_footer(f, chunks[1]);
    }

    fn draw_cue(&mut self, f: &mut Frame, area: Rect) {
        let now = Local::now();
        let table = urgency_table(self.tags.all());
        let ranked = self
            .tasks
            .ranked(self.tags.all(), &self.session_completed, now);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(3)])
            .split(area);

        // Top task panel.
        let header = format!(" {} — {} in your cue ", greeting(now.hour()), ranked.len());
        let top_block = Block::default()
            .borders(Borders::ALL)
            .title(header)
            .border_style(Style::default().fg(GOLD));
        match ranked.first() {
            Some(top) => {
                let mut tag_spans: Vec<Span> = vec![];
                for name in &top.tags {
                    tag_spans.push(Span::styled(
                        format!(" {name} "),
                        Style::default().fg(Color::Black).bg(tag_color(name)),
                    ));
                    tag_spans.push(Span::raw(" "));
                }
                let lines = vec![
                    Line::from(Span::styled(
                        top.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(tag_spans),
                    Line::from(Span::raw(format!(
                        "score {:.1} · {}",
                        urgency_score(top, &table),
                        format_recurrence(top.is_recurring, &top.recurring_details),
                    ))),
                    Line::from(Span::styled(
                        top.notes.clone(),
                        Style::default().fg(Color::DarkGray),
                    )),
                ];
                f.render_widget(Paragraph::new(lines).block(top_block), chunks[0]);
            }
            None => {
                let empty = Paragraph::new("Create your first bucket and task to display your cue!")
                    .block(top_block);
                f.render_widget(empty, chunks[0]);
            }
        }

        // Remaining tasks.
        let items: Vec<ListItem> = ranked
            .iter()
            .map(|t| {
                let score = urgency_score(t, &table);
                let spans = vec![
                    Span::styled(format!("{score:>4.1} "), Style::default().fg(GOLD)),
                    Span::raw(t.title.clone()),
                    Span::styled(
                        format!("  [{}]", t.tags.join(",")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ];
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Cue "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, chunks[1], &mut self.cue_state);
    }

    fn draw_buckets(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .buckets
            .all()
            .iter()
            .map(|b| {
                let count = self.tasks.in_bucket(&b.id).len();
                Row::new(vec![b.name.clone(), count.to_string(), b.id.clone()])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Length(6),
                Constraint::Percentage(40),
            ],
        )
        .header(Row::new(vec!["Bucket", "Tasks", "Id"]).style(Style::default().fg(GOLD)))
        .block(Block::default().borders(Borders::ALL).title(" Buckets "))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(table, area, &mut self.bucket_state);
    }

    fn draw_tags(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .tags
            .all()
            .iter()
            .map(|t| {
                let bar = "█".repeat(t.urgency as usize);
                Row::new(vec![
                    ratatui::text::Text::raw(t.name.clone()),
                    ratatui::text::Text::styled(
                        format!("{bar} {}", t.urgency),
                        Style::default().fg(urgency_color(t.urgency)),
                    ),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
            .header(Row::new(vec!["Tag", "Urgency"]).style(Style::default().fg(GOLD)))
            .block(Block::default().borders(Borders::ALL).title(" Tags "))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(table, area, &mut self.tag_state);
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let help = match self.screen {
            Screen::Cue => "Tab screens · j/k move · c complete · d delete · J/K reorder · q quit",
            Screen::Buckets => "Tab screens · j/k move · d delete bucket · q quit",
            Screen::Tags => "Tab screens · j/k move · +/- urgency · d delete · q quit",
        };
        let text = if self.status_message.is_empty() {
            help.to_string()
        } else {
            format!("{} — {help}", self.status_message)
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}
