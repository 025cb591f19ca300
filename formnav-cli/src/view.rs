use formnav::RequestStatus;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{app::App, widgets::FieldWidget};

const LABEL_WIDTH: u16 = 18;

pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let title = if app.form.is_stock() {
        "New stock order"
    } else {
        "New production order"
    };
    let header = Paragraph::new(title)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    render_fields(frame, chunks[1], app);
    render_footer(frame, chunks[2], app);
}

fn render_fields(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::ALL).title("Order");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let current = app.current_field();
    let mut hit_areas = Vec::new();
    let mut popup = None;

    for (row, slot) in app.form.slots().into_iter().enumerate() {
        let Ok(offset) = u16::try_from(row) else {
            break;
        };
        if offset >= inner.height {
            break;
        }
        let line_area = Rect::new(inner.x, inner.y + offset, inner.width, 1);
        let focused = current.as_deref() == Some(slot.id);
        let enabled = app.is_enabled(slot.id);

        let value_style = match (focused, enabled) {
            (_, false) => Style::default().fg(Color::DarkGray),
            (true, true) => Style::default().fg(Color::Black).bg(Color::Cyan),
            (false, true) => Style::default(),
        };
        let label_style = if enabled {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let value = match &slot.widget {
            FieldWidget::Text(input) => {
                let input = input.borrow();
                if focused {
                    let column = line_area
                        .x
                        .saturating_add(LABEL_WIDTH)
                        .saturating_add(input.caret_columns())
                        .min(line_area.right().saturating_sub(1));
                    frame.set_cursor_position((column, line_area.y));
                }
                input.value().to_string()
            }
            FieldWidget::Select(select) => {
                let select = select.borrow();
                if select.is_open() {
                    popup = Some((line_area, select.clone()));
                }
                format!("{} ▾", select.selected().unwrap_or("(choose)"))
            }
            FieldWidget::Button(button) => format!("[ {} ]", button.borrow().label()),
        };

        let line = Line::from(vec![
            Span::styled(
                format!("{:<width$}", slot.label, width = usize::from(LABEL_WIDTH)),
                label_style,
            ),
            Span::styled(value, value_style),
        ]);
        frame.render_widget(Paragraph::new(line), line_area);
        hit_areas.push((line_area, slot.id));
    }
    app.hit_areas = hit_areas;

    if let Some((anchor, select)) = popup {
        let height = u16::try_from(select.options().len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let below = anchor.y.saturating_add(1);
        let available = frame.area().bottom().saturating_sub(below);
        let rect = Rect::new(
            anchor.x.saturating_add(LABEL_WIDTH),
            below,
            anchor.width.saturating_sub(LABEL_WIDTH).min(30),
            height.min(available),
        );
        let items = select
            .options()
            .iter()
            .map(|option| ListItem::new(*option))
            .collect::<Vec<_>>();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Choose"))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));
        let mut state = ListState::default().with_selected(Some(select.highlight()));
        frame.render_widget(Clear, rect);
        frame.render_stateful_widget(list, rect, &mut state);
    }
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let actions = Paragraph::new(format!("Actions: {}", app.help_text()))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions, rows[0]);

    let mut status = app.tracker.message().to_string();
    if app.dirty {
        status.push_str(" • unsaved changes");
    }
    let badge = match app.tracker.status() {
        RequestStatus::Error(_) => Span::styled("[!]", Style::default().fg(Color::Red)),
        RequestStatus::Loading => Span::styled("[..]", Style::default().fg(Color::Blue)),
        RequestStatus::Idle | RequestStatus::Success(_) => {
            Span::styled("[ok]", Style::default().fg(Color::Green))
        }
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw("Status: "),
        Span::raw(status),
        Span::raw(" "),
        badge,
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(status, rows[1]);
}
