//! TUI rendering for Dream Explorer using ratatui.

mod input;
mod scene;
mod theme;

pub use input::{InputPump, apply_event, handle_events};
pub use scene::{SceneView, hint_line};
pub use theme::{Glyphs, Palette, glyphs, palette, ramp, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};

use dream_engine::{App, View};

pub const GATE_TITLE: &str = "Dream Explorer";
pub const VERIFY_LABEL: &str = "VERIFY AND ENTER";
pub const VERIFYING_LABEL: &str = "VERIFYING...";

const CARD_MAX_WIDTH: u16 = 52;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    match app.view() {
        View::Gate => draw_gate(frame, app, &palette),
        View::Scene => draw_scene(frame, app, &palette, &glyphs),
    }
}

fn draw_gate(frame: &mut Frame, app: &App, palette: &Palette) {
    let area = frame.area();
    let state = app.verification();
    let card_width = CARD_MAX_WIDTH.min(area.width.saturating_sub(2)).max(1);
    let content_width = card_width.saturating_sub(4).max(1); // borders + padding

    let feedback = sanitize_line(&state.feedback);
    let feedback_style = if feedback.starts_with("Error:") {
        styles::feedback_error(palette)
    } else {
        styles::feedback(palette)
    };
    let feedback_lines = wrapped_height(&feedback, content_width);

    let (label, button_style) = if state.loading {
        let spinner = spinner_frame(app.tick_count(), app.ui_options());
        (
            format!("{spinner} {VERIFYING_LABEL}"),
            styles::button_disabled(palette),
        )
    } else {
        (VERIFY_LABEL.to_string(), styles::button(palette))
    };
    let button = centered_padded(&label, content_width as usize);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(GATE_TITLE, styles::title(palette))).centered(),
        Line::from(""),
    ];
    lines.push(Line::from(Span::styled(feedback, feedback_style)).centered());
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(button, button_style)));
    lines.push(Line::from(""));
    lines.push(gate_hints(palette, state.loading).centered());

    // Title, blanks, button, hints plus however many rows the feedback wraps to.
    let inner_height = 6 + feedback_lines;
    let card_height = inner_height.saturating_add(4).min(area.height);

    let [card] = Layout::horizontal([Constraint::Length(card_width)])
        .flex(Flex::Center)
        .areas(area);
    let [card] = Layout::vertical([Constraint::Length(card_height)])
        .flex(Flex::Center)
        .areas(card);

    frame.render_widget(Clear, card);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::uniform(1));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, card);
}

fn gate_hints(palette: &Palette, loading: bool) -> Line<'static> {
    let mut spans = Vec::new();
    if !loading {
        spans.push(Span::styled("Enter", styles::key_highlight(palette)));
        spans.push(Span::styled(" verify  ", styles::key_hint(palette)));
    }
    spans.push(Span::styled("q", styles::key_highlight(palette)));
    spans.push(Span::styled(" quit", styles::key_hint(palette)));
    Line::from(spans)
}

fn draw_scene(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let Some(scene) = app.scene() else {
        return;
    };
    let area = frame.area();
    let [viewport, hints] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    let view = SceneView::new(app.scene_spec(), scene, palette, glyphs);
    frame.render_widget(view, viewport);

    let bar = Paragraph::new(hint_line(scene.is_locked(), palette, glyphs))
        .style(Style::default().bg(palette.bg_panel));
    frame.render_widget(bar, hints);
}

/// Strip control characters so provider messages cannot drive the terminal.
fn sanitize_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Rows `text` takes when word-wrapped to `width`, the way `Paragraph` wraps.
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut rows = 1usize;
    let mut line = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        let joined = if line == 0 { len } else { line + 1 + len };
        if joined <= width {
            line = joined;
            continue;
        }
        if line > 0 {
            rows += 1;
        }
        // Words wider than a row are split across rows.
        let spill = (len - 1) / width;
        rows += spill;
        line = len - spill * width;
    }
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn centered_padded(label: &str, width: usize) -> String {
    let len = label.chars().count();
    let total = width.max(len + 2);
    let left = (total - len) / 2;
    let right = total - len - left;
    format!("{}{label}{}", " ".repeat(left), " ".repeat(right))
}
