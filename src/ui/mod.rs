use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
};

use crate::app::state::AppState;

/// How far the lightning flash pulls every cell towards white.
pub const FLASH_ALPHA: f32 = 0.3;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    state
        .surface
        .blit(frame.buffer_mut(), area, state.settings.backdrop);

    if state.flash_visible() {
        apply_flash(frame.buffer_mut(), area);
    }

    if state.show_hint {
        render_hint(frame, area, state);
    }
}

fn apply_flash(buf: &mut Buffer, area: Rect) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.fg = towards_white(cell.fg);
                cell.bg = towards_white(cell.bg);
            }
        }
    }
}

fn towards_white(color: Color) -> Color {
    let lift = |c: u8| (f32::from(c) + (255.0 - f32::from(c)) * FLASH_ALPHA).round() as u8;
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(lift(r), lift(g), lift(b)),
        other => other,
    }
}

pub fn hint_text(state: &AppState) -> String {
    let sound = if state.settings.with_sound { "on" } else { "off" };
    format!(
        " {} {:.1} | h/t effect | +/- intensity | s sound {sound} | ? hide | q quit ",
        state.settings.effect.label(),
        state.settings.intensity,
    )
}

fn render_hint(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.height < 2 || area.width < 24 {
        return;
    }
    let text = hint_text(state);
    let width = (text.chars().count() as u16).min(area.width);
    let hint_area = Rect {
        x: area.x,
        y: area.bottom().saturating_sub(1),
        width,
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(Line::from(text)).style(Style::default().fg(Color::Gray)),
        hint_area,
    );
}
