use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::display::render_node;
use crate::ui::layout::LayoutAreas;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        draw_board(f, layout.main, app);

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;
    let rotation = &app.state.rotation;

    let titles: Vec<Line> = rotation.registry().iter().map(|v| Line::from(v.display_name())).collect();
    let tab_index = rotation.registry().position(app.active_view().name()).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let status = if rotation.is_enabled() { "rotating" } else { "paused" };
    let controls = Paragraph::new(format!("{} {status}  space ", rotation.glyph()))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(controls, tab_bar[1]);
}

fn draw_board(f: &mut Frame, area: Rect, app: &App) {
    let Some(tree) = app.display_tree() else {
        let msg = if let Some(err) = app.state.last_error.as_deref() {
            format!("Snapshot load failed:\n{err}\n\nPress r to retry")
        } else {
            "Loading tournament data...".to_string()
        };
        let block = default_border(Color::DarkGray);
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let mut block = default_border(Color::White).title(format!(" {} ", tree.view.display_name()));
    if let Some(loaded_at) = app.state.board.loaded_at {
        block = block.title_bottom(Line::from(format!(" loaded {} ", loaded_at.format("%H:%M:%S"))).right_aligned());
    }
    if let Some(err) = app.state.last_error.as_deref() {
        block = block.title_bottom(Line::from(format!(" reload failed: {err} ")).style(Style::default().fg(Color::Red)));
    }
    let inner = block.inner(area);
    f.render_widget(block, area);
    render_node(f, inner, &tree.root);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(2), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
