use super::{App, Field};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use rust_decimal::Decimal;
use trade_calc_core::{
    format_currency, format_percent, format_signed, ReportFormatter, TradingMode,
};
use tui_input::Input;

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Length(3), // Trade details
            Constraint::Min(8),    // Results or breakdown
            Constraint::Length(3), // Status / help
        ])
        .split(f.area());

    render_title(f, chunks[0]);
    render_inputs(f, app, chunks[1]);
    if app.show_breakdown {
        render_breakdown(f, app, chunks[2]);
    } else {
        render_results(f, app, chunks[2]);
    }
    render_status(f, app, chunks[3]);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "📊 Trading Calculator",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("Calculate your trading profits with transaction fees"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_inputs(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(22),
            Constraint::Percentage(22),
            Constraint::Percentage(34),
        ])
        .split(area);

    render_text_field(f, app, Field::BuyPrice, &app.buy_input, columns[0]);
    render_text_field(f, app, Field::SellPrice, &app.sell_input, columns[1]);
    render_text_field(f, app, Field::Quantity, &app.quantity_input, columns[2]);

    let marker = |mode: TradingMode| {
        if app.input().mode == mode {
            "● "
        } else {
            "○ "
        }
    };
    let mode = Paragraph::new(Line::from(vec![
        Span::raw(marker(TradingMode::SameDay)),
        Span::raw("Same Day  "),
        Span::raw(marker(TradingMode::NextDay)),
        Span::raw("Another Day"),
    ]))
    .block(field_block(app, Field::Mode));
    f.render_widget(mode, columns[3]);
}

fn render_text_field(f: &mut Frame, app: &App, field: Field, input: &Input, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll = input.visual_scroll(inner_width);

    let widget = Paragraph::new(input.value())
        .scroll((0, u16::try_from(scroll).unwrap_or(0)))
        .block(field_block(app, field));
    f.render_widget(widget, area);

    if app.focus == field {
        let offset = input.visual_cursor().saturating_sub(scroll);
        let x = area.x + 1 + u16::try_from(offset).unwrap_or(0);
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn field_block(app: &App, field: Field) -> Block<'static> {
    let style = if app.is_invalid(field) {
        Style::default().fg(Color::Red)
    } else if app.focus == field {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(field.label())
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Buy
            Constraint::Length(5), // Sell
            Constraint::Length(5), // Profit/Loss
            Constraint::Min(0),    // Fee structure
        ])
        .split(area);

    let Some(result) = app.result() else {
        let empty = Paragraph::new("No result yet")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    };
    let input = app.input();
    let display = &app.display;
    let prefix = display.currency_prefix.as_str();
    let price = |v: Decimal| format_currency(prefix, v, display.price_decimals);
    let amount = |v: Decimal| format_currency(prefix, v, display.amount_decimals);
    let fee_label = format!("Fee ({}%)", input.fee_percent.normalize());

    // Buy Transaction
    render_metric_row(
        f,
        rows[0],
        "🟢 Buy Transaction",
        &[
            Metric::new("Quantity", input.quantity.to_string()),
            Metric::new("Buy Price", price(input.buy_price)),
            Metric::new(&fee_label, amount(result.buy_fee)),
            Metric::new("Total Cost", price(result.total_cost)),
        ],
    );

    // Sell Transaction
    let sell_fee = match input.mode {
        TradingMode::SameDay => {
            Metric::new("Fee", amount(Decimal::ZERO)).with_note("No fee on same day sell", None)
        }
        TradingMode::NextDay => Metric::new(&fee_label, amount(result.sell_fee)),
    };
    render_metric_row(
        f,
        rows[1],
        "🔴 Sell Transaction",
        &[
            Metric::new("Quantity", input.quantity.to_string()),
            Metric::new("Sell Price", price(input.sell_price)),
            sell_fee,
            Metric::new("Proceeds", amount(result.proceeds)),
        ],
    );

    // Profit/Loss Summary
    let trend = if result.is_gain() { Color::Green } else { Color::Red };
    render_metric_row(
        f,
        rows[2],
        "💰 Profit/Loss Summary",
        &[
            Metric::new("Gain/Loss", amount(result.gain_loss)).with_note(
                &format_signed(result.gain_loss, display.amount_decimals),
                Some(trend),
            ),
            Metric::new(
                "Return %",
                format_percent(result.gain_loss_percent, display.percent_decimals),
            )
            .with_note(
                &format!(
                    "{}%",
                    format_signed(result.gain_loss_percent, display.percent_decimals)
                ),
                Some(trend),
            ),
            Metric::new("Total Fees", amount(result.total_fees))
                .with_note(&format!("Fee charged {}", result.fee_charge_count), None),
        ],
    );

    let info = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Transaction Fee: "),
            Span::styled(
                format!("{}%", input.fee_percent.normalize()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from("Same Day Trading: Fee charged once (on buy only)"),
        Line::from("Sell on Another Day: Fee charged twice (on buy and sell)"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Fee Structure"));
    f.render_widget(info, rows[3]);
}

struct Metric {
    label: String,
    value: String,
    note: Option<(String, Option<Color>)>,
}

impl Metric {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            note: None,
        }
    }

    fn with_note(mut self, note: &str, color: Option<Color>) -> Self {
        self.note = Some((note.to_string(), color));
        self
    }
}

fn render_metric_row(f: &mut Frame, area: Rect, title: &str, metrics: &[Metric]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let count = u32::try_from(metrics.len()).unwrap_or(1).max(1);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(metrics.iter().map(|_| Constraint::Ratio(1, count)))
        .split(inner);

    for (metric, column) in metrics.iter().zip(columns.iter()) {
        let mut lines = vec![
            Line::from(Span::styled(
                metric.label.clone(),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                metric.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some((note, color)) = &metric.note {
            let style = color.map_or_else(Style::default, |c| Style::default().fg(c));
            lines.push(Line::from(Span::styled(note.clone(), style)));
        }
        f.render_widget(Paragraph::new(lines), *column);
    }
}

fn render_breakdown(f: &mut Frame, app: &App, area: Rect) {
    let text = app.result().map_or_else(
        || "No result yet".to_string(),
        |result| ReportFormatter::format(app.input(), result, &app.display),
    );
    let lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();

    let breakdown = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.breakdown_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("📋 Detailed Breakdown"),
        );
    f.render_widget(breakdown, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match (app.input_error(), &app.status) {
        (Some(error), _) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        (None, Some(msg)) => {
            Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Yellow)))
        }
        (None, None) => Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(": Next field | "),
            Span::styled("↑↓", Style::default().fg(Color::Yellow)),
            Span::raw(": Step | "),
            Span::styled("m", Style::default().fg(Color::Yellow)),
            Span::raw(": Toggle mode | "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(": Breakdown | "),
            Span::styled("q", Style::default().fg(Color::Red)),
            Span::raw(": Quit"),
        ]),
    };
    let status = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}
