//! Terminal dashboard: follows a hostpulse feed and reprints every slot on each snapshot.
//!
//! Usage: `hostpulse-watch [ws://host:port/ws]` (or `HOSTPULSE_URL`). While running,
//! type `p <pid|name|cpu|mem>` or `c <proto|local|remote|status>` and Enter to sort.

use anyhow::Result;
use hostpulse::client::{
    ClientSession, ConnectionColumn, ProcessColumn, ReconnectPolicy, SlotMap, Surface, UiEvent,
    Widget, WsConnector,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "ws://127.0.0.1:8003/ws";
const BAR_WIDTH: usize = 20;

/// Keeps the latest widget per slot and redraws the whole screen on flush.
#[derive(Default)]
struct TerminalSurface {
    slots: SlotMap,
}

impl Surface for TerminalSurface {
    fn update(&mut self, slot: &str, widget: Widget) {
        self.slots.update(slot, widget);
    }

    fn flush(&mut self) {
        self.slots.flush();
        let mut out = String::new();
        // Clear screen, cursor home.
        out.push_str("\x1b[2J\x1b[H");
        for (slot, widget) in self.slots.iter() {
            out.push_str(&format!("{slot:>20}  {}\n", describe(widget)));
        }
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(out.as_bytes());
        let _ = stdout.flush();
    }
}

fn describe(widget: &Widget) -> String {
    match widget {
        Widget::Text(s) => s.clone(),
        Widget::Status(up) => (if *up { "active" } else { "inactive" }).to_string(),
        Widget::Bar(bar) => {
            let filled = ((bar.fill_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
            let filled = filled.min(BAR_WIDTH);
            format!(
                "[{}{}] {} ({})",
                "#".repeat(filled),
                ".".repeat(BAR_WIDTH - filled),
                bar.label,
                bar.class.as_str()
            )
        }
        Widget::Table(table) => {
            let mut s = table
                .header
                .iter()
                .map(|h| match h.indicator {
                    Some(order) => format!("{}{}", h.title, order.indicator()),
                    None => h.title.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | ");
            for row in &table.rows {
                s.push_str("\n                      ");
                s.push_str(
                    &row.iter()
                        .map(|c| c.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" | "),
                );
            }
            if let Some(footer) = &table.footer {
                s.push_str("\n                      ");
                s.push_str(footer);
            }
            s
        }
        Widget::CoreChart(cores) => cores
            .iter()
            .map(|c| format!("{} {:.0}%", c.label, c.percent))
            .collect::<Vec<_>>()
            .join("  "),
        Widget::Series(series) => match (series.upload.last(), series.download.last()) {
            (Some(up), Some(down)) => format!(
                "up {up:.2} KB/s, down {down:.2} KB/s ({} samples)",
                series.labels.len()
            ),
            _ => "no samples yet".to_string(),
        },
        Widget::Placeholder => "N/A".to_string(),
    }
}

fn parse_command(line: &str) -> Option<UiEvent> {
    let (kind, column) = line.trim().split_once(' ')?;
    match kind {
        "p" => column.parse::<ProcessColumn>().ok().map(UiEvent::SortProcesses),
        "c" => column
            .parse::<ConnectionColumn>()
            .ok()
            .map(UiEvent::SortConnections),
        _ => None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HOSTPULSE_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    let (ui_tx, ui_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Some(ev) => {
                    if ui_tx.send(ev).await.is_err() {
                        break;
                    }
                }
                None => tracing::warn!(input = %line, "unrecognised command"),
            }
        }
    });

    let mut connector = WsConnector::new(url);
    let mut session = ClientSession::new(TerminalSurface::default());
    let policy = ReconnectPolicy::default();

    tokio::select! {
        _ = session.run(&mut connector, &policy, ui_rx) => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    Ok(())
}
