//! Command-line entry point: parses options, loads configuration, spawns
//! the pty, and drives the terminal engine from the event reactor.
//! There is no graphical backend here — [`vtwindow::NullWindow`] stands
//! in for one, matching this crate's "interpret + forward events, don't
//! render" scope.

use clap::Parser;
use vtio::engine::{EngineEvent, Terminal};
use vtpty::{Pty, SpawnConfig};
use vtreactor::{Bus, Event, Reactor};
use vtwindow::{NullWindow, Window};

/// A terminal core: PTY, VT100/xterm escape interpretation, and an
/// async event loop. Rendering is left to whatever embeds this binary.
#[derive(Debug, Parser)]
#[command(name = "vtrun", version, about)]
#[allow(dead_code)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short = 'c', long = "config")]
    config: Option<std::path::PathBuf>,

    /// Disable swapping to the alternate screen (DECSET 1049).
    #[arg(short = 'a', long = "noalt")]
    noalt: bool,

    /// Font description; unused without a graphical backend, accepted
    /// for command-line compatibility.
    #[arg(short = 'f', long = "font")]
    font: Option<String>,

    /// `COLSxROWS`, e.g. `80x24`.
    #[arg(short = 'g', long = "geometry")]
    geometry: Option<String>,

    #[arg(short = 't', long = "title")]
    title: Option<String>,

    /// Window name hint; unused without a graphical backend.
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Window class hint; unused without a graphical backend.
    #[arg(short = 'w', long = "winclass")]
    winclass: Option<String>,

    /// Explicit program (and args) to exec instead of a shell.
    #[arg(short = 'e', long = "exe", num_args = 1..)]
    exe: Vec<String>,

    /// Tee all pty output to this path (`-` for stdout).
    #[arg(short = 'o', long = "out")]
    out: Option<String>,

    /// Open this line device directly instead of forking a shell.
    #[arg(short = 'l', long = "line")]
    line: Option<String>,

    #[arg(short = 'b', long = "bench")]
    bench: bool,
}

fn parse_geometry(spec: &str) -> Option<(u16, u16)> {
    let (cols, rows) = spec.split_once('x')?;
    Some((cols.parse().ok()?, rows.parse().ok()?))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match vtconfig::Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let (cols, rows) = args
        .geometry
        .as_deref()
        .and_then(parse_geometry)
        .unwrap_or((config.cols, config.rows));

    let spawn_config = SpawnConfig {
        cmd: if args.exe.is_empty() { None } else { Some(args.exe.clone()) },
        term_name: config.term_name.clone(),
        default_shell: config.default_shell.clone(),
        io_tee: args.out.clone().map(std::path::PathBuf::from),
    };

    let mut pty = match args.line.as_deref() {
        Some(line) => Pty::open_line(line),
        None => Pty::spawn(&spawn_config, cols, rows),
    }
    .unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });

    let mut terminal = Terminal::new(cols, rows);
    let mut window = NullWindow::default();
    if let Some(title) = &args.title {
        window.set_title(title);
    }

    let mut reactor = Reactor::new().unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });
    if let Err(e) = reactor.set_ttyfd(pty.as_raw_fd()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    let refresh_secs = 1.0 / (config.refresh_rate_hz.max(1) as f32);
    if let Err(e) = reactor.queue_refresh(refresh_secs) {
        tracing::error!("{e}");
    }

    let mut bus = Bus::new();

    run(&mut reactor, &mut pty, &mut terminal, &mut window, &mut bus);
}

fn run(
    reactor: &mut Reactor,
    pty: &mut Pty,
    terminal: &mut Terminal,
    window: &mut dyn Window,
    bus: &mut Bus,
) {
    let ttyfd = pty.as_raw_fd();
    terminal
        .bus_mut()
        .subscribe::<vtio::grid::Refresh>(|_| tracing::trace!("screen content became dirty"));
    loop {
        match reactor.wait() {
            Event::TtyRead => {
                let mut outbound = Vec::new();
                let hup = pty
                    .read_ready(|bytes| {
                        let carry = vtio::codec::incomplete_suffix_len(bytes);
                        let complete = bytes.len() - carry;
                        let reply = terminal.feed(&bytes[..complete], &mut |event| {
                            apply_event(event, &mut *window);
                        });
                        outbound.extend_from_slice(&reply);
                        carry
                    })
                    .unwrap_or(true);
                if !outbound.is_empty() {
                    let _ = pty.write(&outbound);
                    let _ = reactor.set_events(ttyfd, true, pty.has_pending_write());
                }
                if hup {
                    break;
                }
                bus.publish(&Refresh);
            }
            Event::TtyWrite => {
                let _ = pty.write_ready();
                let _ = reactor.set_events(ttyfd, true, pty.has_pending_write());
            }
            Event::Refresh => {
                bus.publish(&Refresh);
            }
            Event::ChildEnd | Event::Stop => break,
            Event::Window | Event::RepeatKey | Event::Blink => {}
        }
    }
}

/// Published whenever the engine wants a repaint; carries no data since
/// a subscriber reads current screen state directly off the `Terminal`.
struct Refresh;

fn apply_event(event: EngineEvent, window: &mut dyn Window) {
    match event {
        EngineEvent::Bell => window.bell(100),
        EngineEvent::TitleChanged(title) => window.set_title(&title),
        EngineEvent::IconNameChanged(name) => window.set_icon_name(&name),
        EngineEvent::ClipboardSet { data, .. } => window.set_clipboard(data),
        EngineEvent::ModesChanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn geometry_parses_colsxrows() {
        assert_eq!(parse_geometry("80x24"), Some((80, 24)));
    }

    #[test]
    fn geometry_rejects_garbage() {
        assert_eq!(parse_geometry("nonsense"), None);
    }
}
