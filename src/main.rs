//! mudterm - a terminal MUD client
//!
//! mudterm connects to a MUD server, rebuilds its output stream into a
//! styled document, and renders it in the terminal with clickable action
//! links.
//!
//! # Features
//!
//! - **Styled output**: ANSI 16/256/truecolor with a configurable palette
//! - **Action links**: clickable text that sends commands or fills the
//!   input line
//! - **Deferred line breaks**: prompt-friendly line assembly without
//!   spurious blanks
//! - **Input history**: persistent up/down recall
//! - **Scrollback**: PageUp/PageDown through the session
//!
//! # Quick Start
//!
//! ```text
//! mudterm mud.example.com 4000
//! mudterm --offline            # scripted demo, no server needed
//! ```

mod config;
mod core;
mod history;
mod output;
mod ui;

use std::env;
use std::io::Write;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::core::session::Session;
use crate::history::CommandHistory;
use crate::output::{ColorValue, Link, OutputEvent, SendTo, StyleFlags, TextFragment};
use crate::ui::{InputLine, Renderer};

/// Command-line options
#[derive(Default)]
struct Options {
    /// Server host; falls back to the configured world
    host: Option<String>,
    /// Server port; falls back to the configured world
    port: Option<u16>,
    /// Run the scripted offline demo instead of connecting
    offline: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("mudterm {}", VERSION);
}

fn print_help() {
    eprintln!("mudterm {} - a terminal MUD client", VERSION);
    eprintln!();
    eprintln!("Usage: mudterm [OPTIONS] [HOST [PORT]]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --port <PORT>     Server port (default: from config, else 4000)");
    eprintln!("  -o, --offline         Scripted demo session, no server needed");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Enter                 Send the input line");
    eprintln!("  Up/Down               Recall input history");
    eprintln!("  PageUp/PageDown       Scroll the session");
    eprintln!("  Esc                   Back to live view / clear input");
    eprintln!("  Ctrl+C, Ctrl+D        Quit");
    eprintln!();
    eprintln!("Mouse:");
    eprintln!("  Click a link          Activate it (send or fill the input line)");
    eprintln!("  Hover a link          Show its hint in the status line");
    eprintln!("  Scroll wheel          Scroll the session");
    eprintln!();
    eprintln!("Configuration: ~/.mudterm/config.toml");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-o" | "--offline" => {
                options.offline = true;
            }
            "-p" | "--port" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing port argument".to_string());
                }
                let port = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid port: {}", args[i]))?;
                options.port = Some(port);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
            arg => {
                if options.host.is_none() {
                    options.host = Some(arg.to_string());
                } else if options.port.is_none() {
                    let port = arg.parse().map_err(|_| format!("Invalid port: {}", arg))?;
                    options.port = Some(port);
                } else {
                    return Err(format!("Unexpected argument: {}", arg));
                }
            }
        }
        i += 1;
    }

    Ok(options)
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(options) => options,
        Err(error) => {
            eprintln!("Error: {}", error);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Initialize logging to file
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from);

    let log_path = home
        .map(|h| h.join(".mudterm").join("mudterm.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("mudterm.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    info!("mudterm starting...");

    let config = Config::load();
    let mut session = Session::new(config.palette(), config.echo_style());

    let mut status_base;
    if options.offline {
        session.feed_events(demo_events());
        status_base = "offline demo".to_string();
        info!("running offline demo");
    } else {
        // Command line overrides the configured world
        let host = match options.host.or_else(|| config.world.host.clone()) {
            Some(host) => host,
            None => {
                eprintln!("Error: no server given.");
                eprintln!("Pass one (mudterm HOST [PORT]) or set [world] in ~/.mudterm/config.toml");
                std::process::exit(1);
            }
        };
        let port = options.port.unwrap_or(config.world.port);

        info!("connecting to {}:{}", host, port);
        if let Err(e) = session.connect(&host, port) {
            error!("connect failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        status_base = format!("{}:{} - connected", host, port);
    }

    let (cols, rows) = Renderer::size()?;
    info!("terminal size: {}x{}", cols, rows);

    let mut renderer = Renderer::new();
    renderer.init()?;

    // Run main loop
    let result = run_main_loop(&mut session, &mut renderer, &mut status_base);

    // Cleanup - multiple attempts to ensure the console is restored
    let _ = renderer.cleanup();
    let _ = crossterm::terminal::disable_raw_mode();
    print!("\x1b[?1049l"); // Leave alternate screen
    print!("\x1b[?25h"); // Show cursor
    print!("\x1b[0m"); // Reset attributes
    let _ = std::io::stdout().flush();

    session.disconnect();
    info!("mudterm exiting");
    result
}

/// Main event loop
fn run_main_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    status_base: &mut String,
) -> anyhow::Result<()> {
    let poll_timeout = Duration::from_millis(10);
    let mut input = InputLine::new();
    let mut history = CommandHistory::new();
    let mut status_error: Option<String> = None;
    let mut hover: Option<String> = None;
    let mut dirty = true;

    loop {
        // Drain decoded output into the document
        let drained = session.process_output();
        if drained.bell {
            // The bell belongs to the terminal the user is looking at
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
        if drained.closed {
            info!("session ended");
            *status_base = "connection closed - Ctrl+C to quit".to_string();
            dirty = true;
        }
        if drained.changed {
            dirty = true;
        }

        if dirty {
            let status = compose_status(status_base, &status_error, &hover, renderer.is_scrolled());
            renderer.render(&session.document, &input, &status)?;
            dirty = false;
        }

        // Poll for events
        if event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    dirty = true;

                    // Quit keys
                    if key_event.modifiers.contains(KeyModifiers::CONTROL)
                        && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('d'))
                    {
                        break;
                    }

                    match key_event.code {
                        KeyCode::Enter => {
                            if session.is_connected() {
                                let text = input.take();
                                history.add(&text);
                                renderer.scroll_to_bottom();
                                match session.send_input(&text) {
                                    Ok(()) => status_error = None,
                                    Err(e) => {
                                        error!("send failed: {}", e);
                                        status_error = Some(e.to_string());
                                    }
                                }
                            } else {
                                status_error = Some("not connected".to_string());
                            }
                        }
                        KeyCode::Up => input.history_prev(&history),
                        KeyCode::Down => input.history_next(&history),
                        KeyCode::Left => input.move_left(),
                        KeyCode::Right => input.move_right(),
                        KeyCode::Home => input.move_home(),
                        KeyCode::End => input.move_end(),
                        KeyCode::Backspace => input.backspace(),
                        KeyCode::Delete => input.delete(),
                        KeyCode::PageUp => renderer.scroll_up(10),
                        KeyCode::PageDown => renderer.scroll_down(10),
                        KeyCode::Esc => {
                            // First return to live view, then clear input
                            if renderer.is_scrolled() {
                                renderer.scroll_to_bottom();
                            } else {
                                input.clear();
                            }
                        }
                        KeyCode::Char(c)
                            if !key_event.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            input.insert(c)
                        }
                        _ => dirty = false,
                    }
                }

                Event::Mouse(mouse_event) => match mouse_event.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        let payload = renderer
                            .link_at(mouse_event.column, mouse_event.row)
                            .map(str::to_owned);
                        if let Some(payload) = payload {
                            match session.handle_link_activation(&payload) {
                                Ok(Some(text)) => input.set_text(&text),
                                Ok(None) => {}
                                Err(e) => {
                                    error!("link send failed: {}", e);
                                    status_error = Some(e.to_string());
                                }
                            }
                            dirty = true;
                        }
                    }
                    MouseEventKind::Moved => {
                        let tooltip = renderer
                            .tooltip_at(mouse_event.column, mouse_event.row)
                            .map(str::to_owned);
                        if tooltip != hover {
                            hover = tooltip;
                            dirty = true;
                        }
                    }
                    MouseEventKind::ScrollUp => {
                        renderer.scroll_up(3);
                        dirty = true;
                    }
                    MouseEventKind::ScrollDown => {
                        renderer.scroll_down(3);
                        dirty = true;
                    }
                    _ => {}
                },

                Event::Resize(cols, rows) => {
                    info!("resize: {}x{}", cols, rows);
                    dirty = true;
                }

                _ => {}
            }
        }
    }

    Ok(())
}

/// Build the status line text for a frame
fn compose_status(
    base: &str,
    error: &Option<String>,
    hover: &Option<String>,
    scrolled: bool,
) -> String {
    let mut status = String::new();
    if scrolled {
        status.push_str("[SCROLL] ");
    }
    status.push_str(base);
    if let Some(error) = error {
        status.push_str(" | ");
        status.push_str(error);
    }
    if let Some(hover) = hover {
        status.push_str(" → ");
        status.push_str(hover);
    }
    status
}

/// Scripted session for `--offline`: shows off colors, effects, and both
/// kinds of action link without needing a server.
fn demo_events() -> Vec<OutputEvent> {
    let cyan = ColorValue::Ansi(6);
    let green = ColorValue::Ansi(2);
    let bg = ColorValue::Ansi(0);

    vec![
        OutputEvent::Text(
            TextFragment::new("Welcome to the mudterm demo.")
                .with_colors(cyan, bg)
                .with_flags(StyleFlags::BOLD),
        ),
        OutputEvent::LineBreak,
        OutputEvent::LineBreak,
        OutputEvent::Text(TextFragment::new(
            "You stand in a torchlit hall. A draft stirs the dust.",
        )),
        OutputEvent::LineBreak,
        OutputEvent::Text(TextFragment::new("Exits: ")),
        OutputEvent::Text(
            TextFragment::new("north")
                .with_colors(green, bg)
                .with_link(Link::new("north", Some("Walk north"), SendTo::World)),
        ),
        OutputEvent::Text(TextFragment::new("  ")),
        OutputEvent::Text(
            TextFragment::new("south")
                .with_colors(green, bg)
                .with_link(Link::new("south", Some("Walk south"), SendTo::World)),
        ),
        OutputEvent::LineBreak,
        OutputEvent::Text(TextFragment::new("A rusty ")),
        OutputEvent::Text(TextFragment::new("key").with_link(Link::new(
            "take &text;",
            None,
            SendTo::Input,
        ))),
        OutputEvent::Text(TextFragment::new(" lies on the floor.")),
        OutputEvent::LineBreak,
        OutputEvent::Text(TextFragment::new("> ")),
    ]
}
