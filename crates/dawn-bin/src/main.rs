//! Dawn entrypoint.

use anyhow::Result;
use clap::Parser;
use core_actions::{Motion, apply_motion, backspace, delete_forward, insert_newline, insert_text};
use core_config::ThemeChoice;
use core_render::{RenderOpts, RecordingSurface, TermSurface, Theme, render_document};
use core_state::EditorState;
use core_terminal::{CrosstermBackend, TerminalCapabilities};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use std::fs;
use std::io::{Write, stdout};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "dawn", version, about = "Dawn Markdown editor")]
struct Args {
    /// Markdown file to open (a scratch buffer when omitted).
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `dawn.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Disable glyph scaling regardless of terminal support.
    #[arg(long = "no-scaling")]
    pub no_scaling: bool,
}

/// File logging switched on by `DAWN_LOG` (EnvFilter syntax); silent
/// otherwise so the alternate screen stays clean.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env("DAWN_LOG").ok()?;
    let appender = tracing_appender::rolling::never(".", "dawn.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging();
    let mut config = core_config::load_from(args.config.clone())?;

    let content = match &args.path {
        Some(p) => fs::read_to_string(p).unwrap_or_else(|e| {
            warn!(target: "startup", path = %p.display(), error = %e, "open_failed_scratch_buffer");
            String::new()
        }),
        None => String::new(),
    };
    let mut state = EditorState::new(&content);

    let caps = if config.file.render.scaling && !args.no_scaling {
        TerminalCapabilities::detect()
    } else {
        TerminalCapabilities::none()
    };
    let theme = match config.file.render.theme {
        ThemeChoice::Dark => Theme::Dark,
        ThemeChoice::Light => Theme::Light,
    };
    info!(target: "startup", path = ?args.path, ?caps, "dawn_started");

    let mut backend = CrosstermBackend::new();
    let guard = backend.enter_guard()?;
    let result = run(&mut state, &args, &mut config, theme, caps);
    drop(guard);
    result
}

fn save(state: &EditorState, path: &Option<PathBuf>) {
    if let Some(p) = path {
        match fs::write(p, state.buffer().to_string_lossy()) {
            Ok(()) => info!(target: "io", path = %p.display(), "saved"),
            Err(e) => warn!(target: "io", path = %p.display(), error = %e, "save_failed"),
        }
    }
}

fn run(
    state: &mut EditorState,
    args: &Args,
    config: &mut core_config::Config,
    theme: Theme,
    caps: TerminalCapabilities,
) -> Result<()> {
    let mut top_row = 0usize;
    loop {
        let (cols, rows) = crossterm::terminal::size()?;
        let width = match config.apply_viewport_width(cols) {
            0 => cols.max(4) as usize,
            w => w as usize,
        };
        let text_rows = rows.saturating_sub(1).max(1) as usize;

        // Geometry pass: find the cursor row, then clamp the scroll top.
        let mut opts = RenderOpts::new(width, theme, caps);
        let mut probe = RecordingSurface::new();
        let geo = render_document(state.buffer(), state.cache(), state.cursor, &opts, &mut probe)?;
        if geo.cursor_row < top_row {
            top_row = geo.cursor_row;
        } else if geo.cursor_row >= top_row + text_rows {
            top_row = geo.cursor_row + 1 - text_rows;
        }

        let mut out = TermSurface::new(stdout());
        execute!(stdout(), Hide)?;
        queue!(stdout(), MoveTo(0, 0), Clear(ClearType::All))?;
        opts.first_row = top_row;
        opts.max_rows = text_rows;
        let rd = render_document(state.buffer(), state.cache(), state.cursor, &opts, &mut out)?;
        out.flush()?;

        status_line(state, args, rows, rd.total_rows)?;
        let cursor_y = (rd.cursor_row - top_row).min(text_rows - 1) as u16;
        execute!(stdout(), MoveTo(rd.cursor_col as u16, cursor_y), Show)?;

        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if handle_key(state, args, key, width)? {
                    return Ok(());
                }
            }
            Event::Resize(..) => {}
            _ => {}
        }
    }
}

fn status_line(state: &mut EditorState, args: &Args, rows: u16, total_rows: usize) -> Result<()> {
    let name = args
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "[scratch]".to_string());
    let dirty = if state.dirty { "*" } else { "" };
    let words = state.word_count();
    let line = format!(
        " {name}{dirty}  {words} words  byte {}/{}  {} rows ",
        state.cursor,
        state.buffer().len(),
        total_rows
    );
    queue!(
        stdout(),
        MoveTo(0, rows.saturating_sub(1)),
        Clear(ClearType::CurrentLine),
        SetAttribute(Attribute::Reverse),
        Print(line),
        SetAttribute(Attribute::Reset)
    )?;
    stdout().flush()?;
    Ok(())
}

/// Returns true when the session should end.
fn handle_key(state: &mut EditorState, args: &Args, key: KeyEvent, width: usize) -> Result<bool> {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let mut motion = |state: &mut EditorState, m: Motion| {
        state.set_selecting(shift);
        apply_motion(state, m);
    };

    match key.code {
        KeyCode::Esc => {
            if state.is_selecting() {
                state.set_selecting(false);
            } else {
                return Ok(true);
            }
        }
        KeyCode::Char('q') if ctrl => return Ok(true),
        KeyCode::Char('s') if ctrl => {
            save(state, &args.path);
            state.dirty = false;
        }
        KeyCode::Char('z') if ctrl => {
            state.undo();
        }
        KeyCode::Char('y') if ctrl => {
            state.redo();
        }
        KeyCode::Left if ctrl => motion(state, Motion::WordLeft),
        KeyCode::Right if ctrl => motion(state, Motion::WordRight),
        KeyCode::Left => motion(state, Motion::Left),
        KeyCode::Right => motion(state, Motion::Right),
        KeyCode::Up => motion(state, Motion::VisualUp { width }),
        KeyCode::Down => motion(state, Motion::VisualDown { width }),
        KeyCode::Home if ctrl => motion(state, Motion::DocStart),
        KeyCode::End if ctrl => motion(state, Motion::DocEnd),
        KeyCode::Home => motion(state, Motion::LineStart),
        KeyCode::End => motion(state, Motion::LineEnd),
        KeyCode::PageUp => motion(state, Motion::BlockBackward),
        KeyCode::PageDown => motion(state, Motion::BlockForward),
        KeyCode::Backspace => backspace(state),
        KeyCode::Delete => delete_forward(state),
        KeyCode::Enter => insert_newline(state)?,
        KeyCode::Tab => insert_text(state, "\t")?,
        KeyCode::Char(c) if !ctrl => {
            let mut tmp = [0u8; 4];
            insert_text(state, c.encode_utf8(&mut tmp))?;
        }
        _ => {}
    }
    Ok(false)
}
