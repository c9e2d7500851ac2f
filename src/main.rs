mod display;
mod input;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use space_defender::config::{self, GameConfig, LogConfig};
use space_defender::entities::{SessionStatus, SoundCue};
use space_defender::platform::{AudioSink, InputState, Prompt};
use space_defender::session::{Continuation, GameSession};

use display::{TerminalCanvas, Viewport};
use input::HeldKeys;

// ── Logging ───────────────────────────────────────────────────────────────────

/// The screen belongs to the game, so logs go to a file.
fn init_tracing(cfg: &LogConfig) -> anyhow::Result<()> {
    let file = File::create(&cfg.file)
        .with_context(|| format!("create log file {}", cfg.file.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();

    std::panic::set_hook(Box::new(|info| {
        let _ = terminal::disable_raw_mode();
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

// ── Platform adapters ─────────────────────────────────────────────────────────

/// Terminals have no mixer; a hit rings the bell and every cue is logged.
#[derive(Debug, Default)]
struct TerminalAudio {
    bell: bool,
}

impl AudioSink for TerminalAudio {
    fn play(&mut self, cue: SoundCue) {
        debug!(?cue, "sound");
        if cue == SoundCue::ShipHit {
            self.bell = true;
        }
    }
}

impl TerminalAudio {
    fn flush<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        if std::mem::take(&mut self.bell) {
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }
}

/// Yes/no question drawn over the play field, answered with Y/Enter or N/Esc.
struct TerminalPrompt<'a, W: Write> {
    out: &'a mut W,
    rx: &'a mpsc::Receiver<Event>,
    fullscreen: bool,
}

impl<W: Write> TerminalPrompt<'_, W> {
    fn show(&mut self, message: &str) -> std::io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let view = Viewport::fit((cols, rows), self.fullscreen);
        let cx = view.col + view.cols / 2;
        let mut row = view.row + view.rows / 2 + 3;

        let lines = message
            .lines()
            .filter(|l| !l.trim().is_empty())
            .chain(std::iter::once("[Y]es / [N]o"));
        for line in lines {
            let col = cx.saturating_sub(line.chars().count() as u16 / 2);
            self.out.queue(cursor::MoveTo(col, row))?;
            self.out.queue(style::SetForegroundColor(Color::White))?;
            self.out.queue(Print(line))?;
            row += 1;
        }
        self.out.queue(style::ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write> Prompt for TerminalPrompt<'_, W> {
    fn confirm(&mut self, message: &str) -> bool {
        if let Err(e) = self.show(message) {
            warn!(error = %e, "could not draw prompt");
        }
        loop {
            match self.rx.recv() {
                Ok(Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                })) => match code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => return true,
                    KeyCode::Char('n')
                    | KeyCode::Char('N')
                    | KeyCode::Char('q')
                    | KeyCode::Char('Q')
                    | KeyCode::Esc => return false,
                    _ => {}
                },
                Ok(_) => {}
                // Reader thread gone: nobody can answer.
                Err(_) => return false,
            }
        }
    }
}

// ── Terminal restore ──────────────────────────────────────────────────────────

/// Undo everything `main` did to the terminal.
fn restore_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) -> std::io::Result<()> {
    if keyboard_enhanced {
        out.queue(PopKeyboardEnhancementFlags)?;
    }
    out.queue(cursor::Show)?;
    out.queue(terminal::LeaveAlternateScreen)?;
    out.flush()
}

/// Restores the terminal when dropped, including while unwinding a panic.
#[derive(Debug, Default)]
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(&mut stdout(), self.keyboard_enhanced) {
            warn!(error = %e, "could not restore terminal");
        }
        let _ = terminal::disable_raw_mode();
    }
}

// ── Frame ─────────────────────────────────────────────────────────────────────

fn draw_frame<W: Write>(
    out: &mut W,
    session: &GameSession,
    fullscreen: bool,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let view = Viewport::fit((cols, rows), fullscreen);

    let mut canvas = TerminalCanvas::new(out, view);
    session.render(&mut canvas);
    canvas.finish()?;

    display::draw_status_banner(out, view, session.status(), session.score())?;
    display::draw_controls_hint(out, rows)?;
    display::present(out, rows)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// The scheduler: ticks and renders at a fixed cadence while the session is
/// running. Pausing or losing stops the ticks; the screen is then only
/// redrawn when something visible changes (a toggle or a resize).
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let frame_time = session.config().tick_interval();
    let mut keys = HeldKeys::default();
    let mut previous = InputState::default();
    let mut audio = TerminalAudio::default();
    let mut fullscreen = false;
    let mut dirty = true;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => {
                    if keys.observe(key, frame) {
                        return Ok(());
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        let input = keys.snapshot(frame);
        let pressed = input.rising_edges(&previous);
        previous = input;
        if pressed.pause {
            session.toggle_pause();
            dirty = true;
        }
        if pressed.fullscreen {
            fullscreen = !fullscreen;
            info!(fullscreen, "display mode toggled");
            dirty = true;
        }

        if session.status() == SessionStatus::Running {
            let outcome = session.advance_tick(&input, rng, &mut audio);
            draw_frame(out, session, fullscreen)?;
            audio.flush(out)?;
            dirty = false;

            if outcome.game_over {
                let mut prompt = TerminalPrompt {
                    out: &mut *out,
                    rx,
                    fullscreen,
                };
                if let Some(Continuation::Restarted) = session.conclude(&mut prompt, rng) {
                    keys = HeldKeys::default();
                    previous = InputState::default();
                }
                // Declining leaves the session over; only quitting remains.
                dirty = true;
            }
        } else if dirty {
            draw_frame(out, session, fullscreen)?;
            dirty = false;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let path = config::config_path();
    let (cfg, load_error) = GameConfig::load_or_default(&path);
    init_tracing(&cfg.log)?;

    match load_error {
        Some(e) if e.is_not_found() => info!(path = %path.display(), "no config file; using defaults"),
        Some(e) => warn!(error = %e, "config rejected; using defaults"),
        None => info!(path = %path.display(), "config loaded"),
    }
    for warning in cfg.validate() {
        warn!("config: {warning}");
    }

    let mut rng = match cfg.game.seed {
        Some(seed) => {
            info!(seed, "seeded run");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut session = GameSession::new(cfg, &mut rng).context("start session")?;
    // Terminal glyphs need no loading.
    session.sprites_mut().mark_all_ready();

    terminal::enable_raw_mode().context("enable raw mode")?;
    // Declared before `out` so the writer's last flush lands on the
    // alternate screen before the guard leaves it.
    let mut guard = TerminalGuard::default();
    let mut out = BufWriter::new(stdout());

    out.execute(terminal::EnterAlternateScreen)
        .context("enter alternate screen")?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    guard.keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut session, &mut rng, &rx);

    info!(score = session.score(), "exiting");
    result.context("game loop")
}
