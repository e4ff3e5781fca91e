//! starpew entry point
//!
//! Terminal demo wiring keyboard stand-ins for the phone sensors: arrow keys
//! synthesize tilt samples, shifted arrows twist the gyro, and typed words
//! committed with space or enter play the part of speech recognition (type
//! "pew" and hit space to fire). Esc or Ctrl-C quits.

use std::io::{self, BufWriter, Stdout, stdout};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use crossterm::{
    ExecutableCommand, cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use glam::{Vec2, Vec3};

use starpew::input::{
    FireQueue, MotionAccumulator, MotionInputSource, MotionPump, MotionSample, VoiceCommandSource,
    VoiceError, VoiceListener,
};
use starpew::render::{Rgba, Surface, TermSurface, TextAlign};
use starpew::runner::{FrameClock, Session, TickerClock};
use starpew::sim::state::WorldState;
use starpew::tuning::Tuning;

/// Accelerometer reading one arrow press stands for, in g.
const TILT: f32 = 0.5;
/// Gyroscope reading one shifted arrow press stands for.
const TWIST: f32 = 1.0;

const PROMPT_COLOR: Rgba = Rgba::opaque(130, 130, 130);

/// Arrow-key "accelerometer": samples arrive over a channel from the
/// event loop and block the pump thread until the sender hangs up.
struct KeyTilt {
    rx: mpsc::Receiver<MotionSample>,
}

impl MotionInputSource for KeyTilt {
    fn next_sample(&mut self) -> Option<MotionSample> {
        self.rx.recv().ok()
    }
}

/// Typed-word "speech recognizer": the event loop commits finished words
/// here and the voice listener polls them off.
#[derive(Clone, Default)]
struct TypedVoice {
    lines: Arc<std::sync::Mutex<std::collections::VecDeque<String>>>,
}

impl TypedVoice {
    fn speak(&self, line: String) {
        let mut lines = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push_back(line);
    }
}

impl VoiceCommandSource for TypedVoice {
    fn next_fragment(&mut self) -> Result<Option<String>, VoiceError> {
        let mut lines = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(lines.pop_front())
    }
}

/// Raw-mode alternate-screen session; the terminal is restored when this
/// drops, panic unwinds included.
struct RawScreen;

impl RawScreen {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let screen = Self;
        stdout().execute(terminal::EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        Ok(screen)
    }
}

impl Drop for RawScreen {
    fn drop(&mut self) {
        // The frame writer may be mid-borrow; restore through a fresh handle.
        let _ = stdout().execute(cursor::Show);
        let _ = stdout().execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let tuning = Tuning::load_or_default(Path::new("starpew.json"));
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    log::info!("starpew starting (seed {seed})");

    let _screen = RawScreen::enter()?;
    let mut out = BufWriter::new(stdout());

    // Blocking event reads stay on their own thread so the frame clock
    // never waits on terminal I/O.
    let (event_tx, event_rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    run(&mut out, &event_rx, tuning, seed)
}

fn run(
    out: &mut BufWriter<Stdout>,
    events: &mpsc::Receiver<Event>,
    tuning: Tuning,
    seed: u64,
) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let surface = TermSurface::new(cols, rows);
    let viewport = surface.viewport();

    let motion = Arc::new(MotionAccumulator::new(&tuning));
    let (sample_tx, sample_rx) = mpsc::channel();
    let pump = MotionPump::spawn(KeyTilt { rx: sample_rx }, Arc::clone(&motion));

    let fire_queue = Arc::new(FireQueue::new());
    let typed = TypedVoice::default();
    let listener = VoiceListener::spawn(typed.clone(), Arc::clone(&fire_queue));

    let world = WorldState::new(seed, tuning);
    let mut session = Session::new(world, viewport, motion, fire_queue, surface);

    let mut word_buffer = String::new();
    let mut quit = false;
    let mut failure: Option<io::Error> = None;

    TickerClock::default().run(|| {
        while let Ok(ev) = events.try_recv() {
            handle_event(ev, &sample_tx, &typed, &mut word_buffer, &mut quit, &mut session);
        }
        if quit {
            return false;
        }

        session.frame(listener.take_transcript());

        // Overlay the in-progress shout on the bottom row.
        let vp = session.surface().viewport();
        let prompt = format!("say> {word_buffer}");
        session.surface().text(
            &prompt,
            Vec2::new(10.0, vp.height - 10.0),
            20.0,
            TextAlign::Left,
            PROMPT_COLOR,
        );

        if let Err(e) = session.surface().present(out) {
            failure = Some(e);
            return false;
        }
        true
    });

    // Hang up the sample channel so the pump thread drains out.
    drop(sample_tx);
    pump.join();

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn handle_event(
    ev: Event,
    samples: &mpsc::Sender<MotionSample>,
    typed: &TypedVoice,
    word_buffer: &mut String,
    quit: &mut bool,
    session: &mut Session<TermSurface>,
) {
    match ev {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) => {
            if kind == KeyEventKind::Release {
                return;
            }
            let shifted = modifiers.contains(KeyModifiers::SHIFT);
            match code {
                KeyCode::Esc => *quit = true,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    *quit = true;
                }

                // Plain arrows tilt, shifted arrows twist the gyro.
                KeyCode::Up if shifted => twist(samples, Vec3::new(-TWIST, 0.0, 0.0)),
                KeyCode::Down if shifted => twist(samples, Vec3::new(TWIST, 0.0, 0.0)),
                KeyCode::Left if shifted => twist(samples, Vec3::new(0.0, -TWIST, 0.0)),
                KeyCode::Right if shifted => twist(samples, Vec3::new(0.0, TWIST, 0.0)),
                KeyCode::Up => tilt(samples, Vec2::new(0.0, TILT)),
                KeyCode::Down => tilt(samples, Vec2::new(0.0, -TILT)),
                KeyCode::Left => tilt(samples, Vec2::new(-TILT, 0.0)),
                KeyCode::Right => tilt(samples, Vec2::new(TILT, 0.0)),

                // Everything typed builds the shout.
                KeyCode::Backspace => {
                    word_buffer.pop();
                }
                KeyCode::Enter => commit(typed, word_buffer),
                KeyCode::Char(' ') => commit(typed, word_buffer),
                KeyCode::Char(ch) => word_buffer.push(ch),
                _ => {}
            }
        }
        Event::Resize(cols, rows) => {
            session.surface().resize(cols, rows);
            let viewport = session.surface().viewport();
            session.set_viewport(viewport);
        }
        _ => {}
    }
}

fn tilt(samples: &mpsc::Sender<MotionSample>, accel: Vec2) {
    let _ = samples.send(MotionSample {
        accel: Vec3::new(accel.x, accel.y, 0.0),
        gyro: Vec3::ZERO,
    });
}

fn twist(samples: &mpsc::Sender<MotionSample>, gyro: Vec3) {
    let _ = samples.send(MotionSample {
        accel: Vec3::ZERO,
        gyro,
    });
}

fn commit(typed: &TypedVoice, word_buffer: &mut String) {
    if word_buffer.is_empty() {
        return;
    }
    typed.speak(std::mem::take(word_buffer));
}
