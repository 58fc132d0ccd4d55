use std::io::{ self, BufRead };
use std::sync::mpsc;
use std::thread;
use std::time::{ Duration, Instant };

use tracing::{ debug, info, warn };

use crate::animation::AnimationState;
use crate::command::{ parse_line, Command, Parameters };
use crate::geometry::{ Renderable, Sample };
use crate::light::shade;
use crate::screen::Screen;
use crate::terminal::TerminalSink;

/// Messages from the input side to the frame loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// A complete new set of parameters, replacing the previous one.
    Update(Parameters),

    /// Text to show the user beneath the next frame.
    Notice(String),

    Terminate,
}

/// What a single tick of the frame loop produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Tick {
    /// A freshly drawn frame.
    Frame(String),

    /// The animation is paused; nothing was advanced or drawn.
    Paused,

    /// A `Terminate` message arrived; the loop should stop.
    Terminated,
}

/// The render side of the renderer.
///
/// Owns the animation state and the screen. Parameters only change between
/// frames: every `tick` first drains the channel without blocking, keeping
/// the newest `Parameters`, and then uses that one snapshot for the whole
/// frame.
pub struct FrameLoop<R: Renderable> {
    object: R,
    state: AnimationState,
    parameters: Parameters,
    screen: Screen,
    receiver: mpsc::Receiver<Message>,
    notices: Vec<String>,
    terminated: bool,
}

impl<R: Renderable> FrameLoop<R> {
    pub fn new(object: R, parameters: Parameters, screen: Screen,
        receiver: mpsc::Receiver<Message>) -> FrameLoop<R> {
        let state = AnimationState::new(parameters.speed1, parameters.speed2);

        FrameLoop {
            object,
            state,
            parameters,
            screen,
            receiver,
            notices: Vec::new(),
            terminated: false,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Takes the notices collected since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// The shaded samples for the current state and parameters.
    pub fn samples(&self) -> Vec<Sample> {
        let mut samples = self.object.samples(&self.state);
        shade(&mut samples, &self.parameters.light);

        samples
    }

    /// Picks up everything the input side has sent so far.
    fn sync(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(Message::Update(parameters)) => self.parameters = parameters,
                Ok(Message::Notice(text)) => self.notices.push(text),
                Ok(Message::Terminate) => self.terminated = true,

                // A closed channel only means no more input will come.
                Err(mpsc::TryRecvError::Empty)
                    | Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Runs one frame: advance, clear, generate, shade, project, draw.
    pub fn tick(&mut self) -> Tick {
        self.sync();
        if self.terminated {
            return Tick::Terminated;
        }

        let p = self.parameters;
        self.state = self.state.with_speeds(p.speed1, p.speed2);
        if p.paused {
            return Tick::Paused;
        }

        self.state = self.object.advance(self.state);
        self.screen.clear();

        let samples = self.samples();
        self.screen.project(&samples, p.k1, p.k2);

        debug!(
            angle1 = self.state.angle1,
            angle2 = self.state.angle2,
            samples = samples.len(),
            lit = self.screen.buffer().lit_cells(),
            "frame"
        );

        Tick::Frame(self.screen.draw())
    }
}

/// Starts the input side on its own thread.
///
/// Each line of `input` is parsed as a command. The thread keeps the
/// authoritative `Parameters`, and sends a whole new copy to the frame loop
/// after every accepted command. A malformed line changes nothing and is
/// reported back as a notice. The thread ends at end of input, on `quit`, or
/// once the frame loop has gone away.
pub fn spawn_input<B>(input: B, initial: Parameters,
    sender: mpsc::Sender<Message>) -> thread::JoinHandle<()>
    where B: BufRead + Send + 'static {
    thread::spawn(move || {
        let mut parameters = initial;

        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                },
            };

            let message = match parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => Message::Terminate,
                Ok(Some(command)) => {
                    parameters = parameters.apply(&command);
                    debug!(?command, "accepted command");
                    Message::Update(parameters)
                },
                Err(e) => {
                    warn!(line = %line, error = %e, "rejected command");
                    Message::Notice(format!("Invalid input: {}", e))
                },
            };

            let last = message == Message::Terminate;
            if sender.send(message).is_err() || last {
                break;
            }
        }

        debug!("input closed");
    })
}

/// Drives a `FrameLoop` at a fixed interval until it is told to stop.
///
/// A tick starts every `interval`, whether or not it draws anything. If
/// `limit` is set, at most that many ticks run.
pub fn run<R: Renderable>(frames: &mut FrameLoop<R>, sink: &mut TerminalSink,
    interval: Duration, limit: Option<u64>) -> io::Result<()> {
    info!(interval_ms = interval.as_millis() as u64, ?limit, "rendering");

    let mut ticks = 0;
    while limit.map_or(true, |l| ticks < l) {
        let started = Instant::now();
        ticks += 1;

        match frames.tick() {
            Tick::Frame(frame) => sink.present(&frame)?,
            Tick::Paused => {},
            Tick::Terminated => {
                info!(ticks, "terminated");
                break;
            },
        }

        for notice in frames.take_notices() {
            sink.notice(&notice)?;
        }

        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    Ok(())
}

#[cfg(test)]
fn test_loop(back_faces: crate::screen::BackFaces)
    -> (FrameLoop<crate::geometry::TorusShape>, mpsc::Sender<Message>) {
    use crate::geometry::TorusShape;
    use crate::glyph::GlyphRamp;
    use crate::screen::ScreenConfig;
    use crate::tuple::Vector3;

    let torus = TorusShape::new(1.0, 2.0, std::f64::consts::PI,
        std::f64::consts::PI).expect("valid torus");
    let config = ScreenConfig::new(10, 10, GlyphRamp::default(), back_faces)
        .expect("valid screen");
    let parameters = Parameters {
        speed1: 0.0,
        speed2: 0.0,
        k1: 10.0,
        k2: 5.0,
        light: Vector3::new(0.0, 0.0, 1.0),
        paused: false,
    };

    let (sender, receiver) = mpsc::channel();
    (FrameLoop::new(torus, parameters, Screen::new(config), receiver), sender)
}

#[cfg(test)]
const COARSE_TORUS_FRAME: &'static str = concat!(
    "          \n",
    "          \n",
    "          \n",
    "          \n",
    "          \n",
    "     @    \n",
    "          \n",
    "          \n",
    "          \n",
    "          \n",
);

#[test]
fn coarse_torus_frame() {
    use crate::screen::BackFaces;

    let (mut frames, _sender) = test_loop(BackFaces::Discard);

    // Four samples, all landing in the center cell. Two face the light; the
    // nearer of those, at z = -1, wins with full brightness.
    assert_eq!(frames.tick(), Tick::Frame(COARSE_TORUS_FRAME.into()));
    assert_eq!(frames.screen().buffer().depth_at(5, 5), Some(0.25));
    assert_eq!(frames.screen().buffer().lit_cells(), 1);
}

#[test]
fn coarse_torus_frame_with_back_faces() {
    use crate::screen::BackFaces;

    let (mut frames, _sender) = test_loop(BackFaces::Retain);

    // The unlit sample at z = -3 is nearest, so the cell goes blank.
    assert_eq!(frames.tick(), Tick::Frame("          \n".repeat(10)));
    assert_eq!(frames.screen().buffer().depth_at(5, 5), Some(0.5));
}

#[test]
fn update_applies_at_next_tick() {
    use crate::screen::BackFaces;
    use crate::tuple::Vector3;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    let dark = Parameters { light: Vector3::new(0.0, 0.0, 0.0),
        ..*frames.parameters() };

    sender.send(Message::Update(dark)).unwrap();
    assert_eq!(frames.tick(), Tick::Frame("          \n".repeat(10)));
    assert_eq!(frames.parameters().light, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn latest_update_wins() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    let base = *frames.parameters();

    sender.send(Message::Update(Parameters { speed1: 0.1, ..base })).unwrap();
    sender.send(Message::Update(Parameters { speed1: 0.2, ..base })).unwrap();
    frames.tick();

    assert_eq!(frames.parameters().speed1, 0.2);
    assert_eq!(frames.state().angle1, 0.2);
}

#[test]
fn tick_advances_angles() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    let spinning = Parameters { speed1: 0.5, speed2: 0.25,
        ..*frames.parameters() };
    sender.send(Message::Update(spinning)).unwrap();

    frames.tick();
    frames.tick();
    assert_eq!(frames.state().angle1, 1.0);
    assert_eq!(frames.state().angle2, 0.5);
}

#[test]
fn pause_freezes_animation() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    let base = Parameters { speed1: 0.3, speed2: 0.1,
        ..*frames.parameters() };
    sender.send(Message::Update(base)).unwrap();
    frames.tick();

    sender.send(Message::Update(base.apply(&Command::Stop))).unwrap();
    assert_eq!(frames.tick(), Tick::Paused);
    let first = frames.samples();
    let state = *frames.state();

    assert_eq!(frames.tick(), Tick::Paused);
    assert_eq!(frames.samples(), first);
    assert_eq!(*frames.state(), state);

    sender.send(Message::Update(base.apply(&Command::Start))).unwrap();
    assert!(matches!(frames.tick(), Tick::Frame(_)));
    assert!(frames.state().angle1 > state.angle1);
}

#[test]
fn terminate_stops_loop() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    sender.send(Message::Terminate).unwrap();

    assert_eq!(frames.tick(), Tick::Terminated);
    assert_eq!(frames.tick(), Tick::Terminated);
}

#[test]
fn closed_channel_keeps_rendering() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    drop(sender);

    assert!(matches!(frames.tick(), Tick::Frame(_)));
}

#[test]
fn notices_are_collected() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    sender.send(Message::Notice("one".into())).unwrap();
    sender.send(Message::Notice("two".into())).unwrap();
    frames.tick();

    assert_eq!(frames.take_notices(), vec!["one".to_string(), "two".into()]);
    assert!(frames.take_notices().is_empty());
}

#[test]
fn input_thread_publishes_snapshots() {
    use std::io::Cursor;
    use crate::screen::BackFaces;

    let (frames, _) = test_loop(BackFaces::Discard);
    let initial = *frames.parameters();
    let (sender, receiver) = mpsc::channel();

    let input = Cursor::new("s1 0.5\n\nl 1 x 3\nstop\nk2 7\nquit\ns2 9\n");
    spawn_input(input, initial, sender).join().unwrap();

    let messages: Vec<Message> = receiver.try_iter().collect();
    assert_eq!(messages.len(), 5);

    let after_s1 = Parameters { speed1: 0.5, ..initial };
    assert_eq!(messages[0], Message::Update(after_s1));
    assert!(matches!(&messages[1], Message::Notice(n)
        if n.starts_with("Invalid input")));

    let after_stop = Parameters { paused: true, ..after_s1 };
    assert_eq!(messages[2], Message::Update(after_stop));
    assert_eq!(messages[3], Message::Update(Parameters { k2: 7.0, ..after_stop }));
    assert_eq!(messages[4], Message::Terminate);
}

#[test]
fn input_thread_ends_at_end_of_input() {
    use std::io::Cursor;
    use crate::screen::BackFaces;

    let (frames, _) = test_loop(BackFaces::Discard);
    let (sender, receiver) = mpsc::channel();

    spawn_input(Cursor::new("start\n"), *frames.parameters(), sender)
        .join().unwrap();

    let messages: Vec<Message> = receiver.try_iter().collect();
    assert_eq!(messages.len(), 1);
    assert!(!messages.contains(&Message::Terminate));
}

#[test]
fn run_stops_at_limit() {
    use crate::screen::BackFaces;

    let (mut frames, _sender) = test_loop(BackFaces::Discard);
    let mut sink = TerminalSink::buffered(true);

    run(&mut frames, &mut sink, Duration::from_millis(1), Some(3)).unwrap();
    assert_eq!(sink.contents().matches(COARSE_TORUS_FRAME).count(), 3);
}

#[test]
fn run_stops_on_terminate() {
    use crate::screen::BackFaces;

    let (mut frames, sender) = test_loop(BackFaces::Discard);
    let mut sink = TerminalSink::buffered(true);
    sender.send(Message::Notice("bye".into())).unwrap();
    sender.send(Message::Terminate).unwrap();

    run(&mut frames, &mut sink, Duration::from_millis(1), None).unwrap();
    assert_eq!(sink.contents(), "");
}
