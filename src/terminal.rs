//! Presenting frames on a terminal.

use std::convert::TryFrom;
use std::io::{ self, BufWriter, Stdout, Write };

use crossterm::{
    cursor,
    execute,
    queue,
    style::Print,
    terminal::{ Clear, ClearType },
};

use crate::consts::NOTICE_FRAMES;

enum Output {
    Stdout(BufWriter<Stdout>),
    Buffer(Vec<u8>),
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(out) => out.write(buf),
            Output::Buffer(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(out) => out.flush(),
            Output::Buffer(out) => out.flush(),
        }
    }
}

/// Where finished frames go.
///
/// By default every frame is drawn over the previous one from the top-left
/// corner, with the cursor hidden while rendering. Notices are printed on the
/// line below the frame and wiped once that many frames have been drawn
/// after them (`NOTICE_FRAMES` unless changed). In plain mode frames and notices are written one
/// after another with no escape codes, which suits pipes and log files.
///
/// The cursor is shown again when the sink is dropped.
pub struct TerminalSink {
    out: Output,
    plain: bool,
    started: bool,
    rows: u16,

    notice_frames: u32,
    notice_age: Option<u32>,
}

impl TerminalSink {
    pub fn stdout(plain: bool) -> TerminalSink {
        TerminalSink::with_output(Output::Stdout(BufWriter::new(io::stdout())), plain)
    }

    /// A sink that keeps everything in memory; see `contents`.
    pub fn buffered(plain: bool) -> TerminalSink {
        TerminalSink::with_output(Output::Buffer(Vec::new()), plain)
    }

    fn with_output(out: Output, plain: bool) -> TerminalSink {
        TerminalSink {
            out,
            plain,
            started: false,
            rows: 0,
            notice_frames: NOTICE_FRAMES,
            notice_age: None,
        }
    }

    /// Sets how many frames a notice outlives.
    pub fn with_notice_frames(mut self, notice_frames: u32) -> TerminalSink {
        self.notice_frames = notice_frames;
        self
    }

    /// Everything written so far, if this sink is buffered.
    pub fn contents(&self) -> String {
        match &self.out {
            Output::Buffer(buf) => String::from_utf8_lossy(buf).into_owned(),
            Output::Stdout(_) => String::new(),
        }
    }

    pub fn present(&mut self, frame: &str) -> io::Result<()> {
        if self.plain {
            self.out.write_all(frame.as_bytes())?;
            writeln!(self.out)?;
            return self.out.flush();
        }

        if !self.started {
            queue!(self.out, Clear(ClearType::All), cursor::Hide)?;
            self.started = true;
        }

        queue!(self.out, cursor::MoveTo(0, 0))?;
        let mut rows: usize = 0;
        for line in frame.lines() {
            queue!(
                self.out,
                Print(line),
                Clear(ClearType::UntilNewLine),
                cursor::MoveToNextLine(1)
            )?;
            rows += 1;
        }
        self.rows = u16::try_from(rows).unwrap_or(u16::MAX);

        if let Some(age) = self.notice_age {
            if age >= self.notice_frames {
                queue!(
                    self.out,
                    cursor::MoveTo(0, self.rows),
                    Clear(ClearType::CurrentLine)
                )?;
                self.notice_age = None;
            } else {
                self.notice_age = Some(age + 1);
            }
        }

        self.out.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        if self.plain {
            writeln!(self.out, "{}", text)?;
            return self.out.flush();
        }

        queue!(
            self.out,
            cursor::MoveTo(0, self.rows),
            Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.notice_age = Some(0);

        self.out.flush()
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        if self.started {
            let _ = execute!(
                self.out,
                cursor::MoveTo(0, self.rows.saturating_add(1)),
                cursor::Show
            );
        }
    }
}

#[test]
fn plain_frames_are_verbatim() {
    let mut sink = TerminalSink::buffered(true);
    sink.present("ab\ncd\n").unwrap();
    sink.present("ef\ngh\n").unwrap();

    assert_eq!(sink.contents(), "ab\ncd\n\nef\ngh\n\n");
}

#[test]
fn plain_notice_is_a_line() {
    let mut sink = TerminalSink::buffered(true);
    sink.notice("Invalid input: x").unwrap();

    assert_eq!(sink.contents(), "Invalid input: x\n");
}

#[test]
fn plain_sink_writes_no_escapes() {
    let mut sink = TerminalSink::buffered(true);
    sink.present(" @ \n").unwrap();
    sink.notice("hello").unwrap();

    assert!(!sink.contents().contains('\x1b'));
}

#[test]
fn terminal_frames_redraw_in_place() {
    let mut sink = TerminalSink::buffered(false);
    sink.present("ab\ncd\n").unwrap();
    sink.present("ef\ngh\n").unwrap();

    let out = sink.contents();
    assert!(out.contains("\x1b[?25l"));
    assert_eq!(out.matches("\x1b[2J").count(), 1);
    assert_eq!(out.matches("\x1b[1;1H").count(), 2);
    assert!(out.contains("ab") && out.contains("gh"));
    assert!(!out.contains("ab\n"));
}

#[test]
fn terminal_notice_goes_below_frame() {
    let mut sink = TerminalSink::buffered(false);
    sink.present("a\nb\nc\n").unwrap();
    sink.notice("hi").unwrap();

    // Rows are zero-based in the API and one-based on the wire.
    assert!(sink.contents().ends_with("\x1b[4;1H\x1b[2Khi"));
}

#[test]
fn terminal_notice_is_wiped_later() {
    const WIPE: &str = "\x1b[4;1H\x1b[2K";

    let mut sink = TerminalSink::buffered(false).with_notice_frames(1);
    sink.present("a\nb\nc\n").unwrap();
    sink.notice("hi").unwrap();

    sink.present("a\nb\nc\n").unwrap();
    assert!(!sink.contents().ends_with(WIPE));

    sink.present("a\nb\nc\n").unwrap();
    assert!(sink.contents().ends_with(WIPE));

    // Wiped once only.
    sink.present("a\nb\nc\n").unwrap();
    assert!(!sink.contents().ends_with(WIPE));
    assert_eq!(sink.contents().matches(WIPE).count(), 2);
}

#[test]
fn new_notice_restarts_the_count() {
    let mut sink = TerminalSink::buffered(false).with_notice_frames(0);
    sink.present("a\n").unwrap();
    sink.notice("one").unwrap();
    sink.notice("two").unwrap();

    sink.present("a\n").unwrap();
    assert!(sink.contents().ends_with("\x1b[2;1H\x1b[2K"));
}
