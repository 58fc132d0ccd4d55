use std::num::ParseFloatError;

use crate::tuple::Vector3;

/// The externally adjustable parameters, as seen by one frame.
///
/// A `Parameters` value is never edited in place while a frame uses it. The
/// input side builds a new value with `apply` and hands it over whole; the
/// frame loop picks up the latest one before it starts drawing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Radians added to `angle1` each frame.
    pub speed1: f64,

    /// Radians added to `angle2` each frame.
    pub speed2: f64,

    /// Perspective scale.
    pub k1: f64,

    /// Distance from the viewer to the object's origin.
    pub k2: f64,

    /// Direction towards the light. Its length scales brightness.
    pub light: Vector3,

    pub paused: bool,
}

impl Parameters {
    /// Returns the parameters with `command` applied.
    ///
    /// ```
    /// # use ascii_donut::command::{ Command, Parameters };
    /// # use ascii_donut::tuple::Vector3;
    /// let p = Parameters {
    ///     speed1: 0.0, speed2: 0.0, k1: 30.0, k2: 5.0,
    ///     light: Vector3::new(0.0, 0.0, -1.0), paused: false,
    /// };
    ///
    /// let p = p.apply(&Command::Speed1(0.1)).apply(&Command::Stop);
    /// assert_eq!(p.speed1, 0.1);
    /// assert!(p.paused);
    /// ```
    pub fn apply(&self, command: &Command) -> Parameters {
        let mut next = *self;

        match *command {
            Command::Speed(s) => {
                next.speed1 = s;
                next.speed2 = s;
            },
            Command::Speed1(s) => next.speed1 = s,
            Command::Speed2(s) => next.speed2 = s,
            Command::K1(k) => next.k1 = k,
            Command::K2(k) => next.k2 = k,
            Command::Light(l) => next.light = l,
            Command::Stop => next.paused = true,
            Command::Start => next.paused = false,
            Command::Quit => {},
        }

        next
    }
}

/// A single line of input, parsed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// A bare number: sets both speeds.
    Speed(f64),

    /// `s1 <speed>`
    Speed1(f64),

    /// `s2 <speed>`
    Speed2(f64),

    /// `k1 <scale>`
    K1(f64),

    /// `k2 <distance>`
    K2(f64),

    /// `l <x> <y> <z>`
    Light(Vector3),

    /// `stop`: freeze the animation.
    Stop,

    /// `start`: resume the animation.
    Start,

    /// `quit` or `exit`: shut the renderer down.
    Quit,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command `{0}`")]
    Unknown(String),

    #[error("`{command}` takes {expected} argument(s), got {got}")]
    Arity { command: String, expected: usize, got: usize },

    #[error("Invalid number `{token}`: {source}")]
    Number { token: String, source: ParseFloatError },

    #[error("`{0}` is not a finite number")]
    NotFinite(String),
}

/// Parses one line of input.
///
/// Tokens are separated by whitespace and keywords are case-insensitive. A
/// blank line is not an error and parses to `None`. Either every argument of
/// a command parses, or the whole line is rejected.
///
/// # Examples
///
/// ```
/// # use ascii_donut::command::{ parse_line, Command };
/// # use ascii_donut::tuple::Vector3;
/// assert_eq!(parse_line("s1 0.05"), Ok(Some(Command::Speed1(0.05))));
/// assert_eq!(parse_line("  "), Ok(None));
/// assert_eq!(parse_line("l 0 1 -1"),
///     Ok(Some(Command::Light(Vector3::new(0.0, 1.0, -1.0)))));
/// assert!(parse_line("l 0 one -1").is_err());
/// ```
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (head, args) = match tokens.split_first() {
        Some((head, args)) => (*head, args),
        None => return Ok(None),
    };

    let keyword = head.to_ascii_lowercase();
    let command = match keyword.as_str() {
        "s1" => Command::Speed1(single(head, args)?),
        "s2" => Command::Speed2(single(head, args)?),
        "k1" => Command::K1(single(head, args)?),
        "k2" => Command::K2(single(head, args)?),
        "l" => {
            expect_args(head, args, 3)?;
            Command::Light(Vector3::new(
                number(args[0])?,
                number(args[1])?,
                number(args[2])?,
            ))
        },
        "stop" => {
            expect_args(head, args, 0)?;
            Command::Stop
        },
        "start" => {
            expect_args(head, args, 0)?;
            Command::Start
        },
        "quit" | "exit" => {
            expect_args(head, args, 0)?;
            Command::Quit
        },
        _ => {
            // Anything else must be a lone number.
            if head.parse::<f64>().is_err() {
                return Err(CommandError::Unknown(head.into()));
            }

            Command::Speed(single_bare(head, args)?)
        },
    };

    Ok(Some(command))
}

fn expect_args(command: &str, args: &[&str], expected: usize)
    -> Result<(), CommandError> {
    if args.len() != expected {
        return Err(CommandError::Arity {
            command: command.into(),
            expected,
            got: args.len(),
        });
    }

    Ok(())
}

fn single(command: &str, args: &[&str]) -> Result<f64, CommandError> {
    expect_args(command, args, 1)?;
    number(args[0])
}

fn single_bare(token: &str, rest: &[&str]) -> Result<f64, CommandError> {
    if !rest.is_empty() {
        return Err(CommandError::Unknown(token.into()));
    }

    number(token)
}

fn number(token: &str) -> Result<f64, CommandError> {
    let value: f64 = token.parse().map_err(|source| CommandError::Number {
        token: token.into(),
        source,
    })?;

    if !value.is_finite() {
        return Err(CommandError::NotFinite(token.into()));
    }

    Ok(value)
}

#[cfg(test)]
fn params() -> Parameters {
    Parameters {
        speed1: 0.04,
        speed2: 0.02,
        k1: 30.0,
        k2: 5.0,
        light: Vector3::new(0.0, -1.0, -1.0),
        paused: false,
    }
}

#[test]
fn parse_speed_commands() {
    assert_eq!(parse_line("s1 0.5"), Ok(Some(Command::Speed1(0.5))));
    assert_eq!(parse_line("s2 -1"), Ok(Some(Command::Speed2(-1.0))));
    assert_eq!(parse_line("S1 2e-2"), Ok(Some(Command::Speed1(0.02))));
}

#[test]
fn parse_bare_number() {
    assert_eq!(parse_line("0.1"), Ok(Some(Command::Speed(0.1))));
    assert_eq!(parse_line("  3 "), Ok(Some(Command::Speed(3.0))));
    assert_eq!(parse_line("3 4"), Err(CommandError::Unknown("3".into())));
}

#[test]
fn parse_perspective_commands() {
    assert_eq!(parse_line("k1 40"), Ok(Some(Command::K1(40.0))));
    assert_eq!(parse_line("k2\t6.5"), Ok(Some(Command::K2(6.5))));
}

#[test]
fn parse_light_command() {
    assert_eq!(parse_line("l 1 2 3"),
        Ok(Some(Command::Light(Vector3::new(1.0, 2.0, 3.0)))));
}

#[test]
fn parse_pause_commands() {
    assert_eq!(parse_line("stop"), Ok(Some(Command::Stop)));
    assert_eq!(parse_line("START"), Ok(Some(Command::Start)));
    assert_eq!(parse_line("quit"), Ok(Some(Command::Quit)));
    assert_eq!(parse_line("exit"), Ok(Some(Command::Quit)));
}

#[test]
fn parse_blank_line() {
    assert_eq!(parse_line(""), Ok(None));
    assert_eq!(parse_line(" \t "), Ok(None));
}

#[test]
fn parse_malformed_number() {
    match parse_line("s1 fast") {
        Err(CommandError::Number { token, .. }) => assert_eq!(token, "fast"),
        other => panic!("Expected a number error, got {:?}", other),
    }
}

#[test]
fn parse_light_is_all_or_nothing() {
    assert!(matches!(parse_line("l 1 2 x"),
        Err(CommandError::Number { .. })));
    assert!(matches!(parse_line("l 1 2"),
        Err(CommandError::Arity { expected: 3, got: 2, .. })));
}

#[test]
fn parse_rejects_non_finite() {
    assert_eq!(parse_line("k2 inf"),
        Err(CommandError::NotFinite("inf".into())));
    assert_eq!(parse_line("NaN"),
        Err(CommandError::NotFinite("NaN".into())));
}

#[test]
fn parse_unknown_and_arity() {
    assert_eq!(parse_line("spin 3"),
        Err(CommandError::Unknown("spin".into())));
    assert!(matches!(parse_line("s1"),
        Err(CommandError::Arity { expected: 1, got: 0, .. })));
    assert!(matches!(parse_line("stop now"),
        Err(CommandError::Arity { expected: 0, got: 1, .. })));
}

#[test]
fn error_messages_are_readable() {
    let e = parse_line("k1 big").unwrap_err();
    assert!(e.to_string().starts_with("Invalid number `big`"));

    let e = parse_line("l 1").unwrap_err();
    assert_eq!(e.to_string(), "`l` takes 3 argument(s), got 1");
}

#[test]
fn apply_each_command() {
    let p = params();

    assert_eq!(p.apply(&Command::Speed(0.5)).speed1, 0.5);
    assert_eq!(p.apply(&Command::Speed(0.5)).speed2, 0.5);
    assert_eq!(p.apply(&Command::Speed1(0.3)).speed2, 0.02);
    assert_eq!(p.apply(&Command::Speed2(0.3)).speed2, 0.3);
    assert_eq!(p.apply(&Command::K1(12.0)).k1, 12.0);
    assert_eq!(p.apply(&Command::K2(9.0)).k2, 9.0);
    assert_eq!(p.apply(&Command::Light(Vector3::new(1.0, 0.0, 0.0))).light,
        Vector3::new(1.0, 0.0, 0.0));
    assert!(p.apply(&Command::Stop).paused);
    assert!(!p.apply(&Command::Stop).apply(&Command::Start).paused);
    assert_eq!(p.apply(&Command::Quit), p);
}

#[test]
fn apply_leaves_original_untouched() {
    let p = params();
    let q = p.apply(&Command::K1(1.0));

    assert_eq!(p.k1, 30.0);
    assert_eq!(q.k1, 1.0);
}
