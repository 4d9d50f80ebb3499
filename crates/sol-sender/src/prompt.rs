//! Interactive prompts.
//!
//! The shell drives a [`Prompter`]; [`TerminalPrompter`] talks to the real
//! terminal and [`ScriptedPrompter`] replays canned answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use owo_colors::OwoColorize;
use secrecy::SecretString;
use zeroize::Zeroizing;

pub trait Prompter {
    /// Hidden input. The answer never echoes and is wiped when dropped.
    fn password(&mut self, message: &str) -> io::Result<SecretString>;

    fn input(&mut self, message: &str) -> io::Result<String>;

    /// Pick one of `options`; returns its index.
    fn select(&mut self, message: &str, options: &[String], default: usize) -> io::Result<usize>;

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool>;

    /// Report a rejected answer before the question is asked again.
    fn invalid(&mut self, message: &str);
}

/// 1-based pick from a list; blank picks `default`.
pub fn parse_selection(answer: &str, len: usize, default: usize) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Some(default);
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// `y`/`yes`/`n`/`no`, case-insensitive; blank picks `default`.
pub fn parse_confirmation(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Prompts on stdout, answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ask(&self, message: &str, hint: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "{} {} {}", "?".green(), message.bold(), hint.dimmed())?;
        stdout.flush()
    }

    fn read_line(&self) -> io::Result<String> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Read a line in raw mode, echoing `*` per character.
    fn read_masked(&self) -> io::Result<Zeroizing<String>> {
        let _raw = RawMode::enable()?;
        let mut stdout = io::stdout();
        let mut buffer = Zeroizing::new(String::new());

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    write!(stdout, "\r\n")?;
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "input cancelled"));
                }
                KeyCode::Backspace => {
                    if buffer.pop().is_some() {
                        write!(stdout, "\u{8} \u{8}")?;
                    }
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    write!(stdout, "*")?;
                }
                _ => {}
            }
            stdout.flush()?;
        }
        write!(stdout, "\r\n")?;
        stdout.flush()?;
        Ok(buffer)
    }
}

/// Leaves raw mode on drop, including on early return.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

impl Prompter for TerminalPrompter {
    fn password(&mut self, message: &str) -> io::Result<SecretString> {
        self.ask(message, "")?;
        let answer = if io::stdin().is_terminal() {
            self.read_masked()?
        } else {
            Zeroizing::new(self.read_line()?)
        };
        Ok(SecretString::from(answer.trim().to_string()))
    }

    fn input(&mut self, message: &str) -> io::Result<String> {
        self.ask(message, "")?;
        self.read_line()
    }

    fn select(&mut self, message: &str, options: &[String], default: usize) -> io::Result<usize> {
        loop {
            println!("{} {}", "?".green(), message.bold());
            for (i, option) in options.iter().enumerate() {
                let marker = if i == default { ">" } else { " " };
                println!("  {} {}) {}", marker.cyan(), i + 1, option);
            }
            self.ask("Answer", &format!("(1-{}, default {})", options.len(), default + 1))?;
            match parse_selection(&self.read_line()?, options.len(), default) {
                Some(index) => return Ok(index),
                None => self.invalid(&format!("Enter a number from 1 to {}", options.len())),
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        loop {
            self.ask(message, hint)?;
            match parse_confirmation(&self.read_line()?, default) {
                Some(answer) => return Ok(answer),
                None => self.invalid("Please answer y or n"),
            }
        }
    }

    fn invalid(&mut self, message: &str) {
        println!("{} {}", ">>".red(), message.red());
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// Replays a fixed list of answers in order.
///
/// Selections are 1-based numbers and confirmations `y`/`n`; a blank answer
/// takes the default. Running out of answers is an `UnexpectedEof` error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
    rejections: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Every question asked, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Every validation message reported.
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> io::Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for {message:?}"),
            )
        })
    }
}

fn unparseable(answer: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unusable scripted answer {answer:?}"),
    )
}

impl Prompter for ScriptedPrompter {
    fn password(&mut self, message: &str) -> io::Result<SecretString> {
        self.next(message).map(SecretString::from)
    }

    fn input(&mut self, message: &str) -> io::Result<String> {
        self.next(message)
    }

    fn select(&mut self, message: &str, options: &[String], default: usize) -> io::Result<usize> {
        let answer = self.next(message)?;
        parse_selection(&answer, options.len(), default).ok_or_else(|| unparseable(&answer))
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        let answer = self.next(message)?;
        parse_confirmation(&answer, default).ok_or_else(|| unparseable(&answer))
    }

    fn invalid(&mut self, message: &str) {
        self.rejections.push(message.to_string());
    }
}
