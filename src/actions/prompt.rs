//! Line-based terminal prompting.
//!
//! The deletion policies ask two kinds of questions: a global yes/no
//! confirmation and, in interactive mode, which file of a group to keep.
//! Both go through the [`Prompter`] trait so tests can script the answers.
//!
//! Invalid answers are re-asked; running out of input is an error
//! (`UnexpectedEof`) rather than an implicit default.

use std::io::{self, BufRead, Write};

/// Source of answers to the deletion policies' questions.
pub trait Prompter {
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if input or output fails, `UnexpectedEof` if input ends.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Ask which of `count` listed files to keep, 1-based; `0` keeps them all.
    ///
    /// The returned value is always within `0..=count`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if input or output fails, `UnexpectedEof` if input ends.
    fn choose_keep(&mut self, count: usize) -> io::Result<usize>;
}

/// Parse a yes/no answer, case-insensitively.
#[must_use]
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a keep choice within `0..=count`.
#[must_use]
pub fn parse_keep(answer: &str, count: usize) -> Option<usize> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&choice| choice <= count)
}

/// [`Prompter`] reading answers line by line from `input` and writing the
/// questions to `output`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Create a prompter over arbitrary reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning the output writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `prompt` and read answers until `parse` accepts one.
    fn ask<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Option<T>) -> io::Result<T> {
        let mut line = String::new();
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input ended before an answer was given",
                ));
            }
            match parse(&line) {
                Some(value) => return Ok(value),
                None => log::debug!("Rejected answer {:?}", line.trim()),
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.ask(&format!("{question} y/n: "), parse_yes_no)
    }

    fn choose_keep(&mut self, count: usize) -> io::Result<usize> {
        self.ask(&format!("Preserve file: (1 - {count}, 0 for all): "), |answer| {
            parse_keep(answer, count)
        })
    }
}
