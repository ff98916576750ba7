use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Source of answers for interactive questions. Every answer is one line
/// with surrounding whitespace trimmed.
pub trait Prompt {
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Prints a line that is not a question (menus, notices).
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Reads answers from stdin, writes questions to stdout.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for ConsolePrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        println!("{}", message);
        Ok(())
    }
}

/// Canned answers, handed out in order. Running out yields empty answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    /// Every question asked, in order.
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .map(|a| a.trim().to_string())
            .unwrap_or_default())
    }

    fn say(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Blocks until a single key is pressed. Without a terminal, waits for one
/// line (or end of input) on stdin instead.
pub fn wait_for_keypress(message: &str) -> io::Result<()> {
    print!("{}", message);
    io::stdout().flush()?;

    if enable_raw_mode().is_err() {
        return wait_for_line(&mut io::stdin().lock());
    }
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(err) => break Err(err),
        }
    };
    disable_raw_mode()?;
    println!();
    result
}

fn wait_for_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
