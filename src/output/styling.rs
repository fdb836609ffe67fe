use std::fmt::Display;

use console::{style, StyledObject};

/// What a command did to the server; picks the colour of its report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Added,
    Changed,
    Removed,
    Noted,
}

impl Outcome {
    fn paint(self, verb: &str) -> StyledObject<&str> {
        let verb = style(verb).bold();
        match self {
            Self::Added => verb.green(),
            Self::Changed => verb.yellow(),
            Self::Removed => verb.red(),
            Self::Noted => verb.cyan(),
        }
    }
}

/// Prints `<verb> <subject>` to stderr so stdout only carries data.
pub fn report(outcome: Outcome, verb: &str, subject: impl Display) {
    eprintln!("{}", report_line(outcome, verb, subject));
}

fn report_line(outcome: Outcome, verb: &str, subject: impl Display) -> String {
    let subject = subject.to_string();
    if subject.is_empty() {
        outcome.paint(verb).to_string()
    } else {
        format!("{} {subject}", outcome.paint(verb))
    }
}

pub fn title(text: &str) -> StyledObject<&str> {
    style(text).magenta().bold()
}

pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}
