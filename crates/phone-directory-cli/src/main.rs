use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use phone_directory_core::{Command, Directory, DirectoryError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const MENU: &str = "a - Show all records\n\
    d - Delete the current record\n\
    f - Change the first name in the current record\n\
    l - Change the last name in the current record\n\
    n - Add a new record\n\
    p - Change the phone number in the current record\n\
    q - Quit\n\
    s - Select a record from the record list to become the current record";

#[derive(Debug, Parser)]
#[command(name = "pd")]
#[command(about = "Interactive phone directory")]
struct Cli {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    ShowAll,
    Delete,
    ChangeFirstName,
    ChangeLastName,
    Add,
    ChangePhoneNumber,
    Quit,
    Select,
}

impl MenuChoice {
    fn parse(choice: char) -> Option<Self> {
        match choice.to_ascii_lowercase() {
            'a' => Some(Self::ShowAll),
            'd' => Some(Self::Delete),
            'f' => Some(Self::ChangeFirstName),
            'l' => Some(Self::ChangeLastName),
            'n' => Some(Self::Add),
            'p' => Some(Self::ChangePhoneNumber),
            'q' => Some(Self::Quit),
            's' => Some(Self::Select),
            _ => None,
        }
    }

    fn requires_selection(self) -> bool {
        matches!(self, Self::ChangeFirstName | Self::ChangeLastName | Self::ChangePhoneNumber)
    }
}

fn main() -> Result<()> {
    let Cli {} = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(&mut stdin.lock(), &mut stdout.lock())
}

/// Prompt on `output` and read one whitespace-trimmed input line. `None`
/// means end of input; the session treats that as a request to quit.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Read the field values a menu choice needs and build its command. `None`
/// means the input ended mid-command.
fn read_command<R: BufRead, W: Write>(
    choice: MenuChoice,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Command>> {
    let command = match choice {
        MenuChoice::ShowAll => Command::ShowAll,
        MenuChoice::Delete => Command::Delete,
        MenuChoice::Add => {
            let Some(first_name) =
                prompt(input, output, "Please enter the first name for the record: ")?
            else {
                return Ok(None);
            };
            let Some(last_name) =
                prompt(input, output, "Please enter the last name for the record: ")?
            else {
                return Ok(None);
            };
            let Some(phone_number) =
                prompt(input, output, "Please enter the phone number for the record: ")?
            else {
                return Ok(None);
            };
            Command::Add { first_name, last_name, phone_number }
        }
        MenuChoice::ChangeFirstName => {
            let Some(first_name) =
                prompt(input, output, "Please enter the new first name for the record: ")?
            else {
                return Ok(None);
            };
            Command::ChangeFirstName { first_name }
        }
        MenuChoice::ChangeLastName => {
            let Some(last_name) =
                prompt(input, output, "Please enter the new last name for the record: ")?
            else {
                return Ok(None);
            };
            Command::ChangeLastName { last_name }
        }
        MenuChoice::ChangePhoneNumber => {
            let Some(phone_number) =
                prompt(input, output, "Please enter the new phone number for the record: ")?
            else {
                return Ok(None);
            };
            Command::ChangePhoneNumber { phone_number }
        }
        MenuChoice::Select => {
            let Some(first_name) = prompt(input, output, "Enter first name: ")? else {
                return Ok(None);
            };
            let Some(last_name) = prompt(input, output, "Enter last name: ")? else {
                return Ok(None);
            };
            Command::Select { first_name, last_name }
        }
        MenuChoice::Quit => return Ok(None),
    };
    Ok(Some(command))
}

/// One interactive session over a fresh directory. Runs until the user quits
/// or the input ends.
fn run_session<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    let mut directory = Directory::new();

    loop {
        writeln!(output, "{MENU}")?;
        let Some(answer) = prompt(input, output, "Please select an option from the menu: ")?
        else {
            break;
        };
        let Some(choice) = answer.chars().next().and_then(MenuChoice::parse) else {
            writeln!(output, "Invalid option; please try again")?;
            continue;
        };
        if choice == MenuChoice::Quit {
            break;
        }

        // guard before prompting: a change with nothing selected and a select
        // against an empty directory report their condition without asking
        // for field values first
        if choice.requires_selection() && directory.current().is_none() {
            writeln!(output, "{}", DirectoryError::NoCurrentSelection)?;
            continue;
        }
        if choice == MenuChoice::Select && directory.is_empty() {
            writeln!(output, "{}", DirectoryError::EmptyDirectory)?;
            continue;
        }

        let Some(command) = read_command(choice, input, output)? else {
            break;
        };
        debug!(?choice, "dispatching command");
        let outcome = directory.execute(command);
        debug!(success = outcome.success, "command finished");
        for line in &outcome.lines {
            writeln!(output, "{line}")?;
        }
    }

    Ok(())
}
