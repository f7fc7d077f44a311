use thiserror::Error;

/// One line of input to the terminal front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Refresh,
    Add { name: String, title: String },
    Edit(i64),
    EditName(String),
    EditTitle(String),
    Save,
    Cancel,
    Delete(i64),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a worker id")]
    BadId(String),
}

pub const HELP: &str = "\
commands:
  go <path>               open /, /calendar or /schedule
  refresh                 reload the worker list
  add <name> [| <title>]  add a worker
  edit <id>               start editing a row
  name <text>             change the name being edited
  title <text>            change the title being edited
  save                    save the edit
  cancel                  drop the edit
  delete <id>             delete a worker
  help                    show this text
  quit                    leave";

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |cmd: &'static str| -> Result<String, CommandError> {
            if rest.is_empty() {
                Err(CommandError::MissingArgument(cmd))
            } else {
                Ok(rest.to_string())
            }
        };
        let id = |cmd: &'static str| -> Result<i64, CommandError> {
            let text = required(cmd)?;
            text.parse::<i64>().map_err(|_| CommandError::BadId(text))
        };

        match word.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "go" => Ok(Command::Go(required("go")?)),
            "refresh" => Ok(Command::Refresh),
            "add" => {
                let text = required("add")?;
                let (name, title) = text.split_once('|').unwrap_or((text.as_str(), ""));
                Ok(Command::Add {
                    name: name.trim().to_string(),
                    title: title.trim().to_string(),
                })
            }
            "edit" => Ok(Command::Edit(id("edit")?)),
            // Edit fields may be blanked on purpose
            "name" => Ok(Command::EditName(rest.to_string())),
            "title" => Ok(Command::EditTitle(rest.to_string())),
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "delete" => Ok(Command::Delete(id("delete")?)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_splits_name_and_title() {
        assert_eq!(
            Command::parse("add Ann Lee | Night cook"),
            Ok(Command::Add {
                name: "Ann Lee".into(),
                title: "Night cook".into(),
            })
        );
        assert_eq!(
            Command::parse("add Bo"),
            Ok(Command::Add {
                name: "Bo".into(),
                title: String::new(),
            })
        );
    }

    #[test]
    fn ids_must_be_numbers() {
        assert_eq!(Command::parse("delete 12"), Ok(Command::Delete(12)));
        assert_eq!(Command::parse("EDIT 3"), Ok(Command::Edit(3)));
        assert_eq!(
            Command::parse("delete twelve"),
            Err(CommandError::BadId("twelve".into()))
        );
        assert_eq!(
            Command::parse("edit"),
            Err(CommandError::MissingArgument("edit"))
        );
    }

    #[test]
    fn edit_fields_accept_blank_text() {
        assert_eq!(Command::parse("title"), Ok(Command::EditTitle(String::new())));
        assert_eq!(
            Command::parse("name  Cy  "),
            Ok(Command::EditName("Cy".into()))
        );
    }

    #[test]
    fn unknown_and_empty_lines_are_errors() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("fly away"),
            Err(CommandError::Unknown("fly".into()))
        );
        assert_eq!(Command::parse("go /calendar"), Ok(Command::Go("/calendar".into())));
    }
}
