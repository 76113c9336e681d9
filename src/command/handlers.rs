//! Input and output handlers
//!
//! Input handlers turn a parsed option value into what the command wants
//! (a comma separated string into a list, a path into file contents).
//! Output handlers take a named result and print it or write it to the path
//! given by one of the command's options.

use super::error::{HandlerError, HandlerResult};
use super::Value;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Conversion applied to an input after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputHandler {
    /// `"a,b,c"` becomes `["a", "b", "c"]`
    SplitComma,
    /// A path becomes the file's contents
    LoadFileContents,
    /// A path becomes the file's lines
    LoadFileLines,
}

impl InputHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputHandler::SplitComma => "split_comma",
            InputHandler::LoadFileContents => "load_file_contents",
            InputHandler::LoadFileLines => "load_file_lines",
        }
    }

    /// Apply the handler to the value parsed for input `name`.
    pub fn apply(&self, name: &str, value: Value) -> HandlerResult<Value> {
        match self {
            InputHandler::SplitComma => match value {
                Value::Str(s) => Ok(Value::List(
                    s.split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect(),
                )),
                // append inputs: split every occurrence and flatten
                Value::List(items) => Ok(Value::List(
                    items
                        .iter()
                        .flat_map(|s| s.split(','))
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect(),
                )),
                other => Err(self.wrong_type(name, &other)),
            },
            InputHandler::LoadFileContents => {
                let path = value.as_path().ok_or_else(|| self.wrong_type(name, &value))?;
                let contents = read(&path)?;
                Ok(Value::Str(contents))
            }
            InputHandler::LoadFileLines => {
                let path = value.as_path().ok_or_else(|| self.wrong_type(name, &value))?;
                let contents = read(&path)?;
                Ok(Value::List(contents.lines().map(str::to_string).collect()))
            }
        }
    }

    fn wrong_type(&self, name: &str, value: &Value) -> HandlerError {
        HandlerError::WrongType {
            handler: self.as_str(),
            name: name.to_string(),
            found: kind(value),
        }
    }
}

/// Destination for a command result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputHandler {
    PrintString,
    PrintListOfStrings,
    WriteString,
    WriteListOfStrings,
}

impl OutputHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputHandler::PrintString => "print_string",
            OutputHandler::PrintListOfStrings => "print_list_of_strings",
            OutputHandler::WriteString => "write_string",
            OutputHandler::WriteListOfStrings => "write_list_of_strings",
        }
    }

    /// Writing handlers need an option holding the destination path.
    pub fn requires_option(&self) -> bool {
        matches!(
            self,
            OutputHandler::WriteString | OutputHandler::WriteListOfStrings
        )
    }

    /// Short phrase used in command help.
    pub fn describe(&self, option: Option<&str>) -> String {
        match (self, option) {
            (OutputHandler::PrintString | OutputHandler::PrintListOfStrings, _) => {
                "printed to standard output".to_string()
            }
            (_, Some(opt)) => format!("written to the path given by --{}", opt),
            (_, None) => "written to a file".to_string(),
        }
    }

    /// Emit result `name`. `destination` is the bound option's value.
    pub fn emit(
        &self,
        name: &str,
        value: &Value,
        destination: Option<&Path>,
        out: &mut dyn Write,
    ) -> HandlerResult<()> {
        match self {
            OutputHandler::PrintString => {
                writeln!(out, "{}", value)?;
            }
            OutputHandler::PrintListOfStrings => {
                for line in self.lines(name, value)? {
                    writeln!(out, "{}", line)?;
                }
            }
            OutputHandler::WriteString => {
                if let Some(path) = destination {
                    write_new_file(path, &value.to_string())?;
                }
            }
            OutputHandler::WriteListOfStrings => {
                if let Some(path) = destination {
                    let mut contents = self.lines(name, value)?.join("\n");
                    contents.push('\n');
                    write_new_file(path, &contents)?;
                }
            }
        }
        Ok(())
    }

    fn lines(&self, name: &str, value: &Value) -> HandlerResult<Vec<String>> {
        match value {
            Value::List(items) => Ok(items.clone()),
            Value::Str(s) => Ok(s.lines().map(str::to_string).collect()),
            other => Err(HandlerError::WrongType {
                handler: self.as_str(),
                name: name.to_string(),
                found: kind(other),
            }),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Str(_) => "string",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Bool(_) => "bool",
        Value::Path(_) => "path",
        Value::List(_) => "list",
    }
}

fn read(path: &Path) -> HandlerResult<String> {
    fs::read_to_string(path).map_err(|source| HandlerError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Output files are never overwritten.
fn write_new_file(path: &Path, contents: &str) -> HandlerResult<()> {
    if path.exists() {
        return Err(HandlerError::OutputExists(path.to_path_buf()));
    }
    fs::write(path, contents)?;
    Ok(())
}
