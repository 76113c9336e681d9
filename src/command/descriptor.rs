//! Command descriptor parsing and validation
//!
//! A descriptor file (`<name>.toml` inside a registry module directory)
//! declares which constructor implements the command, what it is for, how
//! it is invoked and which inputs and outputs it has. Parsing goes through
//! [`CommandManifest`]; [`CommandDescriptor::from_manifest`] then checks the
//! rules serde cannot express and binds the constructor.

use super::constructors::{Constructor, ConstructorTable};
use super::error::DescriptorError;
use super::handlers::{InputHandler, OutputHandler};
use super::{Command, Settings};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Raw descriptor file contents
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandManifest {
    /// Key into the constructor table
    pub constructor: String,

    /// Brief description shown in usage listings
    #[serde(default)]
    pub description: String,

    /// Longer text shown by `--help`
    #[serde(default)]
    pub long_description: Option<String>,

    /// Version string shown in help; defaults to the crate version
    #[serde(default)]
    pub version: Option<String>,

    /// Print the usage line instead of running when invoked bare
    #[serde(default = "default_true")]
    pub help_on_no_arguments: bool,

    /// Handed verbatim to the constructor
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub usage_examples: Vec<UsageExample>,

    #[serde(default)]
    pub inputs: Vec<InputSpec>,

    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

fn default_true() -> bool {
    true
}

/// One usage example; `%prog` in `example` is replaced by the program name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageExample {
    #[serde(default)]
    pub short_desc: String,
    #[serde(default)]
    pub long_desc: String,
    pub example: String,
}

/// Value type of an input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    #[serde(alias = "string")]
    Str,
    Int,
    Float,
    Bool,
    ExistingFilepath,
    NewFilepath,
    ExistingDirpath,
    NewDirpath,
}

impl InputType {
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            InputType::ExistingFilepath
                | InputType::NewFilepath
                | InputType::ExistingDirpath
                | InputType::NewDirpath
        )
    }
}

/// How repeated or valueless occurrences of an option are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    #[default]
    Store,
    StoreTrue,
    StoreFalse,
    Append,
}

impl InputAction {
    pub fn is_flag(&self) -> bool {
        matches!(self, InputAction::StoreTrue | InputAction::StoreFalse)
    }
}

/// A declared input, exposed as `--<name with dashes>`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSpec {
    pub name: String,

    #[serde(rename = "type", default)]
    pub input_type: InputType,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub help: String,

    #[serde(default)]
    pub short: Option<char>,

    #[serde(default)]
    pub action: InputAction,

    #[serde(default)]
    pub default: Option<toml::Value>,

    /// Shown instead of the literal default in help
    #[serde(default)]
    pub default_description: Option<String>,

    #[serde(default)]
    pub handler: Option<InputHandler>,
}

impl InputSpec {
    /// Long option name, `input_fp` becomes `input-fp`.
    pub fn long_name(&self) -> String {
        dashed(&self.name)
    }

    /// Default rendered as the string clap parses.
    pub fn default_literal(&self) -> Option<String> {
        self.default.as_ref().map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::EmptyInputName);
        }
        if !is_flag_name(&self.name) {
            return Err(DescriptorError::input(
                &self.name,
                "names must start with a letter or digit and contain only letters, digits, '_' and '-'",
            ));
        }

        let long = self.long_name();
        if long == "help" || long == "version" {
            return Err(DescriptorError::ReservedInputName(self.name.clone()));
        }

        if let Some(short) = self.short {
            if !short.is_ascii_alphanumeric() {
                return Err(DescriptorError::InvalidShortFlag {
                    name: self.name.clone(),
                    short: short.to_string(),
                    reason: "is not an ASCII letter or digit".to_string(),
                });
            }
            if short == 'h' || short == 'V' {
                return Err(DescriptorError::InvalidShortFlag {
                    name: self.name.clone(),
                    short: short.to_string(),
                    reason: "is reserved for --help/--version".to_string(),
                });
            }
        }

        if self.required {
            if let Some(default) = self.default_literal() {
                return Err(DescriptorError::RequiredWithDefault {
                    name: self.name.clone(),
                    default,
                });
            }
        }

        match (self.input_type, self.action) {
            (InputType::Bool, InputAction::Store | InputAction::Append) => {
                return Err(DescriptorError::input(
                    &self.name,
                    "bool inputs must use the store_true or store_false action",
                ));
            }
            (t, action) if action.is_flag() && t != InputType::Bool => {
                return Err(DescriptorError::input(
                    &self.name,
                    "store_true/store_false actions require type = \"bool\"",
                ));
            }
            _ => {}
        }

        if self.action.is_flag() {
            if self.default.is_some() {
                return Err(DescriptorError::input(
                    &self.name,
                    "flag inputs take their default from the action",
                ));
            }
            if self.required {
                return Err(DescriptorError::input(
                    &self.name,
                    "flag inputs cannot be required",
                ));
            }
        }

        if let Some(default) = &self.default {
            self.validate_default(default)?;
        }

        Ok(())
    }

    fn validate_default(&self, default: &toml::Value) -> Result<(), DescriptorError> {
        let literal = match default {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                default.to_string()
            }
            _ => {
                return Err(DescriptorError::input(
                    &self.name,
                    "default must be a string, number or boolean",
                ))
            }
        };

        let parses = match self.input_type {
            InputType::Int => literal.parse::<i64>().is_ok(),
            InputType::Float => literal.parse::<f64>().is_ok(),
            _ => true,
        };
        if !parses {
            return Err(DescriptorError::input(
                &self.name,
                format!("default '{}' is not a valid {:?}", literal, self.input_type),
            ));
        }
        Ok(())
    }
}

/// Whether `name` can be used as a long option, `[A-Za-z0-9][A-Za-z0-9_-]*`.
fn is_flag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

/// A declared output: which result to emit and how
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSpec {
    /// Result key produced by the command
    pub name: String,

    pub handler: OutputHandler,

    /// Input whose value is the destination path
    #[serde(default)]
    pub option: Option<String>,

    #[serde(default)]
    pub help: Option<String>,
}

impl OutputSpec {
    /// Help text, falling back to what the handler does.
    pub fn description(&self) -> String {
        match &self.help {
            Some(help) => help.clone(),
            None => {
                let option = self.option.as_deref().map(dashed);
                self.handler.describe(option.as_deref())
            }
        }
    }
}

/// A fully validated command descriptor
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub long_description: Option<String>,
    pub version: String,
    pub help_on_no_arguments: bool,
    pub constructor_name: String,
    pub settings: Settings,
    pub usage_examples: Vec<UsageExample>,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    constructor: Constructor,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("constructor", &self.constructor_name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor {
    /// Parse and validate a descriptor from TOML text.
    pub fn from_toml_str(
        name: &str,
        content: &str,
        constructors: &ConstructorTable,
    ) -> Result<Self, DescriptorError> {
        let manifest: CommandManifest = toml::from_str(content)?;
        Self::from_manifest(name, manifest, constructors)
    }

    /// Validate a parsed manifest and bind its constructor.
    pub fn from_manifest(
        name: &str,
        manifest: CommandManifest,
        constructors: &ConstructorTable,
    ) -> Result<Self, DescriptorError> {
        if manifest.description.trim().is_empty() {
            return Err(DescriptorError::MissingDescription);
        }
        if manifest.usage_examples.is_empty() {
            return Err(DescriptorError::NoUsageExamples);
        }

        let constructor = constructors.get(&manifest.constructor).ok_or_else(|| {
            DescriptorError::UnknownConstructor {
                name: manifest.constructor.clone(),
                available: constructors.names().join(", "),
            }
        })?;

        // Constructors are pure; building once here surfaces bad settings
        // as a load error rather than at run time.
        constructor(&manifest.settings).map_err(|e| DescriptorError::InvalidSettings {
            name: manifest.constructor.clone(),
            reason: e.to_string(),
        })?;

        let mut seen_inputs = HashSet::new();
        let mut seen_shorts = HashSet::new();
        for input in &manifest.inputs {
            input.validate()?;
            if !seen_inputs.insert(input.long_name()) {
                return Err(DescriptorError::DuplicateInput(input.name.clone()));
            }
            if let Some(short) = input.short {
                if !seen_shorts.insert(short) {
                    return Err(DescriptorError::InvalidShortFlag {
                        name: input.name.clone(),
                        short: short.to_string(),
                        reason: "is already used by another input".to_string(),
                    });
                }
            }
        }

        let mut seen_outputs = HashSet::new();
        for output in &manifest.outputs {
            if !seen_outputs.insert(output.name.as_str()) {
                return Err(DescriptorError::DuplicateOutput(output.name.clone()));
            }
            match &output.option {
                Some(option) => {
                    let known = manifest
                        .inputs
                        .iter()
                        .any(|input| input.long_name() == dashed(option));
                    if !known {
                        return Err(DescriptorError::output(
                            &output.name,
                            format!("option '{}' is not a declared input", option),
                        ));
                    }
                }
                None if output.handler.requires_option() => {
                    return Err(DescriptorError::output(
                        &output.name,
                        format!(
                            "handler '{}' needs an option naming the destination path",
                            output.handler.as_str()
                        ),
                    ));
                }
                None => {}
            }
        }

        Ok(Self {
            name: dashed(name),
            description: manifest.description.trim().to_string(),
            long_description: manifest.long_description,
            version: manifest
                .version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            help_on_no_arguments: manifest.help_on_no_arguments,
            constructor_name: manifest.constructor,
            settings: manifest.settings,
            usage_examples: manifest.usage_examples,
            inputs: manifest.inputs,
            outputs: manifest.outputs,
            constructor,
        })
    }

    /// Build the runnable command.
    pub fn construct(&self) -> anyhow::Result<Box<dyn Command>> {
        let mut command = (self.constructor)(&self.settings)?;
        command.bind_inputs(&self.inputs);
        Ok(command)
    }

    /// Look up an input by name; dashes and underscores are equivalent.
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        let wanted = dashed(name);
        self.inputs.iter().find(|input| input.long_name() == wanted)
    }
}

/// `make_bash_completion` and `make-bash-completion` name the same thing.
pub fn dashed(name: &str) -> String {
    name.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECHO: &str = r#"
        constructor = "echo"
        description = "Echo text back"

        [[usage_examples]]
        short_desc = "Greeting"
        long_desc = "Echo a greeting"
        example = "%prog --text hello"

        [[inputs]]
        name = "text"
        required = true
        help = "Text to echo"
        short = "t"

        [[inputs]]
        name = "output_fp"
        type = "new_filepath"

        [[outputs]]
        name = "text"
        handler = "write_string"
        option = "output-fp"
    "#;

    fn table() -> ConstructorTable {
        ConstructorTable::builtin()
    }

    #[test]
    fn test_parse_valid_descriptor() {
        let descriptor = CommandDescriptor::from_toml_str("echo_text", ECHO, &table()).unwrap();
        assert_eq!(descriptor.name, "echo-text");
        assert_eq!(descriptor.description, "Echo text back");
        assert_eq!(descriptor.version, env!("CARGO_PKG_VERSION"));
        assert!(descriptor.help_on_no_arguments);
        assert_eq!(descriptor.inputs.len(), 2);
        assert_eq!(descriptor.inputs[0].short, Some('t'));
        assert_eq!(descriptor.inputs[1].input_type, InputType::NewFilepath);
        assert!(descriptor.input("output-fp").is_some());
        assert!(descriptor.construct().is_ok());
    }

    #[test]
    fn test_missing_usage_examples() {
        let toml = r#"
            constructor = "echo"
            description = "No examples"
        "#;
        let err = CommandDescriptor::from_toml_str("bare", toml, &table()).unwrap_err();
        assert!(matches!(err, DescriptorError::NoUsageExamples));
    }

    #[test]
    fn test_unknown_constructor() {
        let toml = ECHO.replace("constructor = \"echo\"", "constructor = \"nope\"");
        let err = CommandDescriptor::from_toml_str("x", &toml, &table()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("echo"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let toml = format!("{}\nbogus = 1\n", ECHO.trim_start());
        // bogus lands inside the last [[outputs]] table
        let err = CommandDescriptor::from_toml_str("x", &toml, &table()).unwrap_err();
        assert!(matches!(err, DescriptorError::Parse(_)));
    }

    #[test]
    fn test_required_input_with_default() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[inputs]]
            name = "count"
            type = "int"
            required = true
            default = 3
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(matches!(err, DescriptorError::RequiredWithDefault { .. }));
    }

    #[test]
    fn test_duplicate_inputs_by_dashed_name() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[inputs]]
            name = "input_fp"
            [[inputs]]
            name = "input-fp"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(matches!(err, DescriptorError::DuplicateInput(_)));
    }

    #[test]
    fn test_input_name_must_be_a_usable_flag() {
        for name in ["-x", "my input", "_hidden", "a=b"] {
            let toml = format!(
                r#"
                constructor = "echo"
                description = "d"
                [[usage_examples]]
                example = "%prog"
                [[inputs]]
                name = "{}"
                "#,
                name
            );
            let err = CommandDescriptor::from_toml_str("x", &toml, &table()).unwrap_err();
            assert!(
                matches!(err, DescriptorError::InvalidInput { .. }),
                "name {:?} gave {}",
                name,
                err
            );
        }

        assert!(is_flag_name("input_fp"));
        assert!(is_flag_name("2nd-pass"));
    }

    #[test]
    fn test_reserved_short_flag() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[inputs]]
            name = "host"
            short = "h"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_bool_requires_flag_action() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[inputs]]
            name = "verbose"
            type = "bool"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(err.to_string().contains("store_true"));
    }

    #[test]
    fn test_bad_int_default() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[inputs]]
            name = "count"
            type = "int"
            default = "many"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(err.to_string().contains("many"));
    }

    #[test]
    fn test_write_handler_needs_option() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[outputs]]
            name = "text"
            handler = "write_string"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidOutput { .. }));
    }

    #[test]
    fn test_output_option_must_be_declared() {
        let toml = r#"
            constructor = "echo"
            description = "d"
            [[usage_examples]]
            example = "%prog"
            [[outputs]]
            name = "text"
            handler = "write_string"
            option = "missing"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_exec_settings_validated_at_load() {
        let toml = r#"
            constructor = "exec"
            description = "d"
            [[usage_examples]]
            example = "%prog"
        "#;
        let err = CommandDescriptor::from_toml_str("x", toml, &table()).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidSettings { .. }));
    }

    #[test]
    fn test_output_description_fallback() {
        let descriptor = CommandDescriptor::from_toml_str("echo", ECHO, &table()).unwrap();
        assert_eq!(
            descriptor.outputs[0].description(),
            "written to the path given by --output-fp"
        );
    }
}
