use std::collections::HashMap;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::data_handling::Value;
use crate::error::{Error, Result, ValidationError};

/// Runs against the answer before it is accepted: the trimmed text of a text field, or the
/// value behind the picked item of a choice field.
pub type Validator = fn(&Value) -> std::result::Result<(), ValidationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub value: Value,
}

impl Choice {
    pub fn new<L: Into<String>, V: Into<Value>>(label: L, value: V) -> Self {
        Choice {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The synthetic "no manager" entry.
    pub fn none() -> Self {
        Choice::new("None", Value::Null)
    }
}

/// Declarative description of one interactive input.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub message: String,
    pub choices: Vec<Choice>,
    pub validator: Option<Validator>,
}

impl FieldSpec {
    pub fn text(name: &'static str, message: &str) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Text,
            message: String::from(message),
            choices: Vec::new(),
            validator: None,
        }
    }

    pub fn choice(name: &'static str, message: &str, choices: Vec<Choice>) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Choice,
            message: String::from(message),
            choices,
            validator: None,
        }
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

pub fn non_empty(input: &Value) -> std::result::Result<(), ValidationError> {
    if input.to_string().trim().is_empty() {
        Err(ValidationError(String::from("A value is required.")))
    } else {
        Ok(())
    }
}

pub fn non_negative_decimal(input: &Value) -> std::result::Result<(), ValidationError> {
    match input.to_string().trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
        _ => Err(ValidationError(String::from(
            "Please enter a non-negative number.",
        ))),
    }
}

/// Field name to collected value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Answers {
    values: HashMap<&'static str, Value>,
}

impl Answers {
    pub fn get(&self, field: &'static str) -> Result<&Value> {
        self.values.get(field).ok_or(Error::MissingAnswer(field))
    }

    pub fn text(&self, field: &'static str) -> Result<String> {
        self.get(field)?
            .as_str()
            .map(String::from)
            .ok_or(Error::MissingAnswer(field))
    }

    pub fn id(&self, field: &'static str) -> Result<i64> {
        self.get(field)?.as_i64().ok_or(Error::MissingAnswer(field))
    }

    pub fn optional_id(&self, field: &'static str) -> Result<Option<i64>> {
        Ok(self.get(field)?.as_i64())
    }

    pub fn decimal(&self, field: &'static str) -> Result<f64> {
        self.text(field)?
            .parse::<f64>()
            .map_err(|_| Error::MissingAnswer(field))
    }
}

/// The interactive surface: free text, single choice, and a way to show a refusal.
pub trait Prompter {
    fn text(&mut self, message: &str) -> Result<String>;

    /// Index into `labels` of the chosen item.
    fn select(&mut self, message: &str, labels: &[String]) -> Result<usize>;

    fn reject(&mut self, error: &ValidationError);
}

/// Ask every field in order. A validator failure re-prompts the same field.
pub fn collect<P: Prompter>(prompter: &mut P, fields: &[FieldSpec]) -> Result<Answers> {
    let mut answers = Answers::default();

    for field in fields {
        let value = match field.kind {
            FieldKind::Text => loop {
                let input = prompter.text(&field.message)?;
                let value = Value::from(input.trim());

                match field.validator.map_or(Ok(()), |validate| validate(&value)) {
                    Ok(()) => break value,
                    Err(e) => prompter.reject(&e),
                }
            },
            FieldKind::Choice => {
                let labels: Vec<String> = field.choices.iter().map(|c| c.label.clone()).collect();
                loop {
                    let index = prompter.select(&field.message, &labels)?;
                    let value = match field.choices.get(index) {
                        Some(choice) => choice.value.clone(),
                        None => return Err(Error::MissingAnswer(field.name)),
                    };

                    match field.validator.map_or(Ok(()), |validate| validate(&value)) {
                        Ok(()) => break value,
                        Err(e) => prompter.reject(&e),
                    }
                }
            }
        };

        answers.values.insert(field.name, value);
    }

    Ok(answers)
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn text(&mut self, message: &str) -> Result<String> {
        (**self).text(message)
    }

    fn select(&mut self, message: &str, labels: &[String]) -> Result<usize> {
        (**self).select(message, labels)
    }

    fn reject(&mut self, error: &ValidationError) {
        (**self).reject(error)
    }
}

/// Terminal prompts rendered by dialoguer.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, message: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()?)
    }

    fn select(&mut self, message: &str, labels: &[String]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(labels)
            .default(0)
            .interact()?)
    }

    fn reject(&mut self, error: &ValidationError) {
        eprintln!("✗ {}", error);
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::{Reply, ScriptedPrompter};
    use super::*;

    #[test]
    fn invalid_text_is_reprompted_not_coerced() {
        let mut prompter = ScriptedPrompter::new(vec![
            Reply::Type("-5"),
            Reply::Type("abc"),
            Reply::Type(" 42000 "),
        ]);
        let fields = [FieldSpec::text("salary", "What is the salary?")
            .validate_with(non_negative_decimal)];

        let answers = collect(&mut prompter, &fields).unwrap();

        assert_eq!(answers.decimal("salary").unwrap(), 42000.0);
        assert_eq!(prompter.rejections.len(), 2);
        assert_eq!(prompter.asked, vec!["What is the salary?"; 3]);
    }

    #[test]
    fn choices_keep_given_order_and_map_to_values() {
        let mut prompter = ScriptedPrompter::new(vec![Reply::Pick("None")]);
        let fields = [FieldSpec::choice(
            "managerId",
            "Who is the manager?",
            vec![Choice::none(), Choice::new("Zed Shaw", 9i64), Choice::new("Amy Pond", 2i64)],
        )];

        let answers = collect(&mut prompter, &fields).unwrap();

        assert_eq!(prompter.offered[0], vec!["None", "Zed Shaw", "Amy Pond"]);
        assert_eq!(answers.optional_id("managerId").unwrap(), None);
    }

    #[test]
    fn choice_validator_rejects_and_asks_again() {
        fn requires_manager(value: &Value) -> std::result::Result<(), ValidationError> {
            if value.is_null() {
                Err(ValidationError(String::from("Pick a manager.")))
            } else {
                Ok(())
            }
        }
        let mut prompter = ScriptedPrompter::new(vec![Reply::Pick("None"), Reply::Pick("Amy Pond")]);
        let fields = [FieldSpec::choice(
            "managerId",
            "Who is the manager?",
            vec![Choice::none(), Choice::new("Amy Pond", 2i64)],
        )
        .validate_with(requires_manager)];

        let answers = collect(&mut prompter, &fields).unwrap();

        assert_eq!(prompter.rejections, vec!["Pick a manager."]);
        assert_eq!(prompter.offered.len(), 2);
        assert_eq!(answers.optional_id("managerId").unwrap(), Some(2));
    }

    #[test]
    fn unknown_field_is_reported() {
        let answers = Answers::default();
        assert!(matches!(answers.id("roleId"), Err(Error::MissingAnswer("roleId"))));
    }

    #[test]
    fn validators() {
        assert!(non_empty(&Value::from("  ")).is_err());
        assert!(non_empty(&Value::Null).is_err());
        assert!(non_empty(&Value::from("Sales")).is_ok());
        assert!(non_negative_decimal(&Value::from("0")).is_ok());
        assert!(non_negative_decimal(&Value::from("12.50")).is_ok());
        assert!(non_negative_decimal(&Value::from("NaN")).is_err());
        assert!(non_negative_decimal(&Value::from("")).is_err());
    }
}
