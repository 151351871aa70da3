//! Structural validation of parsed model output.

use serde_json::Value;

use super::{MalformedResponse, McqCandidate, OPTION_COUNT, Violation};

const MAX_CORRECT_INDEX: f64 = (OPTION_COUNT - 1) as f64;

/// Validate every element of `value` as a `[question, options, correctIndex]`
/// triple.
///
/// `raw` is the original model output, attached to the error on failure.
/// Stops at the first violation.
pub fn validate_mcq_array(value: &Value, raw: &str) -> Result<Vec<McqCandidate>, MalformedResponse> {
    let fail = |violation: Violation| MalformedResponse::new(violation, raw);

    let items = value.as_array().ok_or_else(|| fail(Violation::NotAnArray))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_item(index, item).map_err(fail))
        .collect()
}

fn validate_item(index: usize, item: &Value) -> Result<McqCandidate, Violation> {
    let parts = item.as_array().ok_or(Violation::ItemNotArray { index })?;
    let [question, options, correct] = parts.as_slice() else {
        return Err(Violation::ItemArity {
            index,
            len: parts.len(),
        });
    };

    let question = question
        .as_str()
        .ok_or(Violation::QuestionNotString { index })?;
    if question.trim().is_empty() {
        return Err(Violation::EmptyQuestion { index });
    }

    Ok(McqCandidate {
        question: question.to_string(),
        options: validate_options(index, options)?,
        correct_index: validate_correct_index(index, correct)?,
    })
}

fn validate_options(index: usize, value: &Value) -> Result<[String; OPTION_COUNT], Violation> {
    let values = value.as_array().ok_or(Violation::OptionsNotArray { index })?;
    if values.len() != OPTION_COUNT {
        return Err(Violation::OptionCount {
            index,
            len: values.len(),
        });
    }

    let mut options: [String; OPTION_COUNT] = Default::default();
    for (option, (slot, value)) in options.iter_mut().zip(values).enumerate() {
        let text = value
            .as_str()
            .ok_or(Violation::OptionNotString { index, option })?;
        if text.trim().is_empty() {
            return Err(Violation::EmptyOption { index, option });
        }
        *slot = text.to_string();
    }

    Ok(options)
}

fn validate_correct_index(index: usize, value: &Value) -> Result<usize, Violation> {
    let Value::Number(number) = value else {
        return Err(Violation::IndexNotNumber { index });
    };
    let position = number
        .as_f64()
        .ok_or(Violation::IndexNotNumber { index })?;

    if !position.is_finite() || position.fract() != 0.0 {
        return Err(Violation::IndexNotInteger { index });
    }
    if !(0.0..=MAX_CORRECT_INDEX).contains(&position) {
        return Err(Violation::IndexOutOfRange {
            index,
            value: number.to_string(),
        });
    }

    Ok(position as usize)
}
