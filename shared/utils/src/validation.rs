use crate::error::{StockboardError, StockboardResult};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> StockboardResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(StockboardError::validation("model", error_messages))
        }
    }
}

/// Flatten validation errors, including nested structs, into one message.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => format!("{}: {}", path, message),
                        None => match error.code.as_ref() {
                            "length" => format!("Length validation failed for field '{}'", path),
                            "range" => format!("Value out of range for field '{}'", path),
                            "required" => format!("Field '{}' is required", path),
                            code => format!("Validation failed for field '{}': {}", path, code),
                        },
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            }
        }
    }
}

/// Check a detected file type (its canonical extension) against the allowed list.
pub fn validate_file_type(extension: &str, allowed_types: &[&str]) -> StockboardResult<()> {
    if !allowed_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(extension)) {
        return Err(StockboardError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> StockboardResult<()> {
    if file_size == 0 {
        return Err(StockboardError::validation("file_size", "Uploaded file is empty"));
    }

    if file_size > max_size {
        return Err(StockboardError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}
