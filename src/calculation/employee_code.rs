//! Employee code generation.
//!
//! Codes look like `ENG-ASH-001`: three characters of the department, three
//! of the name, and the lowest free sequence number for that prefix.

use std::collections::BTreeSet;

use crate::error::{EngineError, EngineResult};

const DEFAULT_DEPARTMENT: &str = "GEN";

fn three_chars(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// The `<DEPT>-<NAME>` prefix of a generated code.
///
/// # Errors
///
/// Returns [`EngineError::InvalidEmployee`] when the name has no
/// alphanumeric characters.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::employee_code_prefix;
///
/// assert_eq!(employee_code_prefix("Asha", "Rao", Some("Engineering")).unwrap(), "ENG-ASH");
/// assert_eq!(employee_code_prefix("Al", "Ng", None).unwrap(), "GEN-ALN");
/// assert!(employee_code_prefix(" ", "", None).is_err());
/// ```
pub fn employee_code_prefix(
    first_name: &str,
    last_name: &str,
    department: Option<&str>,
) -> EngineResult<String> {
    let name = three_chars(&format!("{first_name}{last_name}"));
    if name.is_empty() {
        return Err(EngineError::InvalidEmployee {
            field: "first_name".to_string(),
            message: "a name is required to generate an employee id".to_string(),
        });
    }
    let department = department.map(three_chars).unwrap_or_default();
    let department = if department.is_empty() {
        DEFAULT_DEPARTMENT.to_string()
    } else {
        department
    };
    Ok(format!("{department}-{name}"))
}

/// The code with the lowest sequence number not yet used for `prefix`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::next_employee_code;
///
/// let taken = ["ENG-ASH-001", "ENG-ASH-003", "OPS-RAV-002"];
/// assert_eq!(next_employee_code("ENG-ASH", taken), "ENG-ASH-002");
/// ```
pub fn next_employee_code<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let marker = format!("{prefix}-");
    let used: BTreeSet<u32> = existing
        .into_iter()
        .filter_map(|code| code.strip_prefix(&marker))
        .filter_map(|seq| seq.parse().ok())
        .collect();
    let sequence = (1..).find(|n| !used.contains(n)).unwrap_or(1);
    format!("{prefix}-{sequence:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_strips_punctuation() {
        assert_eq!(
            employee_code_prefix("D'Souza", "", Some("R&D Labs")).unwrap(),
            "RDL-DSO"
        );
    }

    #[test]
    fn test_blank_department_uses_default() {
        assert_eq!(employee_code_prefix("Ravi", "K", Some("  ")).unwrap(), "GEN-RAV");
    }

    #[test]
    fn test_first_code() {
        assert_eq!(next_employee_code("GEN-RAV", []), "GEN-RAV-001");
    }

    #[test]
    fn test_sequence_beyond_three_digits() {
        let taken: Vec<String> = (1..=999).map(|n| format!("GEN-RAV-{n:03}")).collect();
        assert_eq!(
            next_employee_code("GEN-RAV", taken.iter().map(String::as_str)),
            "GEN-RAV-1000"
        );
    }

    #[test]
    fn test_ignores_other_prefixes() {
        assert_eq!(
            next_employee_code("GEN-RAV", ["GEN-RAVI-001", "ENG-RAV-001"]),
            "GEN-RAV-001"
        );
    }
}
