use crate::range::Range;
use crate::verify::EditVerification;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditScript {
    #[serde(default)]
    pub meta: Metadata,
    /// Edits scheduled one by one, in order
    #[serde(default)]
    pub edits: Vec<EditDefinition>,
    /// All-or-nothing groups, scheduled after `edits`
    #[serde(default)]
    pub transactions: Vec<TransactionDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransactionDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub edits: Vec<EditDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditDefinition {
    #[serde(default)]
    pub id: Option<String>,
    pub begin: usize,
    pub end: usize,
    #[serde(flatten)]
    pub operation: EditOperation,
    /// Text the range must currently hold
    #[serde(default)]
    pub expected: Option<String>,
    /// Hex xxh3 digest of the text the range must currently hold
    #[serde(default)]
    pub expected_hash: Option<String>,
}

impl EditDefinition {
    pub fn range(&self) -> Range {
        Range::new(self.begin, self.end)
    }

    /// `id` if set, otherwise the positional label produced by `fallback`.
    pub fn label(&self, fallback: impl FnOnce() -> String) -> String {
        self.id.clone().unwrap_or_else(fallback)
    }

    pub fn verification(&self) -> Option<EditVerification> {
        if let Some(text) = &self.expected {
            return Some(EditVerification::ExactMatch(text.clone()));
        }
        self.expected_hash
            .as_deref()
            .and_then(EditVerification::from_hex)
    }

    fn collect_issues(&self, label: &str, issues: &mut Vec<ValidationIssue>) {
        if self.begin > self.end {
            issues.push(ValidationIssue::InvertedRange {
                edit: label.to_string(),
                begin: self.begin,
                end: self.end,
            });
        }

        if self.expected.is_some() && self.expected_hash.is_some() {
            issues.push(ValidationIssue::InvalidCombo {
                edit: label.to_string(),
                message: "expected and expected_hash cannot both be set".to_string(),
            });
        }

        if let Some(hash) = &self.expected_hash {
            if EditVerification::from_hex(hash).is_none() {
                issues.push(ValidationIssue::InvalidCombo {
                    edit: label.to_string(),
                    message: format!("expected_hash '{hash}' is not a hex xxh3 digest"),
                });
            }
        }

        match &self.operation {
            EditOperation::InsertBefore { text } | EditOperation::InsertAfter { text } => {
                if text.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        edit: label.to_string(),
                        field: "text",
                    });
                }
            }
            EditOperation::Wrap { before, after } => {
                if before.is_empty() && after.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        edit: label.to_string(),
                        field: "before/after",
                    });
                }
            }
            EditOperation::Remove | EditOperation::Replace { .. } => {}
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EditOperation {
    Remove,
    InsertBefore {
        text: String,
    },
    InsertAfter {
        text: String,
    },
    Replace {
        text: String,
    },
    Wrap {
        #[serde(default)]
        before: String,
        #[serde(default)]
        after: String,
    },
}

impl EditScript {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.edits.is_empty() && self.transactions.is_empty() {
            issues.push(ValidationIssue::EmptyScript);
        }

        for (idx, edit) in self.edits.iter().enumerate() {
            let label = edit.label(|| format!("edits[{idx}]"));
            edit.collect_issues(&label, &mut issues);
        }

        for (idx, group) in self.transactions.iter().enumerate() {
            let name = group.label(idx);
            if group.edits.is_empty() {
                issues.push(ValidationIssue::EmptyTransaction { name: name.clone() });
            }
            for (edit_idx, edit) in group.edits.iter().enumerate() {
                let label = edit.label(|| format!("{name}.edits[{edit_idx}]"));
                edit.collect_issues(&label, &mut issues);
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Total number of edits, grouped or not.
    pub fn len(&self) -> usize {
        self.edits.len() + self.transactions.iter().map(|t| t.edits.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransactionDefinition {
    pub fn label(&self, idx: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("transactions[{idx}]"))
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyScript,
    EmptyTransaction {
        name: String,
    },
    InvertedRange {
        edit: String,
        begin: usize,
        end: usize,
    },
    MissingField {
        edit: String,
        field: &'static str,
    },
    InvalidCombo {
        edit: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyScript => write!(f, "edit script contains no edits"),
            ValidationIssue::EmptyTransaction { name } => {
                write!(f, "transaction '{name}' contains no edits")
            }
            ValidationIssue::InvertedRange { edit, begin, end } => {
                write!(f, "edit '{edit}' has begin {begin} after end {end}")
            }
            ValidationIssue::MissingField { edit, field } => {
                write!(f, "edit '{edit}' missing required field '{field}'")
            }
            ValidationIssue::InvalidCombo { edit, message } => {
                write!(f, "edit '{edit}' has invalid configuration: {message}")
            }
        }
    }
}
