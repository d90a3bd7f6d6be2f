use crate::domain::model::{Flavor, HistoryEntry};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Error: unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Error: Not enough arguments to perform the operation {operation}")]
    NotEnoughArguments { operation: String },

    #[error("Error: Too many arguments to perform the operation {operation}")]
    TooManyArguments { operation: String },

    #[error("Error: cannot implement operation {operation}. It requires {required} arguments and the stack has only {available} arguments")]
    StackTooSmall {
        operation: String,
        required: usize,
        available: usize,
    },

    #[error("Error while performing operation Divide: division by 0")]
    DivisionByZero,

    #[error("Error while performing operation Factorial: not supported for the negative number")]
    NegativeFactorial,

    #[error("Error while performing operation Pow: negative exponent not supported")]
    NegativeExponent,

    #[error("Error while performing operation {operation}: result out of range")]
    Overflow { operation: &'static str },

    #[error("Error: cannot remove {requested} from the stack. It has only {available} arguments")]
    CannotRemove { requested: i64, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Plus,
    Minus,
    Times,
    Divide,
    Pow,
    Abs,
    Fact,
}

impl OperationKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "plus" => Some(OperationKind::Plus),
            "minus" => Some(OperationKind::Minus),
            "times" => Some(OperationKind::Times),
            "divide" => Some(OperationKind::Divide),
            "pow" => Some(OperationKind::Pow),
            "abs" => Some(OperationKind::Abs),
            "fact" => Some(OperationKind::Fact),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            OperationKind::Abs | OperationKind::Fact => 1,
            _ => 2,
        }
    }

    fn display_name(self) -> &'static str {
        match self {
            OperationKind::Plus => "Plus",
            OperationKind::Minus => "Minus",
            OperationKind::Times => "Times",
            OperationKind::Divide => "Divide",
            OperationKind::Pow => "Pow",
            OperationKind::Abs => "Abs",
            OperationKind::Fact => "Factorial",
        }
    }

    /// `args` holds exactly `arity()` values.
    fn apply(self, args: &[i64]) -> Result<i64, CalcError> {
        let overflow = CalcError::Overflow {
            operation: self.display_name(),
        };
        match self {
            OperationKind::Plus => args[0].checked_add(args[1]).ok_or(overflow),
            OperationKind::Minus => args[0].checked_sub(args[1]).ok_or(overflow),
            OperationKind::Times => args[0].checked_mul(args[1]).ok_or(overflow),
            OperationKind::Divide => {
                if args[1] == 0 {
                    return Err(CalcError::DivisionByZero);
                }
                floor_div(args[0], args[1]).ok_or(overflow)
            }
            OperationKind::Pow => {
                let (base, exponent) = (args[0], args[1]);
                if exponent < 0 {
                    return Err(CalcError::NegativeExponent);
                }
                // |base| <= 1 永遠不會溢位，不受指數大小限制
                match base {
                    0 if exponent > 0 => Ok(0),
                    1 => Ok(1),
                    -1 => Ok(if exponent % 2 == 0 { 1 } else { -1 }),
                    _ => match u32::try_from(exponent) {
                        Ok(exponent) => base.checked_pow(exponent).ok_or(overflow),
                        Err(_) => Err(overflow),
                    },
                }
            }
            OperationKind::Abs => args[0].checked_abs().ok_or(overflow),
            OperationKind::Fact => {
                if args[0] < 0 {
                    return Err(CalcError::NegativeFactorial);
                }
                (1..=args[0]).try_fold(1i64, |acc, n| acc.checked_mul(n)).ok_or(overflow)
            }
        }
    }
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

/// Result of a stack calculation together with the operands it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    pub result: i64,
    pub arguments: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct Calculator {
    stack: Vec<i64>,
    stack_history: Vec<HistoryEntry>,
    independent_history: Vec<HistoryEntry>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculate_independent(
        &mut self,
        arguments: &[i64],
        operation: &str,
    ) -> Result<i64, CalcError> {
        let kind = OperationKind::parse(operation)
            .ok_or_else(|| CalcError::UnknownOperation(operation.to_string()))?;

        if arguments.len() < kind.arity() {
            return Err(CalcError::NotEnoughArguments {
                operation: operation.to_string(),
            });
        }
        if arguments.len() > kind.arity() {
            return Err(CalcError::TooManyArguments {
                operation: operation.to_string(),
            });
        }

        let result = kind.apply(arguments)?;
        self.log_to_history(Flavor::Independent, operation, arguments.to_vec(), result);
        Ok(result)
    }

    /// Operands come from the top of the stack (`arguments[0]` is the top).
    /// Once the stack is deep enough they are consumed even when the
    /// operation itself then fails.
    pub fn calculate_from_stack(&mut self, operation: &str) -> Result<StackOutcome, CalcError> {
        let kind = OperationKind::parse(operation)
            .ok_or_else(|| CalcError::UnknownOperation(operation.to_string()))?;

        let required = kind.arity();
        if self.stack.len() < required {
            return Err(CalcError::StackTooSmall {
                operation: operation.to_string(),
                required,
                available: self.stack.len(),
            });
        }

        let split_at = self.stack.len() - required;
        let mut arguments = self.stack.split_off(split_at);
        arguments.reverse();

        let result = kind.apply(&arguments)?;
        self.log_to_history(Flavor::Stack, operation, arguments.clone(), result);
        Ok(StackOutcome { result, arguments })
    }

    pub fn push_arguments(&mut self, arguments: &[i64]) -> usize {
        self.stack.extend_from_slice(arguments);
        self.stack.len()
    }

    /// A non-positive count removes nothing.
    pub fn remove_arguments(&mut self, count: i64) -> Result<usize, CalcError> {
        let available = self.stack.len();
        if count > 0 && count as u64 > available as u64 {
            return Err(CalcError::CannotRemove {
                requested: count,
                available,
            });
        }
        let to_remove = usize::try_from(count.max(0)).unwrap_or(0);
        self.stack.truncate(available - to_remove);
        Ok(self.stack.len())
    }

    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    /// Stack content, first element is the top.
    pub fn stack_top_first(&self) -> Vec<i64> {
        self.stack.iter().rev().copied().collect()
    }

    /// Without a flavor: every STACK entry followed by every INDEPENDENT entry.
    pub fn history(&self, flavor: Option<Flavor>) -> Vec<HistoryEntry> {
        match flavor {
            Some(Flavor::Stack) => self.stack_history.clone(),
            Some(Flavor::Independent) => self.independent_history.clone(),
            None => self
                .stack_history
                .iter()
                .chain(self.independent_history.iter())
                .cloned()
                .collect(),
        }
    }

    pub fn history_len(&self, flavor: Flavor) -> usize {
        match flavor {
            Flavor::Stack => self.stack_history.len(),
            Flavor::Independent => self.independent_history.len(),
        }
    }

    pub fn last_calculation(&self, flavor: Flavor) -> Option<&HistoryEntry> {
        match flavor {
            Flavor::Stack => self.stack_history.last(),
            Flavor::Independent => self.independent_history.last(),
        }
    }

    fn log_to_history(&mut self, flavor: Flavor, operation: &str, arguments: Vec<i64>, result: i64) {
        let entry = HistoryEntry {
            flavor,
            operation: operation.to_string(),
            arguments,
            result,
        };
        match flavor {
            Flavor::Stack => self.stack_history.push(entry),
            Flavor::Independent => self.independent_history.push(entry),
        }
    }
}
