use rand::Rng;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Difficulty tier of a room. Each tier draws operands from its own
/// inclusive, non-overlapping range:
///
/// | tier       | operands     |
/// |------------|--------------|
/// | `basic`    | `1..=9`      |
/// | `medium`   | `10..=99`    |
/// | `advanced` | `100..=999`  |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    #[default]
    Basic,
    Medium,
    Advanced,
}

impl Difficulty {
    pub fn operand_range(self) -> RangeInclusive<i64> {
        match self {
            Difficulty::Basic => 1..=9,
            Difficulty::Medium => 10..=99,
            Difficulty::Advanced => 100..=999,
        }
    }

    /// Resolves the tier a client asked for; unknown or missing tiers are `basic`
    pub fn from_request(requested: Option<&str>) -> Self {
        requested
            .and_then(|tier| Difficulty::from_str(tier.trim()).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
}

const OPERATORS: [Operator; 4] = [
    Operator::Add,
    Operator::Subtract,
    Operator::Multiply,
    Operator::Divide,
];

impl Operator {
    /// Exact integer result, `None` on overflow or a non-exact division
    pub fn apply(self, left: i64, right: i64) -> Option<i64> {
        match self {
            Operator::Add => left.checked_add(right),
            Operator::Subtract => left.checked_sub(right),
            Operator::Multiply => left.checked_mul(right),
            Operator::Divide => {
                if right == 0 || left % right != 0 {
                    None
                } else {
                    left.checked_div(right)
                }
            }
        }
    }
}

/// An arithmetic question and its precomputed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub left: i64,
    pub operator: Operator,
    pub right: i64,
    pub answer: i64,
}

impl Question {
    /// Builds a question from explicit operands. Returns `None` when the
    /// result would not be an exact integer.
    pub fn new(left: i64, operator: Operator, right: i64) -> Option<Self> {
        let answer = operator.apply(left, right)?;
        Some(Self {
            left,
            operator,
            right,
            answer,
        })
    }

    /// Human readable form sent to clients, e.g. `"3 + 4"`
    pub fn expression(&self) -> String {
        self.to_string()
    }

    pub fn is_correct(&self, answer: i64) -> bool {
        self.answer == answer
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

/// Generates a question for the tier with a uniformly chosen operator
pub fn generate_question<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Question {
    let operator = OPERATORS[rng.random_range(0..OPERATORS.len())];
    generate_with_operator(difficulty, operator, rng)
}

pub(crate) fn generate_with_operator<R: Rng + ?Sized>(
    difficulty: Difficulty,
    operator: Operator,
    rng: &mut R,
) -> Question {
    let range = difficulty.operand_range();
    let (min, max) = (*range.start(), *range.end());

    let (left, right) = match operator {
        Operator::Divide => {
            // Divisor first, then a quotient that keeps the dividend in range.
            // divisor >= min so the lower bound is 1, divisor <= max so the
            // upper bound is at least 1.
            let divisor = rng.random_range(min..=max);
            let min_quotient = (min + divisor - 1) / divisor;
            let max_quotient = max / divisor;
            let quotient = rng.random_range(min_quotient..=max_quotient);
            (divisor * quotient, divisor)
        }
        Operator::Subtract => {
            let first = rng.random_range(min..=max);
            let second = rng.random_range(min..=max);
            if first < second {
                (second, first)
            } else {
                (first, second)
            }
        }
        Operator::Add | Operator::Multiply => {
            (rng.random_range(min..=max), rng.random_range(min..=max))
        }
    };

    let answer = match operator {
        Operator::Add => left + right,
        Operator::Subtract => left - right,
        Operator::Multiply => left * right,
        Operator::Divide => left / right,
    };

    Question {
        left,
        operator,
        right,
        answer,
    }
}
