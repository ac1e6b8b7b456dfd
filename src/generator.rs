//! Problem generation: arithmetic operations, the operation factory, and the
//! per-difficulty generators behind `QuestionGenerator`.
//!
//! Construction rules:
//! - Division picks divisor and quotient first and derives the dividend, so
//!   every quotient is an exact integer.
//! - Subtraction orders its operands, so the result is never negative.
//! Generators are stateless; successive calls share only the process RNG.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Difficulty, Problem};
use crate::error::GameError;

/// Inclusive operand range.
pub type NumRange = (i64, i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl MathOp {
  /// Factory mapping from the ASCII operator symbol. Adding an operation is
  /// adding an arm here; consumers dispatch through [`operation`] unchanged.
  pub fn from_symbol(symbol: char) -> Result<Self, GameError> {
    match symbol {
      '+' => Ok(MathOp::Add),
      '-' => Ok(MathOp::Sub),
      '*' => Ok(MathOp::Mul),
      '/' => Ok(MathOp::Div),
      other => Err(GameError::InvalidOperation(other)),
    }
  }
}

/// One operation bound to its operand ranges.
#[derive(Clone, Copy, Debug)]
pub struct Operation {
  op: MathOp,
  range_a: NumRange,
  range_b: NumRange,
}

/// Operation factory: symbol from `{+,-,*,/}` plus two inclusive ranges.
pub fn operation(symbol: char, range_a: NumRange, range_b: NumRange) -> Result<Operation, GameError> {
  Ok(Operation { op: MathOp::from_symbol(symbol)?, range_a, range_b })
}

impl Operation {
  /// Produce one arithmetic fact: display text plus its exact answer.
  pub fn problem<R: Rng>(&self, rng: &mut R) -> Problem {
    match self.op {
      MathOp::Add => {
        let (a, b) = self.operands(rng);
        Problem { text: format!("{a} + {b}"), answer: a + b }
      }
      MathOp::Sub => {
        let (a, b) = self.operands(rng);
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        Problem { text: format!("{hi} - {lo}"), answer: hi - lo }
      }
      MathOp::Mul => {
        let (a, b) = self.operands(rng);
        Problem { text: format!("{a} × {b}"), answer: a * b }
      }
      MathOp::Div => {
        // range_a supplies the quotient, range_b the divisor; the dividend
        // is their product, keeping the answer integer-clean.
        let quotient = rng.gen_range(self.range_a.0..=self.range_a.1);
        let divisor = rng.gen_range(self.range_b.0..=self.range_b.1);
        let dividend = divisor * quotient;
        Problem { text: format!("{dividend} ÷ {divisor}"), answer: quotient }
      }
    }
  }

  fn operands<R: Rng>(&self, rng: &mut R) -> (i64, i64) {
    (
      rng.gen_range(self.range_a.0..=self.range_a.1),
      rng.gen_range(self.range_b.0..=self.range_b.1),
    )
  }
}

const EASY_OPS: &[char] = &['+', '-'];
const MEDIUM_FORMS: &[&str] = &["add", "sub", "mul", "mixed"];
const HARD_FORMS: &[&str] = &[
  "add",
  "sub",
  "mul",
  "div",
  "multiply_add",
  "multiply_subtract",
  "divide_add",
  "divide_mixed",
];

fn pick_operation<R: Rng>(rng: &mut R, symbols: &[char], range_a: NumRange, range_b: NumRange) -> Operation {
  let symbol = symbols.choose(rng).copied().unwrap_or('+');
  operation(symbol, range_a, range_b).unwrap_or(Operation { op: MathOp::Add, range_a, range_b })
}

/// Easy: one operation from `{+,-}` on small operands.
fn easy_problem<R: Rng>(rng: &mut R) -> Problem {
  pick_operation(rng, EASY_OPS, (1, 20), (1, 20)).problem(rng)
}

/// Medium: widened `{+,-}`, small-table multiplication, and the compound
/// `a × b + c` form.
fn medium_problem<R: Rng>(rng: &mut R) -> Problem {
  let form = MEDIUM_FORMS.choose(rng).copied().unwrap_or("add");
  match form {
    "add" => pick_operation(rng, &['+'], (10, 50), (10, 50)).problem(rng),
    "sub" => pick_operation(rng, &['-'], (10, 50), (10, 50)).problem(rng),
    "mul" => pick_operation(rng, &['*'], (2, 12), (2, 12)).problem(rng),
    _ => {
      let a = rng.gen_range(2..=10);
      let b = rng.gen_range(2..=10);
      let c = rng.gen_range(2..=10);
      Problem { text: format!("{a} × {b} + {c}"), answer: a * b + c }
    }
  }
}

/// Hard: all four operations on the widest ranges plus compound forms, every
/// division constructed divisor-first.
fn hard_problem<R: Rng>(rng: &mut R) -> Problem {
  let form = HARD_FORMS.choose(rng).copied().unwrap_or("add");
  match form {
    "add" => pick_operation(rng, &['+'], (1, 100), (1, 100)).problem(rng),
    "sub" => pick_operation(rng, &['-'], (1, 100), (1, 100)).problem(rng),
    "mul" => pick_operation(rng, &['*'], (5, 15), (5, 15)).problem(rng),
    "div" => pick_operation(rng, &['/'], (2, 12), (2, 10)).problem(rng),
    "multiply_add" => {
      let a = rng.gen_range(5..=15);
      let b = rng.gen_range(5..=15);
      let c = rng.gen_range(5..=15);
      Problem { text: format!("({a} × {b}) + {c}"), answer: a * b + c }
    }
    "multiply_subtract" => {
      let a = rng.gen_range(5..=15);
      let b = rng.gen_range(5..=15);
      let c = rng.gen_range(5..=15);
      Problem { text: format!("({a} × {b}) - {c}"), answer: a * b - c }
    }
    "divide_add" => {
      let divisor = rng.gen_range(2..=10);
      let dividend = divisor * rng.gen_range(10..=20);
      let add = rng.gen_range(5..=15);
      Problem { text: format!("({dividend} ÷ {divisor}) + {add}"), answer: dividend / divisor + add }
    }
    _ => {
      let divisor = rng.gen_range(2..=10);
      let dividend = divisor * rng.gen_range(10..=20);
      let mul = rng.gen_range(2..=10);
      let add = rng.gen_range(2..=10);
      Problem {
        text: format!("({dividend} ÷ {divisor}) × {mul} + {add}"),
        answer: dividend / divisor * mul + add,
      }
    }
  }
}

/// Difficulty dispatch for one problem.
pub fn generate_for<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Problem {
  match difficulty {
    Difficulty::Easy => easy_problem(rng),
    Difficulty::Medium => medium_problem(rng),
    Difficulty::Hard => hard_problem(rng),
  }
}

/// Picks the generator for a 1–3 level once, then produces problems on demand.
#[derive(Clone, Copy, Debug)]
pub struct QuestionGenerator {
  difficulty: Difficulty,
}

impl QuestionGenerator {
  pub fn new(level: u8) -> Result<Self, GameError> {
    Ok(Self { difficulty: Difficulty::from_level(level)? })
  }

  pub fn for_difficulty(difficulty: Difficulty) -> Self {
    Self { difficulty }
  }

  pub fn difficulty(&self) -> Difficulty {
    self.difficulty
  }

  pub fn generate(&self) -> Problem {
    generate_for(self.difficulty, &mut rand::thread_rng())
  }
}
