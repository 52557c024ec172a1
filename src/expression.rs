use log::trace;
use std::{cell::RefCell, collections::HashMap, fmt, sync::Arc};

/// How many symbol references may be followed while evaluating a single expression. Exceeding
/// the limit means the references are circular.
pub const MAX_REFERENCE_DEPTH: usize = 64;

/// How deep subexpressions may nest, counting parentheses, operators and resolved references.
pub const MAX_NESTING_DEPTH: usize = 256;

/// The value returned from a failed evaluation. It never parses as a number.
pub const UNKNOWN_VALUE: &str = "x";

/// Resolves the symbol references used in expressions.
pub trait SymbolTable {
  /// The expression bound to `reference`, if the symbol exists.
  fn value_of(&self, reference: &str) -> Option<String>;

  /// The human-readable name of `reference`, if it differs from the reference itself.
  fn display_name_of(&self, _reference: &str) -> Option<String> {
    None
  }
}

impl SymbolTable for HashMap<String, String> {
  fn value_of(&self, reference: &str) -> Option<String> {
    self.get(reference).cloned()
  }
}

/// A symbol table with no symbols. Every reference is unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;
impl SymbolTable for NoSymbols {
  fn value_of(&self, _reference: &str) -> Option<String> {
    None
  }
}

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationFailure {
  Empty,
  UnexpectedCharacter(char),
  UnexpectedToken(String),
  UnexpectedEnd,
  InvalidLiteral(String),
  UnknownSymbol(String),
  UnknownFunction(String),
  DivisionByZero,
  ReferenceDepthExceeded(String),
  NestingTooDeep,
}
impl fmt::Display for EvaluationFailure {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      EvaluationFailure::Empty => write!(f, "empty expression"),
      EvaluationFailure::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c),
      EvaluationFailure::UnexpectedToken(t) => write!(f, "unexpected token '{}'", t),
      EvaluationFailure::UnexpectedEnd => write!(f, "unexpected end of expression"),
      EvaluationFailure::InvalidLiteral(l) => write!(f, "invalid literal '{}'", l),
      EvaluationFailure::UnknownSymbol(s) => write!(f, "unknown symbol '{}'", s),
      EvaluationFailure::UnknownFunction(s) => write!(f, "unknown function '{}'", s),
      EvaluationFailure::DivisionByZero => write!(f, "division by zero"),
      EvaluationFailure::ReferenceDepthExceeded(s) => {
        write!(f, "too many nested references while resolving '{}'", s)
      }
      EvaluationFailure::NestingTooDeep => write!(f, "expression is nested too deeply"),
    }
  }
}

type Evaluation = Result<u64, EvaluationFailure>;

/// Evaluates `expression` against `symbols`. Returns the base-10 value and whether the
/// evaluation succeeded. An empty expression yields an empty value.
pub fn evaluate(expression: &str, symbols: &dyn SymbolTable) -> (String, bool) {
  match try_evaluate(expression, symbols) {
    Ok(value) => (value.to_string(), true),
    Err(EvaluationFailure::Empty) => (String::new(), false),
    Err(failure) => {
      trace!("Could not evaluate '{}': {}", expression, failure);
      (UNKNOWN_VALUE.to_owned(), false)
    }
  }
}

/// Evaluates `expression` against `symbols` to an unsigned integer.
pub fn try_evaluate(expression: &str, symbols: &dyn SymbolTable) -> Evaluation {
  let resolver = Resolver {
    symbols,
    resolved: RefCell::new(HashMap::new()),
  };
  evaluate_at_depth(expression, &resolver, 0, 0)
}

/// Symbol lookup for a single top-level evaluation. Each symbol is evaluated at most once.
struct Resolver<'a> {
  symbols: &'a dyn SymbolTable,
  resolved: RefCell<HashMap<String, u64>>,
}

fn evaluate_at_depth(
  expression: &str,
  resolver: &Resolver,
  depth: usize,
  nesting: usize,
) -> Evaluation {
  let tokens = tokenize(expression)?;
  if tokens.is_empty() {
    return Err(EvaluationFailure::Empty);
  }

  let mut parser = Parser {
    tokens,
    position: 0,
    resolver,
    depth,
    nesting,
    evaluating: true,
  };

  let value = parser.ternary()?;
  match parser.peek() {
    None => Ok(value),
    Some(token) => Err(EvaluationFailure::UnexpectedToken(token.to_string())),
  }
}

/// Evaluates expressions against a shared symbol table.
#[derive(Clone)]
pub struct ExpressionParser {
  symbols: Arc<dyn SymbolTable + Send + Sync>,
}
impl ExpressionParser {
  pub fn new(symbols: Arc<dyn SymbolTable + Send + Sync>) -> Self {
    Self { symbols }
  }

  /// A parser that knows no symbols; only literal arithmetic evaluates.
  pub fn without_symbols() -> Self {
    Self::new(Arc::new(NoSymbols))
  }

  /// Returns the base-10 value of `expression` and whether the evaluation succeeded.
  pub fn parse_expression(&self, expression: &str) -> (String, bool) {
    evaluate(expression, self.symbols.as_ref())
  }

  /// Returns the value of `expression`, if it evaluates.
  pub fn value_of(&self, expression: &str) -> Option<u64> {
    try_evaluate(expression, self.symbols.as_ref()).ok()
  }

  pub fn is_valid_expression(&self, expression: &str) -> bool {
    self.value_of(expression).is_some()
  }

  pub fn symbols(&self) -> &dyn SymbolTable {
    self.symbols.as_ref()
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
  Number(u64),
  Symbol(String),
  Function(String),
  Operator(&'static str),
  OpenParen,
  CloseParen,
  Comma,
  Question,
  Colon,
}
impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Token::Number(n) => write!(f, "{}", n),
      Token::Symbol(s) => write!(f, "{}", s),
      Token::Function(s) => write!(f, "${}", s),
      Token::Operator(o) => write!(f, "{}", o),
      Token::OpenParen => write!(f, "("),
      Token::CloseParen => write!(f, ")"),
      Token::Comma => write!(f, ","),
      Token::Question => write!(f, "?"),
      Token::Colon => write!(f, ":"),
    }
  }
}

// Longest operators first so that `<<` is not read as `<`.
const OPERATORS: [&str; 21] = [
  "**", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+", "-", "*", "/", "%", "<", ">", "&",
  "|", "^", "~", "!",
];

fn tokenize(expression: &str) -> Result<Vec<Token>, EvaluationFailure> {
  let chars: Vec<char> = expression.chars().collect();
  let mut tokens = Vec::new();
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];

    if c.is_whitespace() {
      i += 1;
    } else if c.is_ascii_digit() || c == '\'' {
      let start = i;
      while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '_') {
        i += 1;
      }
      if i < chars.len() && chars[i] == '\'' {
        i += 1;
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
          i += 1;
        }
      }
      let literal: String = chars[start..i].iter().collect();
      tokens.push(Token::Number(parse_literal(&literal)?));
    } else if c.is_ascii_alphabetic() || c == '_' || c == '$' {
      let start = i;
      i += 1;
      while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
      }
      let name: String = chars[start..i].iter().collect();
      match name.strip_prefix('$') {
        Some(function) => tokens.push(Token::Function(function.to_owned())),
        None => tokens.push(Token::Symbol(name)),
      }
    } else {
      let single = match c {
        '(' => Some(Token::OpenParen),
        ')' => Some(Token::CloseParen),
        ',' => Some(Token::Comma),
        '?' => Some(Token::Question),
        ':' => Some(Token::Colon),
        _ => None,
      };

      if let Some(token) = single {
        tokens.push(token);
        i += 1;
        continue;
      }

      let rest: String = chars[i..].iter().take(2).collect();
      match OPERATORS.iter().find(|op| rest.starts_with(*op)) {
        Some(op) => {
          tokens.push(Token::Operator(*op));
          i += op.len();
        }
        None => return Err(EvaluationFailure::UnexpectedCharacter(c)),
      }
    }
  }

  Ok(tokens)
}

/// Parses a decimal literal or a sized/unsized based literal such as `8'hFF` or `'b1010`.
fn parse_literal(literal: &str) -> Evaluation {
  let invalid = || EvaluationFailure::InvalidLiteral(literal.to_owned());

  let (size, based) = match literal.find('\'') {
    Some(index) => (&literal[..index], Some(&literal[index + 1..])),
    None => (literal, None),
  };

  let based = match based {
    Some(b) => b,
    None => return parse_digits(size, 10).ok_or_else(invalid),
  };

  if !size.is_empty() && parse_digits(size, 10).map_or(true, |s| s == 0) {
    return Err(invalid());
  }

  let based = based
    .strip_prefix(|c: char| c == 's' || c == 'S')
    .unwrap_or(based);
  let mut chars = based.chars();
  let radix = match chars.next() {
    Some('b') | Some('B') => 2,
    Some('o') | Some('O') => 8,
    Some('d') | Some('D') => 10,
    Some('h') | Some('H') => 16,
    _ => return Err(invalid()),
  };

  parse_digits(chars.as_str(), radix).ok_or_else(invalid)
}

fn parse_digits(digits: &str, radix: u32) -> Option<u64> {
  let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
  if cleaned.is_empty() {
    return None;
  }
  u64::from_str_radix(&cleaned, radix).ok()
}

struct Parser<'a> {
  tokens: Vec<Token>,
  position: usize,
  resolver: &'a Resolver<'a>,
  depth: usize,
  nesting: usize,

  // Cleared while parsing an operand whose value is not used, such as the branch of `?:`
  // that is not selected. Symbols are not resolved and arithmetic does not fail there.
  evaluating: bool,
}
impl<'a> Parser<'a> {
  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.position)
  }

  fn next(&mut self) -> Option<Token> {
    let token = self.tokens.get(self.position).cloned();
    self.position += 1;
    token
  }

  fn expect(&mut self, expected: Token) -> Result<(), EvaluationFailure> {
    match self.next() {
      Some(ref t) if *t == expected => Ok(()),
      Some(t) => Err(EvaluationFailure::UnexpectedToken(t.to_string())),
      None => Err(EvaluationFailure::UnexpectedEnd),
    }
  }

  fn nested(&mut self, f: impl FnOnce(&mut Self) -> Evaluation) -> Evaluation {
    if self.nesting >= MAX_NESTING_DEPTH {
      return Err(EvaluationFailure::NestingTooDeep);
    }

    self.nesting += 1;
    let result = f(self);
    self.nesting -= 1;
    result
  }

  fn operand(&mut self, used: bool, f: impl FnOnce(&mut Self) -> Evaluation) -> Evaluation {
    let evaluating = self.evaluating;
    self.evaluating = evaluating && used;
    let result = f(self);
    self.evaluating = evaluating;
    result
  }

  fn ternary(&mut self) -> Evaluation {
    self.nested(|p| {
      let condition = p.binary(0)?;
      if p.peek() != Some(&Token::Question) {
        return Ok(condition);
      }

      p.position += 1;
      let selected = condition != 0;
      let when_true = p.operand(selected, |p| p.ternary())?;
      p.expect(Token::Colon)?;
      let when_false = p.operand(!selected, |p| p.ternary())?;

      Ok(if selected { when_true } else { when_false })
    })
  }

  fn binary(&mut self, min_precedence: u8) -> Evaluation {
    self.nested(|p| p.binary_from(min_precedence))
  }

  fn binary_from(&mut self, min_precedence: u8) -> Evaluation {
    let mut left = self.unary()?;

    while let Some(Token::Operator(op)) = self.peek() {
      let op = *op;
      let precedence = match binary_precedence(op) {
        Some(p) if p >= min_precedence => p,
        _ => break,
      };
      self.position += 1;

      // `**` is right-associative, everything else left-associative.
      let next_precedence = if op == "**" { precedence } else { precedence + 1 };
      let used = match op {
        "&&" => left != 0,
        "||" => left == 0,
        _ => true,
      };
      let right = self.operand(used, |p| p.binary(next_precedence))?;
      if self.evaluating {
        left = apply_binary(op, left, right)?;
      }
    }

    Ok(left)
  }

  fn unary(&mut self) -> Evaluation {
    self.nested(|p| p.unary_operand())
  }

  fn unary_operand(&mut self) -> Evaluation {
    match self.peek() {
      Some(Token::Operator("-")) => {
        self.position += 1;
        Ok(self.unary()?.wrapping_neg())
      }
      Some(Token::Operator("+")) => {
        self.position += 1;
        self.unary()
      }
      Some(Token::Operator("!")) => {
        self.position += 1;
        Ok((self.unary()? == 0) as u64)
      }
      Some(Token::Operator("~")) => {
        self.position += 1;
        Ok(!self.unary()?)
      }
      _ => self.primary(),
    }
  }

  fn primary(&mut self) -> Evaluation {
    match self.next() {
      Some(Token::Number(n)) => Ok(n),
      Some(Token::Symbol(name)) => self.resolve(&name),
      Some(Token::Function(name)) => self.function(&name),
      Some(Token::OpenParen) => {
        let value = self.ternary()?;
        self.expect(Token::CloseParen)?;
        Ok(value)
      }
      Some(t) => Err(EvaluationFailure::UnexpectedToken(t.to_string())),
      None => Err(EvaluationFailure::UnexpectedEnd),
    }
  }

  fn resolve(&self, name: &str) -> Evaluation {
    if !self.evaluating {
      return Ok(0);
    }

    let cached = self.resolver.resolved.borrow().get(name).copied();
    if let Some(value) = cached {
      return Ok(value);
    }

    if self.depth >= MAX_REFERENCE_DEPTH {
      return Err(EvaluationFailure::ReferenceDepthExceeded(name.to_owned()));
    }

    let expression = match self.resolver.symbols.value_of(name) {
      Some(e) => e,
      None => return Err(EvaluationFailure::UnknownSymbol(name.to_owned())),
    };

    // Only successes are kept; a failure ends the whole evaluation anyway.
    match evaluate_at_depth(&expression, self.resolver, self.depth + 1, self.nesting) {
      Ok(value) => {
        self
          .resolver
          .resolved
          .borrow_mut()
          .insert(name.to_owned(), value);
        Ok(value)
      }
      Err(EvaluationFailure::Empty) => Err(EvaluationFailure::UnknownSymbol(name.to_owned())),
      Err(failure) => Err(failure),
    }
  }

  fn function(&mut self, name: &str) -> Evaluation {
    self.expect(Token::OpenParen)?;
    let mut arguments = vec![self.ternary()?];
    while self.peek() == Some(&Token::Comma) {
      self.position += 1;
      arguments.push(self.ternary()?);
    }
    self.expect(Token::CloseParen)?;

    if !self.evaluating {
      return Ok(0);
    }

    match (name, arguments.as_slice()) {
      ("clog2", [x]) => Ok(clog2(*x)),
      ("pow", [x, y]) => Ok(wrapping_pow(*x, *y)),
      ("sqrt", [x]) => Ok(isqrt(*x)),
      _ => Err(EvaluationFailure::UnknownFunction(name.to_owned())),
    }
  }
}

fn binary_precedence(op: &str) -> Option<u8> {
  match op {
    "||" => Some(1),
    "&&" => Some(2),
    "|" => Some(3),
    "^" => Some(4),
    "&" => Some(5),
    "==" | "!=" => Some(6),
    "<" | "<=" | ">" | ">=" => Some(7),
    "<<" | ">>" => Some(8),
    "+" | "-" => Some(9),
    "*" | "/" | "%" => Some(10),
    "**" => Some(11),
    _ => None,
  }
}

fn apply_binary(op: &str, left: u64, right: u64) -> Evaluation {
  let value = match op {
    "||" => (left != 0 || right != 0) as u64,
    "&&" => (left != 0 && right != 0) as u64,
    "|" => left | right,
    "^" => left ^ right,
    "&" => left & right,
    "==" => (left == right) as u64,
    "!=" => (left != right) as u64,
    "<" => (left < right) as u64,
    "<=" => (left <= right) as u64,
    ">" => (left > right) as u64,
    ">=" => (left >= right) as u64,
    "<<" => shift(left, right, u64::checked_shl),
    ">>" => shift(left, right, u64::checked_shr),
    "+" => left.wrapping_add(right),
    "-" => left.wrapping_sub(right),
    "*" => left.wrapping_mul(right),
    "/" => left
      .checked_div(right)
      .ok_or(EvaluationFailure::DivisionByZero)?,
    "%" => left
      .checked_rem(right)
      .ok_or(EvaluationFailure::DivisionByZero)?,
    "**" => wrapping_pow(left, right),
    _ => return Err(EvaluationFailure::UnexpectedToken(op.to_owned())),
  };

  Ok(value)
}

fn shift(value: u64, amount: u64, f: fn(u64, u32) -> Option<u64>) -> u64 {
  if amount >= 64 {
    return 0;
  }
  f(value, amount as u32).unwrap_or(0)
}

fn wrapping_pow(mut base: u64, mut exponent: u64) -> u64 {
  let mut result: u64 = 1;
  while exponent > 0 {
    if exponent & 1 == 1 {
      result = result.wrapping_mul(base);
    }
    base = base.wrapping_mul(base);
    exponent >>= 1;
  }
  result
}

fn clog2(value: u64) -> u64 {
  if value <= 1 {
    0
  } else {
    64 - (value - 1).leading_zeros() as u64
  }
}

fn isqrt(value: u64) -> u64 {
  let (mut low, mut high) = (0u64, 1u64 << 32);
  while low + 1 < high {
    let mid = low + (high - low) / 2;
    if mid.checked_mul(mid).map_or(false, |square| square <= value) {
      low = mid;
    } else {
      high = mid;
    }
  }
  low
}
