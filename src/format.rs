use crate::expression::SymbolTable;
use std::sync::Arc;

/// Replaces the symbol references of an expression with the names of the symbols.
#[derive(Clone)]
pub struct ExpressionFormatter {
  symbols: Arc<dyn SymbolTable + Send + Sync>,
}
impl ExpressionFormatter {
  pub fn new(symbols: Arc<dyn SymbolTable + Send + Sync>) -> Self {
    Self { symbols }
  }

  /// Formats `expression` for display. Operators, literals and spacing are kept as written;
  /// references without a display name are left untouched.
  pub fn format_referring_expression(&self, expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut formatted = String::with_capacity(expression.len());
    let mut i = 0;

    while i < chars.len() {
      let c = chars[i];
      let start = i;

      if c.is_ascii_digit() || c == '\'' {
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
          i += 1;
        }
        if i < chars.len() && chars[i] == '\'' {
          i += 1;
          while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
            i += 1;
          }
        }
        formatted.extend(&chars[start..i]);
      } else if c.is_ascii_alphabetic() || c == '_' {
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
          i += 1;
        }
        let reference: String = chars[start..i].iter().collect();
        match self.symbols.display_name_of(&reference) {
          Some(name) => formatted.push_str(&name),
          None => formatted.push_str(&reference),
        }
      } else if c == '$' {
        i += 1;
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
          i += 1;
        }
        formatted.extend(&chars[start..i]);
      } else {
        formatted.push(c);
        i += 1;
      }
    }

    formatted
  }
}

/// Renders evaluated values in the numeric base chosen for display.
#[derive(Clone)]
pub struct ValueFormatter {
  expression_formatter: ExpressionFormatter,
}
impl ValueFormatter {
  pub fn new(expression_formatter: ExpressionFormatter) -> Self {
    Self {
      expression_formatter,
    }
  }

  /// Formats `value` in `base`.
  ///
  /// Base 0 keeps the expression form, with references replaced by their names. Bases 2, 8 and
  /// 16 produce a sized literal such as `8'hFF`, sized to the bit length of the value. Base 10
  /// produces a plain decimal. Values that are not unsigned integers, and any other base, are
  /// returned as given.
  pub fn format(&self, value: &str, base: u32) -> String {
    if base == 0 {
      return self.expression_formatter.format_referring_expression(value);
    }

    let number = match value.trim().parse::<u64>() {
      Ok(n) => n,
      Err(_) => return value.to_owned(),
    };

    let bit_length = format!("{:b}", number).len();

    match base {
      2 => format!("{}'b{:b}", bit_length, number),
      8 => format!("{}'o{:o}", bit_length, number),
      10 => number.to_string(),
      16 => format!("{}'h{:X}", bit_length, number),
      _ => value.to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{ExpressionFormatter, ValueFormatter};
  use crate::expression::{evaluate, NoSymbols, SymbolTable};
  use std::sync::Arc;

  struct NamedSymbols;
  impl SymbolTable for NamedSymbols {
    fn value_of(&self, reference: &str) -> Option<String> {
      match reference {
        "ID_width" => Some("8".to_owned()),
        _ => None,
      }
    }

    fn display_name_of(&self, reference: &str) -> Option<String> {
      match reference {
        "ID_width" => Some("WIDTH".to_owned()),
        _ => None,
      }
    }
  }

  fn formatter() -> ValueFormatter {
    ValueFormatter::new(ExpressionFormatter::new(Arc::new(NamedSymbols)))
  }

  #[test]
  fn formats_sized_literals() {
    let formatter = formatter();

    assert_eq!("8'hFF", formatter.format("255", 16));
    assert_eq!("4'b1010", formatter.format("10", 2));
    assert_eq!("4'o10", formatter.format("8", 8));
    assert_eq!("1'h0", formatter.format("0", 16));
    assert_eq!("255", formatter.format("255", 10));
  }

  #[test]
  fn leaves_unformattable_values() {
    let formatter = formatter();

    assert_eq!("x", formatter.format("x", 16));
    assert_eq!("12", formatter.format("12", 3));
  }

  #[test]
  fn sized_literals_evaluate_back() {
    let formatter = formatter();

    for value in &[0u64, 1, 5, 255, 4096, u64::MAX] {
      for base in &[2, 8, 16] {
        let literal = formatter.format(&value.to_string(), *base);
        assert_eq!((value.to_string(), true), evaluate(&literal, &NoSymbols));
      }
    }
  }

  #[test]
  fn base_zero_keeps_expression() {
    let formatter = formatter();

    assert_eq!(
      "WIDTH * 2 + 8'hF0 - UNKNOWN",
      formatter.format("ID_width * 2 + 8'hF0 - UNKNOWN", 0)
    );
    assert_eq!("$clog2(WIDTH)", formatter.format("$clog2(ID_width)", 0));
  }
}
