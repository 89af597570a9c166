//! Defines a trait implemented by all error types in dcmb64.

use std::io::Write;

use owo_colors::{OwoColorize, Stream::Stderr};

/// Error trait implemented by all error types in dcmb64.
///
pub trait Dcmb64Error {
  /// Returns lines of text that describe an error in a human-readable format.
  ///
  fn to_lines(&self, task_description: &str) -> Vec<String>;

  /// Prints details on the error to stderr. This will include all details and
  /// contextual information stored in the error.
  ///
  fn print(&self, task_description: &str) {
    print_error_lines(&self.to_lines(task_description));
  }
}

/// Prints lines of error information to stderr as a single block, after
/// flushing any pending stdout output.
///
pub fn print_error_lines(lines: &[String]) {
  let _ = std::io::stdout().flush();

  let mut stderr = std::io::stderr().lock();
  for line in error_block(lines) {
    let _ = writeln!(
      stderr,
      "{}",
      line.if_supports_color(Stderr, |text| text.red())
    );
  }
}

/// Surrounds lines of error information with a header naming the tool and
/// blank separator lines.
///
pub fn error_block(lines: &[String]) -> Vec<String> {
  let mut block = Vec::with_capacity(lines.len() + 3);

  block.push(String::new());
  block.push("----- dcmb64 -----".to_string());
  block.extend(lines.iter().cloned());
  block.push(String::new());

  block
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_block_has_header() {
    let lines = vec!["Error reading file".to_string(), "  Bad".to_string()];

    assert_eq!(
      error_block(&lines),
      vec!["", "----- dcmb64 -----", "Error reading file", "  Bad", ""]
    );
  }

  #[test]
  fn error_block_without_lines() {
    assert_eq!(error_block(&[]), vec!["", "----- dcmb64 -----", ""]);
  }
}
