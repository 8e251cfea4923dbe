use std::io::{self, BufRead, Write};

use tracing::{info, warn};

use crate::report::{report, Settings};

pub const PROMPT: &str = ">>> ";

/// Parses one line at a time until `exit` or end of input.
pub fn start<R: BufRead, W: Write>(mut input: R, out: &mut W, settings: &Settings) -> io::Result<()> {
    info!("starting interactive mode");
    writeln!(out, "--- kparse interactive mode ---")?;
    writeln!(out, "Type code to parse. Enter 'exit' or press Ctrl+D to quit.")?;

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "failed to read input");
                writeln!(out, "Error reading input: {}", err)?;
                break;
            }
        }

        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        if line.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        report(out, line, settings)?;
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let mut out = Vec::new();
        start(input.as_bytes(), &mut out, &Settings::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_each_line_is_parsed_separately() {
        let out = session("val x = 1\ny = x + 2\n");
        assert_eq!(out.matches("Parse succeeded").count(), 2);
        assert_eq!(out.matches(PROMPT).count(), 3);
    }

    #[test]
    fn test_exit_stops_session() {
        let out = session("a = 1\nEXIT\nb = 2\n");
        assert_eq!(out.matches("Parse succeeded").count(), 1);
    }

    #[test]
    fn test_blank_lines_and_failures() {
        let out = session("\n   \nval = 3\n");
        assert!(!out.contains("Parse succeeded"));
        assert!(out.contains("Parse failed: Syntax error at token EQ, value '=' on line 1"));
    }
}
