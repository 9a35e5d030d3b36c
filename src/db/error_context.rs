//! Rich error context for MySQL/MariaDB errors raised while running a script.

use sqlx::mysql::MySqlDatabaseError;

/// Rich error context extracted from MySQL errors
#[derive(Debug, Clone)]
pub struct SqlErrorContext {
    /// The primary error message
    pub message: String,
    /// Line number in the script, when the server reports one
    pub line_number: Option<usize>,
    /// Server error number (e.g. 1064 for a syntax error)
    pub number: Option<u16>,
    /// SQLSTATE (e.g. "42S02" for an unknown table)
    pub code: Option<String>,
}

impl SqlErrorContext {
    /// Extract rich error context from a sqlx error
    pub fn from_sqlx_error(error: &sqlx::Error) -> Self {
        if let Some(db_error) = error.as_database_error()
            && let Some(my_error) = db_error.try_downcast_ref::<MySqlDatabaseError>()
        {
            let message = my_error.message().to_string();
            return Self {
                line_number: line_from_message(&message),
                message,
                number: Some(my_error.number()),
                code: my_error.code().map(|s| s.to_string()),
            };
        }

        // Fallback for transport and protocol errors
        Self {
            message: error.to_string(),
            line_number: None,
            number: None,
            code: None,
        }
    }

    /// Format the error, showing the offending lines of `sql_content` when known
    pub fn format(&self, sql_content: &str) -> String {
        let mut msg = String::from("SQL error");

        match (self.number, &self.code) {
            (Some(number), Some(code)) => msg.push_str(&format!(" {} ({})", number, code)),
            (Some(number), None) => msg.push_str(&format!(" {}", number)),
            _ => {}
        }
        if let Some(line) = self.line_number {
            msg.push_str(&format!(" at line {}", line));
        }
        msg.push_str(&format!(": {}", self.message));

        if let Some(line) = self.line_number {
            msg.push_str(&format!("\n\n{}", format_line_context(sql_content, line)));
        }

        msg
    }
}

/// MySQL reports syntax errors as "... near '...' at line N"
pub fn line_from_message(message: &str) -> Option<usize> {
    let idx = message.rfind("at line ")?;
    let digits: String = message[idx + "at line ".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Format SQL content showing context around the error line
pub fn format_line_context(content: &str, error_line: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();
    const CONTEXT_LINES: usize = 3;

    let error_idx = error_line.saturating_sub(1);
    let start_idx = error_idx.saturating_sub(CONTEXT_LINES).min(total_lines);
    let end_idx = (error_idx + CONTEXT_LINES + 1).min(total_lines);

    let mut result = String::new();

    if start_idx > 0 {
        result.push_str(&format!("  ... [{} lines above]\n", start_idx));
    }

    for (idx, line) in lines[start_idx..end_idx].iter().enumerate() {
        let line_num = start_idx + idx + 1;
        let marker = if line_num == error_line { ">" } else { " " };
        result.push_str(&format!("  {} {:4} | {}\n", marker, line_num, line));
    }

    if end_idx < total_lines {
        result.push_str(&format!("  ... [{} lines below]", total_lines - end_idx));
    }

    result
}
