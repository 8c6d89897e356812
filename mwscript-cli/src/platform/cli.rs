//! CLI 格式化输出
//!
//! 提供命令行友好的错误显示和源码上下文打印。

use mwscript_api::ScriptError;
use mwscript_core::compiler::Diagnostic;

/// 错误行前后显示的上下文行数
const CONTEXT_LINES: usize = 2;

/// 打印错误并显示源代码上下文
pub fn print_error_with_source(e: &ScriptError, source: Option<&str>) {
    match (e, source) {
        (ScriptError::Compile { diagnostics }, Some(source)) => {
            print_diagnostics(diagnostics, source);
            eprintln!("❌ {e}");
        }
        (ScriptError::Unrecoverable(diagnostic), Some(source)) => {
            print_diagnostics(std::slice::from_ref(diagnostic), source);
        }
        _ => eprintln!("❌ {e}"),
    }
}

/// 逐条打印诊断及其源码位置
pub fn print_diagnostics(diagnostics: &[Diagnostic], source: &str) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
        if let Some(location) = &diagnostic.location {
            print_source_context(source, location.line, location.column);
        }
    }
}

/// 打印源代码上下文（显示错误行前后几行）
fn print_source_context(source: &str, error_line: usize, error_col: usize) {
    eprint!("{}", render_source_context(source, error_line, error_col));
}

/// 渲染错误行前后几行及列标记；行号越界时为空
fn render_source_context(source: &str, error_line: usize, error_col: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let total_lines = lines.len();

    if error_line == 0 || error_line > total_lines {
        return String::new();
    }

    // 计算要显示的行范围
    let start_line = error_line.saturating_sub(CONTEXT_LINES).max(1);
    let end_line = (error_line + CONTEXT_LINES).min(total_lines);

    // 计算行号的最大宽度用于对齐
    let width = end_line.to_string().len();
    let separator = "-".repeat(width + 1);
    let mut out = format!("{separator}|--\n");

    for line_idx in start_line..=end_line {
        out.push_str(&format!("{line_idx:>width$} | {}\n", lines[line_idx - 1]));
        if line_idx == error_line {
            // 指向错误位置的标记
            let marker = " ".repeat(error_col.saturating_sub(1));
            out.push_str(&format!("{:width$} | {marker}^\n", ""));
        }
    }

    out.push_str(&format!("{separator}|--\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "begin t\nshort a\nset a to b\nend";

    #[test]
    fn test_render_source_context_marks_column() {
        let text = render_source_context(SOURCE, 3, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"--|--"));
        assert!(lines.contains(&"1 | begin t"));
        assert!(lines.contains(&"3 | set a to b"));
        assert!(lines.contains(&"  |          ^"));
        assert!(lines.contains(&"4 | end"));
    }

    #[test]
    fn test_render_source_context_out_of_range() {
        assert_eq!(render_source_context(SOURCE, 0, 1), "");
        assert_eq!(render_source_context(SOURCE, 9, 1), "");
    }
}
