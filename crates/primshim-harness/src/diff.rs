//! Diff rendering for fixture comparison.

/// Render a text diff between expected and actual output.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");

    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let common = expected_lines.len().min(actual_lines.len());

    for i in 0..common {
        if expected_lines[i] != actual_lines[i] {
            out.push_str(&format!("@@ line {} @@\n", i + 1));
            out.push_str(&format!("-{}\n", expected_lines[i]));
            out.push_str(&format!("+{}\n", actual_lines[i]));
        }
    }
    for (i, line) in expected_lines.iter().enumerate().skip(common) {
        out.push_str(&format!("@@ line {} @@\n-{line}\n", i + 1));
    }
    for (i, line) in actual_lines.iter().enumerate().skip(common) {
        out.push_str(&format!("@@ line {} @@\n+{line}\n", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_render_marker() {
        assert_eq!(render_diff("65", "65"), "[identical]");
    }

    #[test]
    fn changed_line_renders_both_sides() {
        let diff = render_diff("65", "0");
        assert!(diff.contains("-65"));
        assert!(diff.contains("+0"));
        assert!(diff.contains("@@ line 1 @@"));
    }

    #[test]
    fn trailing_extra_lines_are_reported() {
        let diff = render_diff("a", "a\nb");
        assert!(diff.contains("@@ line 2 @@"));
        assert!(diff.contains("+b"));
    }
}
