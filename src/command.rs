use std::path::PathBuf;

use itertools::Itertools;

use crate::domain::ExecutionRequest;

/// Describes one launch of a compiled Java program under a restrictive
/// runtime policy. The engine itself is argv-agnostic; this builder covers
/// the one concrete use case of running untrusted submissions.
#[derive(Clone, Debug)]
pub struct JvmLaunch {
    pub java_path: String,
    pub heap_limit_mb: u32,
    pub policy_file: PathBuf,
    pub classpath: String,
    pub main_class: String,
    pub program_args: String,
}

impl JvmLaunch {
    pub fn to_request(&self) -> ExecutionRequest {
        let mut argv = vec![
            self.java_path.clone(),
            "-Djava.security.manager".to_string(),
            format!("-Xmx{}m", self.heap_limit_mb),
            format!("-Djava.security.policy={}", self.policy_file.display()),
            "-cp".to_string(),
            self.classpath.clone(),
            self.main_class.clone(),
        ];
        argv.extend(split_program_args(&self.program_args));
        tracing::debug!("Built child command: {}", argv.iter().join(" "));
        ExecutionRequest::new(argv)
    }
}

/// Splits a raw program-argument string into individual arguments.
/// Whitespace separates arguments; single and double quotes group, and a
/// backslash escapes the next character (inside double quotes too, so a
/// quoted argument may contain a literal quote).
pub fn split_program_args(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    match chars.next() {
                        Some(next) => current.push(next),
                        None => current.push('\\'),
                    }
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_token = true;
                    quote = Some(c);
                }
                '\\' => {
                    in_token = true;
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                c if c.is_whitespace() => {
                    if in_token {
                        args.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    in_token = true;
                    current.push(c);
                }
            },
        }
    }
    if in_token {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(program_args: &str) -> JvmLaunch {
        JvmLaunch {
            java_path: "java".to_string(),
            heap_limit_mb: 64,
            policy_file: PathBuf::from("/srv/judge/student.policy"),
            classpath: "/srv/judge/classes".to_string(),
            main_class: "submission.Main".to_string(),
            program_args: program_args.to_string(),
        }
    }

    #[test]
    fn test_argv_layout() {
        let request = launch("alpha beta").to_request();
        let expected: Vec<String> = [
            "java",
            "-Djava.security.manager",
            "-Xmx64m",
            "-Djava.security.policy=/srv/judge/student.policy",
            "-cp",
            "/srv/judge/classes",
            "submission.Main",
            "alpha",
            "beta",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(request.argv, expected);
    }

    #[test]
    fn test_no_program_args() {
        let request = launch("").to_request();
        assert_eq!(request.argv.len(), 7);
        assert_eq!(request.argv[6], "submission.Main");
    }

    #[test]
    fn test_split_plain_words() {
        assert_eq!(split_program_args("a b  c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_keeps_quoted_words_together() {
        assert_eq!(
            split_program_args(r#"alpha "beta gamma" 'delta  epsilon'"#),
            vec!["alpha", "beta gamma", "delta  epsilon"]
        );
    }

    #[test]
    fn test_split_backslash_escapes_separator() {
        assert_eq!(split_program_args(r"one\ word two"), vec!["one word", "two"]);
    }

    #[test]
    fn test_split_escaped_quote_inside_double_quotes() {
        assert_eq!(split_program_args(r#""say \"hi\"""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn test_split_single_quotes_keep_backslashes() {
        assert_eq!(split_program_args(r"'a\tb'"), vec![r"a\tb"]);
    }

    #[test]
    fn test_split_empty_quotes_yield_empty_argument() {
        assert_eq!(split_program_args("a '' b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_blank_input() {
        assert!(split_program_args("").is_empty());
        assert!(split_program_args("   \t ").is_empty());
    }

    #[test]
    fn test_split_unterminated_quote_takes_rest() {
        assert_eq!(split_program_args("'tail end"), vec!["tail end"]);
    }
}
