use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use crate::{
    CorrectionEnv, Result, SYSTEM_PROMPT, TEMPERATURE, TextCorrector, TransportError,
    is_retryable_error, max_tokens_for,
};

/// Runs an external program per paragraph: the text goes to its stdin, the
/// corrected text (or the sentinel) is read from its stdout.
///
/// The program receives the editorial prompt and request parameters through
/// `TAFSIR_SYSTEM_PROMPT`, `TAFSIR_MODEL`, `TAFSIR_TEMPERATURE` and
/// `TAFSIR_MAX_TOKENS`.
#[derive(Debug, Clone)]
pub struct CommandCorrector {
    program: String,
    args: Vec<String>,
    model: String,
}

impl CommandCorrector {
    pub fn new(program: impl Into<String>, args: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            model: model.into(),
        }
    }

    pub fn from_env(env: &CorrectionEnv) -> Result<Self> {
        Ok(Self::new(
            env.corrector_command()?,
            env.corrector_args.clone(),
            env.model.clone(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextCorrector for CommandCorrector {
    fn correct(&self, text: &str) -> std::result::Result<String, TransportError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("TAFSIR_SYSTEM_PROMPT", SYSTEM_PROMPT)
            .env("TAFSIR_MODEL", &self.model)
            .env("TAFSIR_TEMPERATURE", TEMPERATURE.to_string())
            .env("TAFSIR_MAX_TOKENS", max_tokens_for(text).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    TransportError::Fatal(format!("cannot run {}: {e}", self.program))
                }
                _ => TransportError::Transient(format!("cannot run {}: {e}", self.program)),
            })?;

        // stdin is fed from its own thread while stdout and stderr drain here.
        let stdin = child.stdin.take();
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(text.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.map_err(|e| TransportError::Transient(e.to_string()))?;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(TransportError::Transient(e.to_string())),
            Err(_) => {
                return Err(TransportError::Transient(format!(
                    "writing to {} panicked",
                    self.program
                )));
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = format!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(if is_retryable_error(&stderr) {
                TransportError::Transient(message)
            } else {
                TransportError::Fatal(message)
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|_| TransportError::Fatal(format!("{} replied with invalid UTF-8", self.program)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandCorrector {
        CommandCorrector::new("sh", vec!["-c".to_string(), script.to_string()], "gpt-4o-mini")
    }

    #[test]
    fn echoes_stdin_back() {
        let corrector = CommandCorrector::new("cat", vec![], "gpt-4o-mini");
        assert_eq!(corrector.correct("Хвала Аллаху").unwrap(), "Хвала Аллаху");
    }

    #[test]
    fn paragraph_larger_than_pipe_buffer_round_trips() {
        let text = "Толкование этого аята разъясняет смысл. ".repeat(3000);
        assert!(text.len() > 64 * 1024);

        let (tx, rx) = std::sync::mpsc::channel();
        let worker = {
            let text = text.clone();
            std::thread::spawn(move || {
                let corrector = CommandCorrector::new("cat", vec![], "gpt-4o-mini");
                let _ = tx.send(corrector.correct(&text));
            })
        };

        let reply = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("corrector stalled on a large paragraph");
        assert_eq!(reply.unwrap(), text);
        worker.join().unwrap();
    }

    #[test]
    fn passes_request_parameters_through_env() {
        let corrector = shell("cat >/dev/null; printf '%s|%s' \"$TAFSIR_MODEL\" \"$TAFSIR_MAX_TOKENS\"");
        assert_eq!(corrector.correct("Аят").unwrap(), "gpt-4o-mini|506");
    }

    #[test]
    fn missing_program_is_fatal() {
        let corrector = CommandCorrector::new("tafsir-no-such-corrector", vec![], "m");
        assert!(matches!(corrector.correct("текст"), Err(TransportError::Fatal(_))));
    }

    #[test]
    fn failure_exit_is_transient_unless_auth() {
        let flaky = shell("cat >/dev/null; echo 'connection reset' >&2; exit 1");
        assert!(matches!(flaky.correct("текст"), Err(TransportError::Transient(_))));

        let denied = shell("cat >/dev/null; echo 'HTTP 401 Unauthorized' >&2; exit 1");
        assert!(matches!(denied.correct("текст"), Err(TransportError::Fatal(_))));
    }
}
