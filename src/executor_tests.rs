// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for lexicon execution and result parsing.

#[cfg(test)]
mod tests {
    use crate::command::{build_command, CommandSpec, DnsOperation, RecordChange};
    use crate::credentials::ResolvedCredentials;
    use crate::errors::SolverError;
    use crate::executor::{parse_result, CommandExecutor};

    fn create_spec() -> CommandSpec {
        build_command(
            "route53",
            &RecordChange {
                operation: DnsOperation::Create,
                zone: "example.com.",
                fqdn: "_acme-challenge.example.com.",
                content: "abc123",
                ttl: Some(120),
            },
            &ResolvedCredentials {
                api_key: "AKIAEXAMPLE".to_string(),
                api_secret: "secret".to_string(),
            },
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_result_true() {
        assert_eq!(parse_result("true\n"), Ok(true));
        assert_eq!(parse_result("  True  "), Ok(true));
    }

    #[test]
    fn test_parse_result_false() {
        assert_eq!(parse_result("false"), Ok(false));
    }

    #[test]
    fn test_parse_result_uses_last_non_empty_line() {
        let stdout = "Record created\n[{\"type\": \"TXT\"}]\n  true \n\n   \n";

        assert_eq!(parse_result(stdout), Ok(true));
    }

    #[test]
    fn test_parse_result_ignores_earlier_booleans() {
        assert_eq!(parse_result("true\nsomething went wrong\n"), Err("something went wrong".to_string()));
    }

    #[test]
    fn test_parse_result_empty_output() {
        assert_eq!(parse_result(""), Err(String::new()));
        assert_eq!(parse_result("\n \n"), Err(String::new()));
    }

    #[test]
    fn test_parse_result_rejects_other_words() {
        assert_eq!(parse_result("yes"), Err("yes".to_string()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_execution_error() {
        let executor = CommandExecutor::new("/nonexistent/path/to/lexicon", None);

        let result = executor.execute(&create_spec()).await;

        match result {
            Err(SolverError::Execution { message, .. }) => {
                assert!(message.contains("failed to start"));
            }
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    mod process {
        use super::create_spec;
        use crate::errors::SolverError;
        use crate::executor::CommandExecutor;
        use crate::test_support::fake_lexicon;
        use std::time::Duration;

        #[tokio::test]
        async fn test_true_result_is_success() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo 'RESULT'\necho 'true'");
            let executor = CommandExecutor::new(program, None);

            let result = executor.execute(&create_spec()).await.unwrap();

            assert!(result.success);
            assert!(result.stdout.contains("RESULT"));
            assert!(result.stderr.is_empty());
        }

        #[tokio::test]
        async fn test_false_result_is_not_success() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo false");
            let executor = CommandExecutor::new(program, None);

            let result = executor.execute(&create_spec()).await.unwrap();

            assert!(!result.success);
        }

        #[tokio::test]
        async fn test_unparsable_result_is_not_success() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo '{\"status\": \"ok\"}'");
            let executor = CommandExecutor::new(program, None);

            let result = executor.execute(&create_spec()).await.unwrap();

            assert!(!result.success);
        }

        #[tokio::test]
        async fn test_stdout_and_stderr_are_captured_separately() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo 'deprecation warning' >&2\necho true");
            let executor = CommandExecutor::new(program, None);

            let result = executor.execute(&create_spec()).await.unwrap();

            assert!(result.success);
            assert_eq!(result.stdout.trim(), "true");
            assert_eq!(result.stderr.trim(), "deprecation warning");
        }

        #[tokio::test]
        async fn test_arguments_are_passed_in_order() {
            let dir = tempfile::tempdir().unwrap();
            let args_file = dir.path().join("args");
            let program = fake_lexicon(
                dir.path(),
                &format!(
                    "for arg in \"$@\"; do echo \"$arg\" >> '{}'; done\necho true",
                    args_file.display()
                ),
            );
            let executor = CommandExecutor::new(program, None);
            let spec = create_spec();

            executor.execute(&spec).await.unwrap();

            let recorded = std::fs::read_to_string(&args_file).unwrap();
            let recorded: Vec<&str> = recorded.lines().collect();
            assert_eq!(recorded, spec.args());
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_execution_error() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo 'provider rejected credentials' >&2\nexit 3");
            let executor = CommandExecutor::new(program, None);

            let result = executor.execute(&create_spec()).await;

            match result {
                Err(SolverError::Execution { message, stderr }) => {
                    assert!(message.contains("lexicon exited with"));
                    assert_eq!(stderr.as_deref(), Some("provider rejected credentials"));
                }
                other => panic!("expected execution error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_timeout_is_execution_error() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "exec sleep 10");
            let executor = CommandExecutor::new(program, Some(Duration::from_millis(200)));

            let result = executor.execute(&create_spec()).await;

            match result {
                Err(SolverError::Execution { message, .. }) => {
                    assert!(message.contains("timed out"));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_stop_signal_cancels_command() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "exec sleep 10");
            let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
            let executor = CommandExecutor::new(program, None).with_stop_signal(stop_rx);

            let stopper = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                stop_tx.send(true).unwrap();
                stop_tx
            });

            let result = tokio::time::timeout(Duration::from_secs(5), executor.execute(&create_spec()))
                .await
                .expect("stop signal should interrupt the command");

            match result {
                Err(SolverError::Execution { message, .. }) => {
                    assert!(message.contains("cancelled"));
                }
                other => panic!("expected cancellation, got {other:?}"),
            }
            drop(stopper.await.unwrap());
        }

        #[tokio::test]
        async fn test_timeout_keeps_stderr_written_before_kill() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo 'waiting for provider API' >&2\nexec sleep 10");
            let executor = CommandExecutor::new(program, Some(Duration::from_millis(500)));

            let result = executor.execute(&create_spec()).await;

            match result {
                Err(SolverError::Execution { message, stderr }) => {
                    assert!(message.contains("timed out"));
                    assert_eq!(stderr.as_deref(), Some("waiting for provider API"));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_stop_signal_already_set_does_not_start_command() {
            let dir = tempfile::tempdir().unwrap();
            let marker = dir.path().join("started");
            let program = fake_lexicon(
                dir.path(),
                &format!("touch '{}'\necho true", marker.display()),
            );
            let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
            stop_tx.send(true).unwrap();
            let executor = CommandExecutor::new(program, None).with_stop_signal(stop_rx);

            let result = executor.execute(&create_spec()).await;

            match result {
                Err(SolverError::Execution { message, stderr }) => {
                    assert!(message.contains("cancelled"));
                    assert!(stderr.is_none());
                }
                other => panic!("expected cancellation, got {other:?}"),
            }
            assert!(!marker.exists());
        }

        #[tokio::test]
        async fn test_dropped_stop_sender_never_cancels() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_lexicon(dir.path(), "echo true");
            let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
            drop(stop_tx);
            let executor = CommandExecutor::new(program, None).with_stop_signal(stop_rx);

            let result = executor.execute(&create_spec()).await.unwrap();

            assert!(result.success);
        }
    }
}
