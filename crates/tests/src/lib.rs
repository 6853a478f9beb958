//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置与合约的跨 crate 校验
//! - 模拟 e2e 测试（收件人文件 -> 引擎 -> Mock 网关 -> 统计 -> 失败导出）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::JobSettings;

    #[test]
    fn test_config_feeds_job_settings() {
        let config = ConfigLoader::load_from_str(
            "[dispatch]\ninterval_secs = 0\nmax_attempts = 3\njitter = false\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(
            config.dispatch.job_settings(),
            JobSettings {
                max_attempts_per_recipient: 3,
                base_interval_secs: 0,
                jitter_enabled: false,
            }
        );
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let toml = ConfigLoader::to_toml(&Default::default()).unwrap();
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.gateway.base_url, "http://localhost:3000/api");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::sync::Arc;

    use contracts::{
        Attachment, ContractError, DispatchEvent, DispatchJob, JobSettings, RecipientOutcome,
        RunState,
    };
    use dispatcher::{CancellationToken, DispatchEngine, DispatcherError, FixedJitter};
    use gateway::{GatewayCall, MockConfig, MockGateway};
    use recipients::{dedupe, RecipientSource};
    use tokio::sync::mpsc;

    fn recipient_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn settings(max_attempts: u32, interval: u64) -> JobSettings {
        JobSettings {
            max_attempts_per_recipient: max_attempts,
            base_interval_secs: interval,
            jitter_enabled: false,
        }
    }

    fn engine(mock: &Arc<MockGateway>) -> DispatchEngine<MockGateway> {
        DispatchEngine::new(Arc::clone(mock)).with_jitter(FixedJitter(0))
    }

    /// End-to-end: CSV file -> RecipientSource -> DispatchEngine -> MockGateway -> export
    ///
    /// 验证完整的数据流：
    /// 1. 读取首列、跳过表头、去掉浮点尾巴
    /// 2. 去重后按文件顺序发送
    /// 3. 失败号码重试后进入导出文件
    #[tokio::test(start_paused = true)]
    async fn test_e2e_csv_to_failure_export() {
        let file = recipient_file(
            "telefone\n5511900000001\n5511900000002.0\n\n5511900000001\n5511900000003\n",
        );
        let recipients = dedupe(RecipientSource::load_from_path(file.path()).unwrap());
        assert_eq!(recipients.len(), 3);

        let mock = Arc::new(MockGateway::new().failing("5511900000002", "number blocked"));
        let engine = engine(&mock);
        let job =
            DispatchJob::new(recipients, Some("promo".into()), vec![], settings(2, 0)).unwrap();

        let summary = engine.run(job, CancellationToken::new()).await.unwrap();

        assert_eq!(summary.state, RunState::Completed);
        assert_eq!(summary.statistics.total, 3);
        assert_eq!(summary.statistics.succeeded, 2);
        assert_eq!(summary.statistics.failed, 1);
        assert_eq!(summary.attempts, 4);
        assert_eq!(mock.calls_for("5511900000002"), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");
        let exported = engine.reporter().export_failures_to(&path).unwrap();
        assert_eq!(exported, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "number,error\n5511900000002,number blocked\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_e2e_text_then_attachments_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut attachments = Vec::new();
        for name in ["menu.pdf", "photo.jpg"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"data").unwrap();
            attachments.push(Attachment::from_path(&path).unwrap());
        }

        let file = recipient_file("numero\n111\n222\n");
        let recipients = RecipientSource::load_from_path(file.path()).unwrap();

        let mock = Arc::new(MockGateway::new());
        let job = DispatchJob::new(recipients, Some("hello".into()), attachments, settings(1, 0))
            .unwrap();
        engine(&mock)
            .run(job, CancellationToken::new())
            .await
            .unwrap();

        let file_call = |number: &str, file_name: &str| GatewayCall::File {
            number: number.into(),
            file_name: file_name.into(),
        };
        let text_call = |number: &str| GatewayCall::Text {
            number: number.into(),
            message: "hello".into(),
        };
        assert_eq!(
            mock.send_calls(),
            vec![
                text_call("111"),
                file_call("111", "menu.pdf"),
                file_call("111", "photo.jpg"),
                text_call("222"),
                file_call("222", "menu.pdf"),
                file_call("222", "photo.jpg"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_e2e_cancel_after_first_recipient() {
        let file = recipient_file("numero\n1\n2\n3\n");
        let recipients = RecipientSource::load_from_path(file.path()).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mock = Arc::new(MockGateway::new());
        let engine = engine(&mock).with_events(tx);
        let job = DispatchJob::new(recipients, Some("hi".into()), vec![], settings(2, 10)).unwrap();

        let handle = engine.spawn(job).unwrap();
        drop(engine);

        while let Some(event) = rx.recv().await {
            if matches!(event, DispatchEvent::RecipientFinalized { .. }) {
                handle.cancel();
                break;
            }
        }

        let reporter = handle.reporter().clone();
        let summary = handle.wait().await.unwrap();

        assert_eq!(summary.state, RunState::Cancelled);
        assert_eq!(summary.statistics.finalized(), 1);
        assert_eq!(summary.statistics.remaining(), 2);
        assert_eq!(
            reporter.outcomes()[0].1,
            RecipientOutcome::Succeeded
        );
        assert_eq!(mock.calls_for("2"), 0);
        assert!(reporter.export_failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_e2e_flaky_number_recovers_within_cap() {
        let file = recipient_file("numero\n5511\n");
        let recipients = RecipientSource::load_from_path(file.path()).unwrap();

        let mock = Arc::new(MockGateway::new().failing_times("5511", 2, "rate limited"));
        let engine = engine(&mock);
        let job = DispatchJob::new(recipients, Some("hi".into()), vec![], settings(3, 0)).unwrap();

        let summary = engine.run(job, CancellationToken::new()).await.unwrap();

        assert_eq!(summary.statistics.succeeded, 1);
        assert_eq!(summary.attempts, 3);
        let attempts = engine.reporter().attempts();
        assert_eq!(
            attempts.iter().map(|a| a.attempt_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(attempts[2].outcome.is_success());
    }

    #[tokio::test]
    async fn test_e2e_unpaired_gateway_sends_nothing() {
        let file = recipient_file("numero\n1\n2\n");
        let recipients = RecipientSource::load_from_path(file.path()).unwrap();

        let mock = Arc::new(MockGateway::with_config(MockConfig {
            ready: false,
            ..Default::default()
        }));
        let engine = engine(&mock);
        let job = DispatchJob::new(recipients, Some("hi".into()), vec![], settings(2, 0)).unwrap();

        let err = engine.spawn(job).unwrap().wait().await.unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Contract(ContractError::NotReady { .. })
        ));
        assert!(mock.send_calls().is_empty());
        assert_eq!(engine.reporter().snapshot().total, 0);
        assert_eq!(engine.state(), RunState::Idle);
    }
}
