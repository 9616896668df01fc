//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> sinks -> dispatcher -> 输出文件
//! - 不经过 dispatcher，直接驱动 classifier + buffer

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, Token};

    #[test]
    fn test_contracts_compile() {
        let _ = ConfigVersion::V1;
        assert_eq!(Token::parse("{").kind(), "open_block");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::io::{self, Cursor, Write};
    use std::num::NonZeroUsize;
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Batch, BulkSink, ContractError, ManualClock};
    use dispatcher::{
        create_dispatcher, ConsoleSink, Dispatcher, FileSink, FileSinkConfig, ReaderSource,
    };
    use tempfile::tempdir;

    const EXAMPLE_INPUT: &str = "cmd1\ncmd2\ncmd3\ncmd4\ncmd5\n{\ncmd1\n{\ncmd2\n{\ncmd3\ncmd4\n}\ncmd5\n}\ncmd6\n}\ncmd1\ncmd2\n";

    /// Writer shared between a ConsoleSink and the test
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails on every other batch
    struct FlakySink {
        calls: Mutex<u32>,
    }

    impl BulkSink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        fn write(&self, _batch: &Batch) -> Result<(), ContractError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls % 2 == 1 {
                Err(ContractError::sink_write("flaky", "disk full"))
            } else {
                Ok(())
            }
        }
    }

    fn threshold(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    /// End-to-end: stdin-like reader -> Dispatcher -> console + file sinks
    #[test]
    fn test_e2e_console_and_file() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));

        let out = SharedBuf::default();
        let console = Arc::new(ConsoleSink::with_writer("console", out.clone()));
        let file = Arc::new(
            FileSink::new(
                "file",
                FileSinkConfig {
                    dir: dir.path().to_path_buf(),
                    ..Default::default()
                },
            )
            .unwrap(),
        );

        let mut dispatcher = Dispatcher::with_clock(threshold(3), Arc::clone(&clock));
        dispatcher.subscribe(&console);
        dispatcher.subscribe(&file);

        // 每行推进一秒，每个批次写入独立文件
        let mut source = ReaderSource::new(Cursor::new(EXAMPLE_INPUT));
        let mut lines = Vec::new();
        while let Some(line) = contracts::LineSource::next_line(&mut source).unwrap() {
            lines.push(line);
        }
        for line in &lines {
            dispatcher.process_line(line);
            clock.advance(Duration::seconds(1));
        }
        dispatcher.process(contracts::Token::EndOfInput);

        assert_eq!(
            out.contents(),
            "bulk: cmd1, cmd2, cmd3\n\
             bulk: cmd4, cmd5\n\
             bulk: cmd1, cmd2, cmd3, cmd4, cmd5, cmd6\n\
             bulk: cmd1, cmd2\n"
        );

        // Batch start times: line 0, line 3, line 6, line 17
        let read = |secs: i64| {
            fs::read_to_string(dir.path().join(format!("bulk{}.log", 1_700_000_000 + secs)))
                .unwrap()
        };
        assert_eq!(read(0), "cmd1, cmd2, cmd3\n");
        assert_eq!(read(3), "cmd4, cmd5\n");
        assert_eq!(read(6), "cmd1, cmd2, cmd3, cmd4, cmd5, cmd6\n");
        assert_eq!(read(17), "cmd1, cmd2\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    /// Config file drives sink creation; dropping the sinks stops delivery
    #[test]
    fn test_e2e_from_config() {
        let dir = tempdir().unwrap();
        let content = format!(
            "[[sinks]]\nname = \"files\"\nsink_type = \"file\"\n[sinks.params]\ndir = \"{}\"\n\n[[sinks]]\nname = \"trace\"\nsink_type = \"log\"\n",
            dir.path().display().to_string().replace('\\', "\\\\")
        );
        let config = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();

        let (mut dispatcher, sinks) = create_dispatcher(threshold(2), &config.sinks).unwrap();
        let summary = dispatcher
            .process_stream(ReaderSource::new(Cursor::new("a\nb\nc\n")))
            .unwrap();

        assert_eq!(summary.lines, 3);
        assert_eq!(summary.batches, 2);
        assert_eq!(dispatcher.metrics().write_count(), 4);

        let written: String = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
            .collect();
        assert!(written.contains("a, b\n"));
        assert!(written.contains("c\n"));

        drop(sinks);
        dispatcher.process_lines(["d"]);
        assert_eq!(dispatcher.metrics().write_count(), 4);
        assert_eq!(dispatcher.metrics().released_count(), 2);
    }

    /// A failing sink neither blocks other sinks nor corrupts batching
    #[test]
    fn test_e2e_flaky_sink() {
        let out = SharedBuf::default();
        let console = Arc::new(ConsoleSink::with_writer("console", out.clone()));
        let flaky = Arc::new(FlakySink {
            calls: Mutex::new(0),
        });

        let mut dispatcher = Dispatcher::new(threshold(3));
        dispatcher.subscribe(&flaky);
        dispatcher.subscribe(&console);

        dispatcher
            .process_stream(ReaderSource::new(Cursor::new(EXAMPLE_INPUT)))
            .unwrap();

        assert_eq!(out.contents().lines().count(), 4);
        let metrics = dispatcher.metrics().snapshot();
        assert_eq!(metrics.batch_count, 4);
        assert_eq!(metrics.failure_count, 2);
        assert_eq!(metrics.write_count, 6);
    }

    /// Engine pieces composed by hand, as an alternative driver would
    #[test]
    fn test_engine_without_dispatcher() {
        use bulk_engine::{BlockClassifier, Boundary, CommandBuffer};
        use contracts::{SystemClock, Token};

        let mut classifier = BlockClassifier::new(threshold(3));
        let mut buffer = CommandBuffer::new(SystemClock);
        let mut delivered = Vec::new();

        let tokens = EXAMPLE_INPUT
            .lines()
            .map(Token::parse)
            .chain(std::iter::once(Token::EndOfInput));
        for token in tokens {
            let step = classifier.classify(token);
            if let Some(command) = step.command {
                buffer.push(command);
            }
            if let Some(boundary) = step.boundary {
                buffer.flush(|batch| delivered.push((boundary, batch.len())));
            }
        }

        assert_eq!(
            delivered,
            vec![
                (Boundary::SizeReached, 3),
                (Boundary::BlockOpened, 2),
                (Boundary::BlockClosed, 6),
                (Boundary::EndOfInput, 2),
            ]
        );
    }
}
