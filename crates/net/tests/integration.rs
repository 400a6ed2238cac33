//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use distro_events::{channel, AppEvent, DownloadEvent};
    use distro_net::*;
    use distro_platform::{NoopInspector, PackageInspector};
    use distro_types::{ItemState, PackageMetadata, Progress};
    use httpmock::prelude::*;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct FixedInspector;

    impl PackageInspector for FixedInspector {
        fn inspect(&self, _file: &Path) -> Option<PackageMetadata> {
            Some(PackageMetadata {
                install_identifier: "com.example".into(),
                version_label: "1.0.0".into(),
                version_ordinal: 100,
                display_label: "Example".into(),
            })
        }
    }

    fn engine(inspector: Arc<dyn PackageInspector>) -> TransferEngine {
        TransferEngine::new(
            NetClient::new(NetConfig::default()).unwrap(),
            TransferSettings::default(),
            inspector,
        )
    }

    #[tokio::test]
    async fn test_successful_transfer_ends_at_full_progress() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let content = vec![7u8; 64 * 1024];
        let mock = server.mock(|when, then| {
            when.method(GET).path("/app-1.0.0.apk");
            then.status(200).body(content.clone());
        });

        let temp = tempdir().unwrap();
        let job = TransferJob {
            url: server.url("/app-1.0.0.apk"),
            dest: temp.path().join("temp_a.apk"),
            label: Some("app".into()),
        };

        let mut states = Vec::new();
        let final_state = engine(Arc::new(FixedInspector))
            .run(&job, &tx, |state| states.push(state))
            .await;

        mock.assert();
        match &final_state {
            ItemState::Succeeded {
                local_file,
                metadata,
            } => {
                assert_eq!(local_file, &job.dest);
                assert_eq!(metadata.as_ref().unwrap().install_identifier, "com.example");
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(tokio::fs::read(&job.dest).await.unwrap(), content);

        // sized body: the opening update is already determinate
        assert_eq!(
            states.first(),
            Some(&ItemState::Downloading(Progress::Determinate {
                fraction: 0.0,
                bytes_so_far: 0
            }))
        );
        assert!(states.iter().all(|s| match s {
            ItemState::Downloading(progress) => !progress.is_indeterminate(),
            _ => true,
        }));
        assert_eq!(states.last(), Some(&final_state));

        let last_progress = states
            .iter()
            .rev()
            .find_map(|state| match state {
                ItemState::Downloading(progress) => Some(*progress),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_progress.fraction(), Some(1.0));
        assert_eq!(last_progress.bytes_so_far(), content.len() as u64);

        let mut saw_start = false;
        let mut saw_complete = false;
        while let Ok(message) = rx.try_recv() {
            match message.event {
                AppEvent::Download(DownloadEvent::Started { total_bytes, .. }) => {
                    assert_eq!(total_bytes, Some(content.len() as u64));
                    saw_start = true;
                }
                AppEvent::Download(DownloadEvent::Completed {
                    bytes_downloaded, ..
                }) => {
                    assert_eq!(bytes_downloaded, content.len() as u64);
                    saw_complete = true;
                }
                _ => {}
            }
        }
        assert!(saw_start);
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_http_error_is_a_failed_item() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/missing.apk");
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let job = TransferJob {
            url: server.url("/missing.apk"),
            dest: temp.path().join("temp_b.apk"),
            label: None,
        };

        let state = engine(Arc::new(NoopInspector))
            .run(&job, &tx, |_| {})
            .await;

        match state {
            ItemState::Failed { reason } => assert_eq!(reason, "http status 404"),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(!job.dest.exists());

        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .any(|m| matches!(m.event, AppEvent::Download(DownloadEvent::Failed { .. })));
        assert!(failed);
    }

    #[tokio::test]
    async fn test_empty_body_is_indeterminate() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/empty.apk");
            then.status(200).body("");
        });

        let temp = tempdir().unwrap();
        let job = TransferJob {
            url: server.url("/empty.apk"),
            dest: temp.path().join("temp_c.apk"),
            label: None,
        };

        let mut states = Vec::new();
        let state = engine(Arc::new(NoopInspector))
            .run(&job, &tx, |s| states.push(s))
            .await;

        assert!(matches!(state, ItemState::Succeeded { metadata: None, .. }));
        assert!(states.iter().all(|s| match s {
            ItemState::Downloading(progress) => progress.is_indeterminate(),
            _ => true,
        }));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out_as_a_failed_item() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000\r\n\r\n0123456789")
                .await
                .unwrap();
            socket.flush().await.unwrap();
            // hold the connection open without sending the rest
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        });

        let (tx, _rx) = channel();
        let temp = tempdir().unwrap();
        let job = TransferJob {
            url: format!("http://{addr}/a.apk"),
            dest: temp.path().join("temp_e.apk"),
            label: None,
        };
        let settings = TransferSettings {
            read_timeout: std::time::Duration::from_millis(300),
            ..TransferSettings::default()
        };
        let engine = TransferEngine::new(
            NetClient::new(NetConfig::default()).unwrap(),
            settings,
            Arc::new(NoopInspector),
        );

        let started = std::time::Instant::now();
        let state = engine.run(&job, &tx, |_| {}).await;

        match state {
            ItemState::Failed { reason } => {
                assert!(reason.starts_with("no data from"), "{reason}");
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert!(!job.dest.exists());
        server.abort();
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_failed_item() {
        let (tx, _rx) = channel();
        let temp = tempdir().unwrap();

        // Bind then drop to obtain a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let job = TransferJob {
            url: format!("http://127.0.0.1:{port}/app.apk"),
            dest: temp.path().join("temp_d.apk"),
            label: None,
        };

        let state = engine(Arc::new(NoopInspector))
            .run(&job, &tx, |_| {})
            .await;

        match state {
            ItemState::Failed { reason } => assert!(!reason.is_empty()),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
