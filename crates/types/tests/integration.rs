//! Integration tests for types

#[cfg(test)]
mod tests {
    use distro_types::*;
    use proptest::prelude::*;

    fn items(n: usize) -> Vec<BatchItem> {
        (0..n)
            .map(|i| BatchItem {
                target: TransferTarget::new(i as i64, format!("app{i}"), "https://x/{version}"),
                url: format!("https://x/{i}"),
                state: ItemState::Idle,
                order: i,
            })
            .collect()
    }

    #[derive(Debug, Clone)]
    enum Step {
        Progress(usize, u64),
        Succeed(usize),
        Fail(usize),
    }

    fn step(n: usize) -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..n, any::<u64>()).prop_map(|(i, b)| Step::Progress(i, b)),
            (0..n).prop_map(Step::Succeed),
            (0..n).prop_map(Step::Fail),
        ]
    }

    proptest! {
        #[test]
        fn counters_match_terminal_items(steps in prop::collection::vec(step(6), 0..60)) {
            let id = Uuid::new_v4();
            let mut state = BatchState::start(id, items(6));

            for step in steps {
                let (target, next) = match step {
                    Step::Progress(i, bytes) => (i, ItemState::Downloading(Progress::Indeterminate { bytes_so_far: bytes })),
                    Step::Succeed(i) => (i, ItemState::Succeeded { local_file: format!("/tmp/{i}.apk").into(), metadata: None }),
                    Step::Fail(i) => (i, ItemState::failed("boom")),
                };
                state.merge(id, TargetId(target as i64), next);

                let terminal = state.items.iter().filter(|item| item.state.is_terminal()).count();
                let failed = state.items.iter().filter(|item| item.state.is_failed()).count();
                prop_assert_eq!(state.completed, terminal);
                prop_assert_eq!(state.failed, failed);
                prop_assert!(state.failed <= state.completed);
                prop_assert!(state.completed <= state.total);
            }
        }
    }

    #[test]
    fn ordered_items_follow_submission_order() {
        let mut list = items(3);
        list.reverse();
        let state = BatchState::start(Uuid::new_v4(), list);
        let order: Vec<usize> = state.ordered_items().map(|item| item.order).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn target_serializes_camel_case() {
        let target = TransferTarget::new(7, "Example", "https://x/{version}.apk")
            .with_install_identifier("com.example")
            .with_quick_link("nightly", "https://x/nightly.apk");
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["urlPattern"], "https://x/{version}.apk");
        assert_eq!(json["installIdentifier"], "com.example");
        assert_eq!(json["quickLinks"][0]["name"], "nightly");

        let back: TransferTarget = serde_json::from_value(json).unwrap();
        assert_eq!(back, target);
    }

    #[test]
    fn batch_source_label() {
        assert_eq!(BatchSource::Version("1.0.0".into()).label(), "1.0.0");
        assert_eq!(BatchSource::QuickLink("beta".into()).label(), "beta");
    }
}
