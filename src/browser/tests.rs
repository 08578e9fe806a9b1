//! Tests for browser module.

#[cfg(test)]
mod tests {
    use crate::browser::action::Action;
    use crate::browser::gateway::{DeliveryGateway, RetrievalGateway};
    use crate::browser::navigator::{
        branch_candidates, reduce_press, Effect, InboundEvent, Navigator, EMPTY_REPOSITORY_MESSAGE,
        FETCHING_MESSAGE, NO_SESSION_MESSAGE,
    };
    use crate::browser::session::Mode;
    use crate::browser::store::{MemorySessionStore, SessionStore};
    use crate::browser::tree::Entry;
    use crate::browser::view::ViewDescriptor;
    use crate::domain::{ChatId, MessageId, Revision};
    use crate::error::{DeliveryError, RetrievalError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const CHAT: ChatId = ChatId(42);
    const REPO_URL: &str = "https://github.com/acme/widgets";

    fn not_found(url: &str) -> RetrievalError {
        RetrievalError::Status {
            url: url.to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }

    #[derive(Default)]
    struct FakeRepository {
        entries: Vec<Entry>,
        blobs: HashMap<String, Vec<u8>>,
        missing: bool,
        /// Existing branches; `None` accepts any name
        branches: Option<Vec<String>>,
        oversized: Vec<String>,
        branch_lookups: Mutex<Vec<String>>,
    }

    impl FakeRepository {
        fn with_entries(entries: Vec<Entry>) -> Self {
            Self {
                entries,
                ..Default::default()
            }
        }

        fn with_blob(mut self, path: &str, bytes: &[u8]) -> Self {
            self.blobs.insert(path.to_string(), bytes.to_vec());
            self
        }

        fn with_branches(mut self, branches: &[&str]) -> Self {
            self.branches = Some(branches.iter().map(|b| b.to_string()).collect());
            self
        }
    }

    #[async_trait]
    impl RetrievalGateway for FakeRepository {
        async fn resolve_default_revision(
            &self,
            owner: &str,
            name: &str,
        ) -> Result<Revision, RetrievalError> {
            if self.missing {
                return Err(not_found(&format!("repos/{}/{}", owner, name)));
            }
            Ok(Revision {
                branch: "main".to_string(),
                sha: "c0ffee".to_string(),
            })
        }

        async fn resolve_branch(
            &self,
            _owner: &str,
            _name: &str,
            branch: &str,
        ) -> Result<Revision, RetrievalError> {
            self.branch_lookups.lock().unwrap().push(branch.to_string());
            if let Some(branches) = &self.branches {
                if !branches.iter().any(|b| b == branch) {
                    return Err(RetrievalError::UnknownBranch(branch.to_string()));
                }
            }
            Ok(Revision {
                branch: branch.to_string(),
                sha: "beef".to_string(),
            })
        }

        async fn fetch_tree(
            &self,
            _owner: &str,
            _name: &str,
            _revision: &str,
        ) -> Result<Vec<Entry>, RetrievalError> {
            Ok(self.entries.clone())
        }

        async fn fetch_blob(
            &self,
            _owner: &str,
            _name: &str,
            _revision: &str,
            path: &str,
        ) -> Result<Vec<u8>, RetrievalError> {
            if self.oversized.iter().any(|p| p == path) {
                return Err(RetrievalError::TooLarge {
                    path: path.to_string(),
                    size: 80 * 1024 * 1024,
                    limit: 50 * 1024 * 1024,
                });
            }
            self.blobs.get(path).cloned().ok_or_else(|| not_found(path))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Text(String),
        Keyboard(MessageId, ViewDescriptor),
        Edit(MessageId, ViewDescriptor),
        Document(String, Vec<u8>),
    }

    #[derive(Default)]
    struct RecordingDelivery {
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingDelivery {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn take(&self) -> Vec<Sent> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }

        fn last_keyboard(&self) -> (MessageId, ViewDescriptor) {
            self.sent()
                .into_iter()
                .rev()
                .find_map(|s| match s {
                    Sent::Keyboard(id, view) => Some((id, view)),
                    _ => None,
                })
                .expect("a keyboard was sent")
        }
    }

    #[async_trait]
    impl DeliveryGateway for RecordingDelivery {
        async fn send_text(&self, _chat: ChatId, text: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
            Ok(())
        }

        async fn send_keyboard(
            &self,
            _chat: ChatId,
            view: &ViewDescriptor,
        ) -> Result<MessageId, DeliveryError> {
            let mut sent = self.sent.lock().unwrap();
            let id = MessageId(100 + sent.len() as i64);
            sent.push(Sent::Keyboard(id, view.clone()));
            Ok(id)
        }

        async fn edit_keyboard(
            &self,
            _chat: ChatId,
            message: MessageId,
            view: &ViewDescriptor,
        ) -> Result<(), DeliveryError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Edit(message, view.clone()));
            Ok(())
        }

        async fn send_document(
            &self,
            _chat: ChatId,
            bytes: Vec<u8>,
            filename: &str,
        ) -> Result<(), DeliveryError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Document(filename.to_string(), bytes));
            Ok(())
        }
    }

    struct Harness {
        navigator: Navigator,
        delivery: Arc<RecordingDelivery>,
        store: Arc<MemorySessionStore>,
        repository: Arc<FakeRepository>,
    }

    impl Harness {
        fn new(repository: FakeRepository) -> Self {
            let repository = Arc::new(repository);
            let delivery = Arc::new(RecordingDelivery::default());
            let store = Arc::new(MemorySessionStore::new());
            let navigator = Navigator::new(repository.clone(), delivery.clone(), store.clone(), 8);
            Self {
                navigator,
                delivery,
                store,
                repository,
            }
        }

        async fn text(&self, text: &str) {
            self.navigator
                .handle(InboundEvent::Text {
                    chat: CHAT,
                    text: text.to_string(),
                })
                .await;
        }

        async fn press(&self, message: MessageId, action: Action) {
            self.navigator
                .handle(InboundEvent::ButtonPress {
                    chat: CHAT,
                    message,
                    token: action.to_token(),
                })
                .await;
        }

        async fn load(&self) -> MessageId {
            self.text(REPO_URL).await;
            let (id, _) = self.delivery.last_keyboard();
            self.delivery.take();
            id
        }
    }

    fn labels(view: &ViewDescriptor) -> Vec<String> {
        view.entry_buttons().map(|b| b.label.clone()).collect()
    }

    fn numbered_files(count: usize) -> Vec<Entry> {
        (0..count)
            .map(|i| Entry::file(format!("file{:02}.txt", i)))
            .collect()
    }

    fn only_edit(sent: Vec<Sent>) -> ViewDescriptor {
        match sent.as_slice() {
            [Sent::Edit(_, view)] => view.clone(),
            other => panic!("expected a single edit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scenario_root_and_directory_views() {
        let h = Harness::new(FakeRepository::with_entries(vec![
            Entry::directory("src"),
            Entry::file("src/a.txt"),
            Entry::file("readme.md"),
        ]));

        h.text(REPO_URL).await;
        let sent = h.delivery.sent();
        assert_eq!(sent[0], Sent::Text(FETCHING_MESSAGE.to_string()));
        let (message, root) = h.delivery.last_keyboard();
        assert_eq!(labels(&root), vec!["src", "readme.md"]);
        assert!(!root.has_control(&Action::Back));
        h.delivery.take();

        h.press(message, Action::EnterDirectory("src".to_string()))
            .await;
        let sent = h.delivery.take();
        assert!(matches!(sent.as_slice(), [Sent::Edit(id, _)] if *id == message));
        let view = only_edit(sent);
        assert_eq!(labels(&view), vec!["a.txt"]);
        assert!(view.has_control(&Action::Back));
    }

    #[tokio::test]
    async fn test_scenario_pagination() {
        let h = Harness::new(FakeRepository::with_entries(numbered_files(20)));
        h.text(REPO_URL).await;

        let (message, first) = h.delivery.last_keyboard();
        let expected: Vec<String> = (0..8).map(|i| format!("file{:02}.txt", i)).collect();
        assert_eq!(labels(&first), expected);
        assert!(!first.has_control(&Action::PagePrev));
        assert!(first.has_control(&Action::PageNext));
        h.delivery.take();

        h.press(message, Action::PageNext).await;
        let second = only_edit(h.delivery.take());
        let expected: Vec<String> = (8..16).map(|i| format!("file{:02}.txt", i)).collect();
        assert_eq!(labels(&second), expected);
        assert!(second.has_control(&Action::PagePrev));
        assert!(second.has_control(&Action::PageNext));
    }

    #[tokio::test]
    async fn test_scenario_search_without_matches_keeps_view() {
        let h = Harness::new(FakeRepository::with_entries(numbered_files(10)));
        let message = h.load().await;
        h.press(message, Action::PageNext).await;
        let before = h.store.get(CHAT).await.unwrap();
        h.delivery.take();

        h.press(message, Action::StartSearch).await;
        let prompt = only_edit(h.delivery.take());
        assert!(prompt.has_control(&Action::CancelSearch));

        h.text("test").await;
        let sent = h.delivery.take();
        assert!(matches!(&sent[0], Sent::Text(t) if t.contains("0 results")));
        assert!(matches!(&sent[1], Sent::Keyboard(..)));

        let after = h.store.get(CHAT).await.unwrap();
        assert_eq!(after.mode(), &Mode::Browsing);
        assert_eq!(after.visible_entries(), before.visible_entries());
        assert_eq!(after.page(), before.page());
    }

    #[tokio::test]
    async fn test_search_results_then_cancel() {
        let h = Harness::new(FakeRepository::with_entries(vec![
            Entry::directory("src"),
            Entry::file("src/lib.rs"),
            Entry::directory("tests"),
            Entry::file("tests/parser_test.rs"),
            Entry::file("tests/lexer_Test.rs"),
        ]));
        let message = h.load().await;

        h.press(message, Action::StartSearch).await;
        h.text("TEST").await;
        let (results_message, results) = h.delivery.last_keyboard();
        assert_eq!(labels(&results), vec!["parser_test.rs", "lexer_Test.rs"]);
        h.delivery.take();

        h.press(results_message, Action::CancelSearch).await;
        let view = only_edit(h.delivery.take());
        assert_eq!(labels(&view), vec!["src", "tests"]);
        assert!(view.has_control(&Action::StartSearch));
    }

    #[tokio::test]
    async fn test_scenario_failed_file_fetch_leaves_session() {
        let h = Harness::new(FakeRepository::with_entries(numbered_files(12)));
        let message = h.load().await;
        let before = h.store.get(CHAT).await.unwrap();

        h.press(message, Action::FetchFile("file03.txt".to_string()))
            .await;
        let sent = h.delivery.take();
        assert!(matches!(sent.as_slice(), [Sent::Text(t)] if t.contains("could not fetch file03.txt")));
        assert_eq!(h.store.get(CHAT).await.unwrap(), before);

        h.press(message, Action::PageNext).await;
        let view = only_edit(h.delivery.take());
        assert_eq!(labels(&view), vec!["file08.txt", "file09.txt", "file10.txt", "file11.txt"]);
    }

    #[tokio::test]
    async fn test_file_selection_sends_document_named_after_last_segment() {
        let repository = FakeRepository::with_entries(vec![
            Entry::directory("docs"),
            Entry::file("docs/guide.md"),
        ])
        .with_blob("docs/guide.md", b"# Guide");
        let h = Harness::new(repository);
        let message = h.load().await;
        h.press(message, Action::EnterDirectory("docs".to_string()))
            .await;
        let before = h.store.get(CHAT).await.unwrap();
        h.delivery.take();

        h.press(message, Action::FetchFile("docs/guide.md".to_string()))
            .await;
        assert_eq!(
            h.delivery.take(),
            vec![Sent::Document("guide.md".to_string(), b"# Guide".to_vec())]
        );
        assert_eq!(h.store.get(CHAT).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_oversized_file_is_reported() {
        let mut repository = FakeRepository::with_entries(vec![Entry::file("disk.img")]);
        repository.oversized.push("disk.img".to_string());
        let h = Harness::new(repository);
        let message = h.load().await;
        let before = h.store.get(CHAT).await.unwrap();

        h.press(message, Action::FetchFile("disk.img".to_string()))
            .await;
        let sent = h.delivery.take();
        assert!(matches!(sent.as_slice(), [Sent::Text(t)] if t.contains("too large") && t.contains("50 MB")));
        assert_eq!(h.store.get(CHAT).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_enter_then_back_round_trip() {
        let h = Harness::new(FakeRepository::with_entries(vec![
            Entry::directory("a"),
            Entry::directory("a/b"),
            Entry::file("a/b/c.txt"),
            Entry::file("z.txt"),
        ]));
        let message = h.load().await;
        let root = h.store.get(CHAT).await.unwrap().visible_entries().to_vec();

        h.press(message, Action::EnterDirectory("a".to_string()))
            .await;
        h.press(message, Action::EnterDirectory("a/b".to_string()))
            .await;
        h.press(message, Action::Back).await;
        assert_eq!(h.store.get(CHAT).await.unwrap().current_path(), "a");
        h.press(message, Action::Back).await;

        let session = h.store.get(CHAT).await.unwrap();
        assert_eq!(session.current_path(), "");
        assert_eq!(session.visible_entries(), root.as_slice());
    }

    #[tokio::test]
    async fn test_unrelated_text_is_ignored() {
        let h = Harness::new(FakeRepository::with_entries(numbered_files(3)));
        h.text("good morning").await;
        assert!(h.delivery.sent().is_empty());

        h.load().await;
        h.text("not a keyword, nobody asked").await;
        assert!(h.delivery.sent().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_reports_error() {
        let h = Harness::new(FakeRepository {
            missing: true,
            ..Default::default()
        });
        h.text(REPO_URL).await;

        let sent = h.delivery.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[1], Sent::Text(t) if t.starts_with("❌ Error")));
        assert!(h.store.get(CHAT).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let h = Harness::new(FakeRepository::default());
        h.text(REPO_URL).await;

        assert_eq!(
            h.delivery.sent().last(),
            Some(&Sent::Text(EMPTY_REPOSITORY_MESSAGE.to_string()))
        );
        assert!(h.store.get(CHAT).await.is_none());
    }

    #[tokio::test]
    async fn test_press_without_session() {
        let h = Harness::new(FakeRepository::default());
        h.press(MessageId(1), Action::PageNext).await;
        assert_eq!(
            h.delivery.sent(),
            vec![Sent::Text(NO_SESSION_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_new_repository_replaces_session() {
        let h = Harness::new(FakeRepository::with_entries(vec![
            Entry::directory("src"),
            Entry::file("src/main.rs"),
        ]));
        let message = h.load().await;
        h.press(message, Action::EnterDirectory("src".to_string()))
            .await;

        h.text("https://github.com/acme/gadgets/tree/release").await;
        let session = h.store.get(CHAT).await.unwrap();
        assert_eq!(session.repo().name, "gadgets");
        assert_eq!(session.repo().revision.branch, "release");
        assert_eq!(session.current_path(), "");
        assert_eq!(
            *h.repository.branch_lookups.lock().unwrap(),
            vec!["release".to_string()]
        );
    }

    #[test]
    fn test_branch_candidates_longest_first() {
        let candidates: Vec<&str> = branch_candidates("feature/login/src").collect();
        assert_eq!(candidates, vec!["feature/login/src", "feature/login", "feature"]);
        assert_eq!(branch_candidates("main").collect::<Vec<_>>(), vec!["main"]);
    }

    #[tokio::test]
    async fn test_tree_link_with_slashed_branch() {
        let repository = FakeRepository::with_entries(vec![Entry::file("README.md")])
            .with_branches(&["main", "feature", "feature/login"]);
        let h = Harness::new(repository);

        h.text("https://github.com/acme/widgets/tree/feature/login/docs")
            .await;
        let session = h.store.get(CHAT).await.unwrap();
        assert_eq!(session.repo().revision.branch, "feature/login");
        assert_eq!(
            *h.repository.branch_lookups.lock().unwrap(),
            vec!["feature/login/docs".to_string(), "feature/login".to_string()]
        );
        let (_, view) = h.delivery.last_keyboard();
        assert!(view.title.contains("acme/widgets @ feature/login"));
    }

    #[tokio::test]
    async fn test_tree_link_with_unknown_branch() {
        let repository = FakeRepository::with_entries(vec![Entry::file("README.md")])
            .with_branches(&["main"]);
        let h = Harness::new(repository);

        h.text("https://github.com/acme/widgets/tree/gone/away").await;
        assert_eq!(
            *h.repository.branch_lookups.lock().unwrap(),
            vec!["gone/away".to_string(), "gone".to_string()]
        );
        assert_eq!(
            h.delivery.sent().last(),
            Some(&Sent::Text("❌ Error: branch gone/away not found".to_string()))
        );
        assert!(h.store.get(CHAT).await.is_none());
    }

    #[tokio::test]
    async fn test_stale_buttons_are_ignored() {
        let h = Harness::new(FakeRepository::with_entries(vec![
            Entry::directory("src"),
            Entry::file("src/main.rs"),
        ]));
        let message = h.load().await;
        let before = h.store.get(CHAT).await.unwrap();

        h.press(message, Action::PagePrev).await;
        h.press(message, Action::Back).await;
        h.press(message, Action::CancelSearch).await;
        h.press(message, Action::EnterDirectory("src/nested".to_string()))
            .await;
        h.press(message, Action::FetchFile("src".to_string()))
            .await;
        h.navigator
            .handle(InboundEvent::ButtonPress {
                chat: CHAT,
                message,
                token: "bogus".to_string(),
            })
            .await;

        assert!(h.delivery.sent().is_empty());
        assert_eq!(h.store.get(CHAT).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_reduce_press_file_selection_is_pure() {
        let h = Harness::new(FakeRepository::with_entries(numbered_files(2)));
        h.load().await;
        let mut session = h.store.get(CHAT).await.unwrap();
        let before = session.clone();

        let transition = reduce_press(
            &mut session,
            Action::FetchFile("file01.txt".to_string()),
            MessageId(5),
        );
        assert!(!transition.changed);
        assert_eq!(
            transition.effects,
            vec![Effect::DeliverFile {
                path: "file01.txt".to_string()
            }]
        );
        assert_eq!(session, before);
    }
}
