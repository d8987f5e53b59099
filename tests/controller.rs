use std::sync::{Arc, Mutex};

use copypasta::ClipboardProvider;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use subgrab::controller::Controller;
use subgrab::invidious::InvidiousClient;
use subgrab::session::Phase;
use subgrab::shell;
use subgrab::{CaptionFormat, Error, Instance};

const VTT: &str = "WEBVTT\nKind: captions\nLanguage: en\n\n00:00:01.000 --> 00:00:02.000\nHello&nbsp;world\n\n00:00:02.000 --> 00:00:03.000\nsecond line\n";

async fn caption_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/captions/dQw4w9WgXcQ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "captions": [
                {"label": "English", "languageCode": "en", "url": "/captions/en.vtt"},
                {"label": "Deutsch", "languageCode": "de", "url": "/captions/de.vtt"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/captions/en.vtt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VTT))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/captions/de.vtt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/instances.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ["one.example", {"type": "https", "cors": true, "api": true}],
            ["two.example", {"type": "https", "cors": true, "api": true}],
            ["three.onion", {"type": "onion", "cors": true, "api": true}]
        ])))
        .mount(&server)
        .await;
    server
}

type ProviderResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Clipboard whose contents the test can inspect after handing it to the controller
struct SharedClipboard {
    copied: Arc<Mutex<Option<String>>>,
    refuse: bool,
}

impl ClipboardProvider for SharedClipboard {
    fn get_contents(&mut self) -> ProviderResult<String> {
        Ok(self.copied.lock().unwrap().clone().unwrap_or_default())
    }

    fn set_contents(&mut self, contents: String) -> ProviderResult<()> {
        if self.refuse {
            return Err("no clipboard available".into());
        }
        *self.copied.lock().unwrap() = Some(contents);
        Ok(())
    }
}

fn controller_for(server: &MockServer) -> Controller {
    let client = InvidiousClient::new(format!("{}/instances.json", server.uri()));
    Controller::new(client, Instance::new(server.uri()))
}

#[tokio::test]
async fn test_search_select_fetch() {
    let server = caption_server().await;
    let mut controller = controller_for(&server);

    let tracks = controller.search("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(controller.session().phase(), Phase::CatalogReady);

    controller.session_mut().select_language("en").unwrap();
    let text = controller.fetch().await.unwrap();
    assert_eq!(text, "Hello world second line");
    assert_eq!(controller.session().phase(), Phase::CaptionReady);

    controller.session_mut().set_format(CaptionFormat::Vtt);
    assert_eq!(controller.session().display().as_deref(), Some(VTT));
}

#[tokio::test]
async fn test_invalid_input_makes_no_request() {
    let server = MockServer::start().await;
    let mut controller = controller_for(&server);

    let err = controller.search("not a url").await.unwrap_err();
    assert!(matches!(err, Error::InvalidVideoReference(_)));
    assert_eq!(controller.session().notice(), Some("invalid video URL"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_failure_sets_notice() {
    let server = MockServer::start().await;
    let mut controller = controller_for(&server);

    let err = controller.search("dQw4w9WgXcQ").await.unwrap_err();
    assert!(matches!(err, Error::CatalogUnavailable(_)));
    assert_eq!(controller.session().phase(), Phase::Error);
    assert!(controller.session().catalog().is_none());
    assert_eq!(
        controller.session().notice(),
        Some("error listing captions, check the video URL or try a different instance")
    );
}

#[tokio::test]
async fn test_fetch_failure_keeps_catalog() {
    let server = caption_server().await;
    let mut controller = controller_for(&server);

    controller.search("dQw4w9WgXcQ").await.unwrap();
    controller.session_mut().select_language("de").unwrap();
    let err = controller.fetch().await.unwrap_err();
    assert!(matches!(err, Error::CaptionUnavailable(_)));
    assert!(controller.session().document().is_none());
    assert!(controller.session().catalog().is_some());

    controller.session_mut().select_language("en").unwrap();
    assert!(controller.fetch().await.is_ok());
}

#[tokio::test]
async fn test_load_instances_replaces_list() {
    let server = caption_server().await;
    let mut controller = controller_for(&server);

    let instances = controller.load_instances().await.to_vec();
    assert_eq!(
        instances,
        vec![
            Instance::new(server.uri()),
            Instance::new("one.example"),
            Instance::new("two.example")
        ]
    );
}

#[tokio::test]
async fn test_load_instances_failure_keeps_default() {
    let server = MockServer::start().await;
    let mut controller = controller_for(&server);

    let instances = controller.load_instances().await.to_vec();
    assert_eq!(instances, vec![Instance::new(server.uri())]);
}

#[tokio::test]
async fn test_download_writes_named_file() {
    let server = caption_server().await;
    let mut controller = controller_for(&server);
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(controller.download(dir.path()), Err(Error::NothingToShow)));

    controller.search("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
    controller.session_mut().select_track(0).unwrap();
    controller.fetch().await.unwrap();

    let path = controller.download(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("dQw4w9WgXcQ.txt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello world second line");

    controller.session_mut().set_format(CaptionFormat::Vtt);
    let path = controller.download(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("dQw4w9WgXcQ.vtt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), VTT);
}

#[tokio::test]
async fn test_copy_requires_caption() {
    let server = MockServer::start().await;
    let mut controller = controller_for(&server);
    assert!(matches!(controller.copy(), Err(Error::NothingToShow)));
}

#[tokio::test]
async fn test_copy_writes_rendered_caption() {
    let server = caption_server().await;
    let copied = Arc::new(Mutex::new(None));
    let mut controller = controller_for(&server).with_clipboard(Box::new(SharedClipboard {
        copied: Arc::clone(&copied),
        refuse: false,
    }));

    controller.search("dQw4w9WgXcQ").await.unwrap();
    controller.session_mut().select_track(0).unwrap();
    controller.fetch().await.unwrap();

    controller.copy().unwrap();
    assert_eq!(copied.lock().unwrap().as_deref(), Some("Hello world second line"));
}

#[tokio::test]
async fn test_copy_failure_leaves_session() {
    let server = caption_server().await;
    let copied = Arc::new(Mutex::new(None));
    let mut controller = controller_for(&server).with_clipboard(Box::new(SharedClipboard {
        copied: Arc::clone(&copied),
        refuse: true,
    }));

    controller.search("dQw4w9WgXcQ").await.unwrap();
    controller.session_mut().select_track(0).unwrap();
    controller.fetch().await.unwrap();

    let err = controller.copy().unwrap_err();
    assert!(matches!(err, Error::ClipboardWriteFailed(_)));
    assert!(err.to_string().contains("no clipboard available"));
    assert!(copied.lock().unwrap().is_none());
    assert_eq!(controller.session().phase(), Phase::CaptionReady);
    assert!(controller.session().display().is_some());
}

#[tokio::test]
async fn test_shell_session() {
    let server = caption_server().await;
    let mut controller = controller_for(&server);

    let script = "search dQw4w9WgXcQ\nselect 1\nfetch\nformat vtt\nstatus\nreset-all\nshow\nbogus\nquit\nsearch ignored\n";
    let mut out = Vec::new();
    shell::run(&mut controller, script.as_bytes(), &mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("  1. English [en]"));
    assert!(out.contains("  2. Deutsch [de]"));
    assert!(out.contains("selected: English (en)"));
    assert!(out.contains("Hello world second line"));
    assert!(out.contains("format: vtt"));
    assert!(out.contains("state:    caption ready"));
    assert!(out.contains("nothing fetched yet"));
    assert!(out.contains("unknown command: bogus"));
    assert_eq!(controller.session().input(), "");
    assert_eq!(controller.session().phase(), Phase::Idle);
}
