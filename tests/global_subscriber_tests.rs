//! Runs with the layer installed as the process-wide subscriber, so events
//! from the HTTP client's worker threads reach it too. Kept in its own test
//! binary because the global default can only be set once.
mod test_utils;

use std::thread;
use std::time::Duration;

use webhook_logger::{init_tracing_with_config, InitConfig, WebhookHandler};

use test_utils::MockServer;

#[test]
fn global_layer_posts_once_per_event() {
    let server = MockServer::start(200);
    let handler = WebhookHandler::new(Some(server.url("/abc")));
    init_tracing_with_config(handler, InitConfig { enable_stdout: false }).expect("install subscriber");

    tracing::info!("Deploy finished");

    // Late connection-pool events from the client must not turn into posts.
    thread::sleep(Duration::from_millis(300));

    let requests = server.received();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].json()["attachments"][0]["text"], "Deploy finished");
}
