//! End-to-end tests: real listener, real WebSocket clients, recorded
//! backend notifications.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use naxos_common::{NotifyError, PresenceStatus, UserId};
use naxos_presence::{Notifier, PresenceTracker};
use naxos_relay::{serve, Gate};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<(String, PresenceStatus)>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<(String, PresenceStatus)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user: &UserId, status: PresenceStatus) -> Result<(), NotifyError> {
        self.events
            .lock()
            .unwrap()
            .push((user.as_str().to_string(), status));
        Ok(())
    }
}

struct Relay {
    addr: SocketAddr,
    tracker: PresenceTracker,
    notifier: Arc<RecordingNotifier>,
}

async fn start_relay(debounce: Duration) -> Relay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let tracker = PresenceTracker::new(notifier.clone(), debounce);

    tokio::spawn(serve(listener, Gate::new("sessionid"), tracker.clone()));

    Relay {
        addr,
        tracker,
        notifier,
    }
}

fn request(addr: SocketAddr, cookie: Option<&str>) -> Request {
    let mut request = format!("ws://{addr}/").into_client_request().unwrap();
    if let Some(cookie) = cookie {
        request
            .headers_mut()
            .insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
    }
    request
}

async fn open(addr: SocketAddr, session: &str) -> Client {
    let cookie = format!("csrftoken=t0k3n; sessionid={session}");
    let (ws, _) = connect_async(request(addr, Some(&cookie))).await.unwrap();
    ws
}

const WAIT: Duration = Duration::from_secs(2);
const POLL: Duration = Duration::from_millis(10);

/// Wait until `user` holds exactly `n` open connections.
async fn wait_connections(tracker: &PresenceTracker, user: &UserId, n: u32) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if tracker.connections(user).await == n {
            return true;
        }
        tokio::time::sleep(POLL).await;
    }
    false
}

/// Wait until exactly `n` users are online.
async fn wait_online_count(tracker: &PresenceTracker, n: usize) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if tracker.online_count().await == n {
            return true;
        }
        tokio::time::sleep(POLL).await;
    }
    false
}

/// Wait until at least `n` notifications were recorded.
async fn wait_events(notifier: &RecordingNotifier, n: usize) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if notifier.events().len() >= n {
            return true;
        }
        tokio::time::sleep(POLL).await;
    }
    false
}

fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

fn connected(id: &str) -> (String, PresenceStatus) {
    (id.to_string(), PresenceStatus::Connected)
}

fn disconnected(id: &str) -> (String, PresenceStatus) {
    (id.to_string(), PresenceStatus::Disconnected)
}

#[tokio::test]
async fn handshake_without_cookie_is_refused() {
    let relay = start_relay(Duration::from_millis(50)).await;

    let result = connect_async(request(relay.addr, None)).await;
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("connection without credential was admitted"),
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(relay.tracker.online_count().await, 0);
    assert!(relay.notifier.events().is_empty());
}

#[tokio::test]
async fn handshake_without_session_cookie_is_refused() {
    let relay = start_relay(Duration::from_millis(50)).await;

    let result = connect_async(request(relay.addr, Some("csrftoken=t0k3n"))).await;
    assert!(matches!(result, Err(WsError::Http(ref r)) if r.status() == StatusCode::UNAUTHORIZED));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(relay.tracker.online_count().await, 0);
    assert!(relay.notifier.events().is_empty());
}

#[tokio::test]
async fn single_connection_online_then_offline() {
    let relay = start_relay(Duration::from_millis(100)).await;
    let abc = user("abc123");

    let mut ws = open(relay.addr, "abc123").await;
    assert!(wait_connections(&relay.tracker, &abc, 1).await);
    assert!(wait_events(&relay.notifier, 1).await);
    assert_eq!(relay.notifier.events(), vec![connected("abc123")]);

    ws.close(None).await.unwrap();
    assert!(wait_events(&relay.notifier, 2).await);
    assert_eq!(
        relay.notifier.events(),
        vec![connected("abc123"), disconnected("abc123")]
    );
    assert!(!relay.tracker.is_online(&abc).await);
}

#[tokio::test]
async fn two_tabs_report_once() {
    let relay = start_relay(Duration::from_millis(150)).await;
    let abc = user("abc123");

    let mut tab_a = open(relay.addr, "abc123").await;
    let mut tab_b = open(relay.addr, "abc123").await;
    assert!(wait_connections(&relay.tracker, &abc, 2).await);

    tab_a.close(None).await.unwrap();
    assert!(wait_connections(&relay.tracker, &abc, 1).await);

    // Well past the window: tab B still holds the user online.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(relay.notifier.events(), vec![connected("abc123")]);

    tab_b.close(None).await.unwrap();
    assert!(wait_events(&relay.notifier, 2).await);
    assert_eq!(
        relay.notifier.events(),
        vec![connected("abc123"), disconnected("abc123")]
    );
}

#[tokio::test]
async fn page_navigation_does_not_flap() {
    let relay = start_relay(Duration::from_millis(500)).await;
    let abc = user("abc123");

    let mut first = open(relay.addr, "abc123").await;
    assert!(wait_connections(&relay.tracker, &abc, 1).await);

    first.close(None).await.unwrap();
    assert!(wait_connections(&relay.tracker, &abc, 0).await);
    let _second = open(relay.addr, "abc123").await;

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(relay.notifier.events(), vec![connected("abc123")]);
    assert_eq!(relay.tracker.connections(&abc).await, 1);
}

#[tokio::test]
async fn dropped_socket_counts_as_disconnect() {
    let relay = start_relay(Duration::from_millis(50)).await;
    let abc = user("abc123");

    let ws = open(relay.addr, "abc123").await;
    assert!(wait_connections(&relay.tracker, &abc, 1).await);

    drop(ws);
    assert!(wait_events(&relay.notifier, 2).await);
    assert!(!relay.tracker.is_online(&abc).await);
    assert_eq!(
        relay.notifier.events(),
        vec![connected("abc123"), disconnected("abc123")]
    );
}

#[tokio::test]
async fn users_are_tracked_independently() {
    let relay = start_relay(Duration::from_millis(50)).await;

    let mut alice = open(relay.addr, "alice").await;
    let _bob = open(relay.addr, "bob").await;
    assert!(wait_online_count(&relay.tracker, 2).await);

    alice.close(None).await.unwrap();
    assert!(wait_online_count(&relay.tracker, 1).await);
    assert!(wait_events(&relay.notifier, 3).await);
    assert!(relay.tracker.is_online(&user("bob")).await);
    assert!(relay.notifier.events().contains(&disconnected("alice")));
    assert!(!relay.notifier.events().contains(&disconnected("bob")));
}
