use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct SlotView {
    index: usize,
    name: String,
    start_page: u32,
    end_page: u32,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct WirdView {
    day_index: u32,
    repetition_count: u32,
    pages_per_day: u32,
    slots: Vec<SlotView>,
    completed_slots: usize,
    day_fully_completed: bool,
    plan_complete: bool,
    logical_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckOutcome {
    outcome: String,
}

#[derive(Debug, Deserialize)]
struct AnchorResponse {
    anchor: Option<String>,
    refresh_requested: bool,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("wird_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/wird")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_wird_tracker"))
        .env("PORT", port.to_string())
        .env("WIRD_DATA_PATH", data_path)
        .env_remove("WIRD_DAWN_TIME")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_view(client: &Client, base_url: &str) -> WirdView {
    client
        .get(format!("{base_url}/api/wird"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn toggle(client: &Client, base_url: &str, slot: usize) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/wird/toggle"))
        .json(&serde_json::json!({ "slot": slot }))
        .send()
        .await
        .unwrap()
}

async fn check_rollover(client: &Client, base_url: &str) -> CheckOutcome {
    client
        .post(format!("{base_url}/api/rollover/check"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_view_lists_five_slots() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let view = get_view(&client, &server.base_url).await;
    assert_eq!(view.slots.len(), 5);
    assert_eq!(view.slots[0].name, "Fajr");
    let total: u32 = view
        .slots
        .iter()
        .map(|slot| (slot.end_page + 1).saturating_sub(slot.start_page))
        .sum();
    assert!(total <= view.pages_per_day);
    assert!(!view.plan_complete);
}

#[tokio::test]
async fn http_toggle_marks_slot_done_and_back() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_view(&client, &server.base_url).await;
    let was_done = before.slots[2].done;

    let response = toggle(&client, &server.base_url, 2).await;
    assert!(response.status().is_success());
    let after: WirdView = response.json().await.unwrap();
    assert_eq!(after.slots[2].index, 2);
    assert_eq!(after.slots[2].done, !was_done);
    assert_eq!(after.day_index, before.day_index);

    let restored: WirdView = toggle(&client, &server.base_url, 2).await.json().await.unwrap();
    assert_eq!(restored.slots[2].done, was_done);
    assert_eq!(restored.completed_slots, before.completed_slots);
}

#[tokio::test]
async fn http_toggle_rejects_unknown_slot() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = toggle(&client, &server.base_url, 5).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_repetition_change_needs_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_view(&client, &server.base_url).await;
    let target = if before.repetition_count == 2 { 3 } else { 2 };

    let refused = client
        .post(format!("{}/api/wird/repetitions", server.base_url))
        .json(&serde_json::json!({ "count": target }))
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), StatusCode::CONFLICT);

    let accepted: WirdView = client
        .post(format!("{}/api/wird/repetitions", server.base_url))
        .json(&serde_json::json!({ "count": target, "confirm": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accepted.repetition_count, target);
    assert_eq!(accepted.completed_slots, 0);
    assert!(!accepted.day_fully_completed);
    assert_eq!(accepted.day_index, before.day_index);
}

#[tokio::test]
async fn http_rollover_check_is_idempotent() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    // The startup check may not have run yet, and an anchor pushed by another
    // test can put the logical date behind the calendar one.
    let first = check_rollover(&client, &server.base_url).await;
    assert!(
        ["initialized", "unchanged", "marker_regressed"].contains(&first.outcome.as_str()),
        "unexpected outcome {}",
        first.outcome
    );
    let second = check_rollover(&client, &server.base_url).await;
    assert_eq!(second.outcome, "unchanged");

    let view = get_view(&client, &server.base_url).await;
    assert!(view.logical_date.is_some());
}

#[tokio::test]
async fn http_anchor_can_be_pushed() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let bad = client
        .post(format!("{}/api/anchor", server.base_url))
        .json(&serde_json::json!({ "time": "dawn" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let anchor: AnchorResponse = client
        .post(format!("{}/api/anchor", server.base_url))
        .json(&serde_json::json!({ "time": "04:45" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(anchor.anchor.unwrap().ends_with("T04:45"));
    assert!(!anchor.refresh_requested);
}

#[tokio::test]
async fn http_reset_needs_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let refused = client
        .post(format!("{}/api/wird/reset", server.base_url))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), StatusCode::CONFLICT);

    let view: WirdView = client
        .post(format!("{}/api/wird/reset", server.base_url))
        .json(&serde_json::json!({ "confirm": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.day_index, 1);
    assert_eq!(view.completed_slots, 0);
}
