mod common;

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_test::assert_ok;

use common::OneMoveDealer;
use slide_duel::adapter::server::{run_server, run_server_with, ServerConfig};
use slide_duel::core::{SessionCoordinator, SimpleRng};

async fn start_server(config: ServerConfig) -> SocketAddr {
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = run_server(config, Some(ready_tx)).await;
    });
    wait_ready(ready_rx).await
}

async fn start_scripted_server() -> SocketAddr {
    let coordinator = SessionCoordinator::with_dealer(SimpleRng::new(3), Box::new(OneMoveDealer));
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = run_server_with(test_config(), coordinator, Some(ready_tx)).await;
    });
    wait_ready(ready_rx).await
}

async fn wait_ready(ready_rx: oneshot::Receiver<SocketAddr>) -> SocketAddr {
    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped")
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        seed: Some(2024),
        log_path: None,
    }
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    write_half: OwnedWriteHalf,
    id: String,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = assert_ok!(TcpStream::connect(addr).await);
        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            lines: BufReader::new(read_half).lines(),
            write_half,
            id: String::new(),
        };

        let hello = client.recv().await;
        assert_eq!(hello["type"], "self_id");
        client.id = hello["id"].as_str().expect("id is a string").to_string();
        assert_eq!(client.id.len(), 6);
        client
    }

    async fn send(&mut self, msg: &str) {
        self.send_bytes(msg.as_bytes()).await;
    }

    async fn send_bytes(&mut self, bytes: &[u8]) {
        self.write_half.write_all(bytes).await.unwrap();
        self.write_half.write_all(b"\n").await.unwrap();
        self.write_half.flush().await.unwrap();
    }

    async fn send_json(&mut self, msg: Value) {
        self.send(&msg.to_string()).await;
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    /// Pair with ourselves: the `not_self` reply proves every earlier
    /// message has been handled without producing output.
    async fn sync(&mut self) {
        let own = self.id.clone();
        self.send_json(json!({"type": "play", "opponentId": own})).await;
        assert_eq!(self.recv().await, json!({"type": "not_self"}));
    }
}

fn empty_slot(start: &Value) -> (i64, i64) {
    (
        start["eptX"].as_i64().unwrap(),
        start["eptY"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn duel_pairing_moves_and_disconnect() {
    let addr = start_server(test_config()).await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;
    assert_ne!(a.id, b.id);

    let target = b.id.clone();
    a.send_json(json!({"type": "play", "opponentId": target})).await;

    let start_a = a.recv().await;
    let start_b = b.recv().await;
    assert_eq!(start_a["type"], "start_game");
    assert_eq!(start_a, start_b);
    assert_eq!(start_a["table"].as_array().unwrap().len(), 5);
    assert_eq!(start_a["goal"].as_array().unwrap().len(), 3);

    let (ex, ey) = empty_slot(&start_a);
    assert_eq!(start_a["table"][ey as usize][ex as usize], -1);

    // A move next to the empty slot is accepted silently, and test_win finds no winner yet.
    let (nx, ny) = if ex > 0 { (ex - 1, ey) } else { (ex + 1, ey) };
    b.send_json(json!({"type": "move_tile", "x": nx, "y": ny})).await;
    b.send_json(json!({"type": "test_win"})).await;

    // Both are busy now.
    let target = a.id.clone();
    b.send_json(json!({"type": "play", "opponentId": target})).await;
    assert_eq!(b.recv().await, json!({"type": "already_playing"}));

    drop(a);
    assert_eq!(b.recv().await, json!({"type": "opponent_disconnected"}));

    // The survivor is idle again and may be paired by a newcomer.
    let mut c = Client::connect(addr).await;
    let target = b.id.clone();
    c.send_json(json!({"type": "play", "opponentId": target})).await;
    assert_eq!(c.recv().await["type"], "start_game");
    assert_eq!(b.recv().await["type"], "start_game");
}

#[tokio::test]
async fn pairing_refusals() {
    let addr = start_server(test_config()).await;
    let mut a = Client::connect(addr).await;

    a.sync().await;

    let missing = if a.id == "999999" { "100000" } else { "999999" };
    a.send_json(json!({"type": "play", "opponentId": missing})).await;
    assert_eq!(a.recv().await, json!({"type": "not_exist_id"}));
}

#[tokio::test]
async fn malformed_input_gets_error_replies() {
    let addr = start_server(test_config()).await;
    let mut a = Client::connect(addr).await;

    a.send("this is not json").await;
    let err = a.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "invalid_message");

    a.send_json(json!({"type": "chat", "text": "hello"})).await;
    assert_eq!(a.recv().await["code"], "unknown_type");

    a.send_json(json!({"type": "play", "opponentId": "12"})).await;
    assert_eq!(a.recv().await["code"], "invalid_id");

    // Blank lines, off-board moves and moves outside a session get no reply.
    a.send("").await;
    a.send_json(json!({"type": "move_tile", "x": 7, "y": 0})).await;
    a.send_json(json!({"type": "move_tile", "x": 1, "y": 1})).await;
    a.send_json(json!({"type": "test_win"})).await;
    a.sync().await;
}

#[tokio::test]
async fn invalid_utf8_keeps_the_session_alive() {
    let addr = start_server(test_config()).await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;

    let target = b.id.clone();
    a.send_json(json!({"type": "play", "opponentId": target})).await;
    assert_eq!(a.recv().await["type"], "start_game");
    assert_eq!(b.recv().await["type"], "start_game");

    a.send_bytes(b"{\"type\":\"test_win\",\"x\":\"\xff\xfe\"}").await;
    let err = a.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "invalid_message");

    // Still connected and still paired: the opponent saw nothing.
    let target = b.id.clone();
    a.send_json(json!({"type": "play", "opponentId": target})).await;
    assert_eq!(a.recv().await, json!({"type": "already_playing"}));
    b.sync().await;
}

#[tokio::test]
async fn scripted_win_ends_game_for_both() {
    let addr = start_scripted_server().await;
    let mut a = Client::connect(addr).await;
    let mut b = Client::connect(addr).await;

    let target = b.id.clone();
    a.send_json(json!({"type": "play", "opponentId": target})).await;
    let empty = OneMoveDealer::empty_slot();
    for start in [a.recv().await, b.recv().await] {
        assert_eq!(start["type"], "start_game");
        assert_eq!(empty_slot(&start), (empty.x() as i64, empty.y() as i64));
    }

    // An unsolved board does not end the race.
    a.send_json(json!({"type": "test_win"})).await;
    a.sync().await;

    let win = OneMoveDealer::winning_move();
    b.send_json(json!({"type": "move_tile", "x": win.x(), "y": win.y()})).await;
    b.send_json(json!({"type": "test_win"})).await;
    assert_eq!(b.recv().await, json!({"type": "game_end", "win": true}));
    assert_eq!(a.recv().await, json!({"type": "game_end", "win": false}));

    // The session is gone; both may start over.
    let target = a.id.clone();
    b.send_json(json!({"type": "play", "opponentId": target})).await;
    assert_eq!(b.recv().await["type"], "start_game");
    assert_eq!(a.recv().await["type"], "start_game");
}

#[tokio::test]
async fn same_seed_same_codes() {
    let first = start_server(test_config()).await;
    let second = start_server(test_config()).await;

    let a = Client::connect(first).await;
    let b = Client::connect(second).await;
    assert_eq!(a.id, b.id);
}

#[tokio::test]
async fn wire_log_records_both_directions() {
    let path = std::env::temp_dir().join(format!("slide-duel-wire-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut config = test_config();
    config.log_path = Some(path.to_string_lossy().into_owned());
    let addr = start_server(config).await;

    let mut a = Client::connect(addr).await;
    a.sync().await;

    let mut contents = String::new();
    for _ in 0..40 {
        contents = std::fs::read_to_string(&path).unwrap_or_default();
        if contents.contains("not_self") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let _ = std::fs::remove_file(&path);

    assert!(contents.contains("\"self_id\""), "log: {}", contents);
    assert!(contents.contains("\"opponentId\""), "log: {}", contents);
    assert!(contents.contains("\"not_self\""), "log: {}", contents);
}
