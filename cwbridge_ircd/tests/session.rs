mod common;
use common::*;

use chatwork_client::RoomId;
use cwbridge_ircd::channel_target;

use std::time::Duration;

use pretty_assertions::assert_eq;

#[tokio::test]
async fn handshake_then_updates()
{
    let shared = MockShared::with_rooms(&[(10, "Team A"), (20, "")]);
    shared.queue_poll(Ok(vec![event(1, 10, "Team A", "Carol", "hello")]));

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;

    client.expect_handshake("alice", &["#Team_A", "#mychat"]).await;
    client.expect_line(":Carol PRIVMSG #Team_A :hello").await;

    assert_eq!(*shared.logins.lock(), vec![("bob@example.com".to_string(), "hunter2".to_string())]);
}

#[tokio::test]
async fn handshake_without_nick()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.send("PASS hunter2").await;
    client.send("USER bob@example.com 0 * :Bob").await;

    client.expect_handshake("*", &["#Team_A"]).await;
}

#[tokio::test]
async fn commands_are_case_insensitive()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.send("pass hunter2").await;
    client.send("nick alice").await;
    client.send("user bob@example.com 0 * :Bob").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.send("ping :abc").await;
    client.expect_line(":cwbridge PONG cwbridge :abc").await;
}

#[tokio::test]
async fn login_failure_closes_session()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    *shared.login_error.lock() = Some("bad password".to_string());

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "wrong").await;

    client.expect_line("ERROR :Login failed: api_login rejected: bad password").await;
    client.expect_eof().await;
    client.finished().await;

    assert_eq!(shared.poll_calls(), 0);
}

#[tokio::test]
async fn user_without_pass_logs_in_with_empty_secret()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    *shared.login_error.lock() = Some("empty".to_string());

    let mut client = TestClient::start(&shared);
    client.send("USER bob@example.com 0 * :Bob").await;

    client.expect_line("ERROR :Login failed: api_login rejected: empty").await;
    client.expect_eof().await;
    client.finished().await;

    assert_eq!(*shared.logins.lock(), vec![("bob@example.com".to_string(), String::new())]);
}

#[tokio::test]
async fn privmsg_posts_to_matching_room()
{
    let shared = MockShared::with_rooms(&[(10, "Team A"), (20, "")]);

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A", "#mychat"]).await;

    client.send("PRIVMSG #Team_A :hello there").await;
    client.send("PRIVMSG mychat :no prefix").await;

    // PING is answered in order, so the sends above have been dispatched
    client.send("PING sync").await;
    client.expect_line(":cwbridge PONG cwbridge :sync").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut sent = shared.sent.lock().clone();
    sent.sort();
    assert_eq!(sent, vec![
        (RoomId(10), "hello there".to_string()),
        (RoomId(20), "no prefix".to_string()),
    ]);
}

#[tokio::test]
async fn privmsg_to_unknown_channel_is_ignored()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.send("PRIVMSG #nowhere :hello").await;
    client.send("PING sync").await;
    client.expect_line(":cwbridge PONG cwbridge :sync").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(shared.sent.lock().is_empty());
}

#[tokio::test]
async fn send_failure_keeps_session_open()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    *shared.send_error.lock() = Some("read only".to_string());

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.send("PRIVMSG #Team_A :hello").await;
    client.expect_line("ERROR :Send failed: send_chat rejected: read only").await;

    *shared.send_error.lock() = None;
    client.send("PRIVMSG #Team_A :again").await;
    client.send("PING sync").await;
    client.expect_line(":cwbridge PONG cwbridge :sync").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*shared.sent.lock(), vec![(RoomId(10), "again".to_string())]);
}

#[tokio::test]
async fn multi_line_update()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    shared.queue_poll(Ok(vec![
        event(1, 10, "Team A", "Carol Smith", "first\nsecond\r\nthird"),
        event(2, 10, "Team A", "", "anonymous"),
    ]));

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.expect_line(":Carol_Smith PRIVMSG #Team_A :first").await;
    client.expect_line(":Carol_Smith PRIVMSG #Team_A :second").await;
    client.expect_line(":Carol_Smith PRIVMSG #Team_A :third").await;
    client.expect_line(":mychat PRIVMSG #Team_A :anonymous").await;
}

#[tokio::test]
async fn updates_follow_poll_order()
{
    let shared = MockShared::with_rooms(&[(10, "Team A"), (20, "Other")]);
    shared.queue_poll(Ok(vec![]));
    shared.queue_poll(Ok(vec![event(1, 20, "Other", "Dave", "one")]));
    shared.queue_poll(Ok(vec![event(2, 10, "Team A", "Erin", "two")]));

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A", "#Other"]).await;

    client.expect_line(&format!(":Dave PRIVMSG {} :one", channel_target("Other"))).await;
    client.expect_line(":Erin PRIVMSG #Team_A :two").await;
}

#[tokio::test]
async fn poll_failure_closes_session()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    shared.queue_poll(Err("session expired".to_string()));

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.expect_line("ERROR :Update failed: get_update rejected: session expired").await;
    client.expect_eof().await;
    client.finished().await;

    assert_eq!(shared.poll_calls(), 1);
}

#[tokio::test]
async fn polling_stops_on_quit()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.send("QUIT :bye").await;
    client.expect_eof().await;
    client.finished().await;

    let calls = shared.poll_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(shared.poll_calls(), calls);
}

#[tokio::test]
async fn quit_during_login()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    shared.hang_login.store(true, std::sync::atomic::Ordering::SeqCst);

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    wait_until(|| shared.logins.lock().len() == 1).await;
    client.send("QUIT").await;

    client.expect_eof().await;
    client.finished().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(shared.poll_calls(), 0);
}

#[tokio::test]
async fn quit_during_poll()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);
    shared.hang_poll.store(true, std::sync::atomic::Ordering::SeqCst);

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    wait_until(|| shared.poll_calls() == 1).await;
    client.send("QUIT").await;

    client.expect_eof().await;
    client.finished().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(shared.poll_calls(), 1);
}

#[tokio::test]
async fn disconnect_before_login()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let client = TestClient::start(&shared);
    let session = client.disconnect();

    tokio::time::timeout(Duration::from_secs(2), session).await.unwrap().unwrap();
    assert!(shared.logins.lock().is_empty());
}

#[tokio::test]
async fn privmsg_before_registration()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.send("PRIVMSG #Team_A :too early").await;
    client.expect_line(":cwbridge 451 * :You have not registered").await;

    client.send("NICK alice").await;
    client.send("PRIVMSG #Team_A").await;
    client.expect_line(":cwbridge 461 alice PRIVMSG :Not enough parameters").await;

    assert!(shared.sent.lock().is_empty());
}

#[tokio::test]
async fn missing_parameters()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.send("PASS").await;
    client.expect_line(":cwbridge 461 * PASS :Not enough parameters").await;
    client.send("USER").await;
    client.expect_line(":cwbridge 461 * USER :Not enough parameters").await;

    assert!(shared.logins.lock().is_empty());
}

#[tokio::test]
async fn reregistration_is_refused()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.register("alice", "bob@example.com", "hunter2").await;
    client.expect_handshake("alice", &["#Team_A"]).await;

    client.send("PASS other").await;
    client.expect_line(":cwbridge 462 alice :You may not reregister").await;
    client.send("USER carol@example.com 0 * :Carol").await;
    client.expect_line(":cwbridge 462 alice :You may not reregister").await;

    assert_eq!(shared.logins.lock().len(), 1);
}

#[tokio::test]
async fn unknown_commands_are_ignored()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.send("CAP LS 302").await;
    client.send("MODE alice +i").await;
    client.expect_nothing(Duration::from_millis(100)).await;

    client.send("PING x").await;
    client.expect_line(":cwbridge PONG cwbridge :x").await;
}

#[tokio::test]
async fn empty_line_closes_session()
{
    let shared = MockShared::with_rooms(&[(10, "Team A")]);

    let mut client = TestClient::start(&shared);
    client.send("").await;

    let line = client.next_line().await.unwrap();
    assert!(line.starts_with("ERROR :"), "{}", line);
    client.expect_eof().await;
}
