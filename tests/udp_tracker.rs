//! Integration tests for the UDP control protocol, driving a real tracker
//! instance over the wire.
mod common;

use std::time::Duration;

use bittrickle_test_helpers::configuration;

use crate::common::{start_default_tracker, start_tracker, Client};

#[tokio::test]
async fn it_should_start_and_stop_the_server() {
    let tracker = start_default_tracker().await;

    assert_ne!(tracker.binding.port(), 0);

    tracker.server.stop().await.expect("the server should stop");
}

#[tokio::test]
async fn it_should_authenticate_a_user_with_valid_credentials() {
    let tracker = start_default_tracker().await;
    let alice = Client::connect(tracker.binding).await;

    let response = alice.authenticate("alice", "Wonderland!23", 54001).await;

    assert_eq!(response, "Authentication Success");
}

#[tokio::test]
async fn it_should_reject_authentication_with_an_unknown_username() {
    let tracker = start_default_tracker().await;
    let client = Client::connect(tracker.binding).await;

    let response = client.authenticate("mallory", "whatever", 54001).await;

    assert_eq!(response, "Unknown username");
}

#[tokio::test]
async fn it_should_reject_authentication_with_a_wrong_password() {
    let tracker = start_default_tracker().await;
    let client = Client::connect(tracker.binding).await;

    let response = client.authenticate("alice", "not-her-password", 54001).await;

    assert_eq!(response, "Password does not match");
}

#[tokio::test]
async fn it_should_reject_a_second_session_for_an_active_username() {
    let tracker = start_default_tracker().await;

    let first = Client::connect(tracker.binding).await;
    assert_eq!(first.authenticate("alice", "Wonderland!23", 54001).await, "Authentication Success");

    let second = Client::connect(tracker.binding).await;
    assert_eq!(second.authenticate("alice", "Wonderland!23", 54002).await, "User already active");
}

#[tokio::test]
async fn it_should_answer_unknown_commands_with_invalid_command() {
    let tracker = start_default_tracker().await;
    let client = Client::connect(tracker.binding).await;

    assert_eq!(client.request("frobnicate x").await, "Invalid command.");
}

#[tokio::test]
async fn it_should_survive_malformed_datagrams() {
    let tracker = start_default_tracker().await;
    let client = Client::connect(tracker.binding).await;

    // none of these may terminate the server
    client.send(&[]).await;
    assert_eq!(client.receive().await, "Invalid command.");

    client.send(&[0xff, 0xfe, 0xfd]).await;
    assert_eq!(client.receive().await, "Invalid command.");

    client.send(b"auth alice").await;
    assert_eq!(client.receive().await, "Invalid command.");

    assert_eq!(client.authenticate("alice", "Wonderland!23", 54001).await, "Authentication Success");
}

#[tokio::test]
async fn it_should_require_a_session_for_every_command_except_auth() {
    let tracker = start_default_tracker().await;
    let stranger = Client::connect(tracker.binding).await;

    for command in ["get x.txt", "lap", "lpf", "pub x.txt", "sch x", "unp x.txt", "xit"] {
        assert_eq!(
            stranger.request(command).await,
            "You are not authenticated.",
            "command: {command}"
        );
    }
}

#[tokio::test]
async fn it_should_not_reply_to_heartbeats() {
    let tracker = start_default_tracker().await;
    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;

    alice.send(b"heartbeat alice").await;

    // if the heartbeat had produced a reply it would be read here instead of
    // the listing
    assert_eq!(alice.request("lpf").await, "No published files");
}

#[tokio::test]
async fn it_should_publish_and_list_files() {
    let tracker = start_default_tracker().await;
    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;

    assert_eq!(alice.request("pub x.txt").await, "File published successfully");
    assert_eq!(alice.request("lpf").await, "1 file published:\nx.txt");

    // republishing is idempotent
    assert_eq!(alice.request("pub x.txt").await, "File published successfully");
    assert_eq!(alice.request("lpf").await, "1 file published:\nx.txt");

    assert_eq!(alice.request("pub y.txt").await, "File published successfully");
    assert_eq!(alice.request("lpf").await, "2 files published:\nx.txt\ny.txt");
}

#[tokio::test]
async fn it_should_unpublish_files() {
    let tracker = start_default_tracker().await;
    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    assert_eq!(alice.request("unp x.txt").await, "File unpublished successfully");
    assert_eq!(alice.request("unp x.txt").await, "File unpublication failed");
    assert_eq!(alice.request("lpf").await, "No published files");
}

#[tokio::test]
async fn it_should_remove_a_filename_entirely_when_its_last_owner_unpublishes() {
    let tracker = start_default_tracker().await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;

    assert_eq!(bob.request("sch x").await, "1 file found:\nx.txt");

    alice.request("unp x.txt").await;

    assert_eq!(bob.request("sch x").await, "No files found");
    assert_eq!(bob.request("get x.txt").await, "File not found");
}

#[tokio::test]
async fn it_should_resolve_a_holder_but_never_the_requester_itself() {
    let tracker = start_default_tracker().await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    // alice owns the file, so for her nobody else holds it
    assert_eq!(alice.request("get x.txt").await, "File not found");

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;

    assert_eq!(bob.request("get x.txt").await, "127.0.0.1 54001");
}

#[tokio::test]
async fn it_should_exclude_co_owned_files_from_search_results() {
    let tracker = start_default_tracker().await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;
    bob.request("pub x.txt").await;

    // bob co-owns x.txt, so it is hidden from him even though alice also
    // holds it
    assert_eq!(bob.request("sch x").await, "No files found");

    let carol = Client::connect(tracker.binding).await;
    carol.authenticate("carol", "Carols*2024", 54003).await;

    assert_eq!(carol.request("sch x").await, "1 file found:\nx.txt");
}

#[tokio::test]
async fn it_should_surface_a_file_published_by_two_owners_once_with_a_deterministic_holder() {
    let tracker = start_default_tracker().await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;
    bob.request("pub x.txt").await;

    let carol = Client::connect(tracker.binding).await;
    carol.authenticate("carol", "Carols*2024", 54003).await;

    assert_eq!(carol.request("sch x").await, "1 file found:\nx.txt");

    // both owners are live candidates; the first in iteration order wins
    assert_eq!(carol.request("get x.txt").await, "127.0.0.1 54001");
}

#[tokio::test]
async fn it_should_mark_files_dormant_on_disconnect_and_revive_them_on_reauthentication() {
    let tracker = start_default_tracker().await;

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    assert_eq!(alice.request("xit").await, "Goodbye!");

    assert_eq!(bob.request("sch x").await, "No files found");
    assert_eq!(bob.request("get x.txt").await, "File not found");
    assert_eq!(bob.request("lap").await, "No active peers");

    // reconnecting reactivates the dormant publication without a republish
    let alice = Client::connect(tracker.binding).await;
    assert_eq!(alice.authenticate("alice", "Wonderland!23", 54001).await, "Authentication Success");

    assert_eq!(bob.request("sch x").await, "1 file found:\nx.txt");
}

#[tokio::test]
async fn it_should_list_active_peers_excluding_the_caller() {
    let tracker = start_default_tracker().await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;

    assert_eq!(alice.request("lap").await, "No active peers");

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;

    let carol = Client::connect(tracker.binding).await;
    carol.authenticate("carol", "Carols*2024", 54003).await;

    assert_eq!(alice.request("lap").await, "2 active peers:\nbob\ncarol");
    assert_eq!(carol.request("lap").await, "2 active peers:\nalice\nbob");
}

#[tokio::test]
async fn it_should_treat_sessions_that_stop_heartbeating_as_not_live() {
    let tracker = start_tracker(configuration::ephemeral_with_heartbeat_timeout(1)).await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;
    alice.request("pub x.txt").await;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let bob = Client::connect(tracker.binding).await;
    bob.authenticate("bob", "Builder#99", 54002).await;

    // alice's session still exists, but she is not live for any consumer
    assert_eq!(bob.request("lap").await, "No active peers");
    assert_eq!(bob.request("sch x").await, "No files found");
    assert_eq!(bob.request("get x.txt").await, "File not found");

    // one heartbeat makes her reachable again; no re-auth needed
    alice.send(b"heartbeat alice").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(bob.request("lap").await, "1 active peer:\nalice");
    assert_eq!(bob.request("get x.txt").await, "127.0.0.1 54001");
}

#[tokio::test]
async fn it_should_let_a_user_reconnect_after_its_session_went_stale() {
    let tracker = start_tracker(configuration::ephemeral_with_heartbeat_timeout(1)).await;

    let alice = Client::connect(tracker.binding).await;
    alice.authenticate("alice", "Wonderland!23", 54001).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    // the stale session is overwritten instead of blocking the new one
    let reconnected = Client::connect(tracker.binding).await;
    assert_eq!(
        reconnected.authenticate("alice", "Wonderland!23", 54004).await,
        "Authentication Success"
    );
}
