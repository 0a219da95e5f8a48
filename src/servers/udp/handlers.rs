//! Handlers for the UDP control server.
//!
//! It's responsible for:
//!
//! - Parsing the incoming datagram.
//! - Delegating the request to the correct handler depending on the command.
//! - Rendering the handler outcome as a response.
//!
//! All outcomes, including malformed datagrams and commands from addresses
//! with no session, are recovered into a response; nothing here terminates
//! the server.
use std::net::SocketAddr;
use std::sync::Arc;

use bittrickle_primitives::username::Username;
use tracing::debug;

use super::request::Request;
use super::response::Response;
use super::RawRequest;
use crate::core::error::Error;
use crate::core::Tracker;

/// It handles the incoming datagrams.
///
/// Returns `None` when the command expects no reply (heartbeats).
pub async fn handle_packet(udp_request: RawRequest, tracker: &Arc<Tracker>) -> Option<Response> {
    match Request::from_bytes(&udp_request.payload) {
        Ok(request) => handle_request(request, udp_request.from, tracker).await,
        Err(e) => {
            debug!("Bad control message from {}: {e}", udp_request.from);
            Some(Response::InvalidCommand)
        }
    }
}

/// It dispatches the request to the correct handler.
pub async fn handle_request(request: Request, from: SocketAddr, tracker: &Tracker) -> Option<Response> {
    debug!("Handling request: {request:?} from: {from}");

    match request {
        Request::Authenticate {
            username,
            password,
            transfer_port,
        } => Some(handle_authenticate(&username, &password, transfer_port, from, tracker).await),
        Request::Heartbeat { .. } => {
            // The username argument travels on the wire, but identity is the
            // source address, like for every other command.
            tracker.heartbeat(from).await;
            None
        }
        Request::Get { filename } => Some(handle_get(&filename, from, tracker).await),
        Request::ListActivePeers => Some(handle_list_active_peers(from, tracker).await),
        Request::ListPublishedFiles => Some(handle_list_published_files(from, tracker).await),
        Request::Publish { filename } => Some(handle_publish(&filename, from, tracker).await),
        Request::Search { substring } => Some(handle_search(&substring, from, tracker).await),
        Request::Unpublish { filename } => Some(handle_unpublish(&filename, from, tracker).await),
        Request::Exit => Some(handle_exit(from, tracker).await),
    }
}

async fn handle_authenticate(
    username: &Username,
    password: &str,
    transfer_port: u16,
    from: SocketAddr,
    tracker: &Tracker,
) -> Response {
    match tracker.authenticate(username, password, transfer_port, from).await {
        Ok(()) => Response::AuthenticationSuccess,
        Err(Error::UnknownUser { .. }) => Response::UnknownUsername,
        Err(Error::WrongPassword { .. }) => Response::PasswordMismatch,
        Err(Error::AlreadyActive { .. }) => Response::AlreadyActive,
        Err(e) => unexpected(&e),
    }
}

async fn handle_get(filename: &str, from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.resolve_holder(from, filename).await {
        Ok(endpoint) => Response::Holder(endpoint),
        Err(Error::NotAuthenticated { .. }) => Response::NotAuthenticated,
        Err(Error::NoLiveHolder { .. }) => Response::FileNotFound,
        Err(e) => unexpected(&e),
    }
}

async fn handle_list_active_peers(from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.list_active_peers(from).await {
        Ok(peers) => Response::ActivePeers(peers),
        Err(_) => Response::NotAuthenticated,
    }
}

async fn handle_list_published_files(from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.list_published_files(from).await {
        Ok(files) => Response::PublishedFiles(files),
        Err(_) => Response::NotAuthenticated,
    }
}

async fn handle_publish(filename: &str, from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.publish(from, filename).await {
        Ok(()) => Response::FilePublished,
        Err(_) => Response::NotAuthenticated,
    }
}

async fn handle_search(substring: &str, from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.search(from, substring).await {
        Ok(files) => Response::MatchingFiles(files),
        Err(_) => Response::NotAuthenticated,
    }
}

async fn handle_unpublish(filename: &str, from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.unpublish(from, filename).await {
        Ok(()) => Response::FileUnpublished,
        Err(Error::NotAuthenticated { .. }) => Response::NotAuthenticated,
        Err(Error::NotPublished { .. }) => Response::UnpublishFailed,
        Err(e) => unexpected(&e),
    }
}

async fn handle_exit(from: SocketAddr, tracker: &Tracker) -> Response {
    match tracker.disconnect(from).await {
        Ok(_) => Response::Goodbye,
        Err(_) => Response::NotAuthenticated,
    }
}

fn unexpected(e: &Error) -> Response {
    debug!("Unexpected tracker error: {e}");
    Response::InvalidCommand
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use bittrickle_configuration::SessionPolicy;

    use super::{handle_packet, handle_request};
    use crate::core::auth::Credentials;
    use crate::core::Tracker;
    use crate::servers::udp::request::Request;
    use crate::servers::udp::response::Response;
    use crate::servers::udp::RawRequest;

    fn tracker() -> Arc<Tracker> {
        Arc::new(Tracker::with_credentials(
            Credentials::from_pairs(&[("alice", "Wonderland!23")]),
            SessionPolicy::default(),
        ))
    }

    fn alice_addr() -> SocketAddr {
        "126.0.0.1:5001".parse().unwrap()
    }

    fn raw(payload: &[u8], from: SocketAddr) -> RawRequest {
        RawRequest {
            payload: payload.to_vec(),
            from,
        }
    }

    async fn authenticate_alice(tracker: &Arc<Tracker>) {
        let response = handle_packet(raw(b"auth alice Wonderland!23 54001", alice_addr()), tracker).await;

        assert_eq!(response, Some(Response::AuthenticationSuccess));
    }

    #[tokio::test]
    async fn it_should_answer_malformed_datagrams_with_invalid_command() {
        let tracker = tracker();

        assert_eq!(
            handle_packet(raw(b"", alice_addr()), &tracker).await,
            Some(Response::InvalidCommand)
        );
        assert_eq!(
            handle_packet(raw(&[0xff, 0xfe], alice_addr()), &tracker).await,
            Some(Response::InvalidCommand)
        );
        assert_eq!(
            handle_packet(raw(b"frobnicate x", alice_addr()), &tracker).await,
            Some(Response::InvalidCommand)
        );
    }

    #[tokio::test]
    async fn it_should_not_reply_to_heartbeats() {
        let tracker = tracker();
        authenticate_alice(&tracker).await;

        let response = handle_packet(raw(b"heartbeat alice", alice_addr()), &tracker).await;

        assert_eq!(response, None);
    }

    #[tokio::test]
    async fn it_should_answer_commands_from_strangers_with_not_authenticated() {
        let tracker = tracker();
        let stranger: SocketAddr = "126.0.0.9:5999".parse().unwrap();

        for command in ["get x.txt", "lap", "lpf", "pub x.txt", "sch x", "unp x.txt", "xit"] {
            let response = handle_packet(raw(command.as_bytes(), stranger), &tracker).await;

            assert_eq!(response, Some(Response::NotAuthenticated), "command: {command}");
        }
    }

    #[tokio::test]
    async fn it_should_run_the_publish_then_get_flow() {
        let tracker = tracker();
        authenticate_alice(&tracker).await;

        let response = handle_request(
            Request::Publish {
                filename: "x.txt".to_owned(),
            },
            alice_addr(),
            &tracker,
        )
        .await;
        assert_eq!(response, Some(Response::FilePublished));

        // the requester itself never qualifies as the holder
        let response = handle_request(
            Request::Get {
                filename: "x.txt".to_owned(),
            },
            alice_addr(),
            &tracker,
        )
        .await;
        assert_eq!(response, Some(Response::FileNotFound));
    }

    #[tokio::test]
    async fn it_should_say_goodbye_on_exit() {
        let tracker = tracker();
        authenticate_alice(&tracker).await;

        let response = handle_packet(raw(b"xit", alice_addr()), &tracker).await;

        assert_eq!(response, Some(Response::Goodbye));
    }
}
