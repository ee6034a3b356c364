//! Unix-socket line-protocol server.
//!
//! One task runs [`serve`], accepting connections on a
//! [`tokio::net::UnixListener`] and spawning one ephemeral task per
//! connection. Each connection reads at most
//! [`accounts_protocol::request::MAX_REQUEST_BYTES`] bytes as a single
//! request, dispatches it against a [`accounts_core::Directory`], and
//! writes back the encoded [`accounts_protocol::Response`] before closing.

use std::sync::Arc;

use accounts_core::error::NotFoundKind;
use accounts_core::Directory;
use accounts_protocol::request::MAX_REQUEST_BYTES;
use accounts_protocol::{Body, Request, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

/// Accepts connections until `shutdown` resolves, serving each on its own
/// task. Returns once the listener stops accepting and in-flight
/// connections have been spawned (it does not wait for them to finish —
/// each response is written promptly since handlers do not block past
/// their per-request timeout).
pub async fn serve(listener: UnixListener, directory: Directory, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                tracing::info!("socket server shutting down");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let directory = directory.clone();
                        tokio::spawn(async move {
                            if let Err(error) = handle_connection(stream, directory).await {
                                tracing::warn!(%error, "connection handling failed");
                            }
                        });
                    }
                    Err(error) => {
                        tracing::error!(%error, "failed to accept connection");
                    }
                }
            }
        }
    }
}

async fn handle_connection(mut stream: UnixStream, directory: Directory) -> std::io::Result<()> {
    let mut buf = vec![0_u8; MAX_REQUEST_BYTES];
    let read = tokio::time::timeout(accounts_protocol::request::DEFAULT_TIMEOUT, stream.read(&mut buf))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "request read timed out"))??;

    if read == 0 {
        return Ok(());
    }

    let line = String::from_utf8_lossy(&buf[..read]);
    let response = match Request::parse(&line) {
        Ok(request) => dispatch(&directory, request).await,
        Err(_) => Response::malformed(),
    };

    stream.write_all(response.encode().as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn dispatch(directory: &Directory, request: Request) -> Response {
    let outcome = tokio::time::timeout(request.timeout(), run(directory, request)).await;
    match outcome {
        Ok(response) => response,
        Err(_) => Response::error(),
    }
}

async fn run(directory: &Directory, request: Request) -> Response {
    match request {
        Request::UserByName(name) => match directory.user_by_name(&name).await {
            Ok(cached) => Response::ok(Body::Users(vec![cached.user.clone()])),
            Err(accounts_core::Error::NotFound { kind: NotFoundKind::UserByName, .. }) => Response::not_found(),
            Err(_) => Response::error(),
        },
        Request::UserByUid(uid) => match directory.user_by_uid(uid).await {
            Ok(cached) => Response::ok(Body::Users(vec![cached.user.clone()])),
            Err(_) => Response::not_found(),
        },
        Request::Users => {
            let users = directory.users().await.iter().map(|cached| cached.user.clone()).collect();
            Response::ok(Body::Users(users))
        }
        Request::GroupByName(name) => match directory.group_by_name(&name).await {
            Ok(group) => Response::ok(Body::Groups(vec![group])),
            Err(_) => Response::not_found(),
        },
        Request::GroupByGid(gid) => match directory.group_by_gid(gid).await {
            Ok(group) => Response::ok(Body::Groups(vec![group])),
            Err(_) => Response::not_found(),
        },
        Request::Groups => Response::ok(Body::Groups(directory.groups().await)),
        Request::Names => Response::ok(Body::Names(directory.names().await)),
        Request::IsName(name) => {
            if directory.is_name(&name).await {
                Response::ok(Body::Empty)
            } else {
                Response::not_found()
            }
        }
        Request::Keys(name) => match directory.authorized_keys(&name).await {
            Ok(keys) => Response::ok(Body::Keys(keys)),
            Err(_) => Response::not_found(),
        },
    }
}
