//! Token-bounded WebSocket sessions.
//!
//! # Purpose
//! Keeps streaming sessions from outliving the access token that opened
//! them: when the token's remaining lifetime elapses, the server closes the
//! socket with a policy-violation close frame.
//!
//! # Key invariants
//! - Exactly one close outcome per session. The guard's atomic flag decides
//!   the race between client disconnect and expiry; the loser is dropped.
//! - A token already at or past expiry never upgrades.
use axum::extract::Extension;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use shepherd_auth::{AccessClaims, now_epoch_seconds};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::gw_unauthorized;

/// How a session ended. Reported once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClose {
    ClosedByClient,
    ClosedByTimeout,
}

impl SessionClose {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionClose::ClosedByClient => "client",
            SessionClose::ClosedByTimeout => "timeout",
        }
    }
}

/// Single-fire expiry timer for one session.
///
/// `arm` spawns a watcher that fires the returned channel when the deadline
/// passes, unless the client side wins the race first.
pub struct SessionExpiryGuard {
    fired: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl SessionExpiryGuard {
    pub fn arm(remaining: Duration) -> (Self, oneshot::Receiver<()>) {
        let fired = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let watcher_fired = fired.clone();
        let watcher_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = watcher_cancel.cancelled() => {}
                _ = tokio::time::sleep(remaining) => {
                    if !watcher_fired.swap(true, Ordering::SeqCst) {
                        let _ = tx.send(());
                    }
                }
            }
        });

        (Self { fired, cancel }, rx)
    }

    /// Record a client-side close. Returns `true` if the client won the
    /// race and this session should report `ClosedByClient`.
    pub fn client_closed(&self) -> bool {
        self.cancel.cancel();
        !self.fired.swap(true, Ordering::SeqCst)
    }
}

impl Drop for SessionExpiryGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Upgrade handler for the secured streaming endpoints.
pub async fn upgrade_session(
    ws: WebSocketUpgrade,
    claims: Option<Extension<AccessClaims>>,
    uri: Uri,
) -> Response {
    let path = uri.path().to_string();
    let Some(Extension(claims)) = claims else {
        tracing::warn!(path, "upgrade without verified claims");
        return gw_unauthorized().into_response();
    };

    let remaining = claims.seconds_until_expiry(now_epoch_seconds());
    if remaining <= 0 {
        metrics::counter!("gateway_requests_unauthorized_total", "reason" => "verify")
            .increment(1);
        tracing::warn!(path, sub = %claims.sub, "token expired before upgrade");
        return gw_unauthorized().into_response();
    }

    let ttl = Duration::from_secs(remaining as u64);
    ws.on_upgrade(move |socket| async move {
        let close = handle_session(socket, ttl).await;
        metrics::counter!(
            "gateway_ws_sessions_closed_total",
            "reason" => close.as_str()
        )
        .increment(1);
        tracing::info!(path, sub = %claims.sub, reason = close.as_str(), "session closed");
    })
}

/// Drive one socket until the client leaves or the token expires.
pub async fn handle_session(mut socket: WebSocket, ttl: Duration) -> SessionClose {
    let (guard, mut forced_close) = SessionExpiryGuard::arm(ttl);

    loop {
        tokio::select! {
            _ = &mut forced_close => {
                let frame = CloseFrame {
                    code: close_code::POLICY,
                    reason: "token expired".into(),
                };
                let _ = socket.send(Message::Close(Some(frame))).await;
                return SessionClose::ClosedByTimeout;
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        guard.client_closed();
                        return SessionClose::ClosedByClient;
                    }
                    // Pings are answered by the protocol layer; other frames
                    // are drained until upstream stream routing is attached.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "socket read error");
                        guard.client_closed();
                        return SessionClose::ClosedByClient;
                    }
                }
            }
        }
    }
}
