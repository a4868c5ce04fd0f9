//! Control socket: server (during `dvd serve`) and client (every other command).
//! Protocol: one JSON `ControlRequest` per line, answered by one JSON
//! `ControlResponse` per line. `watch` keeps the connection open and streams
//! one `update` response per accepted detection.

use anyhow::{Context, Result};
use dvd_core::control::{ControlRequest, ControlResponse, ResponseData};
use dvd_core::router::RouterHandle;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::error::RecvError;

/// Binds `path` (replacing a stale socket file) and spawns the accept loop.
/// Each connection forwards its requests to `router`.
pub fn spawn_control_listener(
    router: RouterHandle,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create socket directory: {}", dir.display()))?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)
        .with_context(|| format!("bind control socket: {}", path.display()))?;

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let router = router.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(router, stream).await {
                            tracing::debug!("control connection closed: {:#}", e);
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

async fn serve_connection(router: RouterHandle, stream: UnixStream) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = match serde_json::from_str::<ControlRequest>(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("malformed control request: {}", e);
                write_line(&mut write, &ControlResponse::failure(format!("bad request: {}", e)))
                    .await?;
                continue;
            }
        };
        if request == ControlRequest::Watch {
            return stream_updates(&router, &mut lines, &mut write).await;
        }
        let response = router.request(request).await;
        write_line(&mut write, &response).await?;
    }
    Ok(())
}

/// Forwards session updates until the client goes away.
///
/// The read half is polled alongside the updates so a disconnect is noticed
/// even while nothing is published; further client lines are ignored.
async fn stream_updates<R, W>(
    router: &RouterHandle,
    lines: &mut Lines<R>,
    write: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut updates = router.subscribe();
    write_line(write, &ControlResponse::done()).await?;
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => {
                    write_line(write, &ControlResponse::ok(ResponseData::Update(update))).await?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "watcher lagged behind");
                }
                Err(RecvError::Closed) => return Ok(()),
            },
            line = lines.next_line() => match line {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::debug!("watcher disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            },
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(write: &mut W, response: &ControlResponse) -> Result<()> {
    let mut buf = serde_json::to_vec(response)?;
    buf.push(b'\n');
    write.write_all(&buf).await?;
    write.flush().await?;
    Ok(())
}

async fn connect(socket_path: &Path) -> Result<UnixStream> {
    UnixStream::connect(socket_path).await.with_context(|| {
        format!(
            "connect to {} (is `dvd serve` running?)",
            socket_path.display()
        )
    })
}

async fn send_line(stream: &mut UnixStream, request: &ControlRequest) -> Result<()> {
    let mut buf = serde_json::to_vec(request)?;
    buf.push(b'\n');
    stream.write_all(&buf).await?;
    Ok(())
}

/// Sends one request and waits for its response line.
pub async fn send_request(socket_path: &Path, request: &ControlRequest) -> Result<ControlResponse> {
    let mut stream = connect(socket_path).await?;
    send_line(&mut stream, request).await?;
    let mut lines = BufReader::new(stream).lines();
    let line = lines
        .next_line()
        .await?
        .context("control socket closed without a response")?;
    serde_json::from_str(&line).context("parse control response")
}

/// Sends `watch` and calls `on_response` for every streamed line until the server closes.
pub async fn watch<F>(socket_path: &Path, mut on_response: F) -> Result<()>
where
    F: FnMut(ControlResponse),
{
    let mut stream = connect(socket_path).await?;
    send_line(&mut stream, &ControlRequest::Watch).await?;
    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines.next_line().await? {
        let response: ControlResponse =
            serde_json::from_str(&line).context("parse control response")?;
        on_response(response);
    }
    Ok(())
}
