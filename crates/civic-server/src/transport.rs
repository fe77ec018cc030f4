//! TCP listeners for the control surface and the viewer channel.
//!
//! Both speak newline-delimited text. Each accepted connection gets its
//! own thread; a viewer connection gets a second thread that drains its
//! outbound queue, so a slow viewer never blocks the fan-out.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, Receiver};

use crate::city::City;
use crate::protocol::{ClientMessage, ControlRequest, ControlStatus, ServerMessage};

/// A bound listener running on its own accept thread.
#[derive(Debug)]
pub struct Listener {
    local_addr: SocketAddr,
    thread: JoinHandle<()>,
}

impl Listener {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until the accept loop ends.
    pub fn join(self) {
        if self.thread.join().is_err() {
            tracing::warn!(target: "civic::transport", addr = %self.local_addr, "listener panicked");
        }
    }
}

pub fn spawn_control_listener(bind_addr: SocketAddr, city: Arc<City>) -> io::Result<Listener> {
    spawn_listener("civic-control", bind_addr, move |stream, addr| {
        let city = Arc::clone(&city);
        thread::spawn(move || handle_control_client(stream, addr, &city));
    })
}

pub fn spawn_viewer_listener(bind_addr: SocketAddr, city: Arc<City>) -> io::Result<Listener> {
    spawn_listener("civic-viewers", bind_addr, move |stream, addr| {
        let city = Arc::clone(&city);
        thread::spawn(move || handle_viewer_client(stream, addr, &city));
    })
}

fn spawn_listener<F>(name: &str, bind_addr: SocketAddr, mut on_accept: F) -> io::Result<Listener>
where
    F: FnMut(TcpStream, SocketAddr) + Send + 'static,
{
    let listener = TcpListener::bind(bind_addr)?;
    let local_addr = listener.local_addr()?;
    let label = name.to_string();
    let thread = thread::Builder::new()
        .name(label.clone())
        .spawn(move || loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::info!(target: "civic::transport", listener = %label, client = %addr, "client connected");
                    if let Err(err) = stream.set_nodelay(true) {
                        tracing::warn!(target: "civic::transport", error = %err, "failed to set TCP_NODELAY");
                    }
                    on_accept(stream, addr);
                }
                Err(err) => {
                    tracing::warn!(target: "civic::transport", listener = %label, error = %err, "accept failed");
                    thread::sleep(std::time::Duration::from_millis(200));
                }
            }
        })?;
    tracing::info!(target: "civic::transport", listener = name, addr = %local_addr, "listening");
    Ok(Listener { local_addr, thread })
}

fn handle_control_client(stream: TcpStream, addr: SocketAddr, city: &City) {
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            tracing::warn!(target: "civic::transport", client = %addr, error = %err, "failed to clone stream");
            return;
        }
    };
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let reply = match ControlRequest::parse(trimmed) {
                    Ok(request) => city.handle_control(request),
                    Err(err) => {
                        tracing::warn!(target: "civic::transport", client = %addr, error = %err, "invalid control request");
                        serde_json::to_value(ControlStatus::error(err))
                            .unwrap_or(serde_json::Value::Null)
                    }
                };
                if let Err(err) = writeln!(writer, "{reply}") {
                    tracing::warn!(target: "civic::transport", client = %addr, error = %err, "control write failed");
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(target: "civic::transport", client = %addr, error = %err, "control read error");
                break;
            }
        }
    }
    tracing::info!(target: "civic::transport", client = %addr, "control client closed");
}

fn handle_viewer_client(stream: TcpStream, addr: SocketAddr, city: &City) {
    let writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            tracing::warn!(target: "civic::transport", client = %addr, error = %err, "failed to clone stream");
            return;
        }
    };
    let subscription = city.connect_viewer();
    let id = subscription.id();
    let (reply_tx, reply_rx) = crossbeam_channel::unbounded::<ServerMessage>();
    let outbound = subscription.into_receiver();
    let writer_thread = thread::spawn(move || write_viewer(writer, addr, &outbound, &reply_rx));

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match ClientMessage::parse(trimmed) {
                    Ok(message) => {
                        if let Some(reply) = city.handle_viewer(message) {
                            if reply_tx.send(reply).is_err() {
                                break;
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!(target: "civic::transport", client = %addr, error = %err, "dropped viewer message");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(target: "civic::transport", client = %addr, error = %err, "viewer read error");
                break;
            }
        }
    }

    drop(reply_tx);
    city.disconnect_viewer(id);
    if writer_thread.join().is_err() {
        tracing::warn!(target: "civic::transport", client = %addr, "viewer writer panicked");
    }
    tracing::info!(target: "civic::transport", client = %addr, "viewer closed");
}

fn write_viewer(
    mut stream: TcpStream,
    addr: SocketAddr,
    outbound: &Receiver<ServerMessage>,
    replies: &Receiver<ServerMessage>,
) {
    loop {
        let message = select! {
            recv(replies) -> msg => match msg {
                Ok(msg) => msg,
                Err(_) => break,
            },
            recv(outbound) -> msg => match msg {
                Ok(msg) => msg,
                Err(_) => break,
            },
        };
        let line = match message.to_line() {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(target: "civic::transport", client = %addr, error = %err, "failed to encode message");
                continue;
            }
        };
        if let Err(err) = stream.write_all(line.as_bytes()) {
            tracing::warn!(target: "civic::transport", client = %addr, error = %err, "viewer write failed");
            // Unblock the reader so the connection is torn down.
            let _ = stream.shutdown(std::net::Shutdown::Both);
            break;
        }
    }
}
