//! WebSocket transport for the game server.
//!
//! Provides a platform-agnostic transport interface plus native, WASM and
//! in-memory implementations. Transports move opaque text frames; decoding
//! into game events happens in [`crate::session`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::ConnectionError;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events from a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connected to server
    Connected,
    /// Disconnected from server
    Disconnected,
    /// A text frame arrived
    Text(String),
    /// Error occurred
    Error { message: String },
}

/// A bidirectional, non-blocking connection to the game server.
///
/// Sends are fire-and-forget. Inbound traffic is collected by the
/// implementation and handed out by [`Transport::poll_events`].
pub trait Transport {
    /// Start connecting to `url`.
    fn connect(&mut self, url: &str) -> Result<(), ConnectionError>;

    /// Tear the connection down.
    fn disconnect(&mut self);

    /// Queue a text frame for sending.
    fn send(&self, frame: &str) -> Result<(), ConnectionError>;

    /// Drain pending events (non-blocking).
    fn poll_events(&mut self) -> Vec<TransportEvent>;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

fn track_state(state: &mut ConnectionState, event: &TransportEvent) {
    match event {
        TransportEvent::Connected => *state = ConnectionState::Connected,
        TransportEvent::Disconnected => *state = ConnectionState::Disconnected,
        TransportEvent::Error { .. } => *state = ConnectionState::Error,
        TransportEvent::Text(_) => {}
    }
}

// ============================================================================
// In-memory transport
// ============================================================================

#[derive(Debug)]
struct MemoryInner {
    state: ConnectionState,
    url: Option<String>,
    connects: usize,
    inbound: VecDeque<TransportEvent>,
    sent: Vec<String>,
}

/// Loopback transport with no network behind it.
///
/// Like a browser WebSocket, it refuses frames until the `Connected` event
/// has been polled.
///
/// Clones share the same buffers, so a test can keep a handle to inject
/// server frames and inspect what the session sent.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                state: ConnectionState::Disconnected,
                url: None,
                connects: 0,
                inbound: VecDeque::new(),
                sent: Vec::new(),
            })),
        }
    }

    /// Queue an inbound text frame.
    pub fn push_frame(&self, frame: impl Into<String>) {
        self.push_event(TransportEvent::Text(frame.into()));
    }

    /// Queue any inbound transport event.
    pub fn push_event(&self, event: TransportEvent) {
        self.inner.borrow_mut().inbound.push_back(event);
    }

    /// Frames sent so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.inner.borrow().sent.clone()
    }

    /// Drain the sent frames.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().sent)
    }

    /// Number of successful `connect` calls.
    pub fn connect_count(&self) -> usize {
        self.inner.borrow().connects
    }

    /// URL of the last `connect` call.
    pub fn url(&self) -> Option<String> {
        self.inner.borrow().url.clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn connect(&mut self, url: &str) -> Result<(), ConnectionError> {
        let mut inner = self.inner.borrow_mut();
        if matches!(inner.state, ConnectionState::Connected | ConnectionState::Connecting) {
            return Err(ConnectionError::AlreadyConnected);
        }
        inner.state = ConnectionState::Connecting;
        inner.url = Some(url.to_string());
        inner.connects += 1;
        inner.inbound.push_back(TransportEvent::Connected);
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = ConnectionState::Disconnected;
        inner.inbound.clear();
    }

    fn send(&self, frame: &str) -> Result<(), ConnectionError> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            ConnectionState::Connected => {
                inner.sent.push(frame.to_string());
                Ok(())
            }
            // Same as a browser socket whose handshake is still in flight.
            ConnectionState::Connecting => Err(ConnectionError::Send("Still connecting".to_string())),
            _ => Err(ConnectionError::Send("Not connected".to_string())),
        }
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let mut inner = self.inner.borrow_mut();
        let events: Vec<_> = inner.inbound.drain(..).collect();
        for event in &events {
            track_state(&mut inner.state, event);
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }
}

// ============================================================================
// WASM WebSocket Client
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod wasm_client {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

    /// WebSocket client for WASM.
    ///
    /// Events are collected by the browser callbacks and must be polled via
    /// `poll_events()`.
    pub struct WasmWebSocket {
        ws: Option<WebSocket>,
        state: ConnectionState,
        events: Rc<RefCell<Vec<TransportEvent>>>,
        // Callbacks must outlive the socket.
        _on_open: Option<Closure<dyn Fn()>>,
        _on_message: Option<Closure<dyn Fn(MessageEvent)>>,
        _on_close: Option<Closure<dyn Fn(CloseEvent)>>,
        _on_error: Option<Closure<dyn Fn(ErrorEvent)>>,
    }

    impl WasmWebSocket {
        /// Create a new disconnected WebSocket client.
        pub fn new() -> Self {
            Self {
                ws: None,
                state: ConnectionState::Disconnected,
                events: Rc::new(RefCell::new(Vec::new())),
                _on_open: None,
                _on_message: None,
                _on_close: None,
                _on_error: None,
            }
        }
    }

    impl Transport for WasmWebSocket {
        fn connect(&mut self, url: &str) -> Result<(), ConnectionError> {
            if self.ws.is_some() {
                return Err(ConnectionError::AlreadyConnected);
            }

            let ws = WebSocket::new(url)
                .map_err(|e| ConnectionError::Failed(format!("{:?}", e)))?;
            ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

            self.state = ConnectionState::Connecting;

            let events_open = self.events.clone();
            let on_open = Closure::wrap(Box::new(move || {
                events_open.borrow_mut().push(TransportEvent::Connected);
            }) as Box<dyn Fn()>);
            ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

            let events_msg = self.events.clone();
            let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
                if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                    events_msg.borrow_mut().push(TransportEvent::Text(txt.into()));
                } else {
                    log::debug!("Ignoring non-text frame");
                }
            }) as Box<dyn Fn(MessageEvent)>);
            ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

            let events_close = self.events.clone();
            let on_close = Closure::wrap(Box::new(move |_e: CloseEvent| {
                events_close.borrow_mut().push(TransportEvent::Disconnected);
            }) as Box<dyn Fn(CloseEvent)>);
            ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

            let events_err = self.events.clone();
            let on_error = Closure::wrap(Box::new(move |_e: ErrorEvent| {
                events_err.borrow_mut().push(TransportEvent::Error {
                    message: "WebSocket error".to_string(),
                });
            }) as Box<dyn Fn(ErrorEvent)>);
            ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            self.ws = Some(ws);
            self._on_open = Some(on_open);
            self._on_message = Some(on_message);
            self._on_close = Some(on_close);
            self._on_error = Some(on_error);

            Ok(())
        }

        fn disconnect(&mut self) {
            if let Some(ws) = self.ws.take() {
                let _ = ws.close();
            }
            self.state = ConnectionState::Disconnected;
            self._on_open = None;
            self._on_message = None;
            self._on_close = None;
            self._on_error = None;
        }

        fn send(&self, frame: &str) -> Result<(), ConnectionError> {
            match self.ws {
                Some(ref ws) => ws
                    .send_with_str(frame)
                    .map_err(|e| ConnectionError::Send(format!("{:?}", e))),
                None => Err(ConnectionError::Send("Not connected".to_string())),
            }
        }

        fn poll_events(&mut self) -> Vec<TransportEvent> {
            let events = std::mem::take(&mut *self.events.borrow_mut());
            for event in &events {
                track_state(&mut self.state, event);
            }
            events
        }

        fn state(&self) -> ConnectionState {
            self.state
        }
    }

    impl Default for WasmWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_client::WasmWebSocket;

// ============================================================================
// Native WebSocket Client
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native_client {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client for native platforms.
    ///
    /// Uses a background thread so that neither sends nor polls block the
    /// caller. Frames sent while the handshake is still in flight are
    /// delivered once it completes.
    pub struct NativeWebSocket {
        state: ConnectionState,
        cmd_tx: Option<Sender<WsCommand>>,
        event_rx: Option<Receiver<TransportEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        /// Create a new disconnected WebSocket client.
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }
    }

    fn run_socket(url: String, cmd_rx: Receiver<WsCommand>, event_tx: Sender<TransportEvent>) {
        log::info!("WebSocket thread: connecting to {}", url);

        let (mut socket, response) = match connect(&url) {
            Ok(ok) => ok,
            Err(e) => {
                log::error!("WebSocket connection failed: {}", e);
                let _ = event_tx.send(TransportEvent::Error {
                    message: format!("Connection failed: {}", e),
                });
                return;
            }
        };

        log::info!("WebSocket connected, status: {}", response.status());
        let _ = event_tx.send(TransportEvent::Connected);

        // Short read timeout keeps the loop responsive to outgoing commands.
        match socket.get_mut() {
            tungstenite::stream::MaybeTlsStream::Plain(tcp) => {
                let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
            }
            #[allow(unreachable_patterns)]
            _ => log::debug!("TLS or other stream - using default timeout handling"),
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(WsCommand::Send(frame)) => {
                    log::debug!("WebSocket sending: {}", crate::protocol::preview(&frame));
                    if let Err(e) = socket.send(Message::Text(frame)) {
                        log::error!("WebSocket send error: {}", e);
                        break;
                    }
                }
                Ok(WsCommand::Close) => {
                    log::info!("WebSocket close requested");
                    let _ = socket.close(None);
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    log::info!("WebSocket command channel disconnected");
                    break;
                }
                Err(TryRecvError::Empty) => {}
            }

            match socket.read() {
                Ok(Message::Text(txt)) => {
                    log::debug!("WebSocket received: {}", crate::protocol::preview(&txt));
                    if event_tx.send(TransportEvent::Text(txt)).is_err() {
                        break;
                    }
                }
                Ok(Message::Ping(data)) => {
                    let _ = socket.send(Message::Pong(data));
                }
                Ok(Message::Close(_)) => {
                    log::info!("WebSocket received close frame");
                    break;
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    log::error!("WebSocket read error: {}", e);
                    break;
                }
            }
        }

        log::info!("WebSocket thread exiting");
        let _ = event_tx.send(TransportEvent::Disconnected);
    }

    impl Transport for NativeWebSocket {
        fn connect(&mut self, url: &str) -> Result<(), ConnectionError> {
            if self.cmd_tx.is_some() {
                return Err(ConnectionError::AlreadyConnected);
            }
            crate::config::validate_server_url(url)?;

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<TransportEvent>();
            let url = url.to_string();
            let handle = thread::spawn(move || run_socket(url, cmd_rx, event_tx));

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);

            Ok(())
        }

        fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        fn send(&self, frame: &str) -> Result<(), ConnectionError> {
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(frame.to_string()))
                    .map_err(|e| ConnectionError::Send(e.to_string())),
                None => Err(ConnectionError::Send("Not connected".to_string())),
            }
        }

        fn poll_events(&mut self) -> Vec<TransportEvent> {
            let mut events = Vec::new();
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    track_state(&mut self.state, &event);
                    events.push(event);
                }
            }
            events
        }

        fn state(&self) -> ConnectionState {
            self.state
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::NativeWebSocket;

// ============================================================================
// Platform type alias
// ============================================================================

/// Platform-specific WebSocket client type.
#[cfg(target_arch = "wasm32")]
pub type PlatformWebSocket = WasmWebSocket;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformWebSocket = NativeWebSocket;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_connect_emits_connected() {
        let mut transport = MemoryTransport::new();
        assert_eq!(transport.state(), ConnectionState::Disconnected);

        transport.connect("ws://localhost:3001/ws").unwrap();
        assert_eq!(transport.state(), ConnectionState::Connecting);

        let events = transport.poll_events();
        assert_eq!(events, vec![TransportEvent::Connected]);
        assert!(transport.is_connected());
        assert_eq!(transport.url().as_deref(), Some("ws://localhost:3001/ws"));
    }

    #[test]
    fn test_memory_double_connect_rejected() {
        let mut transport = MemoryTransport::new();
        transport.connect("ws://a/ws").unwrap();
        assert_eq!(transport.connect("ws://a/ws"), Err(ConnectionError::AlreadyConnected));
        assert_eq!(transport.connect_count(), 1);
    }

    #[test]
    fn test_memory_send_requires_connection() {
        let mut transport = MemoryTransport::new();
        assert!(transport.send("x").is_err());

        transport.connect("ws://a/ws").unwrap();
        assert_eq!(
            transport.send("early"),
            Err(ConnectionError::Send("Still connecting".to_string()))
        );
        transport.poll_events();
        transport.send("x").unwrap();
        transport.send("y").unwrap();
        assert_eq!(transport.take_sent(), vec!["x".to_string(), "y".to_string()]);
        assert!(transport.sent().is_empty());

        transport.disconnect();
        assert!(transport.send("z").is_err());
    }

    #[test]
    fn test_memory_clones_share_buffers() {
        let mut transport = MemoryTransport::new();
        let handle = transport.clone();
        transport.connect("ws://a/ws").unwrap();
        handle.push_frame("hello");
        handle.push_event(TransportEvent::Disconnected);

        let events = transport.poll_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], TransportEvent::Text("hello".to_string()));
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_rejects_bad_scheme() {
        let mut ws = NativeWebSocket::new();
        assert!(matches!(ws.connect("http://localhost:3001"), Err(ConnectionError::InvalidUrl(_))));
        assert_eq!(ws.state(), ConnectionState::Disconnected);
    }
}
