//! Live ranking updates over the Socket.IO push channel.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use sos_protocol::{PushFrame, RANKING_NAMESPACE, RANKING_UPDATE_EVENT};

const RECONNECT_BASE_MS: u32 = 1_000;
const RECONNECT_MAX_MS: u32 = 30_000;

/// Delay before reconnect attempt number `attempt`, doubling up to a cap.
pub fn reconnect_delay_ms(attempt: u32) -> u32 {
    RECONNECT_BASE_MS
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(RECONNECT_MAX_MS)
}

#[allow(dead_code)]
struct WsHandlers {
    onopen: Closure<dyn FnMut(Event)>,
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    onerror: Closure<dyn FnMut(ErrorEvent)>,
    onclose: Closure<dyn FnMut(Event)>,
}

struct Inner {
    url: String,
    ws: RefCell<Option<WebSocket>>,
    handlers: RefCell<Option<WsHandlers>>,
    attempts: Cell<u32>,
    closing: Cell<bool>,
    on_update: Box<dyn Fn()>,
}

/// Subscription to `ranking_update` events on the `/ranking` namespace.
///
/// Reconnects with backoff until closed or dropped.
pub struct PushChannel {
    inner: Rc<Inner>,
}

impl PushChannel {
    pub fn open(url: impl Into<String>, on_update: impl Fn() + 'static) -> Self {
        let inner = Rc::new(Inner {
            url: url.into(),
            ws: RefCell::new(None),
            handlers: RefCell::new(None),
            attempts: Cell::new(0),
            closing: Cell::new(false),
            on_update: Box::new(on_update),
        });
        connect(&inner);
        Self { inner }
    }

    pub fn close(&self) {
        self.inner.closing.set(true);
        if let Some(ws) = self.inner.ws.borrow_mut().take() {
            detach(&ws);
            let _ = ws.close();
        }
        self.inner.handlers.borrow_mut().take();
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn detach(ws: &WebSocket) {
    ws.set_onopen(None);
    ws.set_onmessage(None);
    ws.set_onerror(None);
    ws.set_onclose(None);
}

fn send(ws: &WebSocket, frame: &PushFrame) {
    if ws.ready_state() == WebSocket::OPEN && ws.send_with_str(&frame.encode()).is_err() {
        log::warn!("Failed to send push frame {:?}", frame);
    }
}

fn connect(inner: &Rc<Inner>) {
    if inner.closing.get() {
        return;
    }
    let ws = match WebSocket::new(&inner.url) {
        Ok(ws) => ws,
        Err(err) => {
            log::warn!("Failed to open push channel {}: {:?}", inner.url, err);
            schedule_reconnect(inner);
            return;
        }
    };

    let weak = Rc::downgrade(inner);
    let onopen = {
        let url = inner.url.clone();
        Closure::wrap(Box::new(move |_event: Event| {
            log::debug!("Push channel connected to {}", url);
        }) as Box<dyn FnMut(Event)>)
    };
    let onmessage = {
        let weak = weak.clone();
        let ws = ws.clone();
        Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                return;
            };
            if let Some(inner) = weak.upgrade() {
                handle_frame(&inner, &ws, &text);
            }
        }) as Box<dyn FnMut(MessageEvent)>)
    };
    let onerror = {
        let url = inner.url.clone();
        Closure::wrap(Box::new(move |_event: ErrorEvent| {
            log::warn!("Push channel error on {}", url);
        }) as Box<dyn FnMut(ErrorEvent)>)
    };
    let onclose = Closure::wrap(Box::new(move |event: Event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.ws.borrow_mut().take();
        if inner.closing.get() {
            return;
        }
        match event.dyn_ref::<CloseEvent>() {
            Some(close) => log::info!(
                "Push channel closed ({}) {}",
                close.code(),
                close.reason()
            ),
            None => log::info!("Push channel closed"),
        }
        schedule_reconnect(&inner);
    }) as Box<dyn FnMut(Event)>);

    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

    *inner.ws.borrow_mut() = Some(ws);
    // replaced handlers belong to a socket that is already closed
    *inner.handlers.borrow_mut() = Some(WsHandlers {
        onopen,
        onmessage,
        onerror,
        onclose,
    });
}

fn schedule_reconnect(inner: &Rc<Inner>) {
    let attempt = inner.attempts.get();
    inner.attempts.set(attempt.saturating_add(1));
    let delay = reconnect_delay_ms(attempt);
    log::debug!("Reconnecting push channel in {} ms", delay);
    let weak: Weak<Inner> = Rc::downgrade(inner);
    spawn_local(async move {
        TimeoutFuture::new(delay).await;
        if let Some(inner) = weak.upgrade() {
            connect(&inner);
        }
    });
}

fn handle_frame(inner: &Inner, ws: &WebSocket, text: &str) {
    let frame = match PushFrame::parse(text) {
        Ok(frame) => frame,
        Err(err) => {
            log::debug!("Ignoring push frame {:?}: {}", text, err);
            return;
        }
    };
    match &frame {
        PushFrame::Open(handshake) => {
            log::trace!("Push handshake {:?}", handshake);
            send(ws, &PushFrame::connect(RANKING_NAMESPACE));
        }
        PushFrame::Ping => send(ws, &PushFrame::Pong),
        PushFrame::Connect { namespace } if namespace == RANKING_NAMESPACE => {
            log::debug!("Subscribed to {}", namespace);
            inner.attempts.set(0);
        }
        PushFrame::ConnectError { namespace, message } => {
            log::warn!("Push namespace {} refused: {}", namespace, message);
        }
        PushFrame::Close => {
            let _ = ws.close();
        }
        _ if frame.is_event(RANKING_NAMESPACE, RANKING_UPDATE_EVENT) => {
            log::debug!("Ranking update pushed");
            (inner.on_update)();
        }
        _ => log::trace!("Unhandled push frame {:?}", frame),
    }
}
