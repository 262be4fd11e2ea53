//! Application Context
//!
//! Shared state provided via Leptos Context API.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::models::{Notice, NoticeKind};

/// How long a notice stays up
const NOTICE_MS: u32 = 4000;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Trigger to reload the hierarchy from backend - read
    pub reload_trigger: ReadSignal<u32>,
    /// Trigger to reload the hierarchy from backend - write
    set_reload_trigger: WriteSignal<u32>,
    /// Current toast - read
    pub notice: ReadSignal<Option<Notice>>,
    /// Current toast - write
    set_notice: WriteSignal<Option<Notice>>,
    next_notice_id: StoredValue<u32>,
}

impl AppContext {
    pub fn new(
        reload_trigger: (ReadSignal<u32>, WriteSignal<u32>),
        notice: (ReadSignal<Option<Notice>>, WriteSignal<Option<Notice>>),
    ) -> Self {
        Self {
            reload_trigger: reload_trigger.0,
            set_reload_trigger: reload_trigger.1,
            notice: notice.0,
            set_notice: notice.1,
            next_notice_id: StoredValue::new(0),
        }
    }

    /// Trigger a reload of the hierarchy
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        web_sys::console::error_1(&format!("[APP] {}", message).into());
        self.notify(NoticeKind::Error, message);
    }

    pub fn dismiss(&self) {
        self.set_notice.set(None);
    }

    /// Show a notice that clears itself unless replaced in the meantime
    fn notify(&self, kind: NoticeKind, message: String) {
        let id = self.next_notice_id.get_value() + 1;
        self.next_notice_id.set_value(id);
        self.set_notice.set(Some(Notice { id, kind, message }));

        let set_notice = self.set_notice;
        spawn_local(async move {
            TimeoutFuture::new(NOTICE_MS).await;
            set_notice.update(|current| {
                if current.as_ref().is_some_and(|notice| notice.id == id) {
                    *current = None;
                }
            });
        });
    }
}
