use std::cell::Cell;

use gloo::timers::callback::Timeout;
use leptos::*;
use wasm_bindgen::JsCast;

use crate::application::notify::{NotificationLevel, Notifier};
use crate::domain::logging::LogComponent;
use crate::log_debug;

const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

impl Toast {
    fn class(&self) -> String {
        format!("notification notification-{}", self.level)
    }
}

/// Append a toast, dropping the oldest beyond `max_visible`.
pub fn push_toast(toasts: &mut Vec<Toast>, toast: Toast, max_visible: usize) {
    toasts.push(toast);
    if toasts.len() > max_visible {
        let overflow = toasts.len() - max_visible;
        toasts.drain(..overflow);
    }
}

#[component]
fn ToastStack(toasts: RwSignal<Vec<Toast>>) -> impl IntoView {
    view! {
        <div class="notification-stack">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div
                            class=toast.class()
                            on:click=move |_| toasts.update(|list| list.retain(|t| t.id != id))
                        >
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}

/// Transient notifications rendered into `#notifications`, each removed after a fixed delay.
pub struct ToastNotifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: Cell<u64>,
    ttl_ms: u32,
}

impl ToastNotifier {
    /// Mounts the toast stack, or returns `None` when the page has no `#notifications` container.
    pub fn mount(ttl_ms: u32) -> Option<Self> {
        let container = web_sys::window()?
            .document()?
            .get_element_by_id("notifications")?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()?;

        let toasts = create_rw_signal(Vec::<Toast>::new());
        mount_to(container, move || view! { <ToastStack toasts=toasts/> });
        log_debug!(LogComponent::Presentation("Notifications"), "toast stack mounted");

        Some(Self { toasts, next_id: Cell::new(0), ttl_ms })
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let toast = Toast { id, level, message: message.to_string() };
        self.toasts.update(|list| push_toast(list, toast, MAX_VISIBLE));

        let toasts = self.toasts;
        Timeout::new(self.ttl_ms, move || {
            toasts.update(|list| list.retain(|t| t.id != id));
        })
        .forget();
    }
}
