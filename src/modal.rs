//! Custom alert/confirm dialogs that resolve asynchronously instead of blocking.
//!
//! [`ModalController`] owns at most one live dialog. Requests made while a
//! dialog is open (or still animating out) wait in a FIFO queue, so two
//! dialogs never exist at once.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Delay before the dialog is shown and the primary action focused.
pub const SHOW_DELAY: Duration = Duration::from_millis(10);

/// Exit animation; the dialog resolves when it completes.
pub const CLOSE_DURATION: Duration = Duration::from_millis(300);

pub const ALERT_TITLE: &str = "Aviso";
pub const CONFIRM_TITLE: &str = "Confirmação";
pub const ALERT_ICON: &str = "info-circle";
pub const CONFIRM_ICON: &str = "question-circle";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Alert,
    Confirm,
}

/// A focusable control inside a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogControl {
    Cancel,
    Ok,
}

impl DialogControl {
    pub fn label(self, kind: DialogKind) -> &'static str {
        match (self, kind) {
            (Self::Cancel, _) => "Cancelar",
            (Self::Ok, DialogKind::Alert) => "OK",
            (Self::Ok, DialogKind::Confirm) => "Confirmar",
        }
    }
}

/// Actions a confirm prompt guards, with their default wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmIntent {
    Delete,
    Status,
}

impl ConfirmIntent {
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Delete => "Tem certeza que deseja excluir este item?",
            Self::Status => "Tem certeza que deseja alterar o status?",
        }
    }

    /// Prompt text: the trigger's own message when it has one, the default otherwise.
    pub fn message(&self, custom: Option<&str>) -> String {
        custom
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.default_message())
            .to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogPhase {
    Showing { since: Instant },
    Open,
    Closing { since: Instant, result: bool },
}

/// Cycles Tab/Shift+Tab within a fixed list of controls.
#[derive(Debug, Clone)]
pub struct FocusTrap {
    controls: Vec<DialogControl>,
    focused: usize,
}

impl FocusTrap {
    pub fn new(controls: Vec<DialogControl>, initial: DialogControl) -> Self {
        let focused = controls.iter().position(|c| *c == initial).unwrap_or(0);
        Self { controls, focused }
    }

    pub fn controls(&self) -> &[DialogControl] {
        &self.controls
    }

    pub fn focused(&self) -> Option<DialogControl> {
        self.controls.get(self.focused).copied()
    }

    pub fn focus(&mut self, control: DialogControl) {
        if let Some(idx) = self.controls.iter().position(|c| *c == control) {
            self.focused = idx;
        }
    }

    pub fn tab(&mut self, backwards: bool) {
        let len = self.controls.len();
        if len == 0 {
            return;
        }
        self.focused = if backwards {
            (self.focused + len - 1) % len
        } else {
            (self.focused + 1) % len
        };
    }
}

/// A dialog as rendered by the front-end.
#[derive(Debug)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub focus: FocusTrap,
    phase: DialogPhase,
    resolver: Option<oneshot::Sender<bool>>,
    /// Whatever had focus when the dialog was requested
    restore_focus: Option<String>,
}

impl Dialog {
    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_shown(&self) -> bool {
        !matches!(self.phase, DialogPhase::Showing { .. })
    }

    /// Result given on Escape or backdrop click.
    fn dismiss_result(&self) -> bool {
        self.kind == DialogKind::Alert
    }
}

/// Input the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Escape,
    BackdropClick,
    Tab { backwards: bool },
    Activate(DialogControl),
    /// Enter/Space on the focused control
    ActivateFocused,
}

/// Pending result of a dialog. Await it, or poll it with [`DialogHandle::try_result`].
#[derive(Debug)]
pub struct DialogHandle {
    rx: oneshot::Receiver<bool>,
}

impl DialogHandle {
    /// `Some(result)` once the dialog finished closing. A dropped dialog reads as `false`.
    pub fn try_result(&mut self) -> Option<bool> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(false),
        }
    }
}

impl Future for DialogHandle {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.rx).poll(cx).map(|r| r.unwrap_or(false))
    }
}

struct DialogRequest {
    kind: DialogKind,
    title: String,
    message: String,
    icon: String,
    restore_focus: Option<String>,
    resolver: oneshot::Sender<bool>,
}

/// Owner of the single dialog slot.
#[derive(Default)]
pub struct ModalController {
    current: Option<Dialog>,
    queue: VecDeque<DialogRequest>,
    focus_restore: Option<String>,
}

impl ModalController {
    pub fn current(&self) -> Option<&Dialog> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Requests an alert. `focused` names the element to refocus afterwards.
    pub fn show_alert(
        &mut self,
        message: impl Into<String>,
        title: Option<&str>,
        icon: Option<&str>,
        focused: Option<String>,
        now: Instant,
    ) -> DialogHandle {
        self.request(
            DialogKind::Alert,
            message.into(),
            title.unwrap_or(ALERT_TITLE),
            icon.unwrap_or(ALERT_ICON),
            focused,
            now,
        )
    }

    pub fn show_confirm(
        &mut self,
        message: impl Into<String>,
        title: Option<&str>,
        icon: Option<&str>,
        focused: Option<String>,
        now: Instant,
    ) -> DialogHandle {
        self.request(
            DialogKind::Confirm,
            message.into(),
            title.unwrap_or(CONFIRM_TITLE),
            icon.unwrap_or(CONFIRM_ICON),
            focused,
            now,
        )
    }

    fn request(
        &mut self,
        kind: DialogKind,
        message: String,
        title: &str,
        icon: &str,
        restore_focus: Option<String>,
        now: Instant,
    ) -> DialogHandle {
        let (resolver, rx) = oneshot::channel();
        self.queue.push_back(DialogRequest {
            kind,
            title: title.to_owned(),
            message,
            icon: icon.to_owned(),
            restore_focus,
            resolver,
        });
        if self.current.is_some() {
            log::debug!("Dialog queued behind the open one ({} waiting)", self.queue.len());
        }
        self.advance(now);
        DialogHandle { rx }
    }

    fn advance(&mut self, now: Instant) {
        if self.current.is_some() {
            return;
        }
        let Some(request) = self.queue.pop_front() else {
            return;
        };
        let controls = match request.kind {
            DialogKind::Alert => vec![DialogControl::Ok],
            DialogKind::Confirm => vec![DialogControl::Cancel, DialogControl::Ok],
        };
        self.current = Some(Dialog {
            kind: request.kind,
            title: request.title,
            message: request.message,
            icon: request.icon,
            focus: FocusTrap::new(controls, DialogControl::Ok),
            phase: DialogPhase::Showing { since: now },
            resolver: Some(request.resolver),
            restore_focus: request.restore_focus,
        });
    }

    /// Feeds an input event to the live dialog.
    pub fn handle(&mut self, event: DialogEvent, now: Instant) {
        let Some(dialog) = self.current.as_mut() else {
            return;
        };
        if matches!(dialog.phase, DialogPhase::Closing { .. }) {
            return;
        }

        let result = match event {
            DialogEvent::Escape | DialogEvent::BackdropClick => Some(dialog.dismiss_result()),
            DialogEvent::Tab { backwards } => {
                dialog.focus.tab(backwards);
                None
            }
            DialogEvent::Activate(control) => Some(control == DialogControl::Ok),
            DialogEvent::ActivateFocused => dialog
                .focus
                .focused()
                .map(|control| control == DialogControl::Ok),
        };

        if let Some(result) = result {
            dialog.phase = DialogPhase::Closing { since: now, result };
        }
    }

    /// Advances animations, resolves finished dialogs and promotes the next queued one.
    pub fn tick(&mut self, now: Instant) {
        let Some(dialog) = self.current.as_mut() else {
            self.advance(now);
            return;
        };

        match dialog.phase {
            DialogPhase::Showing { since }
                if now.saturating_duration_since(since) >= SHOW_DELAY =>
            {
                dialog.phase = DialogPhase::Open;
            }
            DialogPhase::Closing { since, result }
                if now.saturating_duration_since(since) >= CLOSE_DURATION =>
            {
                if let Some(resolver) = dialog.resolver.take() {
                    let _ = resolver.send(result);
                }
                self.focus_restore = dialog.restore_focus.take();
                self.current = None;
                self.advance(now);
            }
            _ => {}
        }
    }

    /// Time until the next scheduled transition, for requesting a repaint.
    pub fn next_transition(&self, now: Instant) -> Option<Duration> {
        match self.current.as_ref()?.phase {
            DialogPhase::Showing { since } => {
                Some(SHOW_DELAY.saturating_sub(now.saturating_duration_since(since)))
            }
            DialogPhase::Closing { since, .. } => {
                Some(CLOSE_DURATION.saturating_sub(now.saturating_duration_since(since)))
            }
            DialogPhase::Open => None,
        }
    }

    /// Element that should get focus back after the last dialog closed.
    pub fn take_focus_restore(&mut self) -> Option<String> {
        self.focus_restore.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(controller: &mut ModalController, now: Instant) -> Instant {
        let later = now + SHOW_DELAY;
        controller.tick(later);
        later
    }

    fn finish(controller: &mut ModalController, now: Instant) -> Instant {
        let later = now + CLOSE_DURATION;
        controller.tick(later);
        later
    }

    #[test]
    fn confirm_escape_resolves_false() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let mut handle = modal.show_confirm("Excluir?", None, None, None, now);
        let now = shown(&mut modal, now);

        modal.handle(DialogEvent::Escape, now);
        assert_eq!(handle.try_result(), None);
        finish(&mut modal, now);
        assert_eq!(handle.try_result(), Some(false));
        assert!(modal.current().is_none());
    }

    #[test]
    fn confirm_backdrop_resolves_false() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let mut handle = modal.show_confirm("Excluir?", None, None, None, now);
        modal.handle(DialogEvent::BackdropClick, now);
        finish(&mut modal, now);
        assert_eq!(handle.try_result(), Some(false));
    }

    #[test]
    fn confirm_button_resolves_true() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let mut handle = modal.show_confirm("Excluir?", None, None, None, now);
        modal.handle(DialogEvent::Activate(DialogControl::Ok), now);
        finish(&mut modal, now);
        assert_eq!(handle.try_result(), Some(true));

        let mut cancelled = modal.show_confirm("De novo?", None, None, None, now);
        modal.handle(DialogEvent::Activate(DialogControl::Cancel), now);
        finish(&mut modal, now);
        assert_eq!(cancelled.try_result(), Some(false));
    }

    #[test]
    fn alert_dismiss_resolves_true() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let mut handle = modal.show_alert("Salvo", None, None, None, now);
        assert_eq!(modal.current().map(|d| d.title.as_str()), Some(ALERT_TITLE));
        modal.handle(DialogEvent::Escape, now);
        finish(&mut modal, now);
        assert_eq!(handle.try_result(), Some(true));
    }

    #[test]
    fn focus_starts_on_primary_and_wraps() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let _handle = modal.show_confirm("?", None, None, None, now);
        let dialog = modal.current().unwrap();
        assert_eq!(dialog.focus.focused(), Some(DialogControl::Ok));

        modal.handle(DialogEvent::Tab { backwards: false }, now);
        assert_eq!(
            modal.current().unwrap().focus.focused(),
            Some(DialogControl::Cancel)
        );
        modal.handle(DialogEvent::Tab { backwards: true }, now);
        modal.handle(DialogEvent::Tab { backwards: true }, now);
        assert_eq!(
            modal.current().unwrap().focus.focused(),
            Some(DialogControl::Cancel)
        );

        modal.handle(DialogEvent::ActivateFocused, now);
        assert!(matches!(
            modal.current().unwrap().phase(),
            DialogPhase::Closing { result: false, .. }
        ));
    }

    #[test]
    fn second_request_waits_for_first() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let mut first = modal.show_alert("um", None, None, None, now);
        let mut second = modal.show_confirm("dois", None, None, None, now);
        assert_eq!(modal.pending(), 1);
        assert_eq!(modal.current().unwrap().message, "um");

        modal.handle(DialogEvent::Activate(DialogControl::Ok), now);
        let now = finish(&mut modal, now);
        assert_eq!(first.try_result(), Some(true));
        assert_eq!(modal.current().unwrap().message, "dois");
        assert_eq!(modal.pending(), 0);

        modal.handle(DialogEvent::Escape, now);
        finish(&mut modal, now);
        assert_eq!(second.try_result(), Some(false));
    }

    #[test]
    fn input_during_close_is_ignored() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let mut handle = modal.show_confirm("?", None, None, None, now);
        modal.handle(DialogEvent::Escape, now);
        modal.handle(DialogEvent::Activate(DialogControl::Ok), now);
        finish(&mut modal, now);
        assert_eq!(handle.try_result(), Some(false));
    }

    #[test]
    fn focus_is_restored_after_close() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let _handle = modal.show_alert("x", None, None, Some("delete-7".to_owned()), now);
        modal.handle(DialogEvent::Escape, now);
        assert_eq!(modal.take_focus_restore(), None);
        finish(&mut modal, now);
        assert_eq!(modal.take_focus_restore().as_deref(), Some("delete-7"));
    }

    #[tokio::test]
    async fn handle_can_be_awaited() {
        let now = Instant::now();
        let mut modal = ModalController::default();
        let handle = modal.show_confirm("?", None, None, None, now);
        modal.handle(DialogEvent::Activate(DialogControl::Ok), now);
        finish(&mut modal, now);
        assert!(handle.await);
    }

    #[test]
    fn confirm_intent_messages() {
        assert_eq!(
            ConfirmIntent::Delete.message(None),
            "Tem certeza que deseja excluir este item?"
        );
        assert_eq!(
            ConfirmIntent::Status.message(Some("Desativar produto?")),
            "Desativar produto?"
        );
        assert_eq!(
            ConfirmIntent::Status.message(Some("  ")),
            ConfirmIntent::Status.default_message()
        );
    }
}
