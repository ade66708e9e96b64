//! Transient notification banners.
//!
//! The library only decides *what* to show; the front-end hands each
//! [`Notice`] to its toast renderer with [`TOAST_DURATION`] as lifetime.

use std::time::{Duration, Instant};

/// Auto-dismiss delay for toasts and notifications.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

/// Slide-out animation played before a toast is removed.
pub const TOAST_EXIT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl ToastLevel {
    /// Icon name (Font Awesome naming, minus the `fa-` prefix).
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Error => "times-circle",
            Self::Warning => "exclamation-triangle",
            Self::Info => "info-circle",
        }
    }

    /// Background color as RGB.
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Success => [0x82, 0xc3, 0x41],
            Self::Error => [0xe7, 0x4c, 0x3c],
            Self::Warning => [0xf3, 0x9c, 0x12],
            Self::Info => [0x34, 0x98, 0xdb],
        }
    }

    /// Parses a level name; unknown names fall back to `Info`.
    pub fn parse(name: &str) -> Self {
        match name {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
    pub created: Instant,
    /// Set once the exit animation started
    pub leaving_since: Option<Instant>,
}

/// Stack of live notices, newest last.
#[derive(Debug, Default)]
pub struct Notifier {
    next_id: u64,
    notices: Vec<Notice>,
    /// Notices not yet handed to the renderer
    outbox: Vec<Notice>,
}

impl Notifier {
    pub fn show(&mut self, level: ToastLevel, message: impl Into<String>, now: Instant) -> u64 {
        self.next_id += 1;
        let notice = Notice {
            id: self.next_id,
            level,
            message: message.into(),
            created: now,
            leaving_since: None,
        };
        match level {
            ToastLevel::Error => log::warn!("{}", notice.message),
            _ => log::info!("{}", notice.message),
        }
        self.outbox.push(notice.clone());
        self.notices.push(notice);
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.show(ToastLevel::Success, message, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.show(ToastLevel::Error, message, now)
    }

    pub fn warning(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.show(ToastLevel::Warning, message, now)
    }

    pub fn info(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.show(ToastLevel::Info, message, now)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Notices created since the last call, for forwarding to a renderer.
    pub fn drain_new(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.outbox)
    }

    /// Manual close: removes the notice at once.
    pub fn close(&mut self, id: u64) {
        self.notices.retain(|n| n.id != id);
    }

    /// Starts exit animations for expired notices and drops finished ones.
    pub fn tick(&mut self, now: Instant) {
        for notice in &mut self.notices {
            if notice.leaving_since.is_none()
                && now.saturating_duration_since(notice.created) >= TOAST_DURATION
            {
                notice.leaving_since = Some(now);
            }
        }
        self.notices.retain(|n| {
            n.leaving_since
                .is_none_or(|since| now.saturating_duration_since(since) < TOAST_EXIT)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_icons() {
        assert_eq!(ToastLevel::Success.icon(), "check-circle");
        assert_eq!(ToastLevel::Error.icon(), "times-circle");
        assert_eq!(ToastLevel::Warning.icon(), "exclamation-triangle");
        assert_eq!(ToastLevel::parse("bogus"), ToastLevel::Info);
        assert_eq!(ToastLevel::parse("bogus").icon(), "info-circle");
    }

    #[test]
    fn notices_expire_after_five_seconds() {
        let start = Instant::now();
        let mut notifier = Notifier::default();
        notifier.success("Produto salvo", start);

        notifier.tick(start + Duration::from_secs(4));
        assert_eq!(notifier.notices().len(), 1);
        assert!(notifier.notices()[0].leaving_since.is_none());

        let expired = start + TOAST_DURATION;
        notifier.tick(expired);
        assert!(notifier.notices()[0].leaving_since.is_some());

        notifier.tick(expired + TOAST_EXIT);
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn manual_close_and_stacking() {
        let now = Instant::now();
        let mut notifier = Notifier::default();
        let a = notifier.info("a", now);
        let b = notifier.error("b", now);
        assert_eq!(notifier.drain_new().len(), 2);
        assert!(notifier.drain_new().is_empty());

        notifier.close(a);
        let ids: Vec<u64> = notifier.notices().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![b]);
    }
}
