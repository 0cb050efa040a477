//! Binding table from live notifications to their click targets.
//!
//! Exactly one binding exists per live notification identifier: created when
//! the platform accepts a notification, consulted on click-through, removed
//! on the platform's dismissal event.

use std::collections::HashMap;

use crate::types::status::{NotificationId, TabId};

/// What clicking a notification should do.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    /// Focus this tab's window, then activate the tab.
    Tab(TabId),
    /// Open a new tab at this URL.
    Url(String),
}

/// Notification-id → click-target table.
pub struct NotificationBinder {
    bindings: HashMap<NotificationId, ClickTarget>,
}

impl NotificationBinder {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, id: NotificationId, target: ClickTarget) {
        if self.bindings.insert(id.clone(), target).is_some() {
            log::warn!("replaced existing binding for notification {}", id.0);
        }
    }

    pub fn target(&self, id: &NotificationId) -> Option<&ClickTarget> {
        self.bindings.get(id)
    }

    /// Remove the binding for a dismissed notification.
    pub fn unbind(&mut self, id: &NotificationId) -> Option<ClickTarget> {
        self.bindings.remove(id)
    }

    /// Drop every binding that targets the given tab. Used when the tab's
    /// page agent is destroyed.
    pub fn drop_tab(&mut self, tab: TabId) {
        self.bindings
            .retain(|_, target| !matches!(target, ClickTarget::Tab(t) if *t == tab));
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for NotificationBinder {
    fn default() -> Self {
        Self::new()
    }
}
