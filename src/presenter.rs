//! Headless status-bar presenter
//!
//! Subscribes to every observable of both models plus the completion event
//! and keeps the status-bar strings current. The presenter holds plain
//! handles to the models; the models know nothing about it beyond the
//! subscriptions it owns. Dropping the presenter unsubscribes everything.

use crate::formatting::{self, COMPLETION_ALERT};
use crate::observable::{Subscription, lock};
use crate::tasks::TaskList;
use crate::timer::CountdownTimer;
use std::sync::{Arc, Mutex};

/// What the status bar currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBarView {
    pub title: String,
    pub tooltip: String,
    /// Number of notifications rendered so far
    pub renders: u64,
    /// Completion alerts raised so far
    pub alerts_raised: u64,
}

pub struct StatusBarPresenter {
    view: Arc<Mutex<StatusBarView>>,
    _subscriptions: Vec<Subscription>,
}

impl StatusBarPresenter {
    /// Render once and subscribe to both models
    pub fn attach(timer: CountdownTimer, tasks: TaskList) -> Self {
        let view = Arc::new(Mutex::new(StatusBarView::default()));
        render(&view, &timer, &tasks);

        let refresh = {
            let view = view.clone();
            let timer = timer.clone();
            let tasks = tasks.clone();
            Arc::new(move || render(&view, &timer, &tasks))
        };

        let mut subscriptions = Vec::with_capacity(5);
        let on_change = refresh.clone();
        subscriptions.push(timer.subscribe_remaining_time(move |_| on_change()));
        let on_change = refresh.clone();
        subscriptions.push(timer.subscribe_status(move |_| on_change()));
        let on_change = refresh.clone();
        subscriptions.push(tasks.subscribe_tasks(move |_| on_change()));
        let on_change = refresh;
        subscriptions.push(tasks.subscribe_current_index(move |_| on_change()));

        let alert_view = view.clone();
        subscriptions.push(timer.subscribe_completion(move |_| {
            lock(&alert_view).alerts_raised += 1;
            tracing::info!(alert = COMPLETION_ALERT, "{} Timer", formatting::APP_NAME);
        }));

        Self {
            view,
            _subscriptions: subscriptions,
        }
    }

    /// Snapshot of the current status-bar strings
    pub fn view(&self) -> StatusBarView {
        lock(&self.view).clone()
    }
}

fn render(view: &Mutex<StatusBarView>, timer: &CountdownTimer, tasks: &TaskList) {
    let title = formatting::status_title(timer, tasks);
    let tooltip = formatting::status_tooltip(timer);
    let mut view = lock(view);
    if view.title != title || view.tooltip != tooltip {
        tracing::debug!(%title, %tooltip, "status bar updated");
    }
    view.title = title;
    view.tooltip = tooltip;
    view.renders += 1;
}
