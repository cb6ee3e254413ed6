//! Change notification and status-bar presenter tests
mod common;

use allyhub::{
    ContextLoop, CountdownTimer, MainContext, StatusBarPresenter, Task, TaskList, TimerStatus,
};
use common::{elapse, recorded, recorder, tasks_fixture, timer_fixture};
use std::time::Duration;

fn models() -> (CountdownTimer, TaskList, ContextLoop) {
    let (context, context_loop) = MainContext::new();
    (
        CountdownTimer::new(context.clone()),
        TaskList::new(context),
        context_loop,
    )
}

#[tokio::test]
async fn test_deliveries_wait_for_the_context() {
    let (timer, mut context_loop) = timer_fixture();
    let (statuses, callback) = recorder::<TimerStatus>();
    let _subscription = timer.subscribe_status(callback);

    timer.start();
    assert!(recorded(&statuses).is_empty());

    context_loop.run_until_idle();
    assert_eq!(recorded(&statuses), vec![TimerStatus::Running]);
}

#[tokio::test]
async fn test_subscribe_does_not_replay_current_value() {
    let (timer, mut context_loop) = timer_fixture();
    timer.set_remaining_time(42);
    context_loop.run_until_idle();

    let (values, callback) = recorder::<i64>();
    let _subscription = timer.subscribe_remaining_time(callback);
    context_loop.run_until_idle();

    assert!(recorded(&values).is_empty());
}

#[tokio::test]
async fn test_status_sequence() {
    let (timer, mut context_loop) = timer_fixture();
    let (statuses, callback) = recorder::<TimerStatus>();
    let _subscription = timer.subscribe_status(callback);

    timer.toggle();
    timer.toggle();
    context_loop.run_until_idle();

    assert_eq!(
        recorded(&statuses),
        vec![TimerStatus::Running, TimerStatus::Paused]
    );
}

#[test]
fn test_same_value_is_not_delivered() {
    let (timer, mut context_loop) = timer_fixture();
    let (values, callback) = recorder::<i64>();
    let _subscription = timer.subscribe_remaining_time(callback);

    timer.set_remaining_time(3600);
    timer.set_remaining_time(10);
    timer.set_remaining_time(10);
    context_loop.run_until_idle();

    assert_eq!(recorded(&values), vec![10]);
}

#[test]
fn test_current_index_notifications() {
    let (tasks, mut context_loop) = tasks_fixture();
    let (indices, callback) = recorder::<usize>();
    let _subscription = tasks.subscribe_current_index(callback);

    tasks.next_task();
    tasks.next_task();
    tasks.previous_task();
    // Out of range: nothing changes, nothing is delivered
    tasks.go_to_task(9);
    context_loop.run_until_idle();

    assert_eq!(recorded(&indices), vec![1, 2, 1]);
}

#[test]
fn test_add_task_notifies_tasks_only() {
    let (tasks, mut context_loop) = tasks_fixture();
    let (lists, on_tasks) = recorder::<Vec<Task>>();
    let (indices, on_index) = recorder::<usize>();
    let _tasks_subscription = tasks.subscribe_tasks(on_tasks);
    let _index_subscription = tasks.subscribe_current_index(on_index);

    tasks.add_task("Plan sprint");
    context_loop.run_until_idle();

    let lists = recorded(&lists);
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].len(), 5);
    assert_eq!(lists[0][4].title, "Plan sprint");
    assert!(recorded(&indices).is_empty());
}

#[test]
fn test_complete_notifies_tasks_then_index() {
    let (tasks, mut context_loop) = tasks_fixture();
    let (order, on_tasks) = recorder::<&'static str>();
    let index_sink = order.clone();
    let _tasks_subscription = tasks.subscribe_tasks(move |_| on_tasks(&"tasks"));
    let _index_subscription = tasks.subscribe_current_index(move |_| {
        index_sink.lock().unwrap().push("current_index")
    });

    tasks.mark_current_task_completed();
    context_loop.run_until_idle();

    assert_eq!(recorded(&order), vec!["tasks", "current_index"]);
}

#[test]
fn test_dropped_subscription_receives_nothing() {
    let (tasks, mut context_loop) = tasks_fixture();
    let (indices, callback) = recorder::<usize>();
    let subscription = tasks.subscribe_current_index(callback);

    tasks.next_task();
    // Delivery is already queued when the subscriber goes away
    drop(subscription);
    context_loop.run_until_idle();

    assert!(recorded(&indices).is_empty());
}

#[test]
fn test_subscribers_run_in_registration_order() {
    let (tasks, mut context_loop) = tasks_fixture();
    let (order, first) = recorder::<&'static str>();
    let second_sink = order.clone();
    let _first = tasks.subscribe_current_index(move |_| first(&"first"));
    let _second = tasks.subscribe_current_index(move |_| {
        second_sink.lock().unwrap().push("second")
    });

    tasks.next_task();
    context_loop.run_until_idle();

    assert_eq!(recorded(&order), vec!["first", "second"]);
}

#[test]
fn test_presenter_initial_render() {
    let (timer, tasks, _context_loop) = models();

    let presenter = StatusBarPresenter::attach(timer, tasks);
    let view = presenter.view();

    assert_eq!(view.title, "01:00:00 · Email triage (0/4)");
    assert_eq!(view.tooltip, "AllyHub - 01:00:00 (Stopped)");
    assert_eq!(view.renders, 1);
    assert_eq!(view.alerts_raised, 0);
}

#[test]
fn test_presenter_follows_task_changes() {
    let (timer, tasks, mut context_loop) = models();
    let presenter = StatusBarPresenter::attach(timer, tasks.clone());

    tasks.mark_current_task_completed();
    // Nothing is rendered until the context runs
    assert_eq!(presenter.view().renders, 1);

    context_loop.run_until_idle();
    let view = presenter.view();
    assert_eq!(view.title, "01:00:00 · Spec doc review (1/4)");
    // One render for the task list, one for the cursor
    assert_eq!(view.renders, 3);
}

#[tokio::test(start_paused = true)]
async fn test_presenter_follows_countdown_and_raises_alert() {
    let (timer, tasks, mut context_loop) = models();
    let presenter = StatusBarPresenter::attach(timer.clone(), tasks);

    timer.set_remaining_time(2);
    timer.start();
    context_loop.run_until_idle();
    assert_eq!(presenter.view().tooltip, "AllyHub - 00:00:02 (Running)");

    elapse(Duration::from_secs(5)).await;
    context_loop.run_until_idle();

    let view = presenter.view();
    assert_eq!(view.title, "00:00:00 · Email triage (0/4)");
    assert_eq!(view.tooltip, "AllyHub - 00:00:00 (Stopped)");
    assert_eq!(view.alerts_raised, 1);
}

#[test]
fn test_presenter_renders_extreme_remaining_times() {
    let (timer, tasks, mut context_loop) = models();
    let presenter = StatusBarPresenter::attach(timer.clone(), tasks);

    timer.set_remaining_time(i64::MIN);
    context_loop.run_until_idle();
    let view = presenter.view();
    assert_eq!(view.title, "00:00:00 · Email triage (0/4)");
    assert_eq!(view.tooltip, "AllyHub - 00:00:00 (Stopped)");

    timer.set_remaining_time(i64::MAX);
    context_loop.run_until_idle();
    assert!(presenter.view().title.starts_with("2562047788015215:30:07"));
    assert_eq!(presenter.view().renders, 3);
}

#[test]
fn test_no_op_task_commands_deliver_nothing() {
    let (tasks, mut context_loop) = tasks_fixture();
    let (lists, on_tasks) = recorder::<Vec<Task>>();
    let _subscription = tasks.subscribe_tasks(on_tasks);

    tasks.go_to_task(3);
    tasks.next_task();
    tasks.remove_task(17);
    tasks.go_to_task(-4);

    assert_eq!(context_loop.run_until_idle(), 0);
    assert!(recorded(&lists).is_empty());
}

#[test]
fn test_dropping_presenter_unsubscribes() {
    let (timer, tasks, mut context_loop) = models();
    let presenter = StatusBarPresenter::attach(timer.clone(), tasks.clone());

    drop(presenter);
    tasks.next_task();
    timer.set_remaining_time(5);

    // No subscriber left, so nothing is queued
    assert_eq!(context_loop.run_until_idle(), 0);
}
