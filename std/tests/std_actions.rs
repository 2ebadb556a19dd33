use parking_lot::Mutex;
use screenflow_core::{FlowConfig, Outcome, RenderReason};
use screenflow_runtime::{FlowController, StackItem};
use screenflow_std::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct Order {
    total: u32,
    express: bool,
    blocked: bool,
}

fn screen(tag: &str) -> StackItem<Order, String> {
    let label = tag.to_string();
    StackItem::screen(tag, move |_| label.clone())
}

fn build(
    items: Vec<StackItem<Order, String>>,
    order: Order,
) -> (FlowController<Order, String>, Arc<Mutex<Vec<RenderReason>>>) {
    let reasons = Arc::new(Mutex::new(Vec::new()));
    let sink = reasons.clone();
    let flow = FlowController::builder("checkout", order)
        .config(FlowConfig::default())
        .on_render(move |reason| sink.lock().push(reason))
        .items(items)
        .build()
        .unwrap();
    (flow, reasons)
}

fn current_tag(flow: &FlowController<Order, String>) -> Option<String> {
    flow.current_screen()
        .and_then(|screen| screen.item.tag().map(str::to_string))
}

#[test]
fn test_branching_helpers_route_the_walk() {
    let items = vec![
        screen("cart"),
        StackItem::new().with_action(end_when(|order: &Order| order.blocked)),
        StackItem::new().with_action(when(|order: &Order| order.express, "express")),
        StackItem::tagged("discount")
            .with_action(skip_unless(|order: &Order| order.total > 100))
            .with_render(|_| "discount".to_string()),
        screen("standard"),
        screen("express"),
    ];

    let (flow, _) = build(items, Order { total: 50, ..Order::default() });
    flow.start();
    flow.next();
    assert_eq!(current_tag(&flow).as_deref(), Some("standard"));

    flow.back();
    flow.update_then_next(|order| order.express = true);
    assert_eq!(current_tag(&flow).as_deref(), Some("express"));

    flow.back();
    flow.update_then_next(|order| order.blocked = true);
    assert!(flow.is_ended());
}

#[test]
fn test_switch_routes_by_state() {
    let items = vec![
        screen("start"),
        StackItem::new().with_action(switch(|order: &Order| {
            (order.total > 100).then_some("review")
        })),
        screen("pay"),
        screen("review"),
    ];

    let (flow, _) = build(items, Order { total: 150, ..Order::default() });
    flow.start();
    flow.next();
    assert_eq!(current_tag(&flow).as_deref(), Some("review"));
}

#[tokio::test]
async fn test_delay_shows_busy_screen_until_elapsed() {
    let items = vec![
        screen("start"),
        StackItem::tagged("processing")
            .with_action(delay(Duration::from_millis(10), Outcome::Continue))
            .with_render_busy(|_| "processing".to_string()),
        screen("done"),
    ];

    let (flow, reasons) = build(items, Order::default());
    flow.start();
    flow.next();
    assert!(flow.is_locked());
    assert_eq!(current_tag(&flow).as_deref(), Some("processing"));

    flow.settled().await;

    assert!(!flow.is_locked());
    assert_eq!(current_tag(&flow).as_deref(), Some("done"));
    assert_eq!(flow.screen_count(), 2);
    assert_eq!(
        reasons.lock().clone(),
        vec![RenderReason::Start, RenderReason::Next, RenderReason::Next]
    );
}

#[tokio::test]
async fn test_timeout_ends_the_flow() {
    let items = vec![
        screen("start"),
        StackItem::tagged("upload")
            .with_action(|_, _| {
                Ok(with_timeout::<Order, _, _>(
                    Duration::from_millis(5),
                    std::future::pending::<anyhow::Result<Outcome>>(),
                ))
            })
            .with_render_busy(|_| "uploading".to_string()),
        screen("done"),
    ];

    let (flow, _) = build(items, Order::default());
    flow.start();
    flow.next();
    flow.settled().await;

    assert!(flow.is_ended());
    assert_eq!(current_tag(&flow).as_deref(), Some("start"));
}
