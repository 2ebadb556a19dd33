//! # Onboarding Wizard Demo
//!
//! Walks a small onboarding flow without a UI: a scripted "user" presses the
//! buttons each rendered screen exposes.
//!
//! - synchronous branching with `screenflow-std` helpers
//! - an asynchronous account creation step with a busy screen and a timeout
//! - back/forward through the screen ledger
//!
//! ```bash
//! cargo run --bin onboarding-wizard
//! RUST_LOG=debug cargo run --bin onboarding-wizard
//! ```

use screenflow_core::prelude::*;
use screenflow_runtime::{FlowController, ScreenProps, StackItem};
use screenflow_std::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct Onboarding {
    name: String,
    team: Option<String>,
    account_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
enum View {
    Welcome,
    Name(String),
    Team,
    Creating,
    Done { name: String, account_id: u64 },
}

type Wizard = FlowController<Onboarding, View>;

fn steps() -> Vec<StackItem<Onboarding, View>> {
    vec![
        StackItem::screen("welcome", |_| View::Welcome),
        StackItem::screen("name", |props: &ScreenProps<'_, Onboarding, View>| View::Name(props.state.name.clone())),
        // solo users skip the team screen
        StackItem::tagged("team")
            .with_action(skip_unless(|state: &Onboarding| state.team.is_some()))
            .with_render(|_| View::Team),
        StackItem::tagged("create")
            .with_action(|state: &mut Onboarding, _| {
                let name = state.name.clone();
                Ok(with_timeout::<Onboarding, _, _>(Duration::from_secs(2), async move {
                    let id = create_account(&name).await?;
                    Ok::<_, anyhow::Error>(
                        Settled::new(Outcome::goto("done"))
                            .with_update(move |state: &mut Onboarding| state.account_id = Some(id)),
                    )
                }))
            })
            .with_render_busy(|_| View::Creating),
        StackItem::screen("unreachable", |_| View::Welcome),
        StackItem::screen("done", |props: &ScreenProps<'_, Onboarding, View>| View::Done {
            name: props.state.name.clone(),
            account_id: props.state.account_id.unwrap_or_default(),
        }),
    ]
}

async fn create_account(name: &str) -> anyhow::Result<u64> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    anyhow::ensure!(!name.is_empty(), "name must not be empty");
    Ok(name.bytes().map(u64::from).sum())
}

fn show(wizard: &Wizard, reason: RenderReason) {
    if let Some(screen) = wizard.current_screen() {
        println!(
            "[{reason}] screen #{} {:?}{}",
            screen.id,
            screen.result,
            if screen.busy { " (busy)" } else { "" }
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    screenflow_observe::init_stdout_tracing();

    let config = FlowConfig::from_toml_str(
        r#"
        renderDistance = 1
        maxScreens = 20
        logLevel = "info"
        "#,
    )?;

    let wizard = FlowController::builder("onboarding", Onboarding::default())
        .config(config)
        .items(steps())
        .build()?;

    let observer = wizard.downgrade();
    wizard.subscribe(move |reason| {
        if let Some(wizard) = observer.upgrade() {
            show(&wizard, reason);
        }
        Ok(())
    });

    wizard.start();
    wizard.next();

    // second thoughts: go back, then return to the name screen
    wizard.back();
    wizard.forward();

    wizard.update_then_next(|state| state.name = "Ada".into());
    tracing::info!(locked = wizard.is_locked(), "Waiting for account creation");
    wizard.settled().await;

    let state = wizard.state();
    tracing::info!(
        account_id = ?state.account_id,
        screens = wizard.screen_count(),
        "Onboarding finished"
    );

    wizard.end();
    Ok(())
}
