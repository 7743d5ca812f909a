use chrono::Utc;
use tracing::{error, info, warn, Instrument};

use urbanzest::app_system::{setup_tracing, OrderingSystem};
use urbanzest::config::Config;
use urbanzest::domain::{format_price, PaymentMethod, SignUpForm};
use urbanzest::error::{AuthError, UserFacing};
use urbanzest::history::{average_rating, describe_age};
use urbanzest::router::{resolve, Navigation, Route};

const DEMO_EMAIL: &str = "demo@urbanzest.test";
const DEMO_PASSWORD: &str = "urbanzest";

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::load().map_err(|e| e.to_string())?;
    info!(backend = ?config.backend, "Starting Urbanzest client");

    let system = OrderingSystem::start(&config).map_err(|e| e.to_string())?;

    let outcome = run_demo(&system).await;
    if let Err(message) = &outcome {
        error!(%message, "Demo session stopped");
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    outcome
}

/// One scripted visit: sign in, fill the cart, pay, watch the delivery and
/// rate it.
async fn run_demo(system: &OrderingSystem) -> Result<(), String> {
    let span = tracing::info_span!("sign_in");
    let user = async {
        let form = SignUpForm {
            full_name: "Demo Customer".to_string(),
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            confirm_password: DEMO_PASSWORD.to_string(),
            address: "42 Curry Lane, Bengaluru".to_string(),
            ..Default::default()
        };
        match system.users.sign_up(form).await {
            Err(AuthError::EmailTaken(_)) => {
                info!("Account exists, logging in");
                system.users.login(DEMO_EMAIL, DEMO_PASSWORD).await
            }
            other => other,
        }
    }
    .instrument(span)
    .await
    .map_err(|e| e.user_message())?;
    info!(name = user.display_name(), "Signed in");

    if let Navigation::Redirect(route) = resolve(Route::Cart.path(), system.session.is_logged_in()) {
        warn!(to = route.path(), "Cart page unavailable");
    }

    let menu = system.menu.fetch_menu().await;
    system.cart.fetch().await.map_err(|e| e.user_message())?;
    for dish in menu.iter().take(3) {
        system
            .cart
            .add_item(dish.id.clone(), 1, &dish.name, dish.price)
            .await
            .map_err(|e| e.user_message())?;
    }
    if let Some(first) = menu.first() {
        system
            .cart
            .update_quantity(first.id.clone(), 2)
            .await
            .map_err(|e| e.user_message())?;
    }
    info!(total = %format_price(system.cart.total(&menu)), "Cart ready");

    let snapshot = system
        .cart
        .checkout_snapshot(&menu)
        .map_err(|e| e.user_message())?;

    let span = tracing::info_span!("checkout");
    let placed = system
        .orders
        .place_order(&snapshot, Some(&user), Some(PaymentMethod::Card), "Leave at the door")
        .instrument(span)
        .await
        .map_err(|e| e.user_message())?;
    info!(order_id = %placed.order.id, total = %format_price(placed.order.total), "Order placed");

    let tracked = system.orders.track_order(placed.order.id.clone()).await;
    if let Some(notice) = &tracked.notice {
        warn!(%notice, "Tracking placeholder order");
    }

    let mut tracker = system.track(tracked.order.id.clone());
    let mut updates = tracker.subscribe();
    while updates.changed().await.is_ok() {
        let view = *updates.borrow_and_update();
        info!(
            status = view.status_text(),
            progress = view.progress,
            remaining_minutes = view.remaining_minutes,
            "Delivery update"
        );
        if view.arrival_notice {
            info!("Your order is arriving soon");
            tracker.dismiss_arrival_notice();
            // only the notice flag changed
            updates.borrow_and_update();
        }
        if view.is_delivered() {
            break;
        }
    }
    tracker.wait().await;

    system
        .session
        .set_rating(placed.order.id.clone(), 5)
        .map_err(|e| e.user_message())?;

    let now = Utc::now();
    let history = system
        .orders
        .order_history(now)
        .await
        .map_err(|e| e.user_message())?;
    for entry in history.visible() {
        info!(
            order_id = %entry.order.id,
            placed = %describe_age(entry.placed_at, now),
            total = %format_price(entry.order.total),
            rating = ?system.session.rating(&entry.order.id),
            "Order history"
        );
    }
    if let Some(average) = average_rating(&system.session.ratings()) {
        info!(orders = history.len(), average = %format!("{average:.1}"), "Ratings");
    }

    Ok(())
}
