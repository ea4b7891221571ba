use std::sync::Arc;
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_catalog::CatalogLoader;
use wayfare_client::{CheckoutError, CheckoutFlow, HttpBookingService, HttpCatalogService, PlannedSeat};
use wayfare_core::cancel_pair;
use wayfare_order::{BookingSaga, SagaOutcome};
use wayfare_store::{app_config::Config, RedisSessionStore, SessionBridge};

const USAGE: &str = "usage: wayfare <session-id> <leg>:<passenger>:<seat>...";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare=info,wayfare_client=debug,wayfare_order=debug,wayfare_catalog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let session_id = args.next().context(USAGE)?;
    let plan = args
        .map(|a| a.parse::<PlannedSeat>())
        .collect::<Result<Vec<_>, _>>()?;

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Checkout for session {}", session_id);

    let store = RedisSessionStore::new(&config.session.redis_url, &session_id, config.session.ttl_seconds)
        .context("Failed to open Redis client")?;
    let session = SessionBridge::new(Arc::new(store));

    let catalog = Arc::new(HttpCatalogService::new(&config.catalog.base_url));
    let loader = CatalogLoader::new(catalog, config.catalog.timeout());
    let booking = Arc::new(HttpBookingService::new(&config.booking.base_url));
    let saga = BookingSaga::new(booking, config.booking.saga_policy());

    let (handle, cancel) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight requests");
            handle.cancel();
        }
    });

    let mut flow = match CheckoutFlow::enter(session.clone(), Arc::new(session), loader, saga).await {
        Ok(flow) => flow,
        Err(CheckoutError::NeedsTripSetup) => {
            eprintln!("{}", CheckoutError::NeedsTripSetup);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    for err in flow.load_catalogs(&cancel).await {
        tracing::warn!("{}", err);
    }
    for leg_index in flow.board().unresolved_legs() {
        flow.retry_leg(leg_index, &cancel)
            .await
            .with_context(|| format!("Seat map for leg {} is unavailable", leg_index + 1))?;
    }

    for planned in &plan {
        flow.select(planned.leg_index, planned.passenger_index, &planned.seat)
            .with_context(|| format!("Cannot select seat {}", planned.seat))?;
    }

    let quote = flow.quote();
    tracing::info!(
        "Fare for {} passenger(s): onward {}, return {}, protection {}, total {}",
        quote.passenger_count,
        quote.onward_total,
        quote.return_total,
        quote.cancellation_protection + quote.reschedule_protection,
        quote.total
    );

    match flow.confirm(&cancel).await? {
        SagaOutcome::Completed(success) => {
            println!("Booked {} (total {})", success.booking_ids().join(", "), success.total_amount());
            Ok(())
        }
        SagaOutcome::Failed(failure) => {
            eprintln!("{}", failure.summary());
            std::process::exit(2);
        }
    }
}
