//! Course billing server.
//!
//! `course-billing` runs against PostgreSQL and YooKassa using the
//! `COURSE_BILLING__*` environment. `course-billing --in-memory` runs with
//! in-memory stores, a mock gateway and a seeded demo catalog.

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course_billing::adapters::auth::{JwtSessionValidator, MockSessionValidator};
use course_billing::adapters::events::{InMemoryEventBus, LogEventPublisher};
use course_billing::adapters::http::{app_router, AppState, HttpSettings};
use course_billing::adapters::memory::{
    InMemoryMembershipRepository, InMemoryPlatformStore, InMemoryTransactionRepository,
};
use course_billing::adapters::postgres::{
    PostgresMembershipRepository, PostgresPlatformReader, PostgresTierRepository,
    PostgresTransactionRepository,
};
use course_billing::adapters::yookassa::{MockPaymentGateway, YooKassaClient};
use course_billing::application::{CheckoutSettings, WebhookVerification};
use course_billing::config::{AppConfig, ServerConfig};
use course_billing::domain::access::{AccessParams, Course, CourseAccessConfig};
use course_billing::domain::foundation::{CommunityId, CourseId, Money, TierId, UserId};
use course_billing::domain::tier::{SubscriptionTier, TierFeature};
use course_billing::ports::Community;

const DEV_TOKEN: &str = "dev-token";
const DEV_USER: &str = "dev-user";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let in_memory = std::env::args().skip(1).any(|arg| arg == "--in-memory");

    if in_memory {
        run_in_memory().await
    } else {
        run().await
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        webhook_verification = ?config.payment.webhook_verification,
        "Starting course billing"
    );

    let pool = config
        .database
        .pool_options()
        .connect(config.database.url.as_str())
        .await?;
    tracing::info!("Database pool created");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let platform = Arc::new(PostgresPlatformReader::new(pool.clone()));
    let state = AppState {
        transactions: Arc::new(PostgresTransactionRepository::new(pool.clone())),
        memberships: Arc::new(PostgresMembershipRepository::new(pool.clone())),
        tiers: Arc::new(PostgresTierRepository::new(
            pool.clone(),
            config.payment.currency.clone(),
        )),
        communities: platform.clone(),
        courses: platform.clone(),
        profiles: platform,
        gateway: Arc::new(YooKassaClient::new(config.payment.yookassa())?),
        event_publisher: Arc::new(LogEventPublisher::new()),
        session_validator: Arc::new(JwtSessionValidator::new(config.auth.jwt())),
        checkout: config.payment.checkout(),
        webhook_verification: config.payment.webhook_verification,
    };

    serve(state, &config.server, &config.http_settings()).await
}

async fn run_in_memory() -> anyhow::Result<()> {
    let server = ServerConfig::default();
    init_tracing(&server);

    let platform = Arc::new(InMemoryPlatformStore::new());
    seed_demo_catalog(&platform).await?;

    let state = AppState {
        transactions: Arc::new(InMemoryTransactionRepository::new()),
        memberships: Arc::new(InMemoryMembershipRepository::new()),
        tiers: platform.clone(),
        communities: platform.clone(),
        courses: platform.clone(),
        profiles: platform,
        gateway: Arc::new(MockPaymentGateway::new()),
        event_publisher: Arc::new(InMemoryEventBus::new()),
        session_validator: Arc::new(
            MockSessionValidator::new().with_test_user(DEV_TOKEN, DEV_USER),
        ),
        checkout: CheckoutSettings::new(format!("http://localhost:{}", server.port)),
        webhook_verification: WebhookVerification::Trust,
    };

    tracing::warn!(token = DEV_TOKEN, user_id = DEV_USER, "Running with in-memory stores");

    let settings = HttpSettings {
        cors_origins: vec!["*".to_string()],
        request_timeout: server.request_timeout(),
    };
    serve(state, &server, &settings).await
}

async fn serve(
    state: AppState,
    server: &ServerConfig,
    settings: &HttpSettings,
) -> anyhow::Result<()> {
    let app = app_router(state, settings);
    let addr = server.socket_addr()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().pretty()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

/// One community with a free tier, a paid tier and one course of each kind.
async fn seed_demo_catalog(store: &InMemoryPlatformStore) -> anyhow::Result<()> {
    let owner = UserId::new("demo-owner")?;
    let community_id = CommunityId::new();

    store
        .add_community(Community {
            id: community_id,
            name: "Demo school".to_string(),
            owner_id: owner.clone(),
        })
        .await;

    let paid_course = CourseId::new();
    store
        .add_tier(
            SubscriptionTier::new(TierId::new(), community_id, "Free", Money::new(0, "RUB")?)
                .with_features([TierFeature::Other("Community feed".to_string())]),
        )
        .await;
    store
        .add_tier(
            SubscriptionTier::new(
                TierId::new(),
                community_id,
                "Pro",
                Money::new(99_000, "RUB")?,
            )
            .with_features([TierFeature::SelectedCourses, TierFeature::PrivateChat])
            .with_courses([paid_course]),
        )
        .await;

    let params = AccessParams::default();
    store
        .add_course(Course {
            id: CourseId::new(),
            community_id,
            owner_id: owner.clone(),
            title: "Welcome".to_string(),
            access: CourseAccessConfig::from_tags(&["open"], &params)?,
        })
        .await;
    store
        .add_course(Course {
            id: paid_course,
            community_id,
            owner_id: owner,
            title: "Advanced".to_string(),
            access: CourseAccessConfig::from_tags(&["paid_subscription"], &params)?,
        })
        .await;

    tracing::info!(community_id = %community_id, course_id = %paid_course, "Seeded demo catalog");
    Ok(())
}
