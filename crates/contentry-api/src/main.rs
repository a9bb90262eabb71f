//! Contentry API 서버.
//!
//! Axum 기반 사용자 계정 관리/인증 서버를 시작합니다.
//! 로그인, 사용자 CRUD, 역할 관리 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use contentry_api::auth::{AccessGate, AuthService};
use contentry_api::repository::PgUserStore;
use contentry_api::routes::create_api_router;
use contentry_api::state::AppState;
use contentry_core::{
    init_logging, AppConfig, Argon2Hasher, LogConfig, PasswordHasher, RoleRegistry, UserStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    dotenvy::dotenv().ok();

    // 설정 로드: 파일(선택) + CONTENTRY__* 환경 변수
    let config = AppConfig::load_default().context("설정 로드 실패")?;

    // 로깅 초기화 (잘못된 형식 값은 조용히 넘어가지 않는다)
    let log_format = config
        .logging
        .format
        .parse()
        .map_err(|e| anyhow::anyhow!("로그 형식 해석 실패: {}", e))?;
    init_logging(LogConfig::new(&config.logging.level).with_format(log_format))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    // JWT 서명 키는 반드시 설정되어야 함
    if config.auth.jwt_secret.is_empty() {
        anyhow::bail!("JWT 비밀 키가 설정되지 않았습니다 (CONTENTRY__AUTH__JWT_SECRET)");
    }

    // 데이터베이스 연결 풀
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL 환경 변수가 필요합니다")?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(&database_url)
        .await
        .context("데이터베이스 연결 실패")?;
    info!("Database connected");

    // 협력자 조립: 해셔 → 저장소 → 인증 서비스 → 게이트
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool, Arc::clone(&hasher)));
    let auth = Arc::new(
        AuthService::new(
            Arc::clone(&store),
            hasher,
            &config.auth.jwt_secret,
            config.auth.token_expiry_secs,
        )
        .map_err(|e| anyhow::anyhow!("인증 서비스 초기화 실패: {}", e))?,
    );
    let gate = Arc::new(AccessGate::new(Arc::clone(&auth), RoleRegistry::builtin()));
    let state = Arc::new(AppState::new(store, auth, gate));

    let app = create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive());

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("바인딩 실패: {}", addr))?;
    info!(addr = %addr, "API server listening");

    axum::serve(listener, app).await.context("서버 실행 실패")?;
    Ok(())
}
