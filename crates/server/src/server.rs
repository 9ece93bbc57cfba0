use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{accounts, movements, reconciliations, transfers, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user = match user {
        Some(user) if user.active => user,
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/cash/accounts",
            post(accounts::cash_account_new).get(accounts::cash_account_list),
        )
        .route("/cash/accounts/{id}", get(accounts::cash_account_get))
        .route(
            "/cash/accounts/{id}/deactivate",
            post(accounts::cash_account_deactivate),
        )
        .route("/cash/movements", post(movements::cash_movement_new))
        .route("/cash/movements/list", post(movements::cash_movement_list))
        .route(
            "/cash/movements/{id}/confirm",
            post(movements::cash_movement_confirm),
        )
        .route(
            "/cash/movements/{id}/cancel",
            post(movements::cash_movement_cancel),
        )
        .route("/cash/transfers", post(transfers::cash_transfer_new))
        .route(
            "/cash/reconciliations",
            post(reconciliations::cash_reconciliation_new),
        )
        .route(
            "/cash/reconciliations/{id}/approve",
            post(reconciliations::cash_reconciliation_approve),
        )
        .route(
            "/bank/accounts",
            post(accounts::bank_account_new).get(accounts::bank_account_list),
        )
        .route("/bank/accounts/{id}", get(accounts::bank_account_get))
        .route(
            "/bank/accounts/{id}/deactivate",
            post(accounts::bank_account_deactivate),
        )
        .route("/bank/transactions", post(movements::bank_transaction_new))
        .route(
            "/bank/transactions/list",
            post(movements::bank_transaction_list),
        )
        .route(
            "/bank/transactions/{id}/clear",
            post(movements::bank_transaction_clear),
        )
        .route(
            "/bank/transactions/{id}/cancel",
            post(movements::bank_transaction_cancel),
        )
        .route("/bank/transfers", post(transfers::inter_bank_transfer_new))
        .route(
            "/bank/transfers/{id}/process",
            post(transfers::inter_bank_transfer_process),
        )
        .route(
            "/bank/transfers/{id}/cancel",
            post(transfers::inter_bank_transfer_cancel),
        )
        .route(
            "/bank/reconciliations",
            post(reconciliations::bank_reconciliation_new),
        )
        .route(
            "/bank/reconciliations/{id}/complete",
            post(reconciliations::bank_reconciliation_complete),
        )
        .route(
            "/bank/reconciliations/{id}/auto-match",
            post(reconciliations::bank_reconciliation_auto_match),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, active) VALUES (?, ?, ?)",
            vec!["tesorero".into(), "password".into(), true.into()],
        ))
        .await
        .unwrap();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO currencies (id, code, name, active) VALUES (?, ?, ?, ?)",
            vec!["PEN".into(), "PEN".into(), "Sol".into(), true.into()],
        ))
        .await
        .unwrap();

        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn basic_auth() -> String {
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("tesorero:password")
        )
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn requests_without_credentials_are_unauthorized() {
        let router = test_router().await;
        let res = router
            .oneshot(
                Request::builder()
                    .uri("/cash/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cash_account_round_trip() {
        let router = test_router().await;

        let payload = serde_json::json!({
            "code": "CAJA-01",
            "name": "Caja principal",
            "currency_id": "PEN",
            "initial_balance_minor": 5000
        });
        let res = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cash/accounts")
                    .header(header::AUTHORIZATION, basic_auth())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let created = json_body(res).await;
        assert_eq!(created["balance_minor"], 5000);
        let id = created["id"].as_str().unwrap().to_string();

        let res = router
            .oneshot(
                Request::builder()
                    .uri(format!("/cash/accounts/{id}"))
                    .header(header::AUTHORIZATION, basic_auth())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let fetched = json_body(res).await;
        assert_eq!(fetched["code"], "CAJA-01");
    }

    #[tokio::test]
    async fn duplicate_account_code_maps_to_409() {
        let router = test_router().await;
        let payload = serde_json::json!({
            "code": "CAJA-01",
            "name": "Caja",
            "currency_id": "PEN"
        });

        for expected in [StatusCode::OK, StatusCode::CONFLICT] {
            let res = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/cash/accounts")
                        .header(header::AUTHORIZATION, basic_auth())
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(payload.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(res.status(), expected);
        }
    }

    #[tokio::test]
    async fn unknown_account_maps_to_404() {
        let router = test_router().await;
        let res = router
            .oneshot(
                Request::builder()
                    .uri(format!("/cash/accounts/{}", uuid::Uuid::new_v4()))
                    .header(header::AUTHORIZATION, basic_auth())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
