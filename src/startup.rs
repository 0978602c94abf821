use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, TokenMaker};
use crate::configuration::JwtSettings;
use crate::middleware::{JwtMiddleware, RequestLogging};
use crate::routes::{
    create_order, create_product, create_user, delete_product, delete_user, get_order,
    get_product, health_check, list_orders, list_products, list_users, login, logout, refresh,
    revoke, update_product, update_user,
};
use crate::session::PgSessionStore;

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let token_maker = TokenMaker::new(jwt_config.secret.clone());
    let session_store = Arc::new(PgSessionStore::new(connection.clone()));
    let auth_service = web::Data::new(AuthService::new(
        token_maker.clone(),
        session_store,
        &jwt_config,
    ));
    let connection = web::Data::new(connection);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogging)
            // Shared state
            .app_data(connection.clone())
            .app_data(auth_service.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/users", web::post().to(create_user))
            .route("/products", web::get().to(list_products))
            .route("/products/{id}", web::get().to(get_product))
            // Session management (requires a valid access token)
            .service(
                web::scope("/auth")
                    .wrap(JwtMiddleware::new(token_maker.clone()))
                    .route("/logout", web::post().to(logout))
                    .route("/revoke", web::post().to(revoke)),
            )
            // Authenticated routes
            .service(
                web::scope("/orders")
                    .wrap(JwtMiddleware::new(token_maker.clone()))
                    .service(
                        web::resource("")
                            .route(web::post().to(create_order))
                            .route(web::get().to(list_orders)),
                    )
                    .route("/{id}", web::get().to(get_order)),
            )
            .service(
                web::scope("/users")
                    .wrap(JwtMiddleware::new(token_maker.clone()))
                    .route("/me", web::patch().to(update_user)),
            )
            // Admin routes
            .service(
                web::scope("/admin")
                    .wrap(JwtMiddleware::admin(token_maker.clone()))
                    .route("/users", web::get().to(list_users))
                    .route("/users/{id}", web::delete().to(delete_user))
                    .route("/products", web::post().to(create_product))
                    .service(
                        web::resource("/products/{id}")
                            .route(web::patch().to(update_product))
                            .route(web::delete().to(delete_product)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
