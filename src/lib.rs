pub mod application;
pub mod auth;
pub mod context;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod validation;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::commerce_service::CommerceService;
use infrastructure::memory::{InMemoryCartRepository, InMemoryOrderRepository};

/// The service wired to its in-memory repositories.
pub type AppService = CommerceService<InMemoryOrderRepository, InMemoryCartRepository>;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::cancel_order,
        handlers::orders::update_order_status,
        handlers::cart::add_cart_item,
        handlers::cart::get_cart,
    ),
    components(schemas(
        handlers::orders::CreateOrderRequest,
        handlers::orders::CancelOrderRequest,
        handlers::orders::UpdateOrderStatusRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderLinks,
        handlers::orders::ListOrdersResponse,
        handlers::cart::AddCartItemRequest,
        handlers::cart::CartResponse,
        handlers::cart::CartItemResponse,
        validation::Violation,
    )),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "cart", description = "Cart intake"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. State lives in the in-memory repositories created here,
/// so each built server is independent.
pub fn build_server(host: &str, port: u16) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(AppService::new(
        InMemoryOrderRepository::new(),
        InMemoryCartRepository::new(),
    ));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .wrap(from_fn(context::bind_request_context))
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::get_cart))
                    .route("/items", web::post().to(handlers::cart::add_cart_item)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}/cancel", web::post().to(handlers::orders::cancel_order))
                    .route("/{id}/status", web::put().to(handlers::orders::update_order_status)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
