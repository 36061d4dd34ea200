use crate::db::PgPool;
use crate::routes::{
    health_check::health_check,
    order::order::{create_order, delete_order, get_order, list_orders},
    products::product::{
        create_product, delete_product, get_product, list_products, update_product,
    },
};
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{dev::Server, web, App, HttpResponse, HttpServer};
use serde_json::json;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/**************************************************************/
// Application State to reuse the same code in main and tests
/***************************************************************/
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(port: u16, pool: PgPool) -> Result<Self, std::io::Error> {
        let listener = if port == 0 {
            TcpListener::bind("127.0.0.1:0")?
        } else {
            let address = format!("127.0.0.1:{}", port);
            TcpListener::bind(&address)?
        };

        let actual_port = listener.local_addr()?.port();

        let server = run_server(listener, pool.clone()).await?;
        Ok(Self {
            port: actual_port,
            server,
        })
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/******************************************/
// Running Server
/******************************************/
pub async fn run_server(listener: TcpListener, pool: PgPool) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_header(header::CONTENT_TYPE);

        // Malformed JSON bodies get the same envelope as every other error
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(json!({ "message": "Invalid JSON payload" })),
            )
            .into()
        });

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .app_data(json_config)
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/products")
                    .route("", web::get().to(list_products))
                    .route("", web::post().to(create_product))
                    .route("/{id}", web::get().to(get_product))
                    .route("/{id}", web::put().to(update_product))
                    .route("/{id}", web::delete().to(delete_product)),
            )
            .service(
                web::scope("/api/orders")
                    .route("", web::get().to(list_orders))
                    .route("", web::post().to(create_order))
                    .route("/{id}", web::get().to(get_order))
                    .route("/{id}", web::delete().to(delete_order)),
            )
    })
    .listen(listener)?
    .run();
    Ok(server)
}
