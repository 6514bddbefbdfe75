use actix_web::middleware::Logger;
use actix_web::web::{delete, get, post, put, resource, scope, Data};
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use haven::core::services::membership::VotePolicy;
use haven::handlers;
use haven::impls::analyzer::random::RandomAnalyzer;
use haven::impls::fetcher::http::HttpFetcher;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "actix_web=info,haven=info");
    }
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    let policy = VotePolicy::from_env();
    let fetcher = HttpFetcher::new();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(policy.clone()))
            .app_data(Data::new(RandomAnalyzer::default()))
            .app_data(Data::new(fetcher.clone()))
            .service(
                scope("membership/{role}")
                    .service(
                        resource("applications")
                            .route(post().to(handlers::membership::apply))
                            .route(get().to(handlers::membership::list)),
                    )
                    .service(resource("applications/{application_id}/votes").route(post().to(handlers::membership::cast_vote)))
                    .service(resource("login").route(post().to(handlers::membership::login))),
            )
            .service(
                scope("feed/{role}")
                    .service(
                        resource("posts")
                            .route(get().to(handlers::feed::list))
                            .route(post().to(handlers::feed::publish)),
                    )
                    .service(resource("posts/{post_id}/hide").route(post().to(handlers::feed::hide))),
            )
            .service(
                scope("notes/{role}/{login_id}")
                    .service(
                        resource("")
                            .route(get().to(handlers::note::list))
                            .route(post().to(handlers::note::create)),
                    )
                    .service(
                        resource("{note_id}")
                            .route(put().to(handlers::note::update))
                            .route(delete().to(handlers::note::delete_note)),
                    ),
            )
            .service(resource("analysis").route(post().to(handlers::analysis::analyze::<RandomAnalyzer>)))
            .service(resource("browse").route(get().to(handlers::browse::fetch_page::<HttpFetcher>)))
    })
    .bind(bind_addr)?
    .run()
    .await
}
