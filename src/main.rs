use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::{authentication, authorization, capture_presence},
    modules::{
        event::{repository_pg::EventRepositoryPg, service::EventService},
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        geo::{repository_pg::LocationRepositoryPg, service::GeoService},
        notify::LogNotifier,
        user::{repository_pg::UserRepositoryPg, schema::UserRole, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .map_err(|_| std::io::Error::other("Database migration error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let event_repo = Arc::new(EventRepositoryPg::new(db_pool.clone()));
    let location_repo = Arc::new(LocationRepositoryPg::new(db_pool.clone()));
    let notifier = Arc::new(LogNotifier);

    let user_service = UserService::with_dependencies(user_repo.clone(), Arc::new(redis_pool));
    let friend_service = FriendService::with_dependencies(
        friend_repo,
        user_repo.clone(),
        notifier.clone() as Arc<dyn modules::notify::Notifier>,
    );
    let event_service = EventService::with_dependencies(
        event_repo.clone(),
        user_repo.clone(),
        notifier as Arc<dyn modules::notify::Notifier>,
    );
    let geo_service =
        GeoService::with_dependencies(location_repo, event_repo, ENV.max_distance_km);

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(geo_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .service(
                web::scope("/api").configure(modules::user::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(authorization(vec![UserRole::User, UserRole::Admin])))
                        .wrap(from_fn(capture_presence))
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::friend::route::configure)
                        .configure(modules::event::route::configure)
                        .configure(modules::geo::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
