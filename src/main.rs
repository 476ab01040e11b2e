use lambda_http::{run, service_fn, Error, Request};
use tracing_subscriber::EnvFilter;

use social_todo_api::{config::Config, db, router};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env();
    let db_client = db::DynamoClient::new(&config.table_name).await;

    run(service_fn(move |req: Request| {
        let db = db_client.clone();
        async move { router::route(req, &db).await }
    }))
    .await
}
