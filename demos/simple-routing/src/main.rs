//! Simple routing demo.
//!
//! Serves two routes on `localhost:8080`:
//!
//! ```text
//! GET /                  -> This is the main page!
//! GET /query?amount=5    -> The value is 5. It's square is 25
//! ```
//!
//! Pass a TOML file as the first argument to override the bind address:
//!
//! ```text
//! cargo run -p simple-routing -- server.toml
//! ```

use ramus::prelude::*;

fn query(ctx: &mut RequestContext) -> Result<(), HandlerError> {
    let value = int_parameter("amount").get(ctx)?;
    let square = value
        .checked_mul(value)
        .ok_or_else(|| HandlerError::internal(format!("square of {value} overflows")))?;
    ctx.complete(format!("The value is {value}. It's square is {square}"))?;
    Ok(())
}

fn routes() -> Route {
    get([
        path("", [complete("This is the main page!")]),
        path("query", [handle(query)]),
    ])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::development())?;

    let config = match std::env::args().nth(1) {
        Some(file) => ServerConfig::from_file(file)?,
        None => ServerConfig::default(),
    };

    tracing::info!(addr = %config.addr(), "starting simple routing demo");
    Server::new(config, routes()).run().await?;
    Ok(())
}
