use clap::Parser;
use restatic::Args;
use restatic::Config;
use restatic::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::try_from(Args::parse())?;
    restatic::server::serve(config).await
}
