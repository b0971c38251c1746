use crate::api;
use crate::api::handlers::state::AdminConfig;
use crate::cli::actions::Action;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            passkey,
            secure_cookies,
        } => {
            let config = AdminConfig::new(passkey, secure_cookies);

            api::new(port, dsn, config).await?;
        }
    }

    Ok(())
}
