//! Customer login and wishlist commands.

use clap::{Args, Subcommand};
use erp_storefront_client::{ErpClient, ItemCode, SessionClient, UserSession};
use secrecy::SecretString;

use super::{CommandResult, emit};

/// Customer credentials, taken from flags or the environment.
#[derive(Args)]
pub struct Credentials {
    /// Email address or mobile number
    #[arg(long, env = "STOREFRONT_USER")]
    identifier: String,

    /// Password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Save an item, or update its quantity
    Add {
        /// Item code
        item_code: String,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Remove an item
    Remove {
        /// Item code
        item_code: String,
    },
    /// Remove every item
    Clear,
}

async fn sign_in(
    client: &ErpClient,
    credentials: &Credentials,
) -> Result<(SessionClient, UserSession), Box<dyn std::error::Error>> {
    let session = client.open_session()?;
    let password = SecretString::from(credentials.password.clone());
    let user = session.login(&credentials.identifier, &password).await?;
    tracing::info!(user = %user.user, "Signed in");
    Ok((session, user))
}

pub async fn login(client: &ErpClient, credentials: &Credentials) -> CommandResult {
    let (session, user) = sign_in(client, credentials).await?;
    emit(&user)?;
    session.logout().await?;
    Ok(())
}

pub async fn wishlist(
    client: &ErpClient,
    credentials: &Credentials,
    action: WishlistAction,
) -> CommandResult {
    let (session, user) = sign_in(client, credentials).await?;
    let user = user.user.as_str();

    match action {
        WishlistAction::Show => emit(&session.get_wishlist(user).await?)?,
        WishlistAction::Add {
            item_code,
            qty,
            notes,
        } => {
            let wishlist = session
                .add_item(user, &ItemCode::new(item_code), qty, notes.as_deref())
                .await?;
            emit(&wishlist)?;
        }
        WishlistAction::Remove { item_code } => {
            emit(&session.remove_item(user, &ItemCode::new(item_code)).await?)?;
        }
        WishlistAction::Clear => {
            session.clear(user).await?;
            tracing::info!("Wishlist cleared");
        }
    }

    session.logout().await?;
    Ok(())
}
