//! Authenticated landing view and logout.

use crate::client::{AuthClient, UserProfile};
use crate::session::{SessionContext, TokenStore};
use crate::Destination;
use tracing::{debug, instrument, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardView {
    Redirect(Destination),
    Ready(UserProfile),
}

/// Loads the current user for the dashboard. Any lookup failure drops the
/// token and sends the user back to login.
#[instrument(skip_all)]
pub async fn load<S: TokenStore>(
    session: &mut SessionContext<S>,
    client: &AuthClient,
) -> DashboardView {
    let Some(token) = session.token() else {
        debug!("No session token, redirecting to login");
        return DashboardView::Redirect(Destination::Login);
    };

    match client.fetch_current_user(&token).await {
        Ok(profile) => DashboardView::Ready(profile),
        Err(err) => {
            warn!("User lookup failed, clearing session: {err}");
            session.clear_token();
            DashboardView::Redirect(Destination::Login)
        }
    }
}

pub fn logout<S: TokenStore>(session: &mut SessionContext<S>) -> Destination {
    session.sign_out();
    Destination::Login
}
