//! Sign-in and session commands
use chirp_core::Chirp;

use super::{Output, UserInfo};

pub async fn login(chirp: &Chirp, out: &Output, email: &str, password: &str) -> anyhow::Result<()> {
    let response = chirp.session().login(email, password).await?;
    let info = UserInfo::from_user(&response.user);
    out.emit(&info, |u| format!("Signed in as @{}", u.username))
}

pub async fn register(
    chirp: &Chirp,
    out: &Output,
    name: &str,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let response = chirp
        .session()
        .register(name, username, email, password)
        .await?;
    let info = UserInfo::from_user(&response.user);
    out.emit(&info, |u| format!("Welcome, @{}", u.username))
}

pub fn logout(chirp: &Chirp, out: &Output) -> anyhow::Result<()> {
    chirp.session().logout();
    out.message("Signed out")
}

pub fn whoami(chirp: &Chirp, out: &Output) -> anyhow::Result<()> {
    let session = chirp.session().snapshot();
    match &session.user {
        Some(user) if session.is_authenticated => {
            out.emit(&UserInfo::from_user(user), UserInfo::line)
        }
        _ => out.message("Not signed in"),
    }
}
