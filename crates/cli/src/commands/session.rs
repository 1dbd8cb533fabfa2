//! Session commands: `login`, `logout`, `whoami`.

use shiftwatch_client::projection::avatar_for;
use shiftwatch_core::PhoneNumber;

use super::{CommandError, Context};

/// Sign in and save the session.
pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<(), CommandError> {
    let profile = ctx.client.login(email, password).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Bienvenido, {}", profile.full_name);
    }
    Ok(())
}

/// Forget the saved session.
pub async fn logout(ctx: &Context) {
    ctx.client.logout().await;

    #[allow(clippy::print_stdout)]
    {
        println!("Sesión cerrada");
    }
}

/// Stored numbers are the bare nine digits; show them with the country prefix.
fn display_phone(raw: &str) -> String {
    PhoneNumber::parse(raw).map_or_else(|_| raw.to_owned(), |phone| phone.international())
}

/// Print the signed-in profile.
pub async fn whoami(ctx: &Context) -> Result<(), CommandError> {
    let session = ctx.client.session().await;
    let (Some(_), Some(profile)) = (session.token, session.profile) else {
        return Err(CommandError::NotSignedIn);
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{} <{}>", profile.full_name, profile.email);
        println!("  ID:      {}", profile.id);
        println!("  Celular: {}", display_phone(&profile.phone));
        println!("  Avatar:  {}", avatar_for(&profile).asset());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_phone_adds_country_prefix() {
        assert_eq!(display_phone("987654321"), "+51 987654321");
        assert_eq!(display_phone("+51987654321"), "+51 987654321");
        assert_eq!(display_phone("123"), "123");
    }
}
