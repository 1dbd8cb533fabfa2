//! Theme commands.

use super::Context;

/// Print the saved theme.
pub async fn show(ctx: &Context) {
    let theme = ctx.credentials().load_theme().await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", theme.as_str());
    }
}

/// Flip between dark and light.
pub async fn toggle(ctx: &Context) {
    let theme = ctx.credentials().toggle_theme().await;

    #[allow(clippy::print_stdout)]
    {
        println!("Tema: {}", theme.as_str());
    }
}
