use alerta_core::session::validate_login_form;
use alerta_core::Role;

use crate::commands::common::AppContext;
use crate::error::CliError;

pub fn run_login(
    context: &AppContext,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), CliError> {
    validate_login_form(email, password)?;
    let user = context.session.login(email, password, role)?;
    println!("Signed in as {} ({})", user.email, user.role.label());
    Ok(())
}

pub fn run_logout(context: &AppContext) {
    let previous = context.session.current();
    context.session.logout();
    match previous {
        Some(user) => println!("Signed out {}", user.email),
        None => println!("Not signed in."),
    }
}

pub fn run_whoami(context: &AppContext) -> Result<(), CliError> {
    let user = context.require_user()?;
    println!("{} ({})", user.email, user.role.label());
    println!("id: {}", user.id);
    if user.role.has_admin_view() {
        println!("Run `alerta admin` for the administrative view.");
    }
    Ok(())
}
