//! Prints a `[[users]]` entry for the server config.
//!
//! Usage: `hash_password <username>`; the password is read from stdin.

use std::io::{self, Write};

#[allow(dead_code)]
#[path = "../auth/password.rs"]
mod password;

fn main() -> anyhow::Result<()> {
    let username = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: hash_password <username>"))?;

    eprint!("Enter password for {username}: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim();

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = password::hash_password(password)?;

    println!("[[users]]");
    println!("username = \"{username}\"");
    println!("password_hash = \"{hash}\"");
    println!("folders = [\"/\"]");
    Ok(())
}
