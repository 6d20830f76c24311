// Interactive bcrypt demo: hash a password at the default cost, then
// verify a second entry against the result.

use bcrypt_rust::{hash, verify, DEFAULT_COST};
use rpassword::read_password;
use std::io::{self, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Read password securely (without displaying it)
    print!("Enter password to hash: ");
    io::stdout().flush()?;
    let password = read_password()?;

    let hashed = hash(&password, DEFAULT_COST, None)?;
    println!("\nHashed password: {}", hashed);

    print!("\nEnter password to verify: ");
    io::stdout().flush()?;
    let candidate = read_password()?;

    let is_valid = verify(&candidate, &hashed);
    println!(
        "\nPassword verification: {}",
        if is_valid { "success" } else { "failed" }
    );

    Ok(())
}
