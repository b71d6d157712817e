//! Mailbox password generation.

use rand::Rng;

use crate::config::MIN_PASSWORD_LENGTH;

/// Alphabet for generated passwords, without look-alikes (0/O, 1/l/I).
const PASSWORD_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Generate a random mailbox password.
///
/// The result has at least [`MIN_PASSWORD_LENGTH`] characters and contains
/// an uppercase letter, a lowercase letter and a digit, which Mailcow's
/// default password policy requires.
pub fn generate_mailbox_password(length: usize) -> String {
    let length = length.max(MIN_PASSWORD_LENGTH);
    let mut rng = rand::rng();

    loop {
        let password: String = (0..length)
            .map(|_| {
                let idx = rng.random_range(0..PASSWORD_CHARS.len());
                PASSWORD_CHARS[idx] as char
            })
            .collect();

        if meets_policy(&password) {
            return password;
        }
    }
}

fn meets_policy(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
