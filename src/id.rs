use uuid::Uuid;

/// Digits used for paste ids. Visually ambiguous characters (`0`, `1`, `I`,
/// `O`, `l`) are left out, and every character is safe in a URL path.
const ALPHABET: &[u8; 57] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of every generated id; 57^22 covers the full 128-bit range.
pub const ID_LEN: usize = 22;

/// Generate a new random paste id.
pub fn generate_id() -> String {
    encode(Uuid::new_v4().as_u128())
}

/// Whether `id` could have been produced by [`generate_id`].
pub fn is_well_formed(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| ALPHABET.contains(&b))
}

fn encode(mut value: u128) -> String {
    let base = ALPHABET.len() as u128;
    let mut digits = [ALPHABET[0]; ID_LEN];

    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % base) as usize];
        value /= base;
    }

    digits.iter().map(|&b| b as char).collect()
}
