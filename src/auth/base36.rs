// crates.io
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Renders `value` in lowercase base36, the notation nonces and CSRF tokens
/// use for their timestamp component.
pub(crate) fn encode(mut value: u128) -> String {
	if value == 0 {
		return "0".into();
	}

	let mut digits = Vec::new();

	while value > 0 {
		digits.push(ALPHABET[(value % 36) as usize]);
		value /= 36;
	}

	digits.reverse();

	digits.into_iter().map(char::from).collect()
}

/// Draws `len` uniformly random base36 characters.
pub(crate) fn random_chars(len: usize) -> String {
	let mut rng = rand::rng();

	(0..len).map(|_| ALPHABET[rng.random_range(0..36)] as char).collect()
}
