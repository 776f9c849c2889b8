use chrono::Utc;
use rand::Rng;

/// Produces candidate order numbers for the checkout workflow. Injected so
/// tests can force collisions.
pub trait OrderNumberGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `ORD-<unix millis>-<9 base36 chars>`: a time-derived component plus a
/// random suffix. Uniqueness is still checked against the order store.
pub struct TimestampOrderNumbers;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl OrderNumberGenerator for TimestampOrderNumbers {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..9)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        format!("ORD-{}-{}", Utc::now().timestamp_millis(), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_numbers_have_expected_shape() {
        let number = TimestampOrderNumbers.generate();
        let parts: Vec<&str> = number.splitn(3, '-').collect();
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn consecutive_numbers_differ() {
        let a = TimestampOrderNumbers.generate();
        let b = TimestampOrderNumbers.generate();
        assert_ne!(a, b);
    }
}
