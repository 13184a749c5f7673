//! Helpers shared by leaderboard primitives.

use uuid::Uuid;

/// Short, stable prefix of an identifier used in tables and logs.
pub fn short_id(id: Uuid) -> String {
    let mut text = id.simple().to_string();
    text.truncate(8);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_keeps_first_eight_hex_digits() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(short_id(id), "67e55044");
    }
}
