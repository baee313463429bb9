//! Utility functions and helpers

/// Render base units with thousands separators, the way chain RPC
/// "human" encodings print balances (`1234567` -> `"1,234,567"`).
pub fn format_grouped(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Generate a unique transaction hash
pub fn generate_tx_hash() -> String {
    format!("0x{}", uuid::Uuid::new_v4().simple())
}
