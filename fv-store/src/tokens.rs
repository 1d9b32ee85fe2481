use fv_core::TEAM_CODE_PREFIX;
use rand::Rng;
use rand::distr::Alphanumeric;

pub const SHARE_TOKEN_LEN: usize = 26;
pub const TEAM_CODE_SUFFIX_LEN: usize = 6;

const TEAM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Opaque public-report token. Uniqueness is enforced by the `share_token` constraint.
pub fn generate_share_token() -> String {
    rand::rng().sample_iter(&Alphanumeric).take(SHARE_TOKEN_LEN).map(char::from).collect()
}

/// `TEAM-` followed by six uppercase alphanumerics.
pub fn generate_team_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..TEAM_CODE_SUFFIX_LEN)
        .map(|_| TEAM_CODE_ALPHABET[rng.random_range(0..TEAM_CODE_ALPHABET.len())] as char)
        .collect();
    format!("{TEAM_CODE_PREFIX}{suffix}")
}
