use rand::distributions::DistString as _;

/// Matches the length of the opaque bearer tokens the server issues
pub const DEF_RANDOM_STRING_LEN: usize = 32;

pub fn random_string(len: usize) -> String {
    rand::distributions::Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

pub fn random_string_def_len() -> String {
    random_string(DEF_RANDOM_STRING_LEN)
}
