// std imports
use std::collections::HashSet;

// 3rd party imports
use rand::Rng;

/// Prefix of every dataset ID
///
pub const ID_PREFIX: &str = "HDX_";

/// Mints a new dataset ID, `HDX_` followed by 8 uppercase hex characters, which is not in `existing_ids`.
///
/// # Arguments
/// * `existing_ids` - IDs already in use
///
pub fn mint_new_dataset_id(existing_ids: &HashSet<String>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let new_id = format!("{}{:08X}", ID_PREFIX, rng.gen::<u32>());
        if !existing_ids.contains(&new_id) {
            return new_id;
        }
    }
}

/// Checks if the ID starts with `HDX_` followed by 8 alphanumeric characters
///
/// # Arguments
/// * `dataset_id` - ID to check
///
pub fn valid_id(dataset_id: &str) -> bool {
    match dataset_id.strip_prefix(ID_PREFIX) {
        Some(suffix) => suffix.len() == 8 && suffix.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}
