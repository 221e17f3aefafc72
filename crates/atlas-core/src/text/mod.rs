//! Text operations shared by the builder and the query path: tokenizing,
//! token replacement, id hashing, degenerates and subquery permutations.

pub mod degens;
pub mod ids;
pub mod permutations;
pub mod replacer;
pub mod tokenize;

pub use degens::{degenerates, encode_degen, sort_mod4, DEGEN_MAX_DISTANCE};
pub use ids::{lang_hash, phrase_id, term_id};
pub use permutations::{num_tokenize, permutations, uniq_permutations, Subquery};
pub use replacer::{TokenReplacer, TokenRule};
pub use tokenize::{encodable_text, is_address_number, num_token, tokenize};
