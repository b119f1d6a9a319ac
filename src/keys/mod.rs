pub mod flatten;
pub mod structure;

pub use flatten::{
    find_existing_segments, flatten, flatten_strict, get_path, insert_path, remove_path,
    split_key, unflatten, CollisionPolicy, FlatMap,
};
pub use structure::{apply_updates, detect_format, key_segments, preserve_structure, StructureFormat};
